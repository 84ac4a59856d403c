//! Flight connection graph.
//!
//! Built once per search from the flat flight list. Flights live in an
//! arena and are referred to by [`FlightId`]; the graph holds two indexes
//! over that arena:
//!
//! - departures grouped by origin airport, in input order
//! - for each flight, the flights that may legally follow it, latest
//!   departure first

use std::collections::HashMap;
use std::ops::Index;

use tracing::debug;

use crate::domain::{AirportCode, Flight};

use super::config::SearchConfig;

/// Index of a flight within a [`FlightGraph`]'s arena.
///
/// # Examples
///
/// ```
/// use itinerary_planner::planner::FlightId;
///
/// let id = FlightId(3);
/// assert_eq!(id.0, 3);
/// assert_eq!(id.to_string(), "#3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightId(pub usize);

impl std::fmt::Display for FlightId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether `outgoing` may directly follow `incoming`.
///
/// The connection must leave from where `incoming` lands, within the day
/// layover window. If the layover is an overnight it must also fit the
/// night window, at an airport where overnighting is allowed.
pub fn is_valid_connection(incoming: &Flight, outgoing: &Flight, config: &SearchConfig) -> bool {
    if outgoing.origin() != incoming.destination() {
        return false;
    }

    let layover = incoming.layover_until(outgoing);
    if layover < config.min_day_layover() || layover > config.max_day_layover() {
        return false;
    }

    if incoming.is_overnight_before(outgoing)
        && (layover < config.min_night_layover()
            || layover > config.max_night_layover()
            || !config.allows_overnight_at(incoming.destination()))
    {
        return false;
    }

    true
}

/// City and flight adjacency indexes over an arena of flights.
#[derive(Debug, Clone)]
pub struct FlightGraph {
    /// All flights, in input order.
    flights: Vec<Flight>,

    /// Map from airport -> flights departing it, in input order.
    departures: HashMap<AirportCode, Vec<FlightId>>,

    /// `successors[i]` lists the flights that may follow flight `i`,
    /// sorted by descending departure time.
    successors: Vec<Vec<FlightId>>,
}

impl FlightGraph {
    /// Build both indexes in one pass over `flights`.
    ///
    /// Identical input and configuration always give identical indexes.
    pub fn build(flights: Vec<Flight>, config: &SearchConfig) -> Self {
        let mut departures: HashMap<AirportCode, Vec<FlightId>> = HashMap::new();
        for (idx, flight) in flights.iter().enumerate() {
            departures
                .entry(flight.origin())
                .or_default()
                .push(FlightId(idx));
        }

        let successors: Vec<Vec<FlightId>> = flights
            .iter()
            .map(|incoming| {
                let mut next: Vec<FlightId> = departures
                    .get(&incoming.destination())
                    .map(|ids| {
                        ids.iter()
                            .copied()
                            .filter(|id| is_valid_connection(incoming, &flights[id.0], config))
                            .collect()
                    })
                    .unwrap_or_default();

                // Stable, so equal departure times keep input order
                next.sort_by(|a, b| flights[b.0].departs().cmp(&flights[a.0].departs()));
                next
            })
            .collect();

        let graph = Self {
            flights,
            departures,
            successors,
        };

        debug!(
            flights = graph.len(),
            airports = graph.departures.len(),
            connections = graph.connection_count(),
            "Built flight graph"
        );

        graph
    }

    /// Flights departing `airport`, in input order.
    pub fn departures_from(&self, airport: AirportCode) -> &[FlightId] {
        self.departures
            .get(&airport)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Flights that may directly follow `id`, latest departure first.
    pub fn successors(&self, id: FlightId) -> &[FlightId] {
        self.successors
            .get(id.0)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of flights.
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Returns true if the graph has no flights.
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Total number of flight-to-flight edges.
    pub fn connection_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }
}

impl Index<FlightId> for FlightGraph {
    type Output = Flight;

    fn index(&self, id: FlightId) -> &Flight {
        &self.flights[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn flight(from: &str, to: &str, num: &str, dep: NaiveDateTime, arr: NaiveDateTime) -> Flight {
        Flight::new(code(from), code(to), num, dep, arr).unwrap()
    }

    fn config() -> SearchConfig {
        SearchConfig {
            min_day_layover_mins: 60,
            max_day_layover_mins: 20 * 60,
            min_night_layover_mins: 6 * 60,
            max_night_layover_mins: 12 * 60,
            overnight_airports: vec![code("BBB")],
            end_airports: vec![code("AAA")],
            ..SearchConfig::default()
        }
    }

    fn numbers(graph: &FlightGraph, ids: &[FlightId]) -> Vec<String> {
        ids.iter().map(|id| graph[*id].number().to_string()).collect()
    }

    #[test]
    fn city_index_keeps_input_order() {
        let flights = vec![
            flight("AAA", "BBB", "late", at(1, 18, 0), at(1, 19, 0)),
            flight("CCC", "AAA", "other", at(1, 8, 0), at(1, 9, 0)),
            flight("AAA", "CCC", "early", at(1, 6, 0), at(1, 7, 0)),
        ];
        let graph = FlightGraph::build(flights, &config());

        assert_eq!(
            numbers(&graph, graph.departures_from(code("AAA"))),
            vec!["late", "early"]
        );
        assert!(graph.departures_from(code("ZZZ")).is_empty());
    }

    #[test]
    fn successors_sorted_latest_first() {
        let flights = vec![
            flight("AAA", "BBB", "in", at(1, 8, 0), at(1, 10, 0)),
            flight("BBB", "CCC", "noon", at(1, 12, 0), at(1, 13, 0)),
            flight("BBB", "DDD", "eve", at(1, 17, 0), at(1, 18, 0)),
            flight("BBB", "EEE", "aft", at(1, 14, 0), at(1, 15, 0)),
        ];
        let graph = FlightGraph::build(flights, &config());

        assert_eq!(
            numbers(&graph, graph.successors(FlightId(0))),
            vec!["eve", "aft", "noon"]
        );
        assert_eq!(graph.connection_count(), 3);
    }

    #[test]
    fn day_window_is_inclusive() {
        let incoming = flight("AAA", "BBB", "in", at(1, 8, 0), at(1, 10, 0));
        let exactly_min = flight("BBB", "CCC", "1", at(1, 11, 0), at(1, 12, 0));
        let too_tight = flight("BBB", "CCC", "2", at(1, 10, 59), at(1, 12, 0));
        let cfg = config();

        assert!(is_valid_connection(&incoming, &exactly_min, &cfg));
        assert!(!is_valid_connection(&incoming, &too_tight, &cfg));
    }

    #[test]
    fn rejects_departures_before_arrival_and_wrong_airport() {
        let incoming = flight("AAA", "BBB", "in", at(1, 8, 0), at(1, 10, 0));
        let earlier = flight("BBB", "CCC", "1", at(1, 7, 0), at(1, 8, 0));
        let elsewhere = flight("CCC", "DDD", "2", at(1, 12, 0), at(1, 13, 0));
        let cfg = config();

        assert!(!is_valid_connection(&incoming, &earlier, &cfg));
        assert!(!is_valid_connection(&incoming, &elsewhere, &cfg));
    }

    #[test]
    fn overnight_needs_allowed_airport() {
        let cfg = config();
        // Overnight at BBB (allowed), 9 hours
        let into_bbb = flight("AAA", "BBB", "1", at(1, 20, 0), at(1, 22, 0));
        let out_bbb = flight("BBB", "AAA", "2", at(2, 7, 0), at(2, 9, 0));
        assert!(is_valid_connection(&into_bbb, &out_bbb, &cfg));

        // Same times at CCC (not allowed)
        let into_ccc = flight("AAA", "CCC", "3", at(1, 20, 0), at(1, 22, 0));
        let out_ccc = flight("CCC", "AAA", "4", at(2, 7, 0), at(2, 9, 0));
        assert!(!is_valid_connection(&into_ccc, &out_ccc, &cfg));
    }

    #[test]
    fn overnight_must_fit_night_window() {
        let cfg = config();
        let into_bbb = flight("AAA", "BBB", "1", at(1, 22, 0), at(1, 23, 0));
        // 4 hours, overnight but below the 6 hour night minimum
        let too_short = flight("BBB", "AAA", "2", at(2, 3, 0), at(2, 4, 0));
        // 13 hours, above the 12 hour night maximum
        let too_long = flight("BBB", "AAA", "3", at(2, 12, 0), at(2, 13, 0));
        // 8 hours, fine
        let good = flight("BBB", "AAA", "4", at(2, 7, 0), at(2, 8, 0));

        assert!(!is_valid_connection(&into_bbb, &too_short, &cfg));
        assert!(!is_valid_connection(&into_bbb, &too_long, &cfg));
        assert!(is_valid_connection(&into_bbb, &good, &cfg));
    }

    #[test]
    fn long_day_layover_is_not_subject_to_night_window() {
        // 13 hours during the day never crosses 03:00 so only the day window applies
        let cfg = config();
        let incoming = flight("AAA", "CCC", "1", at(1, 4, 0), at(1, 5, 0));
        let outgoing = flight("CCC", "AAA", "2", at(1, 18, 0), at(1, 19, 0));
        assert!(is_valid_connection(&incoming, &outgoing, &cfg));
    }

    #[test]
    fn build_is_deterministic() {
        let flights = vec![
            flight("AAA", "BBB", "1", at(1, 8, 0), at(1, 10, 0)),
            flight("BBB", "CCC", "2", at(1, 12, 0), at(1, 13, 0)),
            flight("BBB", "AAA", "3", at(1, 12, 0), at(1, 13, 0)),
            flight("CCC", "AAA", "4", at(1, 15, 0), at(1, 16, 0)),
        ];
        let a = FlightGraph::build(flights.clone(), &config());
        let b = FlightGraph::build(flights, &config());

        for i in 0..a.len() {
            assert_eq!(a.successors(FlightId(i)), b.successors(FlightId(i)));
        }
        // Ties keep input order
        assert_eq!(numbers(&a, a.successors(FlightId(0))), vec!["2", "3"]);
    }

    #[test]
    fn unknown_id_has_no_successors() {
        let graph = FlightGraph::build(vec![], &config());
        assert!(graph.is_empty());
        assert!(graph.successors(FlightId(7)).is_empty());
    }
}
