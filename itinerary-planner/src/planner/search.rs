//! Backtracking itinerary search.
//!
//! Explores plans depth-first from the hub with an explicit LIFO stack,
//! under an iteration budget. Each popped frame is pruned, checked as an
//! endpoint, optionally chained into a new sub-trip from the hub, and
//! expanded through the flight graph.

use std::collections::BTreeSet;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::domain::{AirportCode, Flight, Itinerary};

use super::config::{ConfigError, SearchConfig};
use super::evaluate::evaluate;
use super::events::{EventSink, Progress, SearchEvent};
use super::graph::{FlightGraph, FlightId};
use super::rank::is_better;

/// Error from itinerary search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Nothing departs the hub inside the start window
    #[error("no valid initial flights found from {airport}")]
    NoInitialFlights { airport: AirportCode },
}

/// Why the search loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every frame was explored.
    Exhausted,
    /// The iteration budget ran out.
    BudgetReached,
    /// Cancellation was observed.
    Cancelled,
}

/// Result of a search run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Best plan found, if any.
    pub best: Option<Itinerary>,

    /// Iterations consumed.
    pub iterations: u64,

    /// Why the loop ended.
    pub termination: Termination,
}

impl SearchOutcome {
    /// Outcome of a run that never iterated.
    pub fn empty(termination: Termination) -> Self {
        Self {
            best: None,
            iterations: 0,
            termination,
        }
    }
}

/// Partial plan on the search stack.
#[derive(Debug, Clone)]
struct Frame {
    /// Flights in travel order. Never empty.
    plan: Vec<FlightId>,

    /// Every destination reached so far, across all sub-trips.
    visited: BTreeSet<AirportCode>,
}

impl Frame {
    /// Single-flight plan.
    fn seed(id: FlightId, graph: &FlightGraph) -> Self {
        Self {
            plan: vec![id],
            visited: BTreeSet::from([graph[id].destination()]),
        }
    }

    /// Copy of this plan with one more flight.
    fn extend(&self, id: FlightId, destination: AirportCode) -> Self {
        let mut plan = Vec::with_capacity(self.plan.len() + 1);
        plan.extend_from_slice(&self.plan);
        plan.push(id);

        let mut visited = self.visited.clone();
        visited.insert(destination);

        Self { plan, visited }
    }

    fn first(&self) -> FlightId {
        self.plan[0]
    }

    fn last(&self) -> FlightId {
        self.plan[self.plan.len() - 1]
    }
}

/// Graph and seeds for a validated search.
#[derive(Debug, Clone)]
pub(crate) struct Prepared {
    pub graph: FlightGraph,
    pub hub: AirportCode,
    pub seeds: Vec<FlightId>,
}

/// Itinerary planner.
pub struct Planner<'a> {
    config: &'a SearchConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    /// Search `flights` for the best plan.
    ///
    /// Every notification goes to `sink`. Unless the search fails to start,
    /// the last one is always [`SearchEvent::Complete`]. If it fails to
    /// start, the error is reported once as [`SearchEvent::Error`] and also
    /// returned.
    pub fn search(
        &self,
        flights: Vec<Flight>,
        cancel: &CancellationToken,
        sink: &mut impl EventSink,
    ) -> Result<SearchOutcome, SearchError> {
        let Some(prepared) = self.prepare(flights, sink)? else {
            sink.emit(SearchEvent::Complete { best: None });
            return Ok(SearchOutcome::empty(Termination::BudgetReached));
        };

        Ok(self.run(
            &prepared.graph,
            prepared.hub,
            &prepared.seeds,
            cancel,
            sink,
        ))
    }

    /// Validate, build the graph and pick seeds.
    ///
    /// Returns `None` when the iteration budget is zero, in which case no
    /// graph is built.
    pub(crate) fn prepare(
        &self,
        flights: Vec<Flight>,
        sink: &mut impl EventSink,
    ) -> Result<Option<Prepared>, SearchError> {
        let hub = self.check_config().inspect_err(|e| report(sink, e))?;

        if self.config.max_iterations == 0 {
            debug!("Iteration budget is zero, skipping search");
            return Ok(None);
        }

        let graph = FlightGraph::build(flights, self.config);
        let seeds = self.initial_flights(&graph, hub);
        if seeds.is_empty() {
            let err = SearchError::NoInitialFlights { airport: hub };
            report(sink, &err);
            return Err(err);
        }

        debug!(seeds = seeds.len(), hub = %hub, "Seeded search");
        Ok(Some(Prepared { graph, hub, seeds }))
    }

    /// Validate the configuration and resolve the hub.
    fn check_config(&self) -> Result<AirportCode, SearchError> {
        self.config.validate()?;
        self.config
            .start_airport()
            .ok_or(SearchError::InvalidConfig(ConfigError::NoEndAirports))
    }

    /// Flights leaving the hub inside the start window, in graph order.
    pub fn initial_flights(&self, graph: &FlightGraph, hub: AirportCode) -> Vec<FlightId> {
        graph
            .departures_from(hub)
            .iter()
            .copied()
            .filter(|&id| {
                let departs = graph[id].departs();
                departs >= self.config.start_date
                    && self
                        .config
                        .latest_start
                        .is_none_or(|latest| departs.date() <= latest)
            })
            .collect()
    }

    /// Whether a plan may end with `flight`.
    ///
    /// Regional end airports only count if the arrival fits their
    /// time-of-day limits; the hub has none.
    pub fn is_valid_endpoint(&self, flight: &Flight, hub: AirportCode) -> bool {
        let destination = flight.destination();
        if destination == hub {
            return true;
        }
        if !self.config.regional_end_airports().contains(&destination) {
            return false;
        }

        let arrives = flight.arrives();
        self.config.home_arrival_cutoff.admits_at_or_before(arrives)
            && self
                .config
                .regional_arrival_earliest
                .is_none_or(|earliest| earliest.precedes(arrives))
    }

    /// Run the search loop from `seeds`.
    pub(crate) fn run(
        &self,
        graph: &FlightGraph,
        hub: AirportCode,
        seeds: &[FlightId],
        cancel: &CancellationToken,
        sink: &mut impl EventSink,
    ) -> SearchOutcome {
        let config = self.config;
        let max_iterations = config.max_iterations;

        let mut stack: Vec<Frame> = seeds.iter().map(|&id| Frame::seed(id, graph)).collect();
        let mut best: Option<Itinerary> = None;
        let mut iteration: u64 = 0;
        let mut last_progress: u64 = 0;

        let termination = loop {
            if cancel.is_cancelled() {
                break Termination::Cancelled;
            }
            if stack.is_empty() {
                break Termination::Exhausted;
            }
            if iteration >= max_iterations {
                break Termination::BudgetReached;
            }
            let Some(frame) = stack.pop() else {
                break Termination::Exhausted;
            };

            let current_id = frame.last();
            let current = &graph[current_id];

            // Prune: too long, or too many repeat visits
            let span = current
                .arrives()
                .signed_duration_since(graph[frame.first()].departs());
            if span > config.max_plan()
                || frame.plan.len() > frame.visited.len() + config.max_dup_airports
            {
                trace!(len = frame.plan.len(), "Pruned frame");
                iteration += 1;
                continue;
            }

            if self.is_valid_endpoint(current, hub) {
                if frame.visited.len() >= config.min_dest_airports {
                    let flights = frame.plan.iter().map(|&id| graph[id].clone()).collect();
                    let candidate = evaluate(flights, frame.visited.clone(), config);

                    let improves = best
                        .as_ref()
                        .is_none_or(|incumbent| is_better(incumbent, &candidate, config.dest_cap));
                    if improves {
                        debug!(
                            iteration,
                            flights = candidate.segment_count(),
                            destinations = candidate.destination_count(),
                            days = candidate.total_days(),
                            "New best plan"
                        );
                        sink.emit(SearchEvent::NewBest {
                            plan: candidate.clone(),
                        });
                        best = Some(candidate);
                    }
                }

                // Chain another round trip from the hub
                if frame.visited.len() < config.dest_cap {
                    for &next in graph.departures_from(hub) {
                        let gap = graph[next]
                            .departs()
                            .signed_duration_since(current.arrives());
                        if gap >= config.min_trip_gap() && gap <= config.max_trip_gap() {
                            stack.push(frame.extend(next, graph[next].destination()));
                        }
                    }
                }
            }

            // Successors are latest-first, so the earliest is popped first
            let len = frame.plan.len();
            for &next in graph.successors(current_id) {
                let destination = graph[next].destination();
                if 2 * len < config.min_dest_airports && destination == current.origin() {
                    continue;
                }
                if len < config.min_dest_airports && destination == hub {
                    continue;
                }
                stack.push(frame.extend(next, destination));
            }

            iteration += 1;

            if iteration - last_progress >= config.progress_interval {
                sink.emit(SearchEvent::Progress(Progress {
                    percent: (iteration as f64 / max_iterations as f64 * 100.0).min(100.0),
                    iteration,
                    max_iterations,
                    queue_size: stack.len(),
                }));
                last_progress = iteration;
            }
        };

        info!(
            iterations = iteration,
            ?termination,
            found = best.is_some(),
            "Search finished"
        );

        sink.emit(SearchEvent::Complete { best: best.clone() });

        SearchOutcome {
            best,
            iterations: iteration,
            termination,
        }
    }
}

/// Report a failed start to the sink.
fn report(sink: &mut impl EventSink, err: &SearchError) {
    debug!(error = %err, "Search failed to start");
    sink.emit(SearchEvent::Error {
        message: err.to_string(),
    });
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
