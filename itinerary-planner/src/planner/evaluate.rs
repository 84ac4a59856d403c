//! Plan evaluation.
//!
//! Pure functions from a contiguous flight sequence to the metrics the
//! ranking compares.

use std::collections::{BTreeSet, HashSet};

use chrono::Duration;

use crate::domain::{AirportCode, Flight, Itinerary, PlanMetrics, local_day};

use super::config::SearchConfig;

/// Last arrival minus first departure. Zero for an empty plan.
pub fn total_duration(flights: &[Flight]) -> Duration {
    match (flights.first(), flights.last()) {
        (Some(first), Some(last)) => last.arrives().signed_duration_since(first.departs()),
        _ => Duration::zero(),
    }
}

/// Number of distinct local calendar days touched by any departure or
/// arrival in the plan.
pub fn days_taken(flights: &[Flight]) -> usize {
    flights
        .iter()
        .flat_map(|f| [local_day(f.departs()), local_day(f.arrives())])
        .collect::<HashSet<_>>()
        .len()
}

/// Time the plan costs the traveller.
///
/// Every flight's own duration counts. A layover counts unless it is a
/// free layover: one that starts at an end airport and is no longer than
/// the minimum trip gap.
pub fn effective_duration(flights: &[Flight], config: &SearchConfig) -> Duration {
    let mut total = Duration::zero();
    for (i, flight) in flights.iter().enumerate() {
        total = total + flight.duration();

        if let Some(next) = flights.get(i + 1) {
            let layover = flight.layover_until(next);
            let free = config.is_end_airport(flight.destination()) && layover <= config.min_trip_gap();
            if !free {
                total = total + layover;
            }
        }
    }
    total
}

/// Number of consecutive flight pairs connected by an overnight layover.
pub fn count_overnights(flights: &[Flight]) -> usize {
    flights
        .windows(2)
        .filter(|pair| pair[0].is_overnight_before(&pair[1]))
        .count()
}

/// Compute every metric for a plan.
pub fn plan_metrics(flights: &[Flight], config: &SearchConfig) -> PlanMetrics {
    PlanMetrics {
        total_duration: total_duration(flights),
        effective_duration: effective_duration(flights, config),
        total_days: days_taken(flights),
        overnights: count_overnights(flights),
    }
}

/// Evaluate a flight sequence into an [`Itinerary`].
pub fn evaluate(
    flights: Vec<Flight>,
    airports: BTreeSet<AirportCode>,
    config: &SearchConfig,
) -> Itinerary {
    let metrics = plan_metrics(&flights, config);
    Itinerary::from_evaluation(flights, airports, metrics)
}
