//! Evaluated itineraries.
//!
//! An `Itinerary` is a complete candidate plan: a chain of
//! flights that starts and ends at end airports, together with the set of
//! airports it visits and the metrics the ranking uses.

use std::collections::BTreeSet;
use std::fmt;

use chrono::Duration;

use super::{AirportCode, Flight};

/// Derived metrics for a flight sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanMetrics {
    /// Last arrival minus first departure.
    pub total_duration: Duration,

    /// In-flight time plus every layover that is not a free layover at an
    /// end airport.
    pub effective_duration: Duration,

    /// Distinct local calendar days touched by any departure or arrival.
    pub total_days: usize,

    /// Consecutive flight pairs whose layover is an overnight.
    pub overnights: usize,
}

/// A terminal, evaluated candidate plan.
///
/// # Invariants
///
/// - At least one flight
/// - Consecutive flights connect (destination of one = origin of next),
///   except where a new sub-trip leaves the hub after a landing at a
///   regional end airport
///
/// Plans made only of hub round trips pass [`Itinerary::is_contiguous`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    flights: Vec<Flight>,
    airports: BTreeSet<AirportCode>,
    metrics: PlanMetrics,
}

impl Itinerary {
    /// Assembles an itinerary from an already-evaluated flight sequence.
    pub(crate) fn from_evaluation(
        flights: Vec<Flight>,
        airports: BTreeSet<AirportCode>,
        metrics: PlanMetrics,
    ) -> Self {
        Self {
            flights,
            airports,
            metrics,
        }
    }

    /// Returns the flights in travel order.
    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    /// Distinct destination airports visited by any flight of the plan.
    pub fn airports(&self) -> &BTreeSet<AirportCode> {
        &self.airports
    }

    /// Returns the derived metrics.
    pub fn metrics(&self) -> &PlanMetrics {
        &self.metrics
    }

    /// Number of flights.
    pub fn segment_count(&self) -> usize {
        self.flights.len()
    }

    /// Number of distinct destinations.
    pub fn destination_count(&self) -> usize {
        self.airports.len()
    }

    /// Last arrival minus first departure.
    pub fn total_duration(&self) -> Duration {
        self.metrics.total_duration
    }

    /// Time counted against the traveller, excluding free layovers.
    pub fn effective_duration(&self) -> Duration {
        self.metrics.effective_duration
    }

    /// Distinct calendar days the plan touches.
    pub fn total_days(&self) -> usize {
        self.metrics.total_days
    }

    /// Number of overnight layovers.
    pub fn overnights(&self) -> usize {
        self.metrics.overnights
    }

    /// Airport the plan starts from, if any.
    pub fn origin(&self) -> Option<AirportCode> {
        self.flights.first().map(Flight::origin)
    }

    /// Airport the plan finishes at, if any.
    pub fn destination(&self) -> Option<AirportCode> {
        self.flights.last().map(Flight::destination)
    }

    /// True if the plan is non-empty and each flight leaves from where the
    /// previous one landed.
    pub fn is_contiguous(&self) -> bool {
        !self.flights.is_empty()
            && self
                .flights
                .windows(2)
                .all(|pair| pair[0].destination() == pair[1].origin())
    }
}

/// Format a duration as "Xh YYm", with a day prefix past 24 hours.
pub fn format_duration(duration: Duration) -> String {
    let total_mins = duration.num_minutes();
    let sign = if total_mins < 0 { "-" } else { "" };
    let total_mins = total_mins.abs();
    let days = total_mins / (24 * 60);
    let hours = (total_mins / 60) % 24;
    let mins = total_mins % 60;
    if days > 0 {
        format!("{sign}{days}d {hours}h {mins:02}m")
    } else {
        format!("{sign}{hours}h {mins:02}m")
    }
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Plan: {} flights, {} destinations:",
            self.flights.len(),
            self.airports.len()
        )?;

        for (i, flight) in self.flights.iter().enumerate() {
            write!(
                f,
                "  {} -> {} ({}) {} -> {}",
                flight.origin(),
                flight.destination(),
                flight.number(),
                flight.departs().format("%m.%d %H:%M"),
                flight.arrives().format("%m.%d %H:%M"),
            )?;
            if let Some(next) = self.flights.get(i + 1) {
                let night = if flight.is_overnight_before(next) {
                    " (night)"
                } else {
                    ""
                };
                write!(
                    f,
                    " [layover: {}{}]",
                    format_duration(flight.layover_until(next)),
                    night
                )?;
            }
            writeln!(f)?;
        }

        let airports: Vec<&str> = self.airports.iter().map(AirportCode::as_str).collect();
        writeln!(f, "  Total duration: {}", format_duration(self.total_duration()))?;
        writeln!(
            f,
            "  Effective duration: {}",
            format_duration(self.effective_duration())
        )?;
        writeln!(f, "  Days taken: {}", self.total_days())?;
        writeln!(f, "  Overnight layovers: {}", self.overnights())?;
        write!(f, "  Airports visited: [{}]", airports.join(", "))
    }
}
