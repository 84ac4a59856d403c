//! Search configuration for the itinerary planner.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{AirportCode, ClockTime};

/// Error from configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// At least one end airport is needed; the first is the start hub
    #[error("end airport list must not be empty")]
    NoEndAirports,

    /// A duration bound is below zero
    #[error("{name} must not be negative (got {mins} minutes)")]
    NegativeDuration { name: &'static str, mins: i64 },

    /// A duration bound is too large to represent
    #[error("{name} is out of range (got {mins} minutes)")]
    DurationOutOfRange { name: &'static str, mins: i64 },

    /// A min/max pair is the wrong way round
    #[error("{name} window is inverted: min {min} minutes > max {max} minutes")]
    InvertedWindow {
        name: &'static str,
        min: i64,
        max: i64,
    },

    /// Search window ends before it starts
    #[error("search window ends ({end}) before it starts ({start})")]
    InvertedSearchWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// A zero destination cap would make every plan rank equal
    #[error("destination cap must be at least 1")]
    ZeroDestinationCap,

    /// Progress would be reported on every iteration boundary of zero
    #[error("progress interval must be at least 1 iteration")]
    ZeroProgressInterval,
}

/// Configuration parameters for itinerary search.
///
/// Durations are stored as whole minutes so the configuration reads
/// naturally from JSON; use the accessor methods to get `chrono::Duration`s.
/// Every key is optional when deserializing and falls back to
/// [`SearchConfig::default`]; unknown keys are rejected. Duration keys are
/// also accepted without their `Mins` suffix (`maxDayLayover`, `maxPlanDur`,
/// `minTripGap`, ...), still counted in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchConfig {
    /// Shortest allowed connection (minutes).
    #[serde(alias = "minDayLayover")]
    pub min_day_layover_mins: i64,

    /// Longest allowed connection (minutes).
    #[serde(alias = "maxDayLayover")]
    pub max_day_layover_mins: i64,

    /// Shortest allowed overnight connection (minutes).
    /// Applies on top of the day window when the layover is an overnight.
    #[serde(alias = "minNightLayover")]
    pub min_night_layover_mins: i64,

    /// Longest allowed overnight connection (minutes).
    #[serde(alias = "maxNightLayover")]
    pub max_night_layover_mins: i64,

    /// Airports where an overnight layover is acceptable.
    pub overnight_airports: Vec<AirportCode>,

    /// Legal trip termini. The first is the primary hub every plan starts
    /// from; the rest are regional alternates.
    pub end_airports: Vec<AirportCode>,

    /// Latest local arrival time at a regional end airport.
    pub home_arrival_cutoff: ClockTime,

    /// If set, arrivals at a regional end airport must also land strictly
    /// after this local time.
    pub regional_arrival_earliest: Option<ClockTime>,

    /// Distinct destinations beyond this count do not improve a plan.
    pub dest_cap: usize,

    /// Minimum distinct destinations for a plan to count.
    pub min_dest_airports: usize,

    /// How many more flights than distinct destinations a plan may have.
    pub max_dup_airports: usize,

    /// Maximum span from first departure to last arrival (minutes).
    #[serde(alias = "maxPlanDur")]
    pub max_plan_mins: i64,

    /// Minimum time at the hub before chaining another trip (minutes).
    #[serde(alias = "minTripGap")]
    pub min_trip_gap_mins: i64,

    /// Maximum time at the hub before chaining another trip (minutes).
    #[serde(alias = "maxTripGap")]
    pub max_trip_gap_mins: i64,

    /// Initial flights must depart at or after this instant.
    pub start_date: NaiveDateTime,

    /// End of the schedule window; flights arriving after it are dropped
    /// when loading a schedule.
    pub end_date: NaiveDateTime,

    /// If set, initial flights must depart on or before this date.
    pub latest_start: Option<NaiveDate>,

    /// Hard cap on search iterations.
    pub max_iterations: u64,

    /// Iterations between progress notifications.
    pub progress_interval: u64,
}

impl SearchConfig {
    /// Parse a configuration from JSON, filling unspecified keys with
    /// defaults. The result is not validated.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check the configuration is usable before starting a search.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end_airports.is_empty() {
            return Err(ConfigError::NoEndAirports);
        }

        let bounds = [
            ("min day layover", self.min_day_layover_mins),
            ("max day layover", self.max_day_layover_mins),
            ("min night layover", self.min_night_layover_mins),
            ("max night layover", self.max_night_layover_mins),
            ("max plan duration", self.max_plan_mins),
            ("min trip gap", self.min_trip_gap_mins),
            ("max trip gap", self.max_trip_gap_mins),
        ];
        for (name, mins) in bounds {
            if mins < 0 {
                return Err(ConfigError::NegativeDuration { name, mins });
            }
            if Duration::try_minutes(mins).is_none() {
                return Err(ConfigError::DurationOutOfRange { name, mins });
            }
        }

        let windows = [
            (
                "day layover",
                self.min_day_layover_mins,
                self.max_day_layover_mins,
            ),
            (
                "night layover",
                self.min_night_layover_mins,
                self.max_night_layover_mins,
            ),
            ("trip gap", self.min_trip_gap_mins, self.max_trip_gap_mins),
        ];
        for (name, min, max) in windows {
            if min > max {
                return Err(ConfigError::InvertedWindow { name, min, max });
            }
        }

        if self.end_date < self.start_date {
            return Err(ConfigError::InvertedSearchWindow {
                start: self.start_date,
                end: self.end_date,
            });
        }

        if self.dest_cap == 0 {
            return Err(ConfigError::ZeroDestinationCap);
        }

        if self.progress_interval == 0 {
            return Err(ConfigError::ZeroProgressInterval);
        }

        Ok(())
    }

    /// The primary hub: first end airport.
    pub fn start_airport(&self) -> Option<AirportCode> {
        self.end_airports.first().copied()
    }

    /// End airports other than the primary hub.
    pub fn regional_end_airports(&self) -> &[AirportCode] {
        self.end_airports.get(1..).unwrap_or(&[])
    }

    /// True if `airport` is any end airport.
    pub fn is_end_airport(&self, airport: AirportCode) -> bool {
        self.end_airports.contains(&airport)
    }

    /// True if an overnight layover is allowed at `airport`.
    pub fn allows_overnight_at(&self, airport: AirportCode) -> bool {
        self.overnight_airports.contains(&airport)
    }

    /// Returns the minimum day layover as a Duration.
    pub fn min_day_layover(&self) -> Duration {
        minutes(self.min_day_layover_mins)
    }

    /// Returns the maximum day layover as a Duration.
    pub fn max_day_layover(&self) -> Duration {
        minutes(self.max_day_layover_mins)
    }

    /// Returns the minimum night layover as a Duration.
    pub fn min_night_layover(&self) -> Duration {
        minutes(self.min_night_layover_mins)
    }

    /// Returns the maximum night layover as a Duration.
    pub fn max_night_layover(&self) -> Duration {
        minutes(self.max_night_layover_mins)
    }

    /// Returns the maximum plan span as a Duration.
    pub fn max_plan(&self) -> Duration {
        minutes(self.max_plan_mins)
    }

    /// Returns the minimum trip gap as a Duration.
    pub fn min_trip_gap(&self) -> Duration {
        minutes(self.min_trip_gap_mins)
    }

    /// Returns the maximum trip gap as a Duration.
    pub fn max_trip_gap(&self) -> Duration {
        minutes(self.max_trip_gap_mins)
    }
}

/// Saturates instead of panicking, for configurations that skipped
/// [`SearchConfig::validate`].
fn minutes(mins: i64) -> Duration {
    Duration::try_minutes(mins).unwrap_or_else(|| {
        if mins < 0 {
            Duration::min_value()
        } else {
            Duration::max_value()
        }
    })
}

const MINS_PER_HOUR: i64 = 60;
const MINS_PER_DAY: i64 = 24 * MINS_PER_HOUR;

fn codes(list: &[&str]) -> Vec<AirportCode> {
    list.iter()
        .filter_map(|s| AirportCode::parse(s).ok())
        .collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_day_layover_mins: 50,
            max_day_layover_mins: 18 * MINS_PER_HOUR,
            min_night_layover_mins: 6 * MINS_PER_HOUR,
            max_night_layover_mins: 18 * MINS_PER_HOUR,
            overnight_airports: codes(&["RDU", "DCA", "BUF", "PVD", "PIT"]),
            end_airports: codes(&["BOS", "PVD", "ORH"]),
            home_arrival_cutoff: ClockTime::new(23, 0).unwrap_or_default(),
            regional_arrival_earliest: None,
            dest_cap: 25,
            min_dest_airports: 15,
            max_dup_airports: 2,
            max_plan_mins: 28 * MINS_PER_DAY,
            min_trip_gap_mins: 3 * MINS_PER_DAY,
            max_trip_gap_mins: 7 * MINS_PER_DAY,
            start_date: NaiveDateTime::MIN,
            end_date: NaiveDateTime::MAX,
            latest_start: None,
            max_iterations: 10_000_000,
            progress_interval: 10_000,
        }
    }
}
