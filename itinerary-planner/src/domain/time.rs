//! Time-of-day and calendar-day handling.
//!
//! Flight instants are naive local date-times, exactly as the schedule
//! supplies them (each airport's wall clock). Calendar days are derived
//! from those wall-clock values by [`local_day`], and every day-sensitive
//! rule (distinct-day counting, the overnight predicate) goes through it so
//! the two can never disagree.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

/// Layovers at or below this length are never overnights.
pub const OVERNIGHT_THRESHOLD_HOURS: i64 = 3;

/// Local hour the traveller must be on the ground through for a layover to
/// count as an overnight.
pub const OVERNIGHT_CHECK_HOUR: u32 = 3;

/// Error returned when parsing an invalid clock time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// The local calendar day an instant falls on.
pub fn local_day(instant: NaiveDateTime) -> NaiveDate {
    instant.date()
}

/// Whether a layover from `arrival` to `departure` is an overnight.
///
/// A layover is an overnight when it is longer than three hours and the
/// traveller is on the ground through 03:00 local time on the day of the
/// outgoing departure.
///
/// # Examples
///
/// ```
/// use itinerary_planner::domain::is_overnight_layover;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
/// let next = day.succ_opt().unwrap();
///
/// // Landed at 22:00, left at 07:00 the next morning
/// let arrival = day.and_hms_opt(22, 0, 0).unwrap();
/// let departure = next.and_hms_opt(7, 0, 0).unwrap();
/// assert!(is_overnight_layover(arrival, departure));
///
/// // A four hour afternoon wait is not
/// let arrival = day.and_hms_opt(12, 0, 0).unwrap();
/// let departure = day.and_hms_opt(16, 0, 0).unwrap();
/// assert!(!is_overnight_layover(arrival, departure));
/// ```
pub fn is_overnight_layover(arrival: NaiveDateTime, departure: NaiveDateTime) -> bool {
    let layover = departure.signed_duration_since(arrival);
    if layover <= Duration::hours(OVERNIGHT_THRESHOLD_HOURS) {
        return false;
    }

    local_day(departure)
        .and_hms_opt(OVERNIGHT_CHECK_HOUR, 0, 0)
        .is_some_and(|check| arrival <= check && check <= departure)
}

/// A wall-clock time of day with minute precision.
///
/// Used for arrival cutoffs such as "regional airports only if landing
/// by 20:00". Serialized as an `"HH:MM"` string; deserializes from either
/// that string or an `{"hours": 20, "minutes": 0}` object.
///
/// # Examples
///
/// ```
/// use itinerary_planner::domain::ClockTime;
///
/// let cutoff = ClockTime::parse_hhmm("20:30").unwrap();
/// assert_eq!(cutoff.hour(), 20);
/// assert_eq!(cutoff.minute(), 30);
/// assert_eq!(cutoff.to_string(), "20:30");
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Create a clock time, rejecting out-of-range components.
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        Ok(Self { hour, minute })
    }

    /// Parse a time from "HH:MM" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use itinerary_planner::domain::ClockTime;
    ///
    /// // Valid times
    /// assert!(ClockTime::parse_hhmm("00:00").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    ///
    /// // Invalid formats
    /// assert!(ClockTime::parse_hhmm("2300").is_err());
    /// assert!(ClockTime::parse_hhmm("23:5").is_err());
    /// assert!(ClockTime::parse_hhmm("24:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::new(hour, minute)
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Converts to a NaiveTime.
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// True if `instant`'s hour and minute are at or before this time.
    ///
    /// Seconds are ignored, so 20:00:45 is still "at" a 20:00 cutoff.
    pub fn admits_at_or_before(&self, instant: NaiveDateTime) -> bool {
        (instant.hour(), instant.minute()) <= (self.hour, self.minute)
    }

    /// True if `instant`'s time of day is strictly after this time.
    pub fn precedes(&self, instant: NaiveDateTime) -> bool {
        self.to_naive_time() < instant.time()
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour, self.minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Parts {
                hours: u32,
                #[serde(default)]
                minutes: u32,
            },
        }

        let parsed = match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Self::parse_hhmm(&s),
            Repr::Parts { hours, minutes } => Self::new(hours, minutes),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
