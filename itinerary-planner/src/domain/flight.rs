//! Scheduled flight segments.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{AirportCode, DomainError, is_overnight_layover};

/// One scheduled flight segment.
///
/// Immutable once constructed. Departure and arrival are local wall-clock
/// instants at the respective airports.
///
/// # Invariants
///
/// - `arrives` is strictly after `departs`
/// - `number` is not blank
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FlightRecord")]
pub struct Flight {
    origin: AirportCode,
    destination: AirportCode,
    number: String,
    departs: NaiveDateTime,
    arrives: NaiveDateTime,
}

/// Unvalidated flight record, as supplied by a schedule source.
///
/// Converting into a [`Flight`] applies the same checks as [`Flight::new`].
#[derive(Debug, Clone, Deserialize)]
pub struct FlightRecord {
    pub origin: AirportCode,
    pub destination: AirportCode,
    pub number: String,
    pub departs: NaiveDateTime,
    pub arrives: NaiveDateTime,
}

impl TryFrom<FlightRecord> for Flight {
    type Error = DomainError;

    fn try_from(record: FlightRecord) -> Result<Self, Self::Error> {
        Flight::new(
            record.origin,
            record.destination,
            record.number,
            record.departs,
            record.arrives,
        )
    }
}

impl Flight {
    /// Creates a flight, checking that it lands after it takes off.
    ///
    /// # Examples
    ///
    /// ```
    /// use itinerary_planner::domain::{AirportCode, Flight};
    /// use chrono::NaiveDate;
    ///
    /// let day = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    /// let bos = AirportCode::parse("BOS").unwrap();
    /// let dca = AirportCode::parse("DCA").unwrap();
    ///
    /// let flight = Flight::new(
    ///     bos,
    ///     dca,
    ///     "B6 1234",
    ///     day.and_hms_opt(8, 0, 0).unwrap(),
    ///     day.and_hms_opt(9, 45, 0).unwrap(),
    /// )
    /// .unwrap();
    /// assert_eq!(flight.duration().num_minutes(), 105);
    ///
    /// // Landing before take-off is rejected
    /// assert!(Flight::new(
    ///     bos,
    ///     dca,
    ///     "B6 1234",
    ///     day.and_hms_opt(9, 45, 0).unwrap(),
    ///     day.and_hms_opt(8, 0, 0).unwrap(),
    /// )
    /// .is_err());
    /// ```
    pub fn new(
        origin: AirportCode,
        destination: AirportCode,
        number: impl Into<String>,
        departs: NaiveDateTime,
        arrives: NaiveDateTime,
    ) -> Result<Self, DomainError> {
        let number = number.into();
        if number.trim().is_empty() {
            return Err(DomainError::EmptyFlightNumber);
        }
        if arrives <= departs {
            return Err(DomainError::ArrivalNotAfterDeparture {
                number,
                departs,
                arrives,
            });
        }

        Ok(Self {
            origin,
            destination,
            number,
            departs,
            arrives,
        })
    }

    /// Airport the flight leaves from.
    pub fn origin(&self) -> AirportCode {
        self.origin
    }

    /// Airport the flight lands at.
    pub fn destination(&self) -> AirportCode {
        self.destination
    }

    /// Carrier flight identifier.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Local departure instant.
    pub fn departs(&self) -> NaiveDateTime {
        self.departs
    }

    /// Local arrival instant.
    pub fn arrives(&self) -> NaiveDateTime {
        self.arrives
    }

    /// Time in the air.
    pub fn duration(&self) -> Duration {
        self.arrives.signed_duration_since(self.departs)
    }

    /// Ground time between landing on this flight and taking off on `next`.
    ///
    /// Negative if `next` leaves before this one lands.
    pub fn layover_until(&self, next: &Flight) -> Duration {
        next.departs.signed_duration_since(self.arrives)
    }

    /// True if connecting from this flight onto `next` means an overnight.
    pub fn is_overnight_before(&self, next: &Flight) -> bool {
        is_overnight_layover(self.arrives, next.departs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    #[test]
    fn accessors() {
        let f = Flight::new(code("BOS"), code("BUF"), "B6 0401", at(1, 6, 0), at(1, 7, 30)).unwrap();
        assert_eq!(f.origin(), code("BOS"));
        assert_eq!(f.destination(), code("BUF"));
        assert_eq!(f.number(), "B6 0401");
        assert_eq!(f.departs(), at(1, 6, 0));
        assert_eq!(f.arrives(), at(1, 7, 30));
        assert_eq!(f.duration(), Duration::minutes(90));
    }

    #[test]
    fn rejects_zero_length_flight() {
        let err = Flight::new(code("BOS"), code("BUF"), "1", at(1, 6, 0), at(1, 6, 0)).unwrap_err();
        assert!(matches!(err, DomainError::ArrivalNotAfterDeparture { .. }));
    }

    #[test]
    fn rejects_blank_number() {
        let err = Flight::new(code("BOS"), code("BUF"), "  ", at(1, 6, 0), at(1, 7, 0)).unwrap_err();
        assert_eq!(err, DomainError::EmptyFlightNumber);
    }

    #[test]
    fn layover_and_overnight() {
        let inbound = Flight::new(code("BOS"), code("PIT"), "1", at(1, 20, 0), at(1, 22, 0)).unwrap();
        let morning = Flight::new(code("PIT"), code("BOS"), "2", at(2, 7, 0), at(2, 9, 0)).unwrap();
        let late = Flight::new(code("PIT"), code("BOS"), "3", at(1, 23, 0), at(2, 1, 0)).unwrap();

        assert_eq!(inbound.layover_until(&morning), Duration::hours(9));
        assert!(inbound.is_overnight_before(&morning));
        assert_eq!(inbound.layover_until(&late), Duration::hours(1));
        assert!(!inbound.is_overnight_before(&late));
    }

    #[test]
    fn serde_shape() {
        let f = Flight::new(code("BOS"), code("BUF"), "401", at(1, 6, 0), at(1, 7, 30)).unwrap();
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["origin"], "BOS");
        assert_eq!(json["destination"], "BUF");
        assert_eq!(json["departs"], "2025-08-01T06:00:00");

        let back: Flight = serde_json::from_value(json).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn deserialize_validates() {
        let json = serde_json::json!({
            "origin": "BOS",
            "destination": "BUF",
            "number": "401",
            "departs": "2025-08-01T07:30:00",
            "arrives": "2025-08-01T06:00:00",
        });
        assert!(serde_json::from_value::<Flight>(json).is_err());
    }
}
