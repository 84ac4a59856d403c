//! Domain error types.
//!
//! These errors represent validation failures when constructing domain
//! values from raw schedule data. They are distinct from I/O errors.

use chrono::NaiveDateTime;

use super::{InvalidAirportCode, TimeError};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Airport code failed validation
    #[error(transparent)]
    Airport(#[from] InvalidAirportCode),

    /// Clock time failed validation
    #[error(transparent)]
    Time(#[from] TimeError),

    /// A flight must land after it takes off
    #[error("flight {number} arrives at {arrives} which is not after its departure at {departs}")]
    ArrivalNotAfterDeparture {
        number: String,
        departs: NaiveDateTime,
        arrives: NaiveDateTime,
    },

    /// Flight identifier is blank
    #[error("flight identifier must not be empty")]
    EmptyFlightNumber,
}
