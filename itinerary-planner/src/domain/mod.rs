//! Domain types for the itinerary planner.
//!
//! This module contains the core domain model types that represent
//! validated schedule data. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod airport;
mod error;
mod flight;
mod itinerary;
mod time;

pub use airport::{AirportCode, InvalidAirportCode};
pub use error::DomainError;
pub use flight::{Flight, FlightRecord};
pub use itinerary::{Itinerary, PlanMetrics, format_duration};
pub use time::{
    ClockTime, OVERNIGHT_CHECK_HOUR, OVERNIGHT_THRESHOLD_HOURS, TimeError, is_overnight_layover,
    local_day,
};
