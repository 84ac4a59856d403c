//! Multi-city flight itinerary planner.
//!
//! Given a flat list of scheduled flights, finds the plan that visits the
//! most distinct airports (up to a cap) in the fewest days, under layover,
//! overnight and trip-length rules. See [`planner`] for the search itself
//! and [`schedule`] for loading flights from disk.

pub mod domain;
pub mod planner;
pub mod schedule;
