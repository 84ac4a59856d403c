//! Itinerary search.
//!
//! Finds the best multi-city plan from a flat list of flights: the flights
//! are indexed into a connection graph, then explored depth-first with
//! pruning, and every plan reaching an end airport is evaluated and
//! ranked against the best so far.
//!
//! The engine is a plain function of its inputs plus an [`EventSink`];
//! [`SearchWorker`] runs it behind an asynchronous command channel and
//! [`search_chunked`] splits it across threads.

mod config;
mod evaluate;
mod events;
mod graph;
mod parallel;
mod rank;
mod search;
mod worker;

pub use config::{ConfigError, SearchConfig};
pub use evaluate::{count_overnights, days_taken, effective_duration, evaluate, plan_metrics, total_duration};
pub use events::{ChannelSink, Discard, EventMessage, EventSink, PlanSnapshot, Progress, SearchEvent};
pub use graph::{FlightGraph, FlightId, is_valid_connection};
pub use parallel::search_chunked;
pub use rank::{PlanScore, compare_plans, is_better, rank_plans};
pub use search::{Planner, SearchError, SearchOutcome, Termination};
pub use worker::{Command, SearchWorker, WorkerError, WorkerHandle};
