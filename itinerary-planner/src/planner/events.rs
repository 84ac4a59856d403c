//! Notifications emitted by a running search.
//!
//! The engine reports through an [`EventSink`] rather than any ambient
//! channel, so tests can collect events into a `Vec` and the worker can
//! forward them over an async channel.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;

use crate::domain::{AirportCode, Flight, Itinerary};

/// Progress snapshot reported at a fixed iteration interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Share of the iteration budget used, 0 to 100.
    pub percent: f64,
    /// Iterations completed so far.
    pub iteration: u64,
    /// Iteration budget.
    pub max_iterations: u64,
    /// Frames waiting on the stack.
    pub queue_size: usize,
}

/// A notification from the search engine or its worker.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// The search could not start.
    Error { message: String },

    /// A plan better than every earlier one was found.
    NewBest { plan: Itinerary },

    /// Periodic progress report.
    Progress(Progress),

    /// The search finished, with the best plan if there was one.
    Complete { best: Option<Itinerary> },

    /// Acknowledges a stop command.
    Stopped,
}

impl SearchEvent {
    /// True for the last event a single search run emits.
    ///
    /// A run ends with either `Complete` or, if it never started, `Error`.
    pub fn ends_search(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// Wire name of the event, as used in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Error { .. } => "error",
            Self::NewBest { .. } => "newBest",
            Self::Progress(_) => "progress",
            Self::Complete { .. } => "complete",
            Self::Stopped => "stopped",
        }
    }

    /// Serialize to a single line of JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&EventMessage::from_event(self))
    }
}

/// Destination for search events.
pub trait EventSink {
    /// Deliver one event.
    fn emit(&mut self, event: SearchEvent);
}

impl EventSink for Vec<SearchEvent> {
    fn emit(&mut self, event: SearchEvent) {
        self.push(event);
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: SearchEvent) {}
}

/// Sink forwarding events over a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SearchEvent>,
}

impl ChannelSink {
    /// Wrap the sending half of a channel.
    pub fn new(tx: mpsc::UnboundedSender<SearchEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: SearchEvent) {
        if let Err(e) = self.tx.send(event) {
            // Nobody is listening any more; the search carries on regardless
            trace!(kind = e.0.kind(), "Dropped search event");
        }
    }
}

/// Plan as it appears on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshot {
    /// Flights in travel order.
    pub flights: Vec<Flight>,

    /// Distinct destinations, sorted.
    pub airports: Vec<AirportCode>,

    /// Span from first departure to last arrival.
    pub total_dur_mins: i64,

    /// Effective duration.
    pub effective_dur_mins: i64,

    /// Distinct calendar days.
    pub total_days: usize,

    /// Overnight layovers.
    pub num_overnights: usize,
}

impl PlanSnapshot {
    /// Snapshot an evaluated plan.
    pub fn from_itinerary(plan: &Itinerary) -> Self {
        Self {
            flights: plan.flights().to_vec(),
            airports: plan.airports().iter().copied().collect(),
            total_dur_mins: plan.total_duration().num_minutes(),
            effective_dur_mins: plan.effective_duration().num_minutes(),
            total_days: plan.total_days(),
            num_overnights: plan.overnights(),
        }
    }
}

/// Event as it appears on the wire, tagged by `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventMessage {
    Error {
        message: String,
    },
    NewBest {
        plan: PlanSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    Progress {
        progress: f64,
        iteration: u64,
        max_iterations: u64,
        queue_size: usize,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        best_plan: Option<PlanSnapshot>,
    },
    Stopped,
}

impl EventMessage {
    /// Convert an engine event to its wire form.
    pub fn from_event(event: &SearchEvent) -> Self {
        match event {
            SearchEvent::Error { message } => Self::Error {
                message: message.clone(),
            },
            SearchEvent::NewBest { plan } => Self::NewBest {
                plan: PlanSnapshot::from_itinerary(plan),
            },
            SearchEvent::Progress(p) => Self::Progress {
                progress: p.percent,
                iteration: p.iteration,
                max_iterations: p.max_iterations,
                queue_size: p.queue_size,
            },
            SearchEvent::Complete { best } => Self::Complete {
                best_plan: best.as_ref().map(PlanSnapshot::from_itinerary),
            },
            SearchEvent::Stopped => Self::Stopped,
        }
    }
}
