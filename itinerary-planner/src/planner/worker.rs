//! Search worker.
//!
//! Runs searches off the caller's task. Callers talk to it only through
//! messages: [`Command`]s in, [`SearchEvent`]s out. Everything crossing the
//! boundary is moved by value.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::Flight;

use super::config::SearchConfig;
use super::events::{ChannelSink, SearchEvent};
use super::search::Planner;

/// Request sent to the worker.
#[derive(Debug, Clone)]
pub enum Command {
    /// Search `flights` under `config`, cancelling any running search.
    Start {
        flights: Vec<Flight>,
        config: SearchConfig,
    },

    /// Cancel the running search, if any. Always acknowledged with
    /// [`SearchEvent::Stopped`].
    Stop,
}

/// Error talking to the worker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    /// The worker's command loop has exited
    #[error("search worker has shut down")]
    Closed,
}

/// Cloneable sending side of a worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl WorkerHandle {
    /// Send a command.
    pub fn send(&self, command: Command) -> Result<(), WorkerError> {
        self.commands.send(command).map_err(|_| WorkerError::Closed)
    }

    /// Start a search.
    pub fn start(&self, flights: Vec<Flight>, config: SearchConfig) -> Result<(), WorkerError> {
        self.send(Command::Start { flights, config })
    }

    /// Request cooperative cancellation.
    pub fn stop(&self) -> Result<(), WorkerError> {
        self.send(Command::Stop)
    }
}

/// A running search worker.
///
/// Dropping it (and every [`WorkerHandle`]) shuts the command loop down
/// and cancels any search still running.
pub struct SearchWorker {
    handle: WorkerHandle,
    events: mpsc::UnboundedReceiver<SearchEvent>,
}

impl SearchWorker {
    /// Spawn the command loop on the current tokio runtime.
    pub fn spawn() -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(command_loop(command_rx, event_tx));

        Self {
            handle: WorkerHandle {
                commands: command_tx,
            },
            events: event_rx,
        }
    }

    /// A handle for sending commands from elsewhere.
    pub fn handle(&self) -> WorkerHandle {
        self.handle.clone()
    }

    /// Start a search.
    pub fn start(&self, flights: Vec<Flight>, config: SearchConfig) -> Result<(), WorkerError> {
        self.handle.start(flights, config)
    }

    /// Request cooperative cancellation.
    pub fn stop(&self) -> Result<(), WorkerError> {
        self.handle.stop()
    }

    /// Wait for the next event. `None` once the worker has shut down and
    /// every search has finished.
    pub async fn next_event(&mut self) -> Option<SearchEvent> {
        self.events.recv().await
    }
}

async fn command_loop(
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<SearchEvent>,
) {
    let mut running: Option<CancellationToken> = None;

    while let Some(command) = commands.recv().await {
        match command {
            Command::Start { flights, config } => {
                if let Some(previous) = running.take() {
                    debug!("Cancelling previous search");
                    previous.cancel();
                }

                let cancel = CancellationToken::new();
                running = Some(cancel.clone());
                let mut sink = ChannelSink::new(events.clone());

                info!(flights = flights.len(), "Starting search");
                tokio::task::spawn_blocking(move || {
                    if let Err(e) = Planner::new(&config).search(flights, &cancel, &mut sink) {
                        debug!(error = %e, "Search did not start");
                    }
                });
            }
            Command::Stop => {
                if let Some(token) = running.take() {
                    debug!("Stop requested");
                    token.cancel();
                }
                // The receiver may already be gone; nothing to acknowledge to
                let _ = events.send(SearchEvent::Stopped);
            }
        }
    }

    if let Some(token) = running {
        token.cancel();
    }
    debug!("Search worker shut down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AirportCode, ClockTime};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::time::Duration as StdDuration;
    use tokio::time::timeout;

    const WAIT: StdDuration = StdDuration::from_secs(30);

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn flight(from: &str, to: &str, num: &str, dep: NaiveDateTime) -> Flight {
        Flight::new(code(from), code(to), num, dep, dep + Duration::hours(1)).unwrap()
    }

    fn config() -> SearchConfig {
        SearchConfig {
            min_day_layover_mins: 30,
            max_day_layover_mins: 48 * 60,
            min_night_layover_mins: 0,
            max_night_layover_mins: 48 * 60,
            overnight_airports: vec![code("BBB"), code("CCC")],
            end_airports: vec![code("AAA")],
            home_arrival_cutoff: ClockTime::new(23, 0).unwrap(),
            dest_cap: 3,
            min_dest_airports: 1,
            max_dup_airports: 2,
            progress_interval: 1_000,
            ..SearchConfig::default()
        }
    }

    fn round_trip() -> Vec<Flight> {
        vec![
            flight("AAA", "BBB", "out", at(1, 10)),
            flight("BBB", "AAA", "back", at(1, 14)),
        ]
    }

    /// Hourly shuttles between two airports that are never end airports.
    /// With unlimited repeat visits the search space is effectively
    /// unbounded and no plan is ever found.
    fn endless() -> (Vec<Flight>, SearchConfig) {
        let mut flights = vec![flight("AAA", "BBB", "seed", at(1, 0))];
        for hour in 1..(5 * 24) {
            let dep = at(1, 0) + Duration::hours(hour);
            flights.push(flight("BBB", "CCC", &format!("B{hour}"), dep));
            flights.push(flight("CCC", "BBB", &format!("C{hour}"), dep));
        }
        let config = SearchConfig {
            max_dup_airports: 100_000,
            max_iterations: u64::MAX,
            ..config()
        };
        (flights, config)
    }

    async fn next(worker: &mut SearchWorker) -> SearchEvent {
        timeout(WAIT, worker.next_event())
            .await
            .expect("timed out waiting for event")
            .expect("worker closed")
    }

    async fn wait_for_progress(worker: &mut SearchWorker) {
        loop {
            if let SearchEvent::Progress(_) = next(worker).await {
                return;
            }
        }
    }

    #[tokio::test]
    async fn runs_search_to_completion() {
        let mut worker = SearchWorker::spawn();
        worker.start(round_trip(), config()).unwrap();

        let first = next(&mut worker).await;
        let SearchEvent::NewBest { plan } = first else {
            panic!("expected newBest, got {first:?}");
        };
        assert_eq!(plan.segment_count(), 2);

        assert_eq!(
            next(&mut worker).await,
            SearchEvent::Complete { best: Some(plan) }
        );
    }

    #[tokio::test]
    async fn reports_start_errors() {
        let mut worker = SearchWorker::spawn();
        worker
            .start(vec![flight("BBB", "CCC", "x", at(1, 10))], config())
            .unwrap();

        let event = next(&mut worker).await;
        assert!(matches!(event, SearchEvent::Error { .. }), "{event:?}");
    }

    #[tokio::test]
    async fn stop_before_any_plan() {
        let (flights, config) = endless();
        let mut worker = SearchWorker::spawn();
        worker.start(flights, config).unwrap();
        wait_for_progress(&mut worker).await;

        worker.stop().unwrap();

        let mut stopped = 0;
        let mut completes = Vec::new();
        while stopped == 0 || completes.is_empty() {
            match next(&mut worker).await {
                SearchEvent::Stopped => stopped += 1,
                SearchEvent::Complete { best } => completes.push(best),
                SearchEvent::Progress(_) => {}
                other => panic!("unexpected event {other:?}"),
            }
        }

        assert_eq!(stopped, 1);
        assert_eq!(completes, vec![None]);
    }

    #[tokio::test]
    async fn stop_when_idle_is_acknowledged() {
        let mut worker = SearchWorker::spawn();
        worker.stop().unwrap();
        assert_eq!(next(&mut worker).await, SearchEvent::Stopped);
    }

    #[tokio::test]
    async fn start_replaces_running_search() {
        let (flights, endless_config) = endless();
        let mut worker = SearchWorker::spawn();
        worker.start(flights, endless_config).unwrap();
        wait_for_progress(&mut worker).await;

        worker.start(round_trip(), config()).unwrap();

        let mut completes = Vec::new();
        while completes.len() < 2 {
            if let SearchEvent::Complete { best } = next(&mut worker).await {
                completes.push(best);
            }
        }

        assert_eq!(completes.iter().filter(|b| b.is_none()).count(), 1);
        let found: Vec<_> = completes.iter().flatten().collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].segment_count(), 2);
    }

    #[tokio::test]
    async fn handle_sends_from_elsewhere() {
        let mut worker = SearchWorker::spawn();
        let handle = worker.handle();
        tokio::spawn(async move { handle.stop() }).await.unwrap().unwrap();
        assert_eq!(next(&mut worker).await, SearchEvent::Stopped);
    }
}
