use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use itinerary_planner::domain::Flight;
use itinerary_planner::planner::{SearchConfig, SearchEvent, SearchWorker, search_chunked};
use itinerary_planner::schedule;

#[derive(Parser, Debug)]
#[command(name = "itinerary-planner")]
#[command(version, about = "Find multi-city flight itineraries")]
struct Args {
    /// Flight schedule (.csv or .json)
    #[arg(short, long)]
    flights: PathBuf,

    /// Search configuration as JSON; missing keys take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Split the search into this many chunks on a thread pool
    #[arg(long, default_value_t = 1)]
    chunks: usize,

    /// Print notifications as JSON lines
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SearchConfig> {
    let Some(path) = path else {
        return Ok(SearchConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    SearchConfig::from_json(&json).with_context(|| format!("failed to parse config {}", path.display()))
}

fn print_event(event: &SearchEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", event.to_json()?);
        return Ok(());
    }

    match event {
        SearchEvent::NewBest { plan } => println!("New best:\n{plan}\n"),
        SearchEvent::Progress(p) => info!(
            percent = p.percent,
            iteration = p.iteration,
            queue = p.queue_size,
            "Searching"
        ),
        SearchEvent::Complete { best: Some(plan) } => println!("Best plan:\n{plan}"),
        SearchEvent::Complete { best: None } => println!("No plan found"),
        SearchEvent::Stopped => println!("Search stopped"),
        SearchEvent::Error { message } => eprintln!("Error: {message}"),
    }
    Ok(())
}

/// Run through the worker, streaming notifications. Ctrl-C sends a stop.
async fn run_streaming(flights: Vec<Flight>, config: SearchConfig, json: bool) -> Result<()> {
    let mut worker = SearchWorker::spawn();

    let handle = worker.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping search");
            if let Err(e) = handle.stop() {
                warn!(error = %e, "Could not stop search");
            }
        }
    });

    worker.start(flights, config)?;

    while let Some(event) = worker.next_event().await {
        if let SearchEvent::Error { message } = &event {
            if json {
                print_event(&event, json)?;
            }
            bail!("{message}");
        }

        print_event(&event, json)?;
        if event.ends_search() {
            break;
        }
    }

    Ok(())
}

/// Run chunks in parallel and print only the final result. Ctrl-C cancels.
async fn run_chunked(
    flights: Vec<Flight>,
    config: SearchConfig,
    chunks: usize,
    json: bool,
) -> Result<()> {
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping search");
            interrupt.cancel();
        }
    });

    let outcome =
        tokio::task::spawn_blocking(move || search_chunked(flights, &config, chunks, &cancel))
            .await
            .context("search thread failed")??;

    info!(
        iterations = outcome.iterations,
        termination = ?outcome.termination,
        "Parallel search finished"
    );

    print_event(&SearchEvent::Complete { best: outcome.best }, json)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;
    config.validate().context("invalid search configuration")?;

    let flights = schedule::load(&args.flights)?;
    let flights = schedule::within_window(flights, config.start_date, config.end_date);
    info!(flights = flights.len(), "Flights in search window");

    if args.chunks > 1 {
        run_chunked(flights, config, args.chunks, args.json).await
    } else {
        run_streaming(flights, config, args.json).await
    }
}
