//! Loading flight schedules from disk.
//!
//! Two formats are understood, chosen by file extension:
//!
//! - `.csv` with a header row
//!   `departure_airport,arrival_airport,flight_number,departure_time,arrival_time`
//!   and times written `YYYY-MM-DD HH:MM:SS`
//! - `.json`, an array of flight records
//!   (`origin`, `destination`, `number`, `departs`, `arrives`)
//!
//! Every record is validated as it is read.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::{AirportCode, Flight};

/// Timestamp format used in CSV schedules.
pub const CSV_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Error loading a schedule.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Could not read the file
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer itself failed (bad quoting, missing columns)
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV row parsed but held an invalid flight
    #[error("line {line}: {message}")]
    Row { line: u64, message: String },

    /// JSON schedule failed to decode or validate
    #[error("invalid JSON schedule: {0}")]
    Json(#[from] serde_json::Error),

    /// Extension is neither `.csv` nor `.json`
    #[error("unsupported schedule format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// One CSV row, before validation.
#[derive(Debug, Deserialize)]
struct CsvRow {
    departure_airport: String,
    arrival_airport: String,
    flight_number: String,
    departure_time: String,
    arrival_time: String,
}

impl CsvRow {
    fn into_flight(self) -> Result<Flight, String> {
        let origin = AirportCode::parse_normalized(&self.departure_airport)
            .map_err(|e| e.to_string())?;
        let destination =
            AirportCode::parse_normalized(&self.arrival_airport).map_err(|e| e.to_string())?;
        let departs = parse_time(&self.departure_time)?;
        let arrives = parse_time(&self.arrival_time)?;

        Flight::new(origin, destination, self.flight_number, departs, arrives)
            .map_err(|e| e.to_string())
    }
}

fn parse_time(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, CSV_TIME_FORMAT)
        .map_err(|e| format!("invalid time {s:?}: {e}"))
}

/// Parse a CSV schedule.
pub fn parse_csv(reader: impl Read) -> Result<Vec<Flight>, ScheduleError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut flights = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        let row: CsvRow = record.deserialize(Some(&headers))?;
        let flight = row
            .into_flight()
            .map_err(|message| ScheduleError::Row { line, message })?;
        flights.push(flight);
    }

    Ok(flights)
}

/// Parse a JSON schedule.
pub fn parse_json(json: &str) -> Result<Vec<Flight>, ScheduleError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a schedule, picking the format from the file extension.
pub fn load(path: &Path) -> Result<Vec<Flight>, ScheduleError> {
    let io_error = |source| ScheduleError::Io {
        path: path.to_path_buf(),
        source,
    };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let flights = match extension.as_deref() {
        Some("csv") => parse_csv(std::fs::File::open(path).map_err(io_error)?)?,
        Some("json") => parse_json(&std::fs::read_to_string(path).map_err(io_error)?)?,
        _ => {
            return Err(ScheduleError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    info!(path = %path.display(), flights = flights.len(), "Loaded schedule");
    Ok(flights)
}

/// Keep flights that depart at or after `start` and arrive at or before
/// `end`.
pub fn within_window(flights: Vec<Flight>, start: NaiveDateTime, end: NaiveDateTime) -> Vec<Flight> {
    let before = flights.len();
    let kept: Vec<Flight> = flights
        .into_iter()
        .filter(|f| f.departs() >= start && f.arrives() <= end)
        .collect();

    debug!(kept = kept.len(), dropped = before - kept.len(), "Applied schedule window");
    kept
}
