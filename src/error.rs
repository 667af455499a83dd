use chrono::{Datelike, NaiveDate};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Bad catalog or plan data. Always fatal, raised before any artifact is written.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unknown session code '{code}'{}", week_suffix(.week))]
    UnknownSessionCode { code: String, week: Option<u32> },

    #[error("invalid plan range: {0}")]
    PlanRange(String),

    #[error("anchor date {} is a {} (expected a Monday)", .0, .0.weekday())]
    InvalidAnchor(NaiveDate),

    #[error("session '{code}' is invalid: {reason}")]
    InvalidSession { code: String, reason: String },

    #[error("session code '{0}' is defined more than once")]
    DuplicateSessionCode(String),

    #[error("failed to read configuration {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse configuration {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn week_suffix(week: &Option<u32>) -> String {
    week.map(|w| format!(" in week {w}")).unwrap_or_default()
}

/// A single artifact could not be produced at its destination.
#[derive(Debug, Error)]
pub enum SinkWriteError {
    #[error("io error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("spreadsheet error writing {}: {source}", .path.display())]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("chart error writing {}: {message}", .path.display())]
    Chart { path: PathBuf, message: String },

    #[error("csv error writing {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to build spreadsheet grid: {0}")]
    Grid(#[from] polars::prelude::PolarsError),
}

impl SinkWriteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Top-level failure of a generation run, naming the stage that failed.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("{sink} sink failed: {source}")]
    Sink {
        sink: &'static str,
        #[source]
        source: SinkWriteError,
    },
}
