//! Error types for price data loading.

use std::path::PathBuf;

use chrono::NaiveDate;
use finplan_core::SeriesError;
use thiserror::Error;

/// Errors raised while reading or writing price files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: missing column {column}")]
    MissingColumn { line: u64, column: &'static str },

    #[error("line {line}: invalid timestamp {value:?}")]
    InvalidTimestamp { line: u64, value: String },

    #[error("line {line}: invalid {column} value {value:?}")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("{symbol}: duplicate observation on {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Result alias for data operations.
pub type Result<T> = std::result::Result<T, DataError>;
