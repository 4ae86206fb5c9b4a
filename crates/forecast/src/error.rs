//! Error types for the forecast engine.
//!
//! Every variant is raised synchronously at the point of misuse; the engine
//! never retries or swallows an error.

use thiserror::Error;

/// Errors that can occur while configuring or running a simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// Asset series do not share a common date index.
    #[error("misaligned data: {ticker} does not share the common date index")]
    MisalignedData {
        /// First ticker whose dates differ from the reference series.
        ticker: String,
    },

    /// Too few price observations to derive returns.
    #[error("insufficient data: {ticker} has {observations} observations, at least 2 required")]
    InsufficientData {
        /// Ticker with too little history.
        ticker: String,
        /// Number of aligned price observations found.
        observations: usize,
    },

    /// Weights, trial count, horizon or asset list are invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Results were requested before a simulation has completed.
    #[error("simulation has not been run")]
    NotSimulated,

    /// Return statistics were requested before they were derived.
    #[error("return statistics have not been derived")]
    StatisticsNotReady,

    /// Matrix dimensions disagree with its buffer, or it has no day-0 column.
    #[error("malformed matrix: {n_trials} x {n_columns} does not fit {len} values")]
    MalformedMatrix {
        n_trials: usize,
        n_columns: usize,
        len: usize,
    },

    /// The run was cancelled before every trial finished.
    #[error("simulation cancelled after {completed_trials} trials")]
    Cancelled {
        /// Trials that finished before cancellation was observed.
        completed_trials: usize,
    },
}

impl SimulationError {
    /// Creates an invalid configuration error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

/// Result alias for forecast operations.
pub type Result<T> = std::result::Result<T, SimulationError>;
