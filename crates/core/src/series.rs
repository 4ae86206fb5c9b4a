//! Historical price series for a single asset.
//!
//! An [`AssetSeries`] is the unit of input for the forecast engine: an ordered
//! run of daily closing prices for one ticker. Construction enforces the
//! ordering and positivity invariants so downstream code can rely on them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building an [`AssetSeries`].
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    /// Dates are not strictly increasing.
    #[error("{ticker}: dates must be strictly increasing ({previous} followed by {next})")]
    UnorderedDates {
        /// Ticker of the offending series.
        ticker: String,
        /// Earlier date in the sequence.
        previous: NaiveDate,
        /// Date that did not advance past `previous`.
        next: NaiveDate,
    },

    /// A close price is zero, negative, or not finite.
    #[error("{ticker}: price on {date} must be positive and finite, got {price}")]
    InvalidPrice {
        /// Ticker of the offending series.
        ticker: String,
        /// Date of the bad observation.
        date: NaiveDate,
        /// The rejected price.
        price: f64,
    },
}

/// A single daily close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price on that date.
    pub close: f64,
}

impl PricePoint {
    #[must_use]
    pub const fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Ordered daily close prices for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl AssetSeries {
    /// Creates a series, validating that dates strictly increase and prices are positive.
    ///
    /// # Errors
    /// Returns [`SeriesError`] if either invariant is violated.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        let ticker = ticker.into();

        for point in &points {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(SeriesError::InvalidPrice {
                    ticker,
                    date: point.date,
                    price: point.close,
                });
            }
        }

        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::UnorderedDates {
                    ticker,
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }

        Ok(Self { ticker, points })
    }

    /// Ticker identifier.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// All observations in date order.
    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of price observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterator over the observation dates.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Daily simple returns, `r_t = price_t / price_{t-1} - 1`.
    ///
    /// The result has `len() - 1` entries (empty for fewer than two prices).
    #[must_use]
    pub fn daily_returns(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .map(|w| w[1].close / w[0].close - 1.0)
            .collect()
    }

    /// Keeps only observations whose date satisfies `keep`.
    ///
    /// Filtering preserves order, so the invariants still hold.
    #[must_use]
    pub fn retain_dates<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(NaiveDate) -> bool,
    {
        self.points.retain(|p| keep(p.date));
        self
    }
}
