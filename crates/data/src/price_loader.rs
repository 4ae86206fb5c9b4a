use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use csv::StringRecord;
use finplan_core::{AssetSeries, PricePoint};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{DataError, Result};

const TIMESTAMP: usize = 0;
const SYMBOL: usize = 1;
const CLOSE: usize = 5;

/// Loads daily close series from OHLCV CSV files.
///
/// Expected layout: `timestamp,symbol,open,high,low,close,volume` with a header
/// row. Timestamps may be RFC 3339 or plain `YYYY-MM-DD`; only the date part
/// is kept. Rows may appear in any order and mix symbols.
pub struct PriceLoader;

impl PriceLoader {
    /// Reads every symbol in the file at `path`.
    ///
    /// # Errors
    /// Returns [`DataError`] if the file cannot be opened, a row is malformed,
    /// a symbol has two rows for the same date or a price is not positive.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<AssetSeries>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let series = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            symbols = series.len(),
            "Loaded price history"
        );
        Ok(series)
    }

    /// Reads every symbol from an in-memory or streamed CSV source.
    ///
    /// Series are returned sorted by symbol, each sorted by date.
    ///
    /// # Errors
    /// See [`PriceLoader::from_path`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<AssetSeries>> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut by_symbol: BTreeMap<String, Vec<PricePoint>> = BTreeMap::new();

        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, csv::Position::line);

            let date = parse_date(line, field(&record, line, TIMESTAMP, "timestamp")?)?;
            let symbol = field(&record, line, SYMBOL, "symbol")?.to_string();
            let close = parse_price(line, field(&record, line, CLOSE, "close")?)?;

            by_symbol
                .entry(symbol)
                .or_default()
                .push(PricePoint::new(date, close));
        }

        by_symbol
            .into_iter()
            .map(|(symbol, mut points)| {
                points.sort_by_key(|p| p.date);
                if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
                    return Err(DataError::DuplicateDate {
                        symbol,
                        date: pair[0].date,
                    });
                }
                tracing::debug!(symbol = %symbol, observations = points.len(), "Parsed series");
                Ok(AssetSeries::new(symbol, points)?)
            })
            .collect()
    }
}

fn field<'r>(
    record: &'r StringRecord,
    line: u64,
    index: usize,
    column: &'static str,
) -> Result<&'r str> {
    record
        .get(index)
        .filter(|value| !value.is_empty())
        .ok_or(DataError::MissingColumn { line, column })
}

fn parse_date(line: u64, value: &str) -> Result<NaiveDate> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DataError::InvalidTimestamp {
        line,
        value: value.to_string(),
    })
}

fn parse_price(line: u64, value: &str) -> Result<f64> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
        .and_then(|d| d.to_f64())
        .ok_or_else(|| DataError::InvalidNumber {
            line,
            column: "close",
            value: value.to_string(),
        })
}
