//! Historical price data for the personal finance planner.
//!
//! This crate provides:
//! - CSV loading of daily closes grouped per symbol
//! - Date alignment across assets that trade on different calendars
//! - CSV writing in the same OHLCV layout

pub mod align;
pub mod csv_storage;
pub mod error;
pub mod price_loader;

pub use align::{align_series, select_tickers};
pub use csv_storage::CsvStorage;
pub use error::{DataError, Result};
pub use price_loader::PriceLoader;
