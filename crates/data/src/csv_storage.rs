use std::fs::File;
use std::path::Path;

use csv::Writer;
use finplan_core::AssetSeries;

use crate::error::{DataError, Result};

pub struct CsvStorage;

impl CsvStorage {
    /// Writes close series in the layout read by [`crate::PriceLoader`].
    ///
    /// Format: timestamp,symbol,open,high,low,close,volume
    ///
    /// Only closes are tracked, so open/high/low repeat the close and volume is 0.
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_series(path: impl AsRef<Path>, series: &[AssetSeries]) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = Writer::from_writer(file);

        writer.write_record(["timestamp", "symbol", "open", "high", "low", "close", "volume"])?;

        for s in series {
            for point in s.points() {
                let close = point.close.to_string();
                writer.write_record([
                    point.date.format("%Y-%m-%d").to_string().as_str(),
                    s.ticker(),
                    close.as_str(),
                    close.as_str(),
                    close.as_str(),
                    close.as_str(),
                    "0",
                ])?;
            }
        }

        writer.flush().map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
