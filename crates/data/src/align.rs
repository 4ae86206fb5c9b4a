use std::collections::BTreeSet;

use chrono::NaiveDate;
use finplan_core::AssetSeries;

/// Restricts every series to the dates present in all of them.
///
/// Holidays and listing gaps differ between markets (crypto trades every day,
/// equities do not), so aligned inputs are required before return statistics
/// can be derived.
#[must_use]
pub fn align_series(series: Vec<AssetSeries>) -> Vec<AssetSeries> {
    if series.is_empty() {
        return series;
    }
    let first = &series[0];

    let common: BTreeSet<NaiveDate> = series.iter().skip(1).fold(
        first.dates().collect(),
        |acc, s| {
            let dates: BTreeSet<NaiveDate> = s.dates().collect();
            acc.intersection(&dates).copied().collect()
        },
    );

    let dropped: usize = series.iter().map(|s| s.len() - common.len()).sum();
    if dropped > 0 {
        tracing::debug!(
            common_dates = common.len(),
            dropped,
            "Aligned series to common dates"
        );
    }

    series
        .into_iter()
        .map(|s| s.retain_dates(|d| common.contains(&d)))
        .collect()
}

/// Keeps the series for `tickers`, in the order given. Unknown tickers are skipped.
#[must_use]
pub fn select_tickers(series: Vec<AssetSeries>, tickers: &[String]) -> Vec<AssetSeries> {
    let mut selected: Vec<AssetSeries> = series
        .into_iter()
        .filter(|s| tickers.iter().any(|t| t == s.ticker()))
        .collect();
    selected.sort_by_key(|s| tickers.iter().position(|t| t == s.ticker()));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use finplan_core::PricePoint;

    fn series(ticker: &str, days: &[u32]) -> AssetSeries {
        let points = days
            .iter()
            .map(|&d| PricePoint::new(NaiveDate::from_ymd_opt(2021, 6, d).unwrap(), 10.0 + f64::from(d)))
            .collect();
        AssetSeries::new(ticker, points).unwrap()
    }

    #[test]
    fn keeps_only_shared_dates() {
        let aligned = align_series(vec![
            series("BTC", &[1, 2, 3, 4, 5, 6, 7]),
            series("SPY", &[1, 2, 3, 4, 7]),
            series("AGG", &[2, 3, 4, 7, 8]),
        ]);

        for s in &aligned {
            let days: Vec<u32> = s.dates().map(|d| chrono::Datelike::day(&d)).collect();
            assert_eq!(days, vec![2, 3, 4, 7], "{}", s.ticker());
        }
        // prices follow their dates
        assert!((aligned[0].points()[0].close - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn already_aligned_is_unchanged() {
        let input = vec![series("AGG", &[1, 2, 3]), series("SPY", &[1, 2, 3])];
        assert_eq!(align_series(input.clone()), input);
    }

    #[test]
    fn empty_input() {
        assert!(align_series(Vec::new()).is_empty());
    }

    #[test]
    fn select_follows_requested_order() {
        let all = vec![series("AGG", &[1]), series("BTC", &[1]), series("SPY", &[1])];
        let tickers = vec!["SPY".to_string(), "AGG".to_string(), "QQQ".to_string()];

        let selected = select_tickers(all, &tickers);

        let names: Vec<&str> = selected.iter().map(AssetSeries::ticker).collect();
        assert_eq!(names, vec!["SPY", "AGG"]);
    }
}
