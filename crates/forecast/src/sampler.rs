//! Pluggable daily return samplers.
//!
//! A [`ReturnSampler`] fills one simulated return per asset for a single
//! trading day. Three distributions are provided:
//!
//! - [`CorrelatedNormal`]: `mu + L z` with `L` the Cholesky factor of the
//!   historical covariance matrix (the default)
//! - [`IndependentNormal`]: `mu_i + sigma_i z_i`, ignoring cross-asset correlation
//! - [`Bootstrap`]: a whole historical return vector drawn with replacement

use std::sync::Arc;

use finplan_core::SamplerKind;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::statistics::ReturnStatistics;

/// Pivots at or below this value are treated as zero variance.
const PIVOT_TOLERANCE: f64 = 1e-15;

/// Draws one day of simulated asset returns.
///
/// Implementations hold only read-only state so a single sampler can be
/// shared by every trial worker.
pub trait ReturnSampler: Send + Sync {
    /// Writes one simulated return per asset into `out`.
    fn sample(&self, rng: &mut ChaCha8Rng, out: &mut [f64]);

    /// Name used in logs and reports.
    fn name(&self) -> &'static str;
}

/// Builds the sampler selected by `kind`.
#[must_use]
pub fn build_sampler(kind: SamplerKind, stats: &Arc<ReturnStatistics>) -> Box<dyn ReturnSampler> {
    match kind {
        SamplerKind::CorrelatedNormal => Box::new(CorrelatedNormal::new(stats)),
        SamplerKind::IndependentNormal => Box::new(IndependentNormal::new(stats)),
        SamplerKind::Bootstrap => Box::new(Bootstrap::new(Arc::clone(stats))),
    }
}

/// Lower-triangular `L` with `L * L^T = matrix` for a positive semi-definite matrix.
///
/// Zero (or numerically negative) pivots yield a zero column instead of an
/// error, so degenerate covariance such as a constant price series is handled.
#[must_use]
pub fn cholesky_lower(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = matrix.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();

            if i == j {
                let pivot = matrix[i][i] - sum;
                l[i][j] = if pivot > PIVOT_TOLERANCE { pivot.sqrt() } else { 0.0 };
            } else if l[j][j] > 0.0 {
                l[i][j] = (matrix[i][j] - sum) / l[j][j];
            }
        }
    }

    l
}

/// Multivariate normal draws with the historical mean vector and covariance.
#[derive(Debug, Clone)]
pub struct CorrelatedNormal {
    means: Vec<f64>,
    factor: Vec<Vec<f64>>,
}

impl CorrelatedNormal {
    #[must_use]
    pub fn new(stats: &ReturnStatistics) -> Self {
        Self {
            means: stats.means().to_vec(),
            factor: cholesky_lower(stats.covariance()),
        }
    }
}

impl ReturnSampler for CorrelatedNormal {
    fn sample(&self, rng: &mut ChaCha8Rng, out: &mut [f64]) {
        for z in out.iter_mut() {
            *z = StandardNormal.sample(rng);
        }

        // out_i depends on z_0..=z_i, so transform from the last asset down.
        for i in (0..out.len()).rev() {
            let shock: f64 = (0..=i).map(|j| self.factor[i][j] * out[j]).sum();
            out[i] = self.means[i] + shock;
        }
    }

    fn name(&self) -> &'static str {
        "correlated_normal"
    }
}

/// Per-asset normal draws that ignore correlation between assets.
#[derive(Debug, Clone)]
pub struct IndependentNormal {
    means: Vec<f64>,
    std_devs: Vec<f64>,
}

impl IndependentNormal {
    #[must_use]
    pub fn new(stats: &ReturnStatistics) -> Self {
        Self {
            means: stats.means().to_vec(),
            std_devs: stats.std_devs(),
        }
    }
}

impl ReturnSampler for IndependentNormal {
    fn sample(&self, rng: &mut ChaCha8Rng, out: &mut [f64]) {
        for (i, value) in out.iter_mut().enumerate() {
            let z: f64 = StandardNormal.sample(rng);
            *value = self.means[i] + self.std_devs[i] * z;
        }
    }

    fn name(&self) -> &'static str {
        "independent_normal"
    }
}

/// Empirical bootstrap of historical daily return vectors.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    stats: Arc<ReturnStatistics>,
}

impl Bootstrap {
    #[must_use]
    pub fn new(stats: Arc<ReturnStatistics>) -> Self {
        Self { stats }
    }
}

impl ReturnSampler for Bootstrap {
    fn sample(&self, rng: &mut ChaCha8Rng, out: &mut [f64]) {
        let day = rng.gen_range(0..self.stats.n_observations());
        out.copy_from_slice(self.stats.return_vector(day));
    }

    fn name(&self) -> &'static str {
        "bootstrap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn stats_from_rows(rows: Vec<Vec<f64>>) -> Arc<ReturnStatistics> {
        let n = rows[0].len();
        let tickers = (0..n).map(|i| format!("A{i}")).collect();
        Arc::new(ReturnStatistics::from_return_rows(tickers, rows).unwrap())
    }

    fn correlated_rows() -> Vec<Vec<f64>> {
        vec![
            vec![0.010, 0.012],
            vec![-0.004, -0.006],
            vec![0.007, 0.005],
            vec![-0.011, -0.009],
            vec![0.002, 0.004],
            vec![0.000, -0.001],
        ]
    }

    // ============================================================
    // Cholesky Tests
    // ============================================================

    #[test]
    fn cholesky_identity() {
        let l = cholesky_lower(&[vec![1.0, 0.0], vec![0.0, 1.0]]);

        assert!((l[0][0] - 1.0).abs() < 1e-12);
        assert!((l[1][1] - 1.0).abs() < 1e-12);
        assert!(l[0][1].abs() < 1e-12);
        assert!(l[1][0].abs() < 1e-12);
    }

    #[test]
    fn cholesky_reconstructs_matrix() {
        let matrix = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
        let l = cholesky_lower(&matrix);

        assert!((l[0][0] * l[0][0] - 4.0).abs() < 1e-12);
        assert!((l[1][0] * l[0][0] - 2.0).abs() < 1e-12);
        assert!((l[1][0] * l[1][0] + l[1][1] * l[1][1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn cholesky_zero_matrix_is_zero() {
        let l = cholesky_lower(&[vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert!(l.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn cholesky_handles_perfectly_correlated_assets() {
        // Rank-one matrix: second asset is an exact copy of the first
        let l = cholesky_lower(&[vec![1.0, 1.0], vec![1.0, 1.0]]);

        assert!((l[0][0] - 1.0).abs() < 1e-12);
        assert!((l[1][0] - 1.0).abs() < 1e-12);
        assert!(l[1][1].abs() < 1e-6);
    }

    // ============================================================
    // Sampler Tests
    // ============================================================

    #[test]
    fn correlated_normal_zero_variance_returns_means_exactly() {
        let stats = stats_from_rows(vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![0.0, 0.0]]);
        let sampler = CorrelatedNormal::new(&stats);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut out = [0.0; 2];

        for _ in 0..100 {
            sampler.sample(&mut rng, &mut out);
            assert_eq!(out, [0.0, 0.0]);
        }
    }

    #[test]
    fn correlated_normal_sample_moments_match_history() {
        let stats = stats_from_rows(correlated_rows());
        let sampler = CorrelatedNormal::new(&stats);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut out = [0.0; 2];

        let n = 200_000;
        let mut draws = Vec::with_capacity(n);
        for _ in 0..n {
            sampler.sample(&mut rng, &mut out);
            draws.push(out);
        }

        let mean0 = draws.iter().map(|d| d[0]).sum::<f64>() / n as f64;
        let mean1 = draws.iter().map(|d| d[1]).sum::<f64>() / n as f64;
        let cov01 = draws
            .iter()
            .map(|d| (d[0] - mean0) * (d[1] - mean1))
            .sum::<f64>()
            / (n as f64 - 1.0);

        let expected = stats.covariance()[0][1];
        assert!((mean0 - stats.means()[0]).abs() < 1e-3);
        assert!((mean1 - stats.means()[1]).abs() < 1e-3);
        assert!(
            (cov01 - expected).abs() < expected.abs() * 0.05,
            "sample covariance {cov01} vs historical {expected}"
        );
    }

    #[test]
    fn independent_normal_uses_per_asset_dispersion() {
        let stats = stats_from_rows(correlated_rows());
        let sampler = IndependentNormal::new(&stats);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut out = [0.0; 2];

        let n = 100_000;
        let mut sum_sq = 0.0;
        for _ in 0..n {
            sampler.sample(&mut rng, &mut out);
            sum_sq += (out[0] - stats.means()[0]).powi(2);
        }

        let var = sum_sq / n as f64;
        let expected = stats.covariance()[0][0];
        assert!((var - expected).abs() < expected * 0.05);
    }

    #[test]
    fn bootstrap_draws_only_historical_vectors() {
        let rows = correlated_rows();
        let stats = stats_from_rows(rows.clone());
        let sampler = Bootstrap::new(Arc::clone(&stats));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut out = [0.0; 2];

        for _ in 0..500 {
            sampler.sample(&mut rng, &mut out);
            assert!(rows.iter().any(|r| r[..] == out[..]));
        }
    }

    #[test]
    fn samplers_are_deterministic_for_a_seed() {
        let stats = stats_from_rows(correlated_rows());

        for kind in [
            SamplerKind::CorrelatedNormal,
            SamplerKind::IndependentNormal,
            SamplerKind::Bootstrap,
        ] {
            let sampler = build_sampler(kind, &stats);
            let mut a = ChaCha8Rng::seed_from_u64(99);
            let mut b = ChaCha8Rng::seed_from_u64(99);
            let mut out_a = [0.0; 2];
            let mut out_b = [0.0; 2];

            for _ in 0..50 {
                sampler.sample(&mut a, &mut out_a);
                sampler.sample(&mut b, &mut out_b);
                assert_eq!(out_a, out_b, "{} diverged", sampler.name());
            }
        }
    }

    #[test]
    fn build_sampler_selects_kind() {
        let stats = stats_from_rows(correlated_rows());

        assert_eq!(
            build_sampler(SamplerKind::CorrelatedNormal, &stats).name(),
            "correlated_normal"
        );
        assert_eq!(
            build_sampler(SamplerKind::IndependentNormal, &stats).name(),
            "independent_normal"
        );
        assert_eq!(build_sampler(SamplerKind::Bootstrap, &stats).name(), "bootstrap");
    }
}
