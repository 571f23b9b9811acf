//! Synthetic data generators for randomized and instrumented designs.
//!
//! All generators are deterministic given a seed and produce [`Dataset`]s
//! with 1-based observation indices, ready to feed the estimators. The
//! correlated draws come from a Cholesky transform of independent
//! standard normals.

mod base_rate;
mod iv;
mod rct;

pub use base_rate::{simulate_base_rate_neglect, BaseRateNeglect};
pub use iv::{simulate_iv, IvConfig};
pub use rct::{simulate_rct, RctConfig};

use faer::Mat;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{Error, Result};
use crate::solvers;

/// Seed the generators default to when the caller has no preference.
pub const DEFAULT_SEED: u64 = 10086;

/// Draw `n` rows from a trivariate normal with the given mean and
/// covariance, as three column vectors.
pub(crate) fn correlated_normal_draws<R: Rng + ?Sized>(
    mean: &[f64; 3],
    covariance: &[[f64; 3]; 3],
    n: usize,
    rng: &mut R,
) -> Result<[Vec<f64>; 3]> {
    let cov = Mat::from_fn(3, 3, |i, j| covariance[i][j]);
    let factor = solvers::cholesky(&cov)
        .map_err(|_| Error::configuration("covariance matrix must be positive definite"))?;

    let mut columns = [
        Vec::with_capacity(n),
        Vec::with_capacity(n),
        Vec::with_capacity(n),
    ];
    for _ in 0..n {
        let z: [f64; 3] = [
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
        ];
        for j in 0..3 {
            let mut value = mean[j];
            for k in 0..=j {
                value += factor[(j, k)] * z[k];
            }
            columns[j].push(value);
        }
    }
    Ok(columns)
}

/// Bernoulli treatment assignment with the given proportion.
pub(crate) fn assign_treatment<R: Rng + ?Sized>(
    proportion: f64,
    n: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let dist = rand_distr::Bernoulli::new(proportion).map_err(|_| {
        Error::configuration(format!(
            "treatment proportion must be in [0, 1], got {}",
            proportion
        ))
    })?;
    Ok((0..n)
        .map(|_| if rng.sample(dist) { 1.0 } else { 0.0 })
        .collect())
}

/// Sanity checks shared by the generator configs.
pub(crate) fn validate_size(sample_size: usize) -> Result<()> {
    if sample_size == 0 {
        return Err(Error::configuration("sample size must be at least 1"));
    }
    Ok(())
}
