//! Instrumental-variable design generator.
//!
//! The endogenous variable `x` loads on `epsilon`, which the outcome does
//! not, and the outcome loads on `delta`, which `x` does not; the
//! randomized treatment shifts `x` directly. That makes the treatment a
//! valid instrument for `x`, and the configured structural slope is the
//! quantity an instrumented estimator should recover.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{assign_treatment, correlated_normal_draws, validate_size};
use crate::data::Dataset;
use crate::error::Result;

/// Data-generation parameters for [`simulate_iv`].
#[derive(Debug, Clone)]
pub struct IvConfig {
    /// Number of rows to generate. Default 2000.
    pub sample_size: usize,
    /// Bernoulli probability of assignment to the treated arm. Default 0.3.
    pub treatment_proportion: f64,
    /// Mean of the correlated (x1, epsilon, delta) draws.
    pub normal_mean: [f64; 3],
    /// Covariance of the correlated (x1, epsilon, delta) draws.
    pub normal_cov: [[f64; 3]; 3],
    /// Coefficients of the endogenous variable, ordered: intercept,
    /// treatment, x1, epsilon, delta. Default `[3.0, -2.0, 0.3, 1.0, 0.0]`.
    pub coefficients: [f64; 5],
    /// Coefficients of the outcome, ordered: intercept, x, x1, epsilon,
    /// delta. Default `[400.0, -3.0, -0.15, 0.0, 1.0]`; position 1 is the
    /// structural effect of `x` on `y`.
    pub iv_coefficients: [f64; 5],
    /// Exponentiate the correlated draws first. Default true.
    pub log_normal: bool,
}

impl Default for IvConfig {
    fn default() -> Self {
        IvConfig {
            sample_size: 2000,
            treatment_proportion: 0.3,
            normal_mean: [0.0; 3],
            normal_cov: [[1.0, 0.7, -0.5], [0.7, 1.0, -0.4], [-0.5, -0.4, 1.0]],
            coefficients: [3.0, -2.0, 0.3, 1.0, 0.0],
            iv_coefficients: [400.0, -3.0, -0.15, 0.0, 1.0],
            log_normal: true,
        }
    }
}

/// Generate an IV dataset with a known structural coefficient.
///
/// Columns: `x1`, `epsilon`, `delta`, `treatment`, `intercept`, `x`, `y`.
pub fn simulate_iv(config: &IvConfig, seed: u64) -> Result<Dataset> {
    validate_size(config.sample_size)?;
    let n = config.sample_size;
    let mut rng = StdRng::seed_from_u64(seed);

    let [mut x1, mut epsilon, mut delta] =
        correlated_normal_draws(&config.normal_mean, &config.normal_cov, n, &mut rng)?;
    if config.log_normal {
        for column in [&mut x1, &mut epsilon, &mut delta] {
            for value in column.iter_mut() {
                *value = value.exp();
            }
        }
    }

    let treatment = assign_treatment(config.treatment_proportion, n, &mut rng)?;

    let c = &config.coefficients;
    let x: Vec<f64> = (0..n)
        .map(|i| c[0] + c[1] * treatment[i] + c[2] * x1[i] + c[3] * epsilon[i] + c[4] * delta[i])
        .collect();

    let b = &config.iv_coefficients;
    let y: Vec<f64> = (0..n)
        .map(|i| b[0] + b[1] * x[i] + b[2] * x1[i] + b[3] * epsilon[i] + b[4] * delta[i])
        .collect();

    Dataset::builder()
        .numeric("x1", x1)
        .numeric("epsilon", epsilon)
        .numeric("delta", delta)
        .numeric("treatment", treatment)
        .numeric("intercept", vec![1.0; n])
        .numeric("x", x)
        .numeric("y", y)
        .build()
}
