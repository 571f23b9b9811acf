//! Base-rate neglect demonstration for pooled IV estimation.
//!
//! Three user types share one table. Each type has its own first-stage
//! strength (how hard the treatment moves the endogenous variable) and
//! its own structural slope. Estimated separately, each type's IV
//! estimate recovers its own slope; estimated on a pooled table, the
//! type with the overwhelming first stage dominates the estimate, however
//! few of its rows there are. Neglecting that base rate is the pitfall
//! this generator exists to demonstrate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::{assign_treatment, correlated_normal_draws};
use crate::data::Dataset;
use crate::effects::{self, EffectSpec};
use crate::error::Result;

const ROWS_PER_TYPE: usize = 10_000;

/// Per-type (first-stage strength, structural slope) pairs.
const TYPE_SLOPES: [(f64, f64); 3] = [(2.0, 0.5), (3.0, 1.0 / 3.0), (300.0, 101.0 / 300.0)];

/// The generated table and the five instrumented estimates run on it.
#[derive(Debug, Clone)]
pub struct BaseRateNeglect {
    /// The full three-type dataset.
    pub data: Dataset,
    /// IV estimate on type 1 alone (true slope 1/2).
    pub effect_type_1: f64,
    /// IV estimate on type 2 alone (true slope 1/3).
    pub effect_type_2: f64,
    /// IV estimate on type 3 alone (true slope 101/300).
    pub effect_type_3: f64,
    /// IV estimate pooling types 1 and 2.
    pub effect_type_1_plus_2: f64,
    /// IV estimate pooling types 1 and 3.
    pub effect_type_1_plus_3: f64,
}

/// Generate the three-type table and run the five IV estimations.
///
/// Columns: `x1`, `epsilon`, `delta`, `x2`, `user_type`, `treatment`,
/// `x`, `y`. Type 3 rows have all covariates scaled by 100, which is what
/// hands them their outsized first stage.
pub fn simulate_base_rate_neglect(seed: u64) -> Result<BaseRateNeglect> {
    let n = 3 * ROWS_PER_TYPE;
    let mut rng = StdRng::seed_from_u64(seed);

    let mean = [0.0; 3];
    let cov = [[1.0, 0.7, -0.5], [0.7, 1.0, -0.4], [-0.5, -0.4, 1.0]];
    let [mut x1, mut epsilon, mut delta] = correlated_normal_draws(&mean, &cov, n, &mut rng)?;
    let mut x2: Vec<f64> = (0..n).map(|_| rng.sample(StandardNormal)).collect();

    let user_type: Vec<f64> = (0..n).map(|i| (i / ROWS_PER_TYPE + 1) as f64).collect();
    let treatment = assign_treatment(0.5, n, &mut rng)?;

    // Type 3 rows play at a 100x scale.
    for i in (2 * ROWS_PER_TYPE)..n {
        x1[i] *= 100.0;
        x2[i] *= 100.0;
        epsilon[i] *= 100.0;
        delta[i] *= 100.0;
    }

    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let (first_stage, slope) = TYPE_SLOPES[i / ROWS_PER_TYPE];
        let xi = x1[i] + treatment[i] * first_stage + epsilon[i];
        x.push(xi);
        y.push(slope * xi + x2[i] + delta[i]);
    }

    let data = Dataset::builder()
        .numeric("x1", x1)
        .numeric("epsilon", epsilon)
        .numeric("delta", delta)
        .numeric("x2", x2)
        .numeric("user_type", user_type)
        .numeric("treatment", treatment)
        .numeric("x", x)
        .numeric("y", y)
        .build()?;

    let spec = EffectSpec::new("treatment", "y")
        .with_exogenous(["x2"])
        .with_endogenous("x");
    let estimate_on = |keep: &dyn Fn(f64) -> bool| -> Result<f64> {
        let types = data.numeric("user_type")?;
        let mask: Vec<bool> = types.iter().map(|&t| keep(t)).collect();
        let subset = data.filter(&mask)?;
        Ok(effects::estimate(&subset, &spec, true, 0.95)?.estimate)
    };

    let effect_type_1 = estimate_on(&|t| t == 1.0)?;
    let effect_type_2 = estimate_on(&|t| t == 2.0)?;
    let effect_type_3 = estimate_on(&|t| t == 3.0)?;
    let effect_type_1_plus_2 = estimate_on(&|t| t < 3.0)?;
    let effect_type_1_plus_3 = estimate_on(&|t| t != 2.0)?;

    Ok(BaseRateNeglect {
        data,
        effect_type_1,
        effect_type_2,
        effect_type_3,
        effect_type_1_plus_2,
        effect_type_1_plus_3,
    })
}
