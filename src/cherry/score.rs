//! Subsample score accumulation.
//!
//! Repeatedly fits the treatment coefficient on random subsamples and
//! credits every sampled row with the deviation of that coefficient from
//! the full-sample one. Rows that keep landing in high-effect subsamples
//! accumulate a high score, which makes the score column a cheap
//! per-observation signal of where the effect concentrates.
//!
//! The fits here only need point estimates, so they use the fast
//! no-inference least-squares path rather than the full solver.

use std::collections::BTreeSet;

use faer::{Col, Mat};
use rand::seq::index;
use rand::Rng;
use tracing::debug;

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::solvers::ols;

/// Configuration for [`calculate_score`].
#[derive(Debug, Clone)]
pub struct ScoreOptions {
    /// Rows drawn per round. Default 1000.
    pub subsample_size: usize,
    /// Draw with replacement. Default false.
    pub replacement: bool,
    /// Subtract the full-sample coefficient from each round's coefficient.
    /// Default true.
    pub minus_tau_0: bool,
    /// Number of subsampling rounds. Default 500.
    pub num_rounds: usize,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        ScoreOptions {
            subsample_size: 1000,
            replacement: false,
            minus_tau_0: true,
            num_rounds: 500,
        }
    }
}

/// Accumulate per-row scores from repeated subsample fits.
///
/// Adds (or resets) a zeroed `score` column on `data` in place, then for
/// each round draws `subsample_size` rows, fits the outcome on
/// `[intercept, treatment, exogenous...]` over the draw, and adds the
/// round's coefficient deviation to the score of every *distinct* sampled
/// row. This mutates the caller-supplied dataset and returns nothing.
///
/// A degenerate subsample (for example one with a constant treatment
/// column) fails the round's fit and aborts the whole computation; there
/// are no retries.
pub fn calculate_score<R: Rng + ?Sized>(
    data: &mut Dataset,
    treatment: &str,
    exogenous: &[&str],
    outcome: &str,
    options: &ScoreOptions,
    rng: &mut R,
) -> Result<()> {
    let n = data.n_rows();
    if options.subsample_size == 0 {
        return Err(Error::configuration("subsample size must be at least 1"));
    }
    if !options.replacement && options.subsample_size > n {
        return Err(Error::configuration(format!(
            "cannot draw {} of {} rows without replacement",
            options.subsample_size, n
        )));
    }

    let t_values = data.numeric(treatment)?.to_vec();
    if t_values.iter().any(|&v| v != 0.0 && v != 1.0) {
        return Err(Error::configuration(format!(
            "treatment column `{}` must contain only 0 and 1",
            treatment
        )));
    }
    let y_values = data.numeric(outcome)?.to_vec();
    let exo_values: Vec<Vec<f64>> = exogenous
        .iter()
        .map(|name| data.numeric(name).map(<[f64]>::to_vec))
        .collect::<Result<_>>()?;

    data.set_numeric("score", vec![0.0; n])?;

    let design_row = |row: usize, j: usize| -> f64 {
        match j {
            0 => 1.0,
            1 => t_values[row],
            _ => exo_values[j - 2][row],
        }
    };
    let p = 2 + exo_values.len();

    // Full-sample reference coefficient.
    let full_design = Mat::from_fn(n, p, |i, j| design_row(i, j));
    let full_response = Col::from_fn(n, |i| y_values[i]);
    let tau_0 = ols::coefficients(&full_design, &full_response)?[1];
    debug!(tau_0, rounds = options.num_rounds, "starting score accumulation");

    for _round in 0..options.num_rounds {
        let sampled: Vec<usize> = if options.replacement {
            (0..options.subsample_size)
                .map(|_| rng.gen_range(0..n))
                .collect()
        } else {
            index::sample(rng, n, options.subsample_size).into_vec()
        };

        // The fit uses the draw as-is (duplicates and all) ...
        let sub_design = Mat::from_fn(sampled.len(), p, |i, j| design_row(sampled[i], j));
        let sub_response = Col::from_fn(sampled.len(), |i| y_values[sampled[i]]);
        let tau = ols::coefficients(&sub_design, &sub_response)?[1];

        let delta = tau - if options.minus_tau_0 { tau_0 } else { 0.0 };

        // ... while each distinct row is credited once per round.
        let distinct: BTreeSet<usize> = sampled.into_iter().collect();
        let scores = data.numeric_mut("score")?;
        for row in distinct {
            scores[row] += delta;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rct(n: usize) -> Dataset {
        let t: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let x: Vec<f64> = (0..n).map(|i| ((i * 13) % 7) as f64).collect();
        let y: Vec<f64> = (0..n)
            .map(|i| 1.0 + 0.5 * t[i] + 0.2 * x[i] + ((i * 29) % 11) as f64 / 10.0)
            .collect();
        Dataset::builder()
            .numeric("treatment", t)
            .numeric("x", x)
            .numeric("y", y)
            .build()
            .unwrap()
    }

    fn options(rounds: usize) -> ScoreOptions {
        ScoreOptions {
            subsample_size: 40,
            replacement: false,
            minus_tau_0: true,
            num_rounds: rounds,
        }
    }

    #[test]
    fn zero_rounds_leaves_scores_at_zero() {
        let mut data = rct(100);
        let mut rng = StdRng::seed_from_u64(7);
        calculate_score(&mut data, "treatment", &["x"], "y", &options(0), &mut rng).unwrap();
        assert!(data.numeric("score").unwrap().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn mutates_only_the_score_column() {
        let mut data = rct(100);
        let y_before = data.numeric("y").unwrap().to_vec();
        let mut rng = StdRng::seed_from_u64(7);
        calculate_score(&mut data, "treatment", &["x"], "y", &options(20), &mut rng).unwrap();

        assert_eq!(data.n_columns(), 4);
        assert_eq!(data.numeric("y").unwrap(), y_before.as_slice());
        assert!(data.numeric("score").unwrap().iter().any(|&s| s != 0.0));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let mut first = rct(100);
        let mut second = rct(100);
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        calculate_score(&mut first, "treatment", &["x"], "y", &options(10), &mut rng_a).unwrap();
        calculate_score(&mut second, "treatment", &["x"], "y", &options(10), &mut rng_b)
            .unwrap();
        assert_eq!(
            first.numeric("score").unwrap(),
            second.numeric("score").unwrap()
        );
    }

    #[test]
    fn oversized_draw_without_replacement_is_rejected() {
        let mut data = rct(10);
        let mut rng = StdRng::seed_from_u64(1);
        let mut opts = options(1);
        opts.subsample_size = 11;
        let err =
            calculate_score(&mut data, "treatment", &["x"], "y", &opts, &mut rng).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
