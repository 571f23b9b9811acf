//! Integration tests for the cherry-picking utilities.
//!
//! These tools exist to demonstrate how biased subsample selection
//! fabricates effects, so the tests check exactly that: a null or modest
//! true effect turns into a large one on the picked subsample.

mod common;

use hte_toolkit::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn residual_picking_inflates_a_simulated_effect() {
    let data = simulate_rct(&RctConfig::default(), DEFAULT_SEED).unwrap();
    let spec = EffectSpec::new("treatment", "y").with_exogenous(["x1", "x2"]);
    let honest = estimate(&data, &spec, false, 0.95).unwrap();

    let picked = residual_pick(
        &data,
        "treatment",
        &["x1", "x2"],
        "y",
        20.0,
        true,
    )
    .unwrap();
    assert_eq!(picked.n_columns(), data.n_columns() + 2);

    let mask: Vec<bool> = picked
        .numeric("residual_pick")
        .unwrap()
        .iter()
        .map(|&f| f == 1.0)
        .collect();
    let subsample = picked.filter(&mask).unwrap();
    let cherry = estimate(&subsample, &spec, false, 0.95).unwrap();

    // Picking the top residual tail of the treated arm and the bottom tail
    // of the control arm manufactures a large positive effect.
    assert!(cherry.estimate > honest.estimate + 1.0);
    // Roughly 20% of each arm is flagged.
    let share = subsample.n_rows() as f64 / data.n_rows() as f64;
    assert!(share > 0.15 && share < 0.25, "share {}", share);
}

#[test]
fn residual_pick_keeps_observation_indices_traceable() {
    let data = simulate_rct(&RctConfig::default(), 3).unwrap();
    let picked = residual_pick(&data, "treatment", &[], "y", 10.0, true).unwrap();

    // The copy preserves row identity, so flagged rows can be traced back
    // to the original table.
    assert_eq!(picked.obs_index(), data.obs_index());
}

#[test]
fn score_ranking_separates_heterogeneous_effects() {
    // Two halves with very different effects: rows 0..n/2 get +0, rows
    // n/2.. get +8. High-effect rows should accumulate higher scores.
    let n = 400;
    let t: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
    let strong: Vec<f64> = (0..n).map(|i| if i >= n / 2 { 1.0 } else { 0.0 }).collect();
    let y: Vec<f64> = (0..n)
        .map(|i| 1.0 + 8.0 * strong[i] * t[i] + ((i * 17) % 13) as f64 / 13.0)
        .collect();
    let mut data = Dataset::builder()
        .numeric("treatment", t)
        .numeric("half", strong)
        .numeric("y", y)
        .build()
        .unwrap();

    let options = ScoreOptions {
        subsample_size: 80,
        replacement: false,
        minus_tau_0: true,
        num_rounds: 300,
    };
    let mut rng = StdRng::seed_from_u64(11);
    calculate_score(&mut data, "treatment", &[], "y", &options, &mut rng).unwrap();

    let scores = data.numeric("score").unwrap();
    let low_half: f64 = scores[..n / 2].iter().sum::<f64>() / (n / 2) as f64;
    let high_half: f64 = scores[n / 2..].iter().sum::<f64>() / (n / 2) as f64;
    assert!(
        high_half > low_half,
        "high-effect rows should outscore low-effect rows ({} vs {})",
        high_half,
        low_half
    );
}

#[test]
fn score_then_top_pick_workflow() {
    // The intended pipeline: score rows, then split the table on the top
    // score share and compare subset effects.
    let data = simulate_rct(&RctConfig::default(), 17).unwrap();
    let mut scored = data.clone();
    let options = ScoreOptions {
        subsample_size: 200,
        replacement: false,
        minus_tau_0: true,
        num_rounds: 50,
    };
    let mut rng = StdRng::seed_from_u64(29);
    calculate_score(&mut scored, "treatment", &["x1", "x2"], "y", &options, &mut rng).unwrap();

    let top = take_top(&scored, "score", 25.0).unwrap();
    assert!(top.n_rows() > 0 && top.n_rows() <= 500);

    let spec = EffectSpec::new("treatment", "y").with_exogenous(["x1", "x2"]);
    let top_effect = estimate(&top, &spec, false, 0.95).unwrap();
    assert_eq!(top_effect.data_size, top.n_rows());
}

#[test]
fn tied_residuals_are_picked_inclusively() {
    // The fit is exact, so every residual is zero and both thresholds sit
    // at zero. The inclusive comparisons then flag every row: ties widen
    // the selection rather than shrink it.
    let data = common::exact_effect_dataset(100, 0.0, 0.0, 1.0);
    let picked = residual_pick(&data, "treatment", &["x"], "y", 50.0, true).unwrap();
    let flags = picked.numeric("residual_pick").unwrap();
    assert!(flags.iter().all(|&f| f == 1.0));
}
