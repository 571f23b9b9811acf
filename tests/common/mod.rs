//! Common test utilities and data generators.

use hte_toolkit::data::Dataset;

/// Noise-free RCT table: y = intercept + effect * t + slope * x, exactly.
///
/// Treatment alternates row by row so both arms are always populated.
#[allow(dead_code)]
pub fn exact_effect_dataset(n: usize, intercept: f64, effect: f64, slope: f64) -> Dataset {
    let x: Vec<f64> = (0..n).map(|i| ((i * 31) % 23) as f64 / 10.0).collect();
    let t: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
    let y: Vec<f64> = (0..n)
        .map(|i| intercept + effect * t[i] + slope * x[i])
        .collect();
    Dataset::builder()
        .numeric("x", x)
        .numeric("treatment", t)
        .numeric("y", y)
        .build()
        .expect("valid test dataset")
}

/// Ranked table with a uniform treated-only lift in driver and outcome.
///
/// The criterion is strictly decreasing, so the descending sort keeps row
/// order; treated rows sit at even positions.
#[allow(dead_code)]
pub fn ranked_lift_dataset(n: usize) -> Dataset {
    let criterion: Vec<f64> = (0..n).map(|i| (n - i) as f64).collect();
    let t: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 1.0 } else { 0.0 }).collect();
    let driver: Vec<f64> = t.iter().map(|&ti| 5.0 * ti).collect();
    let outcome: Vec<f64> = t.iter().map(|&ti| 2.0 * ti).collect();
    Dataset::builder()
        .numeric("rank", criterion)
        .numeric("treatment", t)
        .numeric("driver", driver)
        .numeric("outcome", outcome)
        .build()
        .expect("valid test dataset")
}
