//! Cutoff search over ranked observations.
//!
//! Given a ranking criterion, the search answers: if targeting the
//! top-ranked rows is supposed to capture a given share of the total lift
//! in a driver variable, how far down the ranking does the cutoff sit, and
//! what share of the outcome lift does that prefix capture?
//!
//! Lift of a prefix is `(mean of the variable among treated rows - mean
//! among control rows) * number of control rows`, i.e. the treated-minus-
//! control contrast scaled by the control-arm count. The formula assumes
//! the prefix roughly preserves the sample's treatment/control balance;
//! a prefix missing one arm entirely is an error.
//!
//! The scan itself is a stepped linear pass over candidate prefix sizes,
//! starting at a configurable fraction of the table. Candidate checks are
//! O(1) thanks to cumulative per-arm prefix sums, so a full search costs
//! O(n) setup plus O(n / step) comparisons.

use tracing::debug;

use crate::data::Dataset;
use crate::error::{Error, Result};

/// Tuning knobs for the stepped cutoff scan.
#[derive(Debug, Clone)]
pub struct LiftSearchOptions {
    /// Accepted deviation of the achieved driver-lift share from the
    /// target share (both as fractions). Default 0.01.
    pub tolerance: f64,
    /// Fraction of the table the scan starts at. Default 0.01.
    pub start_fraction: f64,
    /// Scan stride; `None` picks `max(1, n / 10_000)`, trading precision
    /// for speed on large tables.
    pub step: Option<usize>,
}

impl Default for LiftSearchOptions {
    fn default() -> Self {
        LiftSearchOptions {
            tolerance: 0.01,
            start_fraction: 0.01,
            step: None,
        }
    }
}

/// Result of a successful cutoff search.
#[derive(Debug, Clone)]
pub struct CutoffSearch {
    /// Name of the ranking criterion.
    pub criterion: String,
    /// Index of the cutoff row in the descending-sorted table.
    pub cutoff_index: usize,
    /// Criterion value at the cutoff row.
    pub criterion_value: f64,
    /// Share of rows included, in percent (`cutoff_index / n * 100`).
    pub rows_included_percent: f64,
    /// Requested share of total driver lift, in percent.
    pub target_driver_percent: f64,
    /// Achieved share of total driver lift at the cutoff, in percent.
    pub driver_lift_percent: f64,
    /// Achieved share of total outcome lift at the cutoff, in percent.
    pub outcome_lift_percent: f64,
}

/// Per-arm cumulative sums over the descending-sorted table.
struct ArmPrefixes {
    control_count: Vec<usize>,
    treated_count: Vec<usize>,
    driver_control: Vec<f64>,
    driver_treated: Vec<f64>,
    outcome_control: Vec<f64>,
    outcome_treated: Vec<f64>,
}

impl ArmPrefixes {
    /// Lift of the prefix ending at sorted position `i` (inclusive).
    fn lift(&self, i: usize, control_sums: &[f64], treated_sums: &[f64]) -> Result<f64> {
        let n_control = self.control_count[i];
        let n_treated = self.treated_count[i];
        if n_control == 0 || n_treated == 0 {
            let arm = if n_control == 0 { "control" } else { "treatment" };
            return Err(Error::insufficient(format!(
                "prefix of {} top-ranked rows has an empty {} arm",
                i + 1,
                arm
            )));
        }
        let mean_control = control_sums[i] / n_control as f64;
        let mean_treated = treated_sums[i] / n_treated as f64;
        Ok((mean_treated - mean_control) * n_control as f64)
    }

    fn driver_lift(&self, i: usize) -> Result<f64> {
        self.lift(i, &self.driver_control, &self.driver_treated)
    }

    fn outcome_lift(&self, i: usize) -> Result<f64> {
        self.lift(i, &self.outcome_control, &self.outcome_treated)
    }
}

/// Find the smallest scanned prefix capturing `target_driver_percent` of
/// the total driver lift, within tolerance.
///
/// Rows are ranked by `criterion` descending (stable, so ties keep their
/// original order). The scan starts at `start_fraction * n` and advances
/// by the configured step; if it exhausts the table without meeting the
/// tolerance the search fails with [`Error::NoCutoffFound`].
pub fn search(
    data: &Dataset,
    criterion: &str,
    target_driver_percent: f64,
    driver: &str,
    outcome: &str,
    treatment: &str,
    options: &LiftSearchOptions,
) -> Result<CutoffSearch> {
    if !(target_driver_percent > 0.0 && target_driver_percent <= 100.0) {
        return Err(Error::configuration(format!(
            "target driver percent must be in (0, 100], got {}",
            target_driver_percent
        )));
    }
    if options.tolerance < 0.0 {
        return Err(Error::configuration("tolerance must be non-negative"));
    }
    if !(0.0..1.0).contains(&options.start_fraction) {
        return Err(Error::configuration(format!(
            "start fraction must be in [0, 1), got {}",
            options.start_fraction
        )));
    }
    if options.step == Some(0) {
        return Err(Error::configuration("step size must be at least 1"));
    }

    let n = data.n_rows();
    if n == 0 {
        return Err(Error::insufficient("cannot search an empty dataset"));
    }

    let criterion_values = data.numeric(criterion)?;
    let driver_values = data.numeric(driver)?;
    let outcome_values = data.numeric(outcome)?;
    let treatment_values = data.numeric(treatment)?;
    if treatment_values.iter().any(|&v| v != 0.0 && v != 1.0) {
        return Err(Error::configuration(format!(
            "treatment column `{}` must contain only 0 and 1",
            treatment
        )));
    }

    // Descending stable sort; ties keep original row order for
    // reproducibility.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| criterion_values[b].total_cmp(&criterion_values[a]));

    let mut prefixes = ArmPrefixes {
        control_count: Vec::with_capacity(n),
        treated_count: Vec::with_capacity(n),
        driver_control: Vec::with_capacity(n),
        driver_treated: Vec::with_capacity(n),
        outcome_control: Vec::with_capacity(n),
        outcome_treated: Vec::with_capacity(n),
    };
    let mut control_count = 0usize;
    let mut treated_count = 0usize;
    let mut driver_control = 0.0;
    let mut driver_treated = 0.0;
    let mut outcome_control = 0.0;
    let mut outcome_treated = 0.0;
    for &row in &order {
        if treatment_values[row] == 1.0 {
            treated_count += 1;
            driver_treated += driver_values[row];
            outcome_treated += outcome_values[row];
        } else {
            control_count += 1;
            driver_control += driver_values[row];
            outcome_control += outcome_values[row];
        }
        prefixes.control_count.push(control_count);
        prefixes.treated_count.push(treated_count);
        prefixes.driver_control.push(driver_control);
        prefixes.driver_treated.push(driver_treated);
        prefixes.outcome_control.push(outcome_control);
        prefixes.outcome_treated.push(outcome_treated);
    }

    let total_driver_lift = prefixes.driver_lift(n - 1)?;
    if total_driver_lift == 0.0 {
        return Err(Error::estimation(
            "total driver lift is zero, target share is undefined",
        ));
    }

    let start = (options.start_fraction * n as f64) as usize;
    let step = options.step.unwrap_or_else(|| (n / 10_000).max(1));
    let target_share = target_driver_percent / 100.0;

    let mut scanned = 0usize;
    let mut i = start;
    while i < n {
        scanned += 1;
        let achieved_share = prefixes.driver_lift(i)? / total_driver_lift;
        if (achieved_share - target_share).abs() <= options.tolerance {
            let total_outcome_lift = prefixes.outcome_lift(n - 1)?;
            if total_outcome_lift == 0.0 {
                return Err(Error::estimation(
                    "total outcome lift is zero, achieved share is undefined",
                ));
            }
            let outcome_share = prefixes.outcome_lift(i)? / total_outcome_lift;
            debug!(
                criterion,
                cutoff_index = i,
                scanned,
                "cutoff found"
            );
            return Ok(CutoffSearch {
                criterion: criterion.to_string(),
                cutoff_index: i,
                criterion_value: criterion_values[order[i]],
                rows_included_percent: 100.0 * i as f64 / n as f64,
                target_driver_percent,
                driver_lift_percent: 100.0 * achieved_share,
                outcome_lift_percent: 100.0 * outcome_share,
            });
        }
        i += step;
    }

    Err(Error::NoCutoffFound {
        target_percent: target_driver_percent,
        tolerance: options.tolerance,
        scanned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Rows already in rank order (criterion strictly decreasing),
    /// treated rows at even positions, driver lifted by 5.0 uniformly.
    fn ranked_dataset(n: usize) -> Dataset {
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
            .unwrap()
    }

    // Start at 20% so the first candidate prefix already holds both arms.
    fn exhaustive_options() -> LiftSearchOptions {
        LiftSearchOptions {
            tolerance: 1e-9,
            start_fraction: 0.2,
            step: Some(1),
        }
    }

    #[test]
    fn full_target_reaches_final_control_row() {
        // lift(i) = 5 * control_count(i), so the 100% share arrives exactly
        // when the last control row (position 9) enters the prefix.
        let data = ranked_dataset(10);
        let result = search(
            &data,
            "rank",
            100.0,
            "driver",
            "outcome",
            "treatment",
            &exhaustive_options(),
        )
        .unwrap();

        assert_eq!(result.cutoff_index, 9);
        assert_relative_eq!(result.driver_lift_percent, 100.0, epsilon = 1e-9);
        assert_relative_eq!(result.outcome_lift_percent, 100.0, epsilon = 1e-9);
        assert_relative_eq!(result.rows_included_percent, 90.0, epsilon = 1e-9);
        assert_relative_eq!(result.criterion_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn partial_target_stops_at_smallest_matching_prefix() {
        // Shares move in steps of 1/5 as each control row enters; 40%
        // is first reached once the second control row is included.
        let data = ranked_dataset(10);
        let result = search(
            &data,
            "rank",
            40.0,
            "driver",
            "outcome",
            "treatment",
            &exhaustive_options(),
        )
        .unwrap();

        assert_eq!(result.cutoff_index, 3);
        assert_relative_eq!(result.driver_lift_percent, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn unreachable_share_exhausts_the_scan() {
        // Achievable shares are multiples of 20%; 50% within 1e-6 never
        // happens.
        let data = ranked_dataset(10);
        let mut options = exhaustive_options();
        options.tolerance = 1e-6;
        let err = search(
            &data,
            "rank",
            50.0,
            "driver",
            "outcome",
            "treatment",
            &options,
        )
        .unwrap_err();

        match err {
            // Candidates are prefixes ending at positions 2..=9.
            Error::NoCutoffFound { scanned, .. } => assert_eq!(scanned, 8),
            other => panic!("expected NoCutoffFound, got {:?}", other),
        }
    }

    #[test]
    fn single_arm_prefix_is_insufficient_data() {
        // The top-ranked row is treated, so a scan starting at a one-row
        // prefix hits an empty control arm immediately.
        let data = ranked_dataset(10);
        let mut options = exhaustive_options();
        options.start_fraction = 0.0;
        let err = search(
            &data,
            "rank",
            100.0,
            "driver",
            "outcome",
            "treatment",
            &options,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
    }

    #[test]
    fn non_binary_treatment_is_rejected() {
        let data = Dataset::builder()
            .numeric("rank", vec![3.0, 2.0, 1.0])
            .numeric("treatment", vec![0.0, 0.5, 1.0])
            .numeric("driver", vec![1.0, 2.0, 3.0])
            .numeric("outcome", vec![1.0, 2.0, 3.0])
            .build()
            .unwrap();
        let err = search(
            &data,
            "rank",
            50.0,
            "driver",
            "outcome",
            "treatment",
            &LiftSearchOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
