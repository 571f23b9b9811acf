//! Treatment-effect estimation for randomized and instrumented designs.
//!
//! The estimator fits one of two models over a [`Dataset`]:
//!
//! - **Direct**: regress the outcome on `[intercept, treatment, X_exo...]`;
//!   the effect is the coefficient on the treatment indicator.
//! - **Instrumented**: two-stage least squares with a single endogenous
//!   regressor, the exogenous covariates as controls, and the treatment
//!   indicator as the sole instrument; the effect is the coefficient on
//!   the endogenous variable.
//!
//! Both paths report the point estimate together with its standard error,
//! confidence interval at the requested level, and per-arm means of the
//! outcome (and of the endogenous variable, when instrumented).

use faer::{Col, Mat};

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::solvers::{Iv2sls, RegressionBackend};

/// Column roles for one estimation call.
///
/// The treatment column doubles as the instrument in the instrumented path.
#[derive(Debug, Clone)]
pub struct EffectSpec {
    treatment: String,
    exogenous: Vec<String>,
    endogenous: Option<String>,
    outcome: String,
}

impl EffectSpec {
    /// Spec with a treatment indicator and an outcome, no covariates.
    pub fn new(treatment: impl Into<String>, outcome: impl Into<String>) -> Self {
        EffectSpec {
            treatment: treatment.into(),
            exogenous: Vec::new(),
            endogenous: None,
            outcome: outcome.into(),
        }
    }

    /// Add exogenous covariate columns.
    pub fn with_exogenous<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exogenous = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the single endogenous column used by instrumented estimation.
    pub fn with_endogenous(mut self, name: impl Into<String>) -> Self {
        self.endogenous = Some(name.into());
        self
    }

    /// Treatment column name.
    pub fn treatment(&self) -> &str {
        &self.treatment
    }

    /// Outcome column name.
    pub fn outcome(&self) -> &str {
        &self.outcome
    }

    /// Exogenous covariate column names.
    pub fn exogenous(&self) -> &[String] {
        &self.exogenous
    }

    /// Endogenous column name, if any.
    pub fn endogenous(&self) -> Option<&str> {
        self.endogenous.as_deref()
    }
}

/// Result of one estimation call. Immutable once produced.
#[derive(Debug, Clone)]
pub struct TreatmentEffect {
    /// Number of rows the estimate was computed from.
    pub data_size: usize,
    /// Outcome column name.
    pub outcome: String,
    /// Mean outcome in the control arm.
    pub outcome_control_mean: f64,
    /// Mean outcome in the treated arm.
    pub outcome_treated_mean: f64,
    /// Endogenous column name (instrumented path only).
    pub endogenous: Option<String>,
    /// Mean of the endogenous variable in the control arm (0 when direct).
    pub endogenous_control_mean: f64,
    /// Mean of the endogenous variable in the treated arm (0 when direct).
    pub endogenous_treated_mean: f64,
    /// Point estimate of the treatment effect.
    pub estimate: f64,
    /// Standard error of the estimate.
    pub std_error: f64,
    /// Lower confidence bound.
    pub lower: f64,
    /// Upper confidence bound.
    pub upper: f64,
    /// Confidence level the bounds were computed at.
    pub confidence_level: f64,
    /// Whether the estimate came from the instrumented path.
    pub instrumented: bool,
}

/// Treatment-effect estimator parameterized over a regression backend.
#[derive(Debug, Clone)]
pub struct EffectEstimator<B = Iv2sls> {
    backend: B,
    confidence_level: f64,
}

impl EffectEstimator<Iv2sls> {
    /// Estimator with the built-in 2SLS backend and a 95% confidence level.
    pub fn new() -> Self {
        EffectEstimator {
            backend: Iv2sls::new(),
            confidence_level: 0.95,
        }
    }
}

impl Default for EffectEstimator<Iv2sls> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: RegressionBackend> EffectEstimator<B> {
    /// Estimator delegating to a caller-supplied backend.
    pub fn with_backend(backend: B) -> Self {
        EffectEstimator {
            backend,
            confidence_level: 0.95,
        }
    }

    /// Confidence level for interval bounds, in (0, 1).
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Estimate the treatment effect on `data` per `spec`.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] for an invalid confidence level, a
    ///   non-binary treatment column, or a missing endogenous column when
    ///   `instrumented` is set.
    /// - [`Error::InsufficientData`] when either arm is empty.
    /// - [`Error::Estimation`] when the design matrix is degenerate.
    pub fn estimate(
        &self,
        data: &Dataset,
        spec: &EffectSpec,
        instrumented: bool,
    ) -> Result<TreatmentEffect> {
        let level = self.confidence_level;
        if level <= 0.0 || level >= 1.0 {
            return Err(Error::configuration(format!(
                "confidence level must be in (0, 1), got {}",
                level
            )));
        }

        let treatment = data.numeric(spec.treatment())?;
        if treatment.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(Error::configuration(format!(
                "treatment column `{}` must contain only 0 and 1",
                spec.treatment()
            )));
        }

        let n = data.n_rows();
        let n_treated = treatment.iter().filter(|&&v| v == 1.0).count();
        let n_control = n - n_treated;
        if n_control == 0 || n_treated == 0 {
            let arm = if n_control == 0 { "control" } else { "treatment" };
            return Err(Error::insufficient(format!(
                "{} arm of `{}` is empty ({} rows total)",
                arm,
                spec.treatment(),
                n
            )));
        }

        let outcome = data.numeric(spec.outcome())?;
        let (outcome_control_mean, outcome_treated_mean) = arm_means(outcome, treatment);

        let response = Col::from_fn(n, |i| outcome[i]);
        let exogenous: Vec<&[f64]> = spec
            .exogenous()
            .iter()
            .map(|name| data.numeric(name))
            .collect::<Result<_>>()?;

        if instrumented {
            let endogenous_name = spec.endogenous().ok_or_else(|| {
                Error::configuration(
                    "instrumented estimation requires an endogenous column in the spec",
                )
            })?;
            let endogenous = data.numeric(endogenous_name)?;
            let (endogenous_control_mean, endogenous_treated_mean) =
                arm_means(endogenous, treatment);

            // Exogenous block [intercept, X_exo...], endogenous block [X_end],
            // instrument block [t]; the endogenous coefficient comes last.
            let exog_design = design_with_intercept(n, &exogenous, None);
            let endog_block = Mat::from_fn(n, 1, |i, _| endogenous[i]);
            let instr_block = Mat::from_fn(n, 1, |i, _| treatment[i]);

            let summary = self.backend.fit(
                &exog_design,
                Some(&endog_block),
                Some(&instr_block),
                &response,
            )?;
            let index = exog_design.ncols();
            let (lower, upper) = summary.confidence_interval(level)?;

            Ok(TreatmentEffect {
                data_size: n,
                outcome: spec.outcome().to_string(),
                outcome_control_mean,
                outcome_treated_mean,
                endogenous: Some(endogenous_name.to_string()),
                endogenous_control_mean,
                endogenous_treated_mean,
                estimate: summary.coefficients[index],
                std_error: summary.std_errors[index],
                lower: lower[index],
                upper: upper[index],
                confidence_level: level,
                instrumented: true,
            })
        } else {
            // Design [intercept, t, X_exo...]; the effect is the coefficient
            // on the treatment indicator.
            let design = design_with_intercept(n, &exogenous, Some(treatment));
            let summary = self.backend.fit(&design, None, None, &response)?;
            let index = 1;
            let (lower, upper) = summary.confidence_interval(level)?;

            Ok(TreatmentEffect {
                data_size: n,
                outcome: spec.outcome().to_string(),
                outcome_control_mean,
                outcome_treated_mean,
                endogenous: None,
                endogenous_control_mean: 0.0,
                endogenous_treated_mean: 0.0,
                estimate: summary.coefficients[index],
                std_error: summary.std_errors[index],
                lower: lower[index],
                upper: upper[index],
                confidence_level: level,
                instrumented: false,
            })
        }
    }
}

/// Estimate with the built-in backend at the given confidence level.
pub fn estimate(
    data: &Dataset,
    spec: &EffectSpec,
    instrumented: bool,
    confidence_level: f64,
) -> Result<TreatmentEffect> {
    EffectEstimator::new()
        .confidence_level(confidence_level)
        .estimate(data, spec, instrumented)
}

/// Build `[intercept, leading?, covariates...]` as a dense design matrix.
fn design_with_intercept(n: usize, covariates: &[&[f64]], leading: Option<&[f64]>) -> Mat<f64> {
    match leading {
        Some(lead) => Mat::from_fn(n, 2 + covariates.len(), |i, j| match j {
            0 => 1.0,
            1 => lead[i],
            _ => covariates[j - 2][i],
        }),
        None => Mat::from_fn(n, 1 + covariates.len(), |i, j| {
            if j == 0 {
                1.0
            } else {
                covariates[j - 1][i]
            }
        }),
    }
}

fn arm_means(values: &[f64], treatment: &[f64]) -> (f64, f64) {
    let mut control_sum = 0.0;
    let mut control_count = 0usize;
    let mut treated_sum = 0.0;
    let mut treated_count = 0usize;
    for (v, t) in values.iter().zip(treatment) {
        if *t == 1.0 {
            treated_sum += v;
            treated_count += 1;
        } else {
            control_sum += v;
            control_count += 1;
        }
    }
    (
        control_sum / control_count as f64,
        treated_sum / treated_count as f64,
    )
}
