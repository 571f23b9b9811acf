//! Solver adapter contract.
//!
//! The estimators in this crate talk to the regression machinery through a
//! deliberately narrow interface: hand over a design matrix, a response,
//! and optionally an endogenous block with matching instruments; receive
//! coefficients, standard errors, and confidence intervals at a requested
//! level. Any conforming backend can be substituted for the built-in
//! [`Iv2sls`](crate::solvers::Iv2sls) solver.

use faer::{Col, Mat};

use crate::error::{Error, Result};
use crate::inference;

/// Covariance estimator used for coefficient standard errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CovarianceType {
    /// Classical homoskedastic covariance `s^2 (X'X)^-1`.
    Unadjusted,
    /// Heteroskedasticity-robust sandwich covariance with HC1 weights
    /// `n/(n-p) * e_i^2`. This is the default variant.
    #[default]
    Robust,
}

/// Coefficient-level output of a fitted linear model.
///
/// Coefficients are ordered as the backend received the columns: exogenous
/// block first (including any intercept the caller added), endogenous block
/// last.
#[derive(Debug, Clone)]
pub struct FitSummary {
    /// Estimated coefficients.
    pub coefficients: Col<f64>,
    /// Standard errors for each coefficient.
    pub std_errors: Col<f64>,
    /// t-statistics for each coefficient.
    pub t_statistics: Col<f64>,
    /// Two-sided p-values from the t distribution.
    pub p_values: Col<f64>,
    /// Number of observations used in the fit.
    pub n_observations: usize,
    /// Residual degrees of freedom (n - number of coefficients).
    pub df_resid: usize,
}

impl FitSummary {
    /// Assemble a summary from coefficients and a covariance diagonal.
    pub(crate) fn from_covariance_diagonal(
        coefficients: Col<f64>,
        covariance_diagonal: &[f64],
        n_observations: usize,
        df_resid: usize,
    ) -> Result<Self> {
        let p = coefficients.nrows();
        let mut std_errors = Col::zeros(p);
        let mut t_statistics = Col::zeros(p);
        let mut p_values = Col::zeros(p);

        for j in 0..p {
            let variance = covariance_diagonal[j];
            if !variance.is_finite() || variance < 0.0 {
                return Err(Error::estimation(format!(
                    "coefficient {} has an invalid variance estimate ({})",
                    j, variance
                )));
            }
            std_errors[j] = variance.sqrt();
            t_statistics[j] = coefficients[j] / std_errors[j];
            p_values[j] = inference::two_sided_p_value(t_statistics[j], df_resid)?;
        }

        Ok(FitSummary {
            coefficients,
            std_errors,
            t_statistics,
            p_values,
            n_observations,
            df_resid,
        })
    }

    /// Confidence interval bounds for every coefficient at `level`.
    pub fn confidence_interval(&self, level: f64) -> Result<(Col<f64>, Col<f64>)> {
        let critical = inference::t_critical(level, self.df_resid)?;
        let p = self.coefficients.nrows();
        let mut lower = Col::zeros(p);
        let mut upper = Col::zeros(p);
        for j in 0..p {
            lower[j] = self.coefficients[j] - critical * self.std_errors[j];
            upper[j] = self.coefficients[j] + critical * self.std_errors[j];
        }
        Ok((lower, upper))
    }
}

/// A linear-model backend the treatment-effect estimator can delegate to.
pub trait RegressionBackend {
    /// Fit `response` on `exogenous` (plus `endogenous`, instrumented by
    /// `instruments`, when both are given).
    ///
    /// The two optional blocks must be given together and carry the same
    /// number of columns; the backend rejects anything else.
    fn fit(
        &self,
        exogenous: &Mat<f64>,
        endogenous: Option<&Mat<f64>>,
        instruments: Option<&Mat<f64>>,
        response: &Col<f64>,
    ) -> Result<FitSummary>;
}
