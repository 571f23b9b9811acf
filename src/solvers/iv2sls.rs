//! Two-stage least squares solver.
//!
//! One solver covers both estimation paths of the crate: with no
//! endogenous block the fit is ordinary least squares on the exogenous
//! design; with an endogenous block and matching instruments it is
//! textbook 2SLS, restricted to the just-identified case (as many
//! instruments as endogenous regressors).
//!
//! # Algorithm
//!
//! With structural design `X = [exog | endog]` and instrument set
//! `Z = [exog | instruments]`:
//!
//! 1. First stage: project `X` on `Z`, giving `X_hat = Z (Z'Z)^-1 Z'X`
//!    (exogenous columns project onto themselves).
//! 2. Second stage: `beta = (X_hat'X_hat)^-1 X_hat'y`.
//! 3. Residuals come from the *structural* design, `e = y - X beta`, and
//!    feed the covariance estimator.
//!
//! Standard errors use either the classical `s^2 (X_hat'X_hat)^-1`
//! covariance or the HC1 sandwich, selected via
//! [`CovarianceType`](super::CovarianceType).
//!
//! # References
//!
//! - Wooldridge, J.M. (2010). Econometric Analysis of Cross Section and
//!   Panel Data, ch. 5.
//! - White, H. (1980). "A Heteroskedasticity-Consistent Covariance Matrix
//!   Estimator and a Direct Test for Heteroskedasticity." *Econometrica*.

use faer::{Col, Mat};

use super::linalg;
use super::traits::{CovarianceType, FitSummary, RegressionBackend};
use crate::error::{Error, Result};

/// Two-stage least squares backend (ordinary least squares when no
/// endogenous block is supplied).
#[derive(Debug, Clone, Copy, Default)]
pub struct Iv2sls {
    covariance: CovarianceType,
}

impl Iv2sls {
    /// Backend with the default (robust) covariance estimator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the covariance estimator for standard errors.
    pub fn with_covariance(mut self, covariance: CovarianceType) -> Self {
        self.covariance = covariance;
        self
    }
}

impl RegressionBackend for Iv2sls {
    fn fit(
        &self,
        exogenous: &Mat<f64>,
        endogenous: Option<&Mat<f64>>,
        instruments: Option<&Mat<f64>>,
        response: &Col<f64>,
    ) -> Result<FitSummary> {
        let n = exogenous.nrows();
        if response.nrows() != n {
            return Err(Error::configuration(format!(
                "response has {} rows, design has {}",
                response.nrows(),
                n
            )));
        }

        let instrumented = match (endogenous, instruments) {
            (None, None) => None,
            (Some(endog), Some(instr)) => {
                if endog.nrows() != n || instr.nrows() != n {
                    return Err(Error::configuration(
                        "endogenous and instrument blocks must match the design row count",
                    ));
                }
                if endog.ncols() == 0 || instr.ncols() == 0 {
                    return Err(Error::configuration(
                        "endogenous and instrument blocks must be non-empty",
                    ));
                }
                if endog.ncols() != instr.ncols() {
                    return Err(Error::configuration(format!(
                        "two-stage least squares requires exactly as many instruments as \
                         endogenous regressors (got {} endogenous, {} instruments)",
                        endog.ncols(),
                        instr.ncols()
                    )));
                }
                Some((endog, instr))
            }
            _ => {
                return Err(Error::configuration(
                    "endogenous regressors and instruments must be supplied together",
                ));
            }
        };

        let p = exogenous.ncols() + instrumented.map_or(0, |(endog, _)| endog.ncols());
        if p == 0 {
            return Err(Error::configuration("design matrix has no columns"));
        }
        if n <= p {
            return Err(Error::insufficient(format!(
                "{} observations cannot identify {} coefficients",
                n, p
            )));
        }

        // Structural design and (for 2SLS) its first-stage projection.
        let x = hstack(exogenous, instrumented.map(|(endog, _)| endog));
        let x_hat = match instrumented {
            Some((_, instr)) => {
                let z = hstack(exogenous, Some(instr));
                project(&z, &x)?
            }
            None => x.clone(),
        };

        let gram = linalg::transpose_mul(&x_hat, &x_hat);
        let l = linalg::cholesky(&gram)?;
        let xty = linalg::transpose_mul_col(&x_hat, response);
        let coefficients = linalg::cholesky_solve(&l, &xty);

        // Residuals from the structural design, not the projected one.
        let fitted = linalg::mat_mul_col(&x, &coefficients);
        let mut residuals = Col::zeros(n);
        for i in 0..n {
            residuals[i] = response[i] - fitted[i];
        }

        let df_resid = n - p;
        let bread = linalg::cholesky_inverse(&l);
        let diagonal = match self.covariance {
            CovarianceType::Unadjusted => {
                let mut sse = 0.0;
                for i in 0..n {
                    sse += residuals[i] * residuals[i];
                }
                let s2 = sse / df_resid as f64;
                (0..p).map(|j| s2 * bread[(j, j)]).collect::<Vec<f64>>()
            }
            CovarianceType::Robust => {
                let scale = n as f64 / df_resid as f64;
                let weights: Vec<f64> =
                    (0..n).map(|i| scale * residuals[i] * residuals[i]).collect();
                let meat = linalg::weighted_gram(&x_hat, &weights);
                let sandwich = linalg::mat_mul(&bread, &linalg::mat_mul(&meat, &bread));
                (0..p).map(|j| sandwich[(j, j)]).collect::<Vec<f64>>()
            }
        };

        FitSummary::from_covariance_diagonal(coefficients, &diagonal, n, df_resid)
    }
}

/// Concatenate an optional right block onto `left`, column-wise.
fn hstack(left: &Mat<f64>, right: Option<&Mat<f64>>) -> Mat<f64> {
    let n = left.nrows();
    let p_left = left.ncols();
    let p_right = right.map_or(0, |m| m.ncols());
    let mut out = Mat::zeros(n, p_left + p_right);
    for i in 0..n {
        for j in 0..p_left {
            out[(i, j)] = left[(i, j)];
        }
        if let Some(block) = right {
            for j in 0..p_right {
                out[(i, p_left + j)] = block[(i, j)];
            }
        }
    }
    out
}

/// Orthogonal projection of every column of `x` onto the span of `z`.
fn project(z: &Mat<f64>, x: &Mat<f64>) -> Result<Mat<f64>> {
    let ztz = linalg::transpose_mul(z, z);
    let l = linalg::cholesky(&ztz).map_err(|_| {
        Error::estimation("instrument set is rank deficient (collinear instruments)")
    })?;
    let ztx = linalg::transpose_mul(z, x);

    let q = z.ncols();
    let p = x.ncols();
    let mut first_stage = Mat::zeros(q, p);
    for j in 0..p {
        let column = Col::from_fn(q, |i| ztx[(i, j)]);
        let solved = linalg::cholesky_solve(&l, &column);
        for i in 0..q {
            first_stage[(i, j)] = solved[i];
        }
    }

    Ok(linalg::mat_mul(z, &first_stage))
}
