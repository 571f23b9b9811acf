//! Ordinary least squares point estimates without inference.
//!
//! The cherry-picking utilities fit hundreds of small regressions per call
//! and only consume the coefficient on a single column. This path solves
//! the normal equations and skips standard errors entirely; fits that need
//! inference go through [`Iv2sls`](crate::solvers::Iv2sls).

use faer::{Col, Mat};

use super::linalg;
use crate::error::{Error, Result};

/// Least-squares coefficients of `response` on `design`.
///
/// The design matrix is used as given; callers append their own intercept
/// column when they want one.
pub fn coefficients(design: &Mat<f64>, response: &Col<f64>) -> Result<Col<f64>> {
    let n = design.nrows();
    let p = design.ncols();
    if p == 0 {
        return Err(Error::configuration("design matrix has no columns"));
    }
    if response.nrows() != n {
        return Err(Error::configuration(format!(
            "response has {} rows, design has {}",
            response.nrows(),
            n
        )));
    }
    if n <= p {
        return Err(Error::insufficient(format!(
            "{} observations cannot identify {} coefficients",
            n, p
        )));
    }

    let xtx = linalg::transpose_mul(design, design);
    let xty = linalg::transpose_mul_col(design, response);
    let l = linalg::cholesky(&xtx)?;
    Ok(linalg::cholesky_solve(&l, &xty))
}

/// Least-squares residuals of `response` on `design`.
pub fn residuals(design: &Mat<f64>, response: &Col<f64>) -> Result<Col<f64>> {
    let beta = coefficients(design, response)?;
    let fitted = linalg::mat_mul_col(design, &beta);
    let n = design.nrows();
    let mut out = Col::zeros(n);
    for i in 0..n {
        out[i] = response[i] - fitted[i];
    }
    Ok(out)
}
