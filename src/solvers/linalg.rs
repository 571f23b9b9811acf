//! Dense linear algebra primitives shared by the solvers.
//!
//! Everything here operates on `faer` matrices with plain loops; the only
//! factorization is an unpivoted Cholesky of the (symmetric positive
//! definite) normal-equation matrices. A non-positive pivot means the
//! design matrix is rank deficient and is reported as an estimation
//! failure rather than silently regularized.

use faer::{Col, Mat};

use crate::error::{Error, Result};

/// Compute `a' * b`.
pub(crate) fn transpose_mul(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    let n = a.nrows();
    let p = a.ncols();
    let q = b.ncols();
    let mut out = Mat::zeros(p, q);
    for i in 0..p {
        for j in 0..q {
            let mut sum = 0.0;
            for k in 0..n {
                sum += a[(k, i)] * b[(k, j)];
            }
            out[(i, j)] = sum;
        }
    }
    out
}

/// Compute `a' * y`.
pub(crate) fn transpose_mul_col(a: &Mat<f64>, y: &Col<f64>) -> Col<f64> {
    let n = a.nrows();
    let p = a.ncols();
    let mut out = Col::zeros(p);
    for j in 0..p {
        let mut sum = 0.0;
        for i in 0..n {
            sum += a[(i, j)] * y[i];
        }
        out[j] = sum;
    }
    out
}

/// Compute `a * b`.
pub(crate) fn mat_mul(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    let n = a.nrows();
    let k = a.ncols();
    let q = b.ncols();
    let mut out = Mat::zeros(n, q);
    for i in 0..n {
        for j in 0..q {
            let mut sum = 0.0;
            for m in 0..k {
                sum += a[(i, m)] * b[(m, j)];
            }
            out[(i, j)] = sum;
        }
    }
    out
}

/// Compute `a * x`.
pub(crate) fn mat_mul_col(a: &Mat<f64>, x: &Col<f64>) -> Col<f64> {
    let n = a.nrows();
    let p = a.ncols();
    let mut out = Col::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..p {
            sum += a[(i, j)] * x[j];
        }
        out[i] = sum;
    }
    out
}

/// Compute `a' * diag(w) * a` for per-row weights `w`.
pub(crate) fn weighted_gram(a: &Mat<f64>, w: &[f64]) -> Mat<f64> {
    let n = a.nrows();
    let p = a.ncols();
    let mut out = Mat::zeros(p, p);
    for i in 0..p {
        for j in 0..p {
            let mut sum = 0.0;
            for k in 0..n {
                sum += a[(k, i)] * w[k] * a[(k, j)];
            }
            out[(i, j)] = sum;
        }
    }
    out
}

/// Cholesky decomposition `a = L L'` of a symmetric positive definite matrix.
///
/// Fails with an estimation error when a pivot is not meaningfully positive,
/// which is how perfectly collinear designs surface to callers.
pub(crate) fn cholesky(a: &Mat<f64>) -> Result<Mat<f64>> {
    let n = a.nrows();
    let mut l: Mat<f64> = Mat::zeros(n, n);

    for j in 0..n {
        let mut sum = 0.0;
        for k in 0..j {
            sum += l[(j, k)] * l[(j, k)];
        }
        let pivot = a[(j, j)] - sum;
        let tolerance = 1e-12 * (1.0 + a[(j, j)].abs());
        if pivot <= tolerance {
            return Err(Error::estimation(
                "design matrix is rank deficient (collinear or constant columns)",
            ));
        }
        l[(j, j)] = pivot.sqrt();

        for i in (j + 1)..n {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[(i, k)] * l[(j, k)];
            }
            l[(i, j)] = (a[(i, j)] - sum) / l[(j, j)];
        }
    }

    Ok(l)
}

/// Solve `A x = b` given the Cholesky factor `L` of `A`.
pub(crate) fn cholesky_solve(l: &Mat<f64>, b: &Col<f64>) -> Col<f64> {
    let n = l.nrows();

    // Forward substitution: L z = b
    let mut z = Col::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[(i, j)] * z[j];
        }
        z[i] = sum / l[(i, i)];
    }

    // Backward substitution: L' x = z
    let mut x = Col::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for j in (i + 1)..n {
            sum -= l[(j, i)] * x[j];
        }
        x[i] = sum / l[(i, i)];
    }

    x
}

/// Invert `A` given its Cholesky factor `L`, one unit column at a time.
pub(crate) fn cholesky_inverse(l: &Mat<f64>) -> Mat<f64> {
    let n = l.nrows();
    let mut inv = Mat::zeros(n, n);
    for j in 0..n {
        let mut e = Col::zeros(n);
        e[j] = 1.0;
        let column = cholesky_solve(l, &e);
        for i in 0..n {
            inv[(i, j)] = column[i];
        }
    }
    inv
}
