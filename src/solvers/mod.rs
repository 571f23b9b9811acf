//! Regression solvers backing the treatment-effect estimators.

mod iv2sls;
mod linalg;
pub mod ols;
mod traits;

pub use iv2sls::Iv2sls;
pub use traits::{CovarianceType, FitSummary, RegressionBackend};

pub(crate) use linalg::cholesky;
