//! Student-t based coefficient inference.
//!
//! Critical values and p-values come from the t distribution with the
//! model's residual degrees of freedom, matching the convention of R's
//! `lm()` and the reference implementations this crate was validated
//! against.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{Error, Result};

/// Two-sided critical value for a confidence interval at `confidence_level`.
///
/// # Arguments
/// * `confidence_level` - Interval coverage in (0, 1), e.g. 0.95
/// * `df_resid` - Residual degrees of freedom of the fitted model
pub fn t_critical(confidence_level: f64, df_resid: usize) -> Result<f64> {
    if confidence_level <= 0.0 || confidence_level >= 1.0 {
        return Err(Error::configuration(format!(
            "confidence level must be in (0, 1), got {}",
            confidence_level
        )));
    }
    let dist = t_distribution(df_resid)?;
    Ok(dist.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0))
}

/// Two-sided p-value for a t statistic.
pub fn two_sided_p_value(t_statistic: f64, df_resid: usize) -> Result<f64> {
    if !t_statistic.is_finite() {
        return Ok(if t_statistic.is_nan() { f64::NAN } else { 0.0 });
    }
    let dist = t_distribution(df_resid)?;
    Ok(2.0 * (1.0 - dist.cdf(t_statistic.abs())))
}

fn t_distribution(df_resid: usize) -> Result<StudentsT> {
    if df_resid == 0 {
        return Err(Error::estimation(
            "no residual degrees of freedom for inference",
        ));
    }
    StudentsT::new(0.0, 1.0, df_resid as f64)
        .map_err(|e| Error::estimation(format!("t distribution unavailable: {}", e)))
}
