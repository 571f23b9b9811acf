//! Residual-based cherry-picking.
//!
//! Residualize the outcome on the treatment indicator and/or covariates,
//! then flag the rows whose residuals are most favorable to a positive
//! effect: treated rows in the upper residual tail, control rows in the
//! lower tail. The flagged subsample will show an inflated treatment
//! effect even when the true effect is zero — this is a diagnostic for
//! illustrating estimation pitfalls, not a recommended practice.

use faer::{Col, Mat};

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::solvers::ols;
use crate::utils;

/// A first-stage model with a fit/predict contract.
///
/// Used to residualize a variable before picking; any conforming model
/// can stand in for the built-in least-squares one.
pub trait OutcomeModel {
    /// Fit the model on a design matrix (without intercept) and response.
    fn fit(&mut self, design: &Mat<f64>, response: &Col<f64>) -> Result<()>;

    /// Predict the response for a design matrix. Fails when called before
    /// [`OutcomeModel::fit`].
    fn predict(&self, design: &Mat<f64>) -> Result<Col<f64>>;
}

/// Least-squares model with an intercept.
#[derive(Debug, Clone, Default)]
pub struct LinearModel {
    coefficients: Option<Col<f64>>,
}

impl LinearModel {
    /// An unfitted model.
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutcomeModel for LinearModel {
    fn fit(&mut self, design: &Mat<f64>, response: &Col<f64>) -> Result<()> {
        let augmented = with_intercept(design);
        self.coefficients = Some(ols::coefficients(&augmented, response)?);
        Ok(())
    }

    fn predict(&self, design: &Mat<f64>) -> Result<Col<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or_else(|| {
            Error::configuration("model has not been fitted, call fit() before predict()")
        })?;
        let augmented = with_intercept(design);
        if augmented.ncols() != coefficients.nrows() {
            return Err(Error::configuration(format!(
                "design has {} columns, model was fitted with {}",
                design.ncols(),
                coefficients.nrows() - 1
            )));
        }
        let n = augmented.nrows();
        let mut out = Col::zeros(n);
        for i in 0..n {
            let mut sum = 0.0;
            for j in 0..augmented.ncols() {
                sum += augmented[(i, j)] * coefficients[j];
            }
            out[i] = sum;
        }
        Ok(out)
    }
}

/// A model that always predicts zero.
///
/// Stands in for the first-stage treatment model in double-ML style
/// residualizing when the treatment is already randomized: the best
/// predictor of a randomized indicator from covariates is a constant,
/// so fitting a real model would only burn cycles.
#[derive(Debug, Clone, Default)]
pub struct ZeroModel {
    is_fitted: bool,
}

impl ZeroModel {
    /// An unfitted model.
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutcomeModel for ZeroModel {
    fn fit(&mut self, _design: &Mat<f64>, _response: &Col<f64>) -> Result<()> {
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, design: &Mat<f64>) -> Result<Col<f64>> {
        if !self.is_fitted {
            return Err(Error::configuration(
                "model has not been fitted, call fit() before predict()",
            ));
        }
        Ok(Col::zeros(design.nrows()))
    }
}

/// Flag the `pick_share` percent most effect-favorable rows per arm.
///
/// The outcome is residualized on `[treatment] + exogenous` (the treatment
/// column is skipped when `include_treatment` is false, which is the
/// appropriate choice when the true average effect is zero; with no
/// columns at all the residuals are deviations from the outcome mean).
/// Tied residuals at a threshold are included, so the flagged share can
/// come out slightly above the requested one.
///
/// Returns a copy of `data` with `residual` and `residual_pick` columns
/// appended; the input is not mutated.
pub fn residual_pick(
    data: &Dataset,
    treatment: &str,
    exogenous: &[&str],
    outcome: &str,
    pick_share: f64,
    include_treatment: bool,
) -> Result<Dataset> {
    if !(pick_share > 0.0 && pick_share <= 100.0) {
        return Err(Error::configuration(format!(
            "pick share must be in (0, 100], got {}",
            pick_share
        )));
    }

    let t_values = data.numeric(treatment)?;
    if t_values.iter().any(|&v| v != 0.0 && v != 1.0) {
        return Err(Error::configuration(format!(
            "treatment column `{}` must contain only 0 and 1",
            treatment
        )));
    }
    let y_values = data.numeric(outcome)?;
    let n = data.n_rows();

    let mut columns: Vec<&[f64]> = Vec::new();
    if include_treatment {
        columns.push(t_values);
    }
    for name in exogenous {
        columns.push(data.numeric(name)?);
    }

    let design = Mat::from_fn(n, columns.len(), |i, j| columns[j][i]);
    let response = Col::from_fn(n, |i| y_values[i]);
    let mut model = LinearModel::new();
    model.fit(&design, &response)?;
    let predicted = model.predict(&design)?;

    let residuals: Vec<f64> = (0..n).map(|i| y_values[i] - predicted[i]).collect();

    let control_residuals: Vec<f64> = (0..n)
        .filter(|&i| t_values[i] == 0.0)
        .map(|i| residuals[i])
        .collect();
    let treated_residuals: Vec<f64> = (0..n)
        .filter(|&i| t_values[i] == 1.0)
        .map(|i| residuals[i])
        .collect();

    let control_threshold =
        utils::quantile(&control_residuals, pick_share / 100.0).ok_or_else(|| {
            Error::insufficient("control arm is empty, cannot compute the pick threshold")
        })?;
    let treated_threshold = utils::quantile(&treated_residuals, 1.0 - pick_share / 100.0)
        .ok_or_else(|| {
            Error::insufficient("treatment arm is empty, cannot compute the pick threshold")
        })?;

    let picked: Vec<f64> = (0..n)
        .map(|i| {
            let favorable = (t_values[i] == 1.0 && residuals[i] >= treated_threshold)
                || (t_values[i] == 0.0 && residuals[i] <= control_threshold);
            if favorable {
                1.0
            } else {
                0.0
            }
        })
        .collect();

    let mut out = data.clone();
    out.set_numeric("residual", residuals)?;
    out.set_numeric("residual_pick", picked)?;
    Ok(out)
}

fn with_intercept(design: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(design.nrows(), design.ncols() + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            design[(i, j - 1)]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{self, EffectSpec};

    fn null_effect_rct(n: usize) -> Dataset {
        // True effect is zero; outcome is pure noise around 10.
        let t: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let y: Vec<f64> = (0..n).map(|i| 10.0 + ((i * 37) % 17) as f64 - 8.0).collect();
        Dataset::builder()
            .numeric("treatment", t)
            .numeric("y", y)
            .build()
            .unwrap()
    }

    #[test]
    fn appends_residual_columns_on_a_copy() {
        let data = null_effect_rct(40);
        let picked = residual_pick(&data, "treatment", &[], "y", 25.0, true).unwrap();

        assert_eq!(data.n_columns(), 2);
        assert_eq!(picked.n_columns(), 4);
        assert!(picked.numeric("residual").is_ok());
        let flags = picked.numeric("residual_pick").unwrap();
        assert!(flags.iter().all(|&f| f == 0.0 || f == 1.0));
        assert!(flags.iter().any(|&f| f == 1.0));
    }

    #[test]
    fn picked_subsample_inflates_a_null_effect() {
        let data = null_effect_rct(200);
        let spec = EffectSpec::new("treatment", "y");
        let full = effects::estimate(&data, &spec, false, 0.95).unwrap();

        let picked = residual_pick(&data, "treatment", &[], "y", 30.0, true).unwrap();
        let mask: Vec<bool> = picked
            .numeric("residual_pick")
            .unwrap()
            .iter()
            .map(|&f| f == 1.0)
            .collect();
        let subsample = picked.filter(&mask).unwrap();
        let cherry = effects::estimate(&subsample, &spec, false, 0.95).unwrap();

        // Keeping high-residual treated rows and low-residual control rows
        // manufactures a positive contrast.
        assert!(cherry.estimate > full.estimate + 1.0);
    }

    #[test]
    fn zero_model_requires_fit_before_predict() {
        let design = Mat::from_fn(5, 1, |i, _| i as f64);
        let response = Col::from_fn(5, |i| i as f64);

        let model = ZeroModel::new();
        assert!(model.predict(&design).is_err());

        let mut model = ZeroModel::new();
        model.fit(&design, &response).unwrap();
        let predicted = model.predict(&design).unwrap();
        for i in 0..5 {
            assert_eq!(predicted[i], 0.0);
        }
    }

    #[test]
    fn mean_only_residuals_without_treatment_or_covariates() {
        let data = Dataset::builder()
            .numeric("treatment", vec![0.0, 1.0, 0.0, 1.0])
            .numeric("y", vec![1.0, 3.0, 1.0, 3.0])
            .build()
            .unwrap();
        let picked = residual_pick(&data, "treatment", &[], "y", 50.0, false).unwrap();
        let residuals = picked.numeric("residual").unwrap();
        // Residuals are deviations from the overall mean of 2.
        assert_eq!(residuals, &[-1.0, 1.0, -1.0, 1.0]);
    }
}
