//! Top-share selection along a ranking criterion.
//!
//! Both entry points share the same threshold: the `1 - top_percent/100`
//! quantile of the criterion, with strictly-greater comparison. Ties at
//! the threshold are excluded, so the selected share can come out slightly
//! below the requested one.
//!
//! [`flag_top`] modifies the caller-supplied dataset in place, appending a
//! `top_<criterion>` label column and returning nothing; [`take_top`]
//! leaves the input untouched and returns the selected rows as a new
//! dataset.

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::utils;

/// Append a `top_<criterion>` column marking the top `top_percent` share.
///
/// Rows above the threshold are labeled `top <P>%`, the rest `rest`.
/// This mutates `data` in place; use [`take_top`] for a non-mutating
/// variant.
pub fn flag_top(data: &mut Dataset, criterion: &str, top_percent: f64) -> Result<()> {
    let threshold = top_threshold(data, criterion, top_percent)?;
    let values = data.numeric(criterion)?;
    let top_label = format!("top {}%", top_percent);
    let labels: Vec<String> = values
        .iter()
        .map(|&v| {
            if v > threshold {
                top_label.clone()
            } else {
                "rest".to_string()
            }
        })
        .collect();
    data.set_categorical(format!("top_{}", criterion), labels)
}

/// The top `top_percent` share of rows as a new dataset, input untouched.
pub fn take_top(data: &Dataset, criterion: &str, top_percent: f64) -> Result<Dataset> {
    let threshold = top_threshold(data, criterion, top_percent)?;
    let values = data.numeric(criterion)?;
    let mask: Vec<bool> = values.iter().map(|&v| v > threshold).collect();
    data.filter(&mask)
}

fn top_threshold(data: &Dataset, criterion: &str, top_percent: f64) -> Result<f64> {
    if !(top_percent > 0.0 && top_percent <= 100.0) {
        return Err(Error::configuration(format!(
            "top percent must be in (0, 100], got {}",
            top_percent
        )));
    }
    let values = data.numeric(criterion)?;
    utils::quantile(values, 1.0 - top_percent / 100.0).ok_or_else(|| {
        Error::insufficient(format!(
            "cannot compute the selection threshold of empty column `{}`",
            criterion
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored() -> Dataset {
        Dataset::builder()
            .numeric("score", vec![10.0, 40.0, 20.0, 30.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0])
            .build()
            .unwrap()
    }

    #[test]
    fn take_top_returns_strictly_above_threshold() {
        let data = scored();
        let top = take_top(&data, "score", 30.0).unwrap();
        // 70% quantile of 10..100 is 73; rows 80, 90, 100 qualify.
        assert_eq!(top.n_rows(), 3);
        assert_eq!(top.obs_index(), &[8, 9, 10]);
        // Input untouched.
        assert_eq!(data.n_rows(), 10);
        assert_eq!(data.n_columns(), 1);
    }

    #[test]
    fn ties_at_threshold_shrink_the_selection() {
        let data = Dataset::builder()
            .numeric("score", vec![1.0, 1.0, 1.0, 1.0])
            .build()
            .unwrap();
        let top = take_top(&data, "score", 50.0).unwrap();
        assert_eq!(top.n_rows(), 0);
    }

    #[test]
    fn flag_top_appends_one_label_column() {
        let mut data = scored();
        flag_top(&mut data, "score", 30.0).unwrap();
        assert_eq!(data.n_columns(), 2);
        let labels = data.categorical("top_score").unwrap();
        assert_eq!(labels[9], "top 30%");
        assert_eq!(labels[0], "rest");
        assert_eq!(labels.iter().filter(|l| *l == "top 30%").count(), 3);
    }

    #[test]
    fn out_of_range_share_is_rejected() {
        let mut data = scored();
        assert!(flag_top(&mut data, "score", 0.0).is_err());
        assert!(flag_top(&mut data, "score", 120.0).is_err());
    }
}
