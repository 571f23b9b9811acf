//! Dataset partitioning along a criterion column.
//!
//! Two modes:
//!
//! - **Categorical**: one subset per distinct value of the criterion, in
//!   the order values are first encountered (stable, not sorted).
//! - **Quantiles**: `n_bins + 1` quantile boundaries at evenly spaced
//!   levels, one subset per `[boundary_i, boundary_i+1]` interval. Both
//!   interval ends are inclusive, so a row sitting exactly on an interior
//!   boundary lands in two adjacent subsets. Downstream numbers depend on
//!   this, so it is deliberately kept.
//!
//! Empty quantile bins are skipped with a warning rather than producing a
//! degenerate subset.

use tracing::warn;

use crate::data::{Column, Dataset};
use crate::error::{Error, Result};
use crate::utils;

/// How to split a dataset along a criterion column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// One subset per distinct criterion value, in first-encounter order.
    Categorical,
    /// The given number of quantile-bounded bins over a numeric criterion.
    Quantiles(usize),
}

/// One partition cell: a label and the rows that fell into it.
#[derive(Debug, Clone)]
pub struct Subset {
    /// Human-readable cell label (distinct value or quantile interval).
    pub label: String,
    /// The matching rows, observation indices preserved.
    pub data: Dataset,
}

/// Split `data` along `criterion` according to `kind`.
pub fn partition(data: &Dataset, criterion: &str, kind: PartitionKind) -> Result<Vec<Subset>> {
    match kind {
        PartitionKind::Categorical => partition_categorical(data, criterion),
        PartitionKind::Quantiles(n_bins) => partition_quantiles(data, criterion, n_bins),
    }
}

fn partition_categorical(data: &Dataset, criterion: &str) -> Result<Vec<Subset>> {
    let column = data
        .column(criterion)
        .ok_or_else(|| Error::configuration(format!("unknown column `{}`", criterion)))?;

    let mut subsets = Vec::new();
    match column {
        Column::Categorical(values) => {
            let mut seen: Vec<&String> = Vec::new();
            for value in values {
                if seen.iter().any(|&s| s == value) {
                    continue;
                }
                seen.push(value);
                let mask: Vec<bool> = values.iter().map(|v| v == value).collect();
                subsets.push(Subset {
                    label: value.clone(),
                    data: data.filter(&mask)?,
                });
            }
        }
        Column::Numeric(values) => {
            let mut seen: Vec<u64> = Vec::new();
            for &value in values {
                let bits = value.to_bits();
                if seen.contains(&bits) {
                    continue;
                }
                seen.push(bits);
                let mask: Vec<bool> = values.iter().map(|v| v.to_bits() == bits).collect();
                subsets.push(Subset {
                    label: format!("{}", value),
                    data: data.filter(&mask)?,
                });
            }
        }
    }
    Ok(subsets)
}

fn partition_quantiles(data: &Dataset, criterion: &str, n_bins: usize) -> Result<Vec<Subset>> {
    if n_bins == 0 {
        return Err(Error::configuration("quantile partitioning needs n_bins >= 1"));
    }
    let values = data.numeric(criterion)?;
    if values.is_empty() {
        return Err(Error::insufficient(format!(
            "cannot compute quantile boundaries of empty column `{}`",
            criterion
        )));
    }

    let boundaries: Vec<f64> = (0..=n_bins)
        .map(|i| utils::quantile(values, i as f64 / n_bins as f64))
        .collect::<Option<_>>()
        .ok_or_else(|| {
            Error::insufficient(format!(
                "cannot compute quantile boundaries of column `{}`",
                criterion
            ))
        })?;

    let mut subsets = Vec::new();
    for i in 0..n_bins {
        let lower = boundaries[i];
        let upper = boundaries[i + 1];
        // Inclusive on both ends; interior-boundary rows appear in two bins.
        let mask: Vec<bool> = values.iter().map(|&v| v >= lower && v <= upper).collect();
        if !mask.iter().any(|&m| m) {
            warn!(
                criterion,
                lower,
                upper,
                "no rows in quantile bin, skipping"
            );
            continue;
        }
        subsets.push(Subset {
            label: format!("[{:.2}, {:.2}]", lower, upper),
            data: data.filter(&mask)?,
        });
    }
    Ok(subsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorical_keeps_first_encounter_order() {
        let data = Dataset::builder()
            .categorical(
                "group",
                vec!["b".into(), "a".into(), "b".into(), "c".into(), "a".into()],
            )
            .numeric("y", vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .build()
            .unwrap();

        let subsets = partition(&data, "group", PartitionKind::Categorical).unwrap();
        let labels: Vec<&str> = subsets.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);

        let total: usize = subsets.iter().map(|s| s.data.n_rows()).sum();
        assert_eq!(total, data.n_rows());
    }

    #[test]
    fn categorical_works_on_numeric_codes() {
        let data = Dataset::builder()
            .numeric("kind", vec![2.0, 1.0, 2.0, 1.0])
            .numeric("y", vec![1.0, 2.0, 3.0, 4.0])
            .build()
            .unwrap();

        let subsets = partition(&data, "kind", PartitionKind::Categorical).unwrap();
        assert_eq!(subsets.len(), 2);
        assert_eq!(subsets[0].label, "2");
        assert_eq!(subsets[0].data.obs_index(), &[1, 3]);
    }

    #[test]
    fn quantile_bins_cover_range_with_inclusive_bounds() {
        let values: Vec<f64> = (1..=8).map(|i| i as f64).collect();
        let data = Dataset::builder().numeric("x", values).build().unwrap();

        let subsets = partition(&data, "x", PartitionKind::Quantiles(2)).unwrap();
        assert_eq!(subsets.len(), 2);
        // Median of 1..8 is 4.5, so no row sits on the boundary here.
        assert_eq!(subsets[0].data.n_rows(), 4);
        assert_eq!(subsets[1].data.n_rows(), 4);
    }

    #[test]
    fn boundary_rows_are_double_counted() {
        // Median of 1..9 is exactly 5; the middle row lands in both bins.
        let values: Vec<f64> = (1..=9).map(|i| i as f64).collect();
        let data = Dataset::builder().numeric("x", values).build().unwrap();

        let subsets = partition(&data, "x", PartitionKind::Quantiles(2)).unwrap();
        let total: usize = subsets.iter().map(|s| s.data.n_rows()).sum();
        assert_eq!(total, 10);
        assert_eq!(subsets[0].data.obs_index().last(), Some(&5));
        assert_eq!(subsets[1].data.obs_index().first(), Some(&5));
    }

    #[test]
    fn constant_column_puts_every_row_in_every_bin() {
        // All boundaries coincide at 3.0, so every bin holds every row.
        let data = Dataset::builder()
            .numeric("x", vec![3.0, 3.0, 3.0])
            .build()
            .unwrap();
        let subsets = partition(&data, "x", PartitionKind::Quantiles(4)).unwrap();
        assert!(!subsets.is_empty());
        for subset in &subsets {
            assert_eq!(subset.data.n_rows(), 3);
        }
    }

    #[test]
    fn zero_bins_is_a_configuration_error() {
        let data = Dataset::builder().numeric("x", vec![1.0]).build().unwrap();
        assert!(partition(&data, "x", PartitionKind::Quantiles(0)).is_err());
    }
}
