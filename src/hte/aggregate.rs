//! Subset-level treatment-effect aggregation.
//!
//! Partitions the dataset along a criterion, runs the effect estimator on
//! every non-empty subset, and concatenates the results in partition
//! order. There are no retries: a single subset's estimation failure
//! aborts the whole aggregation, wrapped with the subset's label so the
//! offending cell is identifiable.

use crate::data::Dataset;
use crate::effects::{self, EffectSpec, TreatmentEffect};
use crate::error::Result;
use crate::hte::partition::{partition, PartitionKind};

/// One row of the aggregated result table.
#[derive(Debug, Clone)]
pub struct SubsetEffect {
    /// Label of the partition cell the effect was estimated on.
    pub label: String,
    /// The effect estimate for that cell (carries the cell's size).
    pub effect: TreatmentEffect,
}

/// Estimate the treatment effect within every partition cell of `data`.
///
/// Results come back in partition order: first-encounter order for
/// categorical criteria, ascending bin order for quantile bins.
pub fn aggregate(
    data: &Dataset,
    criterion: &str,
    kind: PartitionKind,
    spec: &EffectSpec,
    instrumented: bool,
    confidence_level: f64,
) -> Result<Vec<SubsetEffect>> {
    let subsets = partition(data, criterion, kind)?;

    let mut results = Vec::with_capacity(subsets.len());
    for subset in subsets {
        let effect = effects::estimate(&subset.data, spec, instrumented, confidence_level)
            .map_err(|e| e.in_subset(subset.label.clone()))?;
        results.push(SubsetEffect {
            label: subset.label,
            effect,
        });
    }
    Ok(results)
}
