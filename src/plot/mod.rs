//! Chart-model preparation for subset-effect tables.
//!
//! Turns an aggregated result table into a renderer-agnostic error-bar
//! chart description: one point and whisker per subset, optional scaling
//! to percent of the control-arm mean, optional per-point sample-size
//! annotations. Rendering is left to whatever plotting collaborator the
//! caller prefers; nothing here touches the filesystem.

use crate::error::{Error, Result};
use crate::hte::SubsetEffect;

/// Presentation choices for [`hte_chart`].
#[derive(Debug, Clone, Default)]
pub struct ChartOptions {
    /// Express estimates as percent of each subset's control-arm mean.
    pub percent: bool,
    /// Annotate each point with its subset's sample size.
    pub show_sizes: bool,
    /// Criterion name to mention in the title.
    pub criterion: Option<String>,
    /// Free-text note placed under the chart.
    pub note: Option<String>,
}

/// One point-with-whisker of the chart.
#[derive(Debug, Clone)]
pub struct ErrorBar {
    /// Subset label, used as the tick label.
    pub label: String,
    /// Point estimate (possibly percent-scaled).
    pub estimate: f64,
    /// Lower whisker end.
    pub lower: f64,
    /// Upper whisker end.
    pub upper: f64,
    /// Sample-size annotation such as `n=1.5k`, when requested.
    pub size_annotation: Option<String>,
}

/// A complete, renderer-agnostic chart description.
#[derive(Debug, Clone)]
pub struct HteChart {
    /// Chart title derived from the estimated variables.
    pub title: String,
    /// Horizontal axis label.
    pub x_label: String,
    /// Vertical axis label.
    pub y_label: String,
    /// One entry per subset, in table order.
    pub bars: Vec<ErrorBar>,
    /// Optional free-text note.
    pub note: Option<String>,
}

/// Build an error-bar chart description from an aggregated result table.
pub fn hte_chart(results: &[SubsetEffect], options: &ChartOptions) -> Result<HteChart> {
    let first = results
        .first()
        .ok_or_else(|| Error::configuration("no subset results to chart"))?;

    let mut bars = Vec::with_capacity(results.len());
    for row in results {
        let effect = &row.effect;
        let (estimate, lower, upper) = if options.percent {
            let control_mean = effect.outcome_control_mean;
            if control_mean == 0.0 {
                return Err(Error::configuration(format!(
                    "subset `{}` has a zero control-arm mean, cannot express the effect in percent",
                    row.label
                )));
            }
            (
                100.0 * effect.estimate / control_mean,
                100.0 * effect.lower / control_mean,
                100.0 * effect.upper / control_mean,
            )
        } else {
            (effect.estimate, effect.lower, effect.upper)
        };

        let size_annotation = options
            .show_sizes
            .then(|| format!("n={:.1}k", effect.data_size as f64 / 1000.0));

        bars.push(ErrorBar {
            label: row.label.clone(),
            estimate,
            lower,
            upper,
            size_annotation,
        });
    }

    let criterion = options.criterion.as_deref().unwrap_or("");
    let title = match (&first.effect.endogenous, first.effect.instrumented) {
        (Some(endogenous), true) => format!(
            "Treatment Effect of {} on {} by Selected Subsets with Criterion {}",
            endogenous, first.effect.outcome, criterion
        ),
        _ => format!(
            "Treatment Effect on {} by Selected Subsets with Criterion {}",
            first.effect.outcome, criterion
        ),
    };
    let y_label = if options.percent {
        "Treatment Effect in %".to_string()
    } else {
        "Treatment Effect".to_string()
    };

    Ok(HteChart {
        title,
        x_label: "Subset Name".to_string(),
        y_label,
        bars,
        note: options.note.clone(),
    })
}
