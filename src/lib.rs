//! Econometric analysis helpers for randomized and quasi-experimental data.
//!
//! This library provides treatment-effect estimation (direct and
//! instrumented) with full inference support, heterogeneous-effect
//! analysis over dataset partitions, lift-based cutoff search, synthetic
//! RCT/IV data generators, and cherry-picking diagnostics for
//! illustrating how biased subsamples distort estimates.
//!
//! # Example
//!
//! ```rust,ignore
//! use hte_toolkit::prelude::*;
//!
//! // Simulate a trial with a known effect of 0.2 ...
//! let data = simulate_rct(&RctConfig::default(), DEFAULT_SEED)?;
//!
//! // ... estimate it directly ...
//! let spec = EffectSpec::new("treatment", "y").with_exogenous(["x1", "x2"]);
//! let effect = estimate(&data, &spec, false, 0.95)?;
//! println!("effect = {:.3} [{:.3}, {:.3}]", effect.estimate, effect.lower, effect.upper);
//!
//! // ... and break it out by quartiles of x1.
//! let by_quartile = aggregate(
//!     &data, "x1", PartitionKind::Quantiles(4), &spec, false, 0.95,
//! )?;
//! ```

pub mod cherry;
pub mod data;
pub mod effects;
pub mod error;
pub mod hte;
pub mod inference;
pub mod plot;
pub mod simulate;
pub mod solvers;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cherry::{calculate_score, residual_pick, ScoreOptions};
    pub use crate::data::{Column, Dataset, DatasetBuilder};
    pub use crate::effects::{estimate, EffectEstimator, EffectSpec, TreatmentEffect};
    pub use crate::error::{Error, Result};
    pub use crate::hte::{
        aggregate, flag_top, partition, search, take_top, CutoffSearch, LiftSearchOptions,
        PartitionKind, Subset, SubsetEffect,
    };
    pub use crate::plot::{hte_chart, ChartOptions, HteChart};
    pub use crate::simulate::{
        simulate_base_rate_neglect, simulate_iv, simulate_rct, BaseRateNeglect, IvConfig,
        RctConfig, DEFAULT_SEED,
    };
    pub use crate::solvers::{CovarianceType, FitSummary, Iv2sls, RegressionBackend};
}

pub use crate::data::Dataset;
pub use crate::effects::{EffectSpec, TreatmentEffect};
pub use crate::error::{Error, Result};
