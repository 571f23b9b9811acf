//! Crate-wide error taxonomy.
//!
//! Every failure surfaces immediately to the caller; there is no internal
//! recovery or retry anywhere in the crate. Errors carry enough context
//! (which subset, which prefix, which option) to diagnose without rerunning.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by estimation, partitioning, searching, and simulation.
#[derive(Debug, Error)]
pub enum Error {
    /// A treatment or control arm required by the computation is empty.
    #[error("insufficient data: {context}")]
    InsufficientData {
        /// What was being computed and which arm was missing.
        context: String,
    },

    /// The solver could not produce estimates (rank-deficient or otherwise
    /// degenerate design matrix).
    #[error("estimation failed: {reason}")]
    Estimation {
        /// Diagnosis from the solver.
        reason: String,
    },

    /// The cutoff scan exhausted the table without meeting the tolerance.
    #[error(
        "no cutoff found: scanned {scanned} candidates without reaching \
         {target_percent}% of total driver lift (tolerance {tolerance})"
    )]
    NoCutoffFound {
        /// Requested share of total driver lift, in percent.
        target_percent: f64,
        /// Accepted deviation from the target share.
        tolerance: f64,
        /// Number of candidate prefixes that were checked.
        scanned: usize,
    },

    /// An option, column reference, or precondition was invalid.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// Which option or column was rejected and why.
        reason: String,
    },

    /// A per-subset estimation failure, tagged with the subset label so the
    /// offending partition can be identified.
    #[error("estimation failed for subset `{label}`")]
    Subset {
        /// Label of the subset whose estimation failed.
        label: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error with the label of the subset it occurred in.
    pub fn in_subset(self, label: impl Into<String>) -> Self {
        Error::Subset {
            label: label.into(),
            source: Box::new(self),
        }
    }

    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Error::Configuration {
            reason: reason.into(),
        }
    }

    pub(crate) fn estimation(reason: impl Into<String>) -> Self {
        Error::Estimation {
            reason: reason.into(),
        }
    }

    pub(crate) fn insufficient(context: impl Into<String>) -> Self {
        Error::InsufficientData {
            context: context.into(),
        }
    }
}
