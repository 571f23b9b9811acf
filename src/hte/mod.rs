//! Heterogeneous treatment-effect analysis.
//!
//! Everything here operates on top of the effect estimator: partition a
//! dataset along a criterion, estimate per subset, search for ranking
//! cutoffs that capture a target share of the total lift, and select
//! top-ranked shares of the table.

mod aggregate;
mod lift;
mod partition;
mod pick;

pub use aggregate::{aggregate, SubsetEffect};
pub use lift::{search, CutoffSearch, LiftSearchOptions};
pub use partition::{partition, PartitionKind, Subset};
pub use pick::{flag_top, take_top};
