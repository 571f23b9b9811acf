//! Cherry-picking utilities.
//!
//! Deliberately biased subsample selection, kept around for illustrating
//! estimation pitfalls: residual-tail picking and subsample score
//! accumulation.

mod residual;
mod score;

pub use residual::{residual_pick, LinearModel, OutcomeModel, ZeroModel};
pub use score::{calculate_score, ScoreOptions};
