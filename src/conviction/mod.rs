//! Conviction module
//!
//! Folds gap size, historical fill rate, volume and sentiment into a single
//! ranking tier, plus the human-readable reasons shown alongside it.

mod scorer;
mod types;

pub use scorer::ConvictionScorer;
pub use types::{Action, Conviction, ConvictionInputs, Recommendation};
