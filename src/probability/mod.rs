//! Fill probability module
//!
//! Estimates how often, and how quickly, historical gaps were filled: for each
//! gap the following bars are searched for a touch of the reference level.

mod estimator;
mod types;

pub use estimator::{first_fill, FillProbabilityEstimator};
pub use types::{FillOutcome, ProbabilityResult};
