//! Gap detection module
//!
//! Finds bars that open beyond the previous bar's range. A gap up opens above
//! the prior high, a gap down below the prior low; the prior extreme is the
//! level price must revisit for the gap to count as filled.

mod detector;
mod types;

pub use detector::GapDetector;
pub use types::{GapDirection, GapEvent};
