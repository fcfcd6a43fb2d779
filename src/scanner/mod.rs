//! Scanner module
//!
//! Service layer over the analytics: fetches bars and sentiment through
//! injected collaborators and builds the records handed to callers.

mod error;
mod records;
mod service;

pub use error::ScanError;
pub use records::{
    round2, BacktestRecord, BacktestReport, GapScanRecord, GapSnapshot, ProbabilityRecord,
    SymbolDetail,
};
pub use service::{GapScanner, ScanSettings};
