//! Reporting utilities: summaries and formatted terminal output.
//!
//! Formatting lives in one place so the math/classification code stays
//! clean and output changes are localized.

pub mod format;

pub use format::*;
