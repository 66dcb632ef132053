//! Input/output helpers.
//!
//! - CSV ingest + row-level validation (`ingest`)
//! - result exports: classified records CSV, figure JSON (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
