//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the deviation classification enum (`DeviationClass`)
//! - caller-supplied configuration (`SensorOffsets`, `BoxGeometry`,
//!   `HillParams`, classification/duration/fit options)
//! - trim policy selection (`TrimPolicy`)

pub mod types;

pub use types::*;
