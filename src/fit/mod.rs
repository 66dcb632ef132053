//! Calibration curve fitting.
//!
//! Responsibilities:
//!
//! - validate calibration samples (strictly positive flow, sane degree range)
//! - fit one polynomial per requested degree on the log-flow domain (parallel)
//! - emit labeled traces plus per-degree diagnostics

pub mod calibration;

pub use calibration::*;
