//! `dosing-qc` library crate.
//!
//! The binary (`doseqc`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable from other services or notebooks
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod classify;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod scan;
pub mod table;
