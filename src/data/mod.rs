//! Seeded synthetic data for demos and smoke testing.

pub mod demo;

pub use demo::{demo_calibration, demo_records, demo_scan};
