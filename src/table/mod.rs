//! The common tabular input/output shape.
//!
//! Every core operation consumes and produces [`TabularDataset`]s: ordered,
//! named, equal-length columns where row order encodes time or sample index.

pub mod dataset;

pub use dataset::*;
