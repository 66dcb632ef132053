//! Mathematical utilities: polynomial least squares and evaluation grids.

pub mod grid;
pub mod polyfit;

pub use grid::*;
pub use polyfit::*;
