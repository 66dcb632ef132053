//! Record-level derivations on dosing datasets.
//!
//! - tolerance-band deviation classification (`deviation`)
//! - elapsed-time formatting from start/end timestamps (`duration`)

pub mod deviation;
pub mod duration;

pub use deviation::*;
pub use duration::*;
