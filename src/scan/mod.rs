//! Distance-sensor scan processing.
//!
//! - isolate the "box present" window in a raw scan (`trim`)
//! - reconstruct the material surface from the trimmed channels (`surface`)

pub mod surface;
pub mod trim;

pub use surface::*;
pub use trim::*;
