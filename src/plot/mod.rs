//! Trace and figure value objects.
//!
//! The core never touches a rendering library: it hands the external
//! renderer a [`FigureSpec`] — a list of validated [`TraceDescriptor`]s plus
//! axis/legend style hints — and stops there.

pub mod figure;
pub mod trace;

pub use figure::*;
pub use trace::*;
