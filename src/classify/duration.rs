//! Elapsed-time derivation from start/end timestamp columns.
//!
//! The delta is computed in seconds (rounded to 0.1 s) and rendered either
//! as a human-facing string or kept numeric:
//!
//! - `|delta| <= 60`: `"{seconds:.1}"`, e.g. `"45.0"`
//! - otherwise: `"{minutes}:{seconds:02}"`, e.g. `"1:05"` (minutes unpadded,
//!   seconds zero-padded, sign in front for negative deltas)
//!
//! Rows where either input cell is not a timestamp are dropped from the
//! returned dataset. That silent row-dropping is the established contract of
//! the duration step (and only of this step); the tests pin it down.

use crate::domain::{DurationMode, DurationOptions};
use crate::error::QcError;
use crate::table::{Cell, TabularDataset};

/// Render a second delta in the duration format.
pub fn format_duration(delta_secs: f64) -> String {
    // One decimal, like the store's own rounding.
    let delta = (delta_secs * 10.0).round() / 10.0;

    if delta.abs() <= 60.0 {
        return format!("{delta:.1}");
    }

    let sign = if delta < 0.0 { "-" } else { "" };
    let total = delta.abs();
    let minutes = (total / 60.0).floor() as i64;
    let seconds = (total % 60.0).floor() as i64;
    format!("{sign}{minutes}:{seconds:02}")
}

/// Compute durations for every row with valid timestamps.
///
/// Returns a new dataset containing only the valid rows, with the duration
/// either overwriting the end column or written to `opts.duration_col`.
pub fn apply_duration(
    dataset: &TabularDataset,
    opts: &DurationOptions,
) -> Result<TabularDataset, QcError> {
    let start = dataset.require_column(&opts.start_col)?;
    let end = dataset.require_column(&opts.end_col)?;

    let mut keep = Vec::new();
    let mut cells = Vec::new();
    for i in 0..dataset.n_rows() {
        let (Some(t0), Some(t1)) = (start[i].as_timestamp(), end[i].as_timestamp()) else {
            continue;
        };
        let delta = (t1 - t0).num_milliseconds() as f64 / 1000.0;
        keep.push(i);
        cells.push(match opts.mode {
            DurationMode::Formatted => Cell::Text(format_duration(delta)),
            DurationMode::Seconds => Cell::Float((delta * 10.0).round() / 10.0),
        });
    }

    let mut out = dataset.select_rows(&keep)?;
    let target = if opts.overwrite {
        opts.end_col.as_str()
    } else {
        opts.duration_col.as_str()
    };
    out.set_column(target, cells)?;
    Ok(out)
}
