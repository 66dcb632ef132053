//! Scan trimming: find the samples where the box is actually under the sensors.
//!
//! Two policies, selected per installation:
//!
//! - **Hill detection**: a heuristic edge detector on the middle channel.
//!   The box entering the scan produces a sharp rise followed by a plateau;
//!   leaving produces the mirror image. This is a tuned heuristic, not a
//!   general peak finder — the exact threshold strictness and offsets are
//!   contract, pinned by the tests below.
//! - **Fixed band**: keep rows where all three channels read strictly inside
//!   a numeric band. A filter, not a window: kept rows need not be
//!   contiguous.

use std::ops::Range;

use log::debug;

use crate::domain::{BandLimits, HillParams, ScanBatch, TrimPolicy};
use crate::error::QcError;

/// Detect the in-box window on a single channel.
///
/// Returns a half-open `start..end` range suitable for slicing:
///
/// - start: the first index `i` whose forward difference exceeds
///   `rise_threshold` (strict `>`) while the next `plateau_points`
///   differences all stay below `plateau_margin` in magnitude — the signal
///   has risen and then settled. Start is `i + 1` (the first settled
///   sample). No such index: start = 0.
/// - end: scanning backward, the first index `i` whose difference falls
///   below `fall_threshold` (strict `<`) while the `plateau_points`
///   differences before it are settled. Sample `i` is the last on-plateau
///   sample, so end = `i + 1`. No such index: end = signal length.
///
/// If the detected edges cross (noise fooled one of them), the full signal
/// is returned rather than an unsliceable range.
pub fn hill_window(signal: &[f64], params: &HillParams) -> Range<usize> {
    let n = signal.len();
    if n < 2 {
        return 0..n;
    }

    let diffs: Vec<f64> = signal.windows(2).map(|w| w[1] - w[0]).collect();
    let settled = |range: Range<usize>| {
        range.end <= diffs.len()
            && diffs[range].iter().all(|d| d.abs() < params.plateau_margin)
    };

    let mut start = 0;
    for i in 0..diffs.len() {
        if diffs[i] > params.rise_threshold && settled(i + 1..i + 1 + params.plateau_points) {
            start = i + 1;
            break;
        }
    }

    let mut end = n;
    for i in (0..diffs.len()).rev() {
        if diffs[i] < params.fall_threshold
            && i >= params.plateau_points
            && settled(i - params.plateau_points..i)
        {
            end = i + 1;
            break;
        }
    }

    if end <= start {
        debug!("hill detection edges crossed (start={start}, end={end}); keeping full signal");
        return 0..n;
    }
    start..end
}

/// Row indices where all three channels read strictly inside the band.
pub fn band_rows(batch: &ScanBatch, limits: &BandLimits) -> Vec<usize> {
    let inside = |v: f64| v > limits.min && v < limits.max;
    (0..batch.len())
        .filter(|&i| inside(batch.left[i]) && inside(batch.mid[i]) && inside(batch.right[i]))
        .collect()
}

/// Apply the configured trim policy to a validated batch.
///
/// A malformed batch (unequal channel lengths, non-finite readings) aborts
/// here: a partially trimmed scan would produce a meaningless surface.
pub fn trim_scan(batch: &ScanBatch, policy: &TrimPolicy) -> Result<ScanBatch, QcError> {
    validate_batch(batch)?;

    let trimmed = match policy {
        TrimPolicy::Hill(params) => {
            let window = hill_window(&batch.mid, params);
            debug!(
                "hill window {}..{} of {} samples",
                window.start,
                window.end,
                batch.len()
            );
            ScanBatch {
                left: batch.left[window.clone()].to_vec(),
                mid: batch.mid[window.clone()].to_vec(),
                right: batch.right[window].to_vec(),
            }
        }
        TrimPolicy::Band(limits) => {
            let rows = band_rows(batch, limits);
            debug!("band filter kept {} of {} samples", rows.len(), batch.len());
            ScanBatch {
                left: rows.iter().map(|&i| batch.left[i]).collect(),
                mid: rows.iter().map(|&i| batch.mid[i]).collect(),
                right: rows.iter().map(|&i| batch.right[i]).collect(),
            }
        }
    };

    if trimmed.is_empty() {
        return Err(QcError::EmptyData(
            "no scan samples remain after trimming".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Channel alignment and finiteness checks shared by trim and reconstruction.
pub fn validate_batch(batch: &ScanBatch) -> Result<(), QcError> {
    let n = batch.mid.len();
    for (name, channel) in [("left", &batch.left), ("right", &batch.right)] {
        if channel.len() != n {
            return Err(QcError::precondition(
                name,
                format!("channel has {} samples, `mid` has {n}", channel.len()),
            ));
        }
    }
    for (name, channel) in [
        ("left", &batch.left),
        ("mid", &batch.mid),
        ("right", &batch.right),
    ] {
        if let Some(i) = channel.iter().position(|v| !v.is_finite()) {
            return Err(QcError::precondition(
                name,
                format!("non-finite reading at sample {i}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// flat(0) -> ramp up in +100 steps -> flat(500) x 50 -> ramp down -> flat(0)
    fn hill_signal() -> Vec<f64> {
        let mut s = vec![0.0; 10];
        s.extend([100.0, 200.0, 300.0, 400.0]);
        s.extend(std::iter::repeat(500.0).take(50));
        s.extend([400.0, 300.0, 200.0, 100.0]);
        s.extend(vec![0.0; 10]);
        s
    }

    #[test]
    fn hill_window_brackets_exactly_the_plateau() {
        let signal = hill_signal();
        let window = hill_window(&signal, &HillParams::default());

        // Plateau samples sit at indices 14..64 (first 500 at 14, last at 63).
        assert_eq!(window, 14..64);
        assert!(signal[window.clone()].iter().all(|&v| v == 500.0));
        assert_eq!(window.len(), 50);
    }

    #[test]
    fn no_edges_means_full_signal() {
        // All flat: no diff ever exceeds the thresholds.
        let flat = vec![500.0; 20];
        assert_eq!(hill_window(&flat, &HillParams::default()), 0..20);
        assert_eq!(hill_window(&[], &HillParams::default()), 0..0);
    }

    #[test]
    fn rise_threshold_is_strict() {
        // Step of exactly the threshold must NOT trigger the start.
        let params = HillParams {
            rise_threshold: 100.0,
            ..HillParams::default()
        };
        let mut signal = vec![0.0; 8];
        signal.extend(std::iter::repeat(100.0).take(20));
        assert_eq!(hill_window(&signal, &params).start, 0);

        // One unit above and it does.
        let params = HillParams {
            rise_threshold: 99.0,
            ..params
        };
        assert_eq!(hill_window(&signal, &params).start, 8);
    }

    #[test]
    fn rise_without_settling_does_not_start_the_window() {
        // Monotone staircase: every diff is a "rise", none is followed by a
        // plateau, so the detector keeps the whole signal.
        let signal: Vec<f64> = (0..30).map(|i| i as f64 * 100.0).collect();
        assert_eq!(hill_window(&signal, &HillParams::default()), 0..30);
    }

    #[test]
    fn band_filter_keeps_non_contiguous_rows() {
        let batch = ScanBatch {
            left: vec![400.0, 100.0, 400.0, 400.0],
            mid: vec![450.0, 450.0, 700.0, 450.0],
            right: vec![500.0, 500.0, 500.0, 500.0],
        };
        let rows = band_rows(&batch, &BandLimits::default());
        assert_eq!(rows, vec![0, 3]);

        let trimmed = trim_scan(&batch, &TrimPolicy::Band(BandLimits::default())).unwrap();
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed.mid, vec![450.0, 450.0]);
    }

    #[test]
    fn band_boundaries_are_exclusive() {
        let batch = ScanBatch {
            left: vec![350.0],
            mid: vec![400.0],
            right: vec![400.0],
        };
        assert!(band_rows(&batch, &BandLimits::default()).is_empty());
    }

    #[test]
    fn malformed_batches_abort_instead_of_trimming_partially() {
        let unequal = ScanBatch {
            left: vec![1.0],
            mid: vec![1.0, 2.0],
            right: vec![1.0, 2.0],
        };
        let err = trim_scan(&unequal, &TrimPolicy::Hill(HillParams::default())).unwrap_err();
        assert!(matches!(err, QcError::Precondition { field: "left", .. }));

        let nan = ScanBatch {
            left: vec![1.0, 2.0],
            mid: vec![1.0, f64::NAN],
            right: vec![1.0, 2.0],
        };
        let err = trim_scan(&nan, &TrimPolicy::Hill(HillParams::default())).unwrap_err();
        assert!(matches!(err, QcError::Precondition { field: "mid", .. }));
    }
}
