//! Shared domain types.
//!
//! These types are intentionally lightweight and serializable so they can be:
//!
//! - used in-memory during classification/fitting/reconstruction
//! - exported to JSON/CSV alongside results
//! - constructed from CLI flags for the `doseqc` binary

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Outcome of the tolerance-band test for one dosing record.
///
/// The variants are closed on purpose: the PLC side encodes these as raw
/// integers, and an exhaustive match at the formatting boundary is the only
/// place the mapping is allowed to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviationClass {
    /// Actual within `requested * (1 ± tol/100)`.
    Normal,
    /// Actual above the upper band edge.
    Over,
    /// Actual below the lower band edge.
    Under,
    /// Negative requested amount: "fill-to-box" mode, no numeric target.
    ///
    /// Takes precedence over the band test even when the band would match.
    Fill,
    /// Requested/actual/tolerance missing or non-numeric for this row.
    Unclassifiable,
}

impl DeviationClass {
    /// Stable integer code used in exports (matches the store's convention).
    pub fn code(self) -> i64 {
        match self {
            DeviationClass::Normal => 0,
            DeviationClass::Over => 1,
            DeviationClass::Under => 2,
            DeviationClass::Fill => 3,
            DeviationClass::Unclassifiable => -1,
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            DeviationClass::Normal => "Normal",
            DeviationClass::Over => "Over",
            DeviationClass::Under => "Under",
            DeviationClass::Fill => "Fill",
            DeviationClass::Unclassifiable => "Unclassifiable",
        }
    }

    /// Reverse of [`DeviationClass::code`], for re-reading exports.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(DeviationClass::Normal),
            1 => Some(DeviationClass::Over),
            2 => Some(DeviationClass::Under),
            3 => Some(DeviationClass::Fill),
            -1 => Some(DeviationClass::Unclassifiable),
            _ => None,
        }
    }
}

/// Column names consumed/produced by the deviation classifier.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub requested_col: String,
    pub actual_col: String,
    pub tolerance_col: String,
    /// Output column for `requested * tol/100` (overwritten in place if present).
    pub tolerance_out_col: String,
    /// Output column for the classification (overwritten in place if present).
    pub class_out_col: String,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            requested_col: "Requested".to_string(),
            actual_col: "Actual".to_string(),
            tolerance_col: "TolerancePercent".to_string(),
            tolerance_out_col: "TolerancePhysical".to_string(),
            class_out_col: "DeviationClass".to_string(),
        }
    }
}

/// How the computed duration is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DurationMode {
    /// Human-facing string: `"45.0"` for short runs, `"1:05"` above a minute.
    Formatted,
    /// Numeric delta in seconds (rounded to 0.1 s).
    Seconds,
}

/// Options for the duration formatter.
#[derive(Debug, Clone)]
pub struct DurationOptions {
    pub start_col: String,
    pub end_col: String,
    /// `true`: the result replaces the end-time column.
    /// `false`: the result is written to `duration_col`.
    pub overwrite: bool,
    pub duration_col: String,
    pub mode: DurationMode,
}

impl Default for DurationOptions {
    fn default() -> Self {
        Self {
            start_col: "StartTime".to_string(),
            end_col: "EndTime".to_string(),
            overwrite: true,
            duration_col: "Duration".to_string(),
            mode: DurationMode::Formatted,
        }
    }
}

/// Closed degree range + evaluation grid size for calibration fitting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Lowest polynomial degree to fit (>= 1).
    pub degree_min: usize,
    /// Highest polynomial degree to fit (<= 10).
    pub degree_max: usize,
    /// Number of evaluation grid points in log-flow space.
    pub bins: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        // Linear only; higher degrees are opt-in per lot.
        Self {
            degree_min: 1,
            degree_max: 1,
            bins: 100,
        }
    }
}

/// Hill-detection tuning for the scan trimmer.
///
/// These are per-installation calibration values; the defaults match the
/// reference line's distance sensors but carry no special meaning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HillParams {
    /// First difference must exceed this to count as the rising edge.
    pub rise_threshold: f64,
    /// First difference must fall below this to count as the falling edge.
    pub fall_threshold: f64,
    /// Successive diffs within the settle window must stay below this (abs).
    pub plateau_margin: f64,
    /// Number of samples that must be settled after the rise / before the fall.
    pub plateau_points: usize,
}

impl Default for HillParams {
    fn default() -> Self {
        Self {
            rise_threshold: 40.0,
            fall_threshold: -40.0,
            plateau_margin: 10.0,
            plateau_points: 5,
        }
    }
}

/// Fixed-band trim: keep rows whose readings all lie inside `(min, max)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BandLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for BandLimits {
    fn default() -> Self {
        // Reference installation: valid distance readings sit in this band.
        Self { min: 350.0, max: 680.0 }
    }
}

/// Which trim policy isolates the "box present" samples.
///
/// The right policy is calibration-dependent: hill detection works when the
/// box edges produce clean rising/falling steps; the fixed band is the
/// fallback when the approach/exit ramps are too noisy.
#[derive(Debug, Clone, Copy)]
pub enum TrimPolicy {
    Hill(HillParams),
    Band(BandLimits),
}

/// Per-installation sensor geometry.
///
/// `x_*` are cross-axis mounting positions (same unit as the box width);
/// `y_*` are per-channel baseline distances subtracted before reconstruction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorOffsets {
    pub x_left: f64,
    pub x_mid: f64,
    pub x_right: f64,
    pub y_left: f64,
    pub y_mid: f64,
    pub y_right: f64,
}

/// Physical box dimensions for the scanned installation.
///
/// Calibration constants, not algorithmic ones: always supplied by the
/// caller, never hard-coded downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoxGeometry {
    /// Cross-axis inner width; the right wall sits at `x = width`.
    pub width: f64,
    /// Along-axis travel length spanned by one scan.
    pub travel_length: f64,
}

impl Default for BoxGeometry {
    fn default() -> Self {
        Self {
            width: 367.0,
            travel_length: 570.0,
        }
    }
}

/// One batch of three-channel distance scans, row-aligned by sample index.
#[derive(Debug, Clone, Default)]
pub struct ScanBatch {
    pub left: Vec<f64>,
    pub mid: Vec<f64>,
    pub right: Vec<f64>,
}

impl ScanBatch {
    pub fn len(&self) -> usize {
        self.mid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mid.is_empty()
    }
}

/// One calibration observation: material flow at a given slide opening.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// Material flow; must be strictly positive (it is log-transformed).
    pub flow: f64,
    /// Actuator (slide) position.
    pub opening: f64,
    /// Dosed weight for this sample; only used to size scatter markers.
    pub weight_hint: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_codes_round_trip() {
        for class in [
            DeviationClass::Normal,
            DeviationClass::Over,
            DeviationClass::Under,
            DeviationClass::Fill,
            DeviationClass::Unclassifiable,
        ] {
            assert_eq!(DeviationClass::from_code(class.code()), Some(class));
        }
        assert_eq!(DeviationClass::from_code(99), None);
    }
}
