//! Command-line parsing for the dosing QC toolkit.
//!
//! Argument parsing and command dispatch stay out of the processing code:
//! this module only describes flags and maps them onto domain options.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{
    BandLimits, BoxGeometry, CalibrationConfig, ClassifyOptions, DurationMode, DurationOptions,
    HillParams, SensorOffsets, TrimPolicy,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "doseqc", version, about = "Dosing telemetry QC and scan reconstruction")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify dosing records and compute run durations from a CSV export.
    Classify(ClassifyArgs),
    /// Fit opening/flow calibration curves from sample measurements.
    Calibrate(CalibrateArgs),
    /// Trim a distance scan and reconstruct the material surface.
    Scan(ScanArgs),
    /// Run the full pipeline on seeded synthetic data.
    Demo(DemoArgs),
}

/// Options for record classification.
#[derive(Debug, Parser, Clone)]
pub struct ClassifyArgs {
    /// Input CSV with dosing records.
    pub input: PathBuf,

    /// Column holding the requested amount.
    #[arg(long, default_value = "Requested")]
    pub requested_col: String,

    /// Column holding the actually dosed amount.
    #[arg(long, default_value = "Actual")]
    pub actual_col: String,

    /// Column holding the tolerance in percent of the request.
    #[arg(long, default_value = "TolerancePercent")]
    pub tolerance_col: String,

    /// Column holding the run start timestamp.
    #[arg(long, default_value = "StartTime")]
    pub start_col: String,

    /// Column holding the run end timestamp.
    #[arg(long, default_value = "EndTime")]
    pub end_col: String,

    /// How durations are written back.
    #[arg(long, value_enum, default_value_t = DurationMode::Formatted)]
    pub duration_mode: DurationMode,

    /// Write the duration to its own column instead of replacing the end time.
    #[arg(long)]
    pub keep_end_time: bool,

    /// Show the first N classified rows.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Export the classified table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl ClassifyArgs {
    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            requested_col: self.requested_col.clone(),
            actual_col: self.actual_col.clone(),
            tolerance_col: self.tolerance_col.clone(),
            ..ClassifyOptions::default()
        }
    }

    pub fn duration_options(&self) -> DurationOptions {
        DurationOptions {
            start_col: self.start_col.clone(),
            end_col: self.end_col.clone(),
            overwrite: !self.keep_end_time,
            mode: self.duration_mode,
            ..DurationOptions::default()
        }
    }
}

/// Options for calibration fitting.
#[derive(Debug, Parser, Clone)]
pub struct CalibrateArgs {
    /// Input CSV with Flow/Opening[/Weight] samples.
    pub input: PathBuf,

    /// Lowest polynomial degree to fit.
    #[arg(long, default_value_t = 1)]
    pub degree_min: usize,

    /// Highest polynomial degree to fit.
    #[arg(long, default_value_t = 3)]
    pub degree_max: usize,

    /// Evaluation grid points in log-flow space.
    #[arg(long, default_value_t = 100)]
    pub bins: usize,

    /// Export the calibration figure (traces + layout) to JSON.
    #[arg(long = "export-figure")]
    pub export_figure: Option<PathBuf>,
}

impl CalibrateArgs {
    pub fn config(&self) -> CalibrationConfig {
        CalibrationConfig {
            degree_min: self.degree_min,
            degree_max: self.degree_max,
            bins: self.bins,
        }
    }
}

/// How scan rows are trimmed down to the "box present" window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrimKind {
    /// Detect the rising/falling edges of the filled hill.
    Hill,
    /// Keep rows whose readings fall inside a fixed distance band.
    Band,
}

/// Options for scan trimming and surface reconstruction.
#[derive(Debug, Parser, Clone)]
pub struct ScanArgs {
    /// Input CSV with Left/Mid/Right distance columns.
    pub input: PathBuf,

    /// Trim policy applied before reconstruction.
    #[arg(long, value_enum, default_value_t = TrimKind::Hill)]
    pub trim: TrimKind,

    /// Rising-edge threshold for hill trimming.
    #[arg(long, default_value_t = 40.0)]
    pub rise_threshold: f64,

    /// Falling-edge threshold for hill trimming.
    #[arg(long, default_value_t = -40.0)]
    pub fall_threshold: f64,

    /// Settle margin for plateau detection.
    #[arg(long, default_value_t = 10.0)]
    pub plateau_margin: f64,

    /// Settled samples required after the rise / before the fall.
    #[arg(long, default_value_t = 5)]
    pub plateau_points: usize,

    /// Lower band limit (band trimming).
    #[arg(long, default_value_t = 350.0)]
    pub band_min: f64,

    /// Upper band limit (band trimming).
    #[arg(long, default_value_t = 680.0)]
    pub band_max: f64,

    /// Cross-axis positions of the three sensors.
    #[arg(long, default_value_t = 50.0)]
    pub x_left: f64,
    #[arg(long, default_value_t = 183.5)]
    pub x_mid: f64,
    #[arg(long, default_value_t = 317.0)]
    pub x_right: f64,

    /// Per-channel baseline distances (empty-box readings).
    #[arg(long, default_value_t = 0.0)]
    pub y_left: f64,
    #[arg(long, default_value_t = 0.0)]
    pub y_mid: f64,
    #[arg(long, default_value_t = 0.0)]
    pub y_right: f64,

    /// Inner box width; the right wall sits at this x.
    #[arg(long, default_value_t = 367.0)]
    pub box_width: f64,

    /// Along-axis travel length spanned by one scan.
    #[arg(long, default_value_t = 570.0)]
    pub travel_length: f64,

    /// Export the surface figure (traces + layout) to JSON.
    #[arg(long = "export-figure")]
    pub export_figure: Option<PathBuf>,
}

impl ScanArgs {
    pub fn trim_policy(&self) -> TrimPolicy {
        match self.trim {
            TrimKind::Hill => TrimPolicy::Hill(HillParams {
                rise_threshold: self.rise_threshold,
                fall_threshold: self.fall_threshold,
                plateau_margin: self.plateau_margin,
                plateau_points: self.plateau_points,
            }),
            TrimKind::Band => TrimPolicy::Band(BandLimits {
                min: self.band_min,
                max: self.band_max,
            }),
        }
    }

    pub fn offsets(&self) -> SensorOffsets {
        SensorOffsets {
            x_left: self.x_left,
            x_mid: self.x_mid,
            x_right: self.x_right,
            y_left: self.y_left,
            y_mid: self.y_mid,
            y_right: self.y_right,
        }
    }

    pub fn geometry(&self) -> BoxGeometry {
        BoxGeometry {
            width: self.box_width,
            travel_length: self.travel_length,
        }
    }
}

/// Options for the synthetic demo pipeline.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Random seed for all generators.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of dosing records to generate.
    #[arg(long, default_value_t = 60)]
    pub records: usize,

    /// Number of calibration samples to generate.
    #[arg(long, default_value_t = 30)]
    pub samples: usize,

    /// Number of scan points per channel to generate.
    #[arg(long, default_value_t = 200)]
    pub scan_points: usize,

    /// Write the generated record table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}
