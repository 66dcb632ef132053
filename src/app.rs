//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads telemetry CSVs
//! - runs classification / calibration / reconstruction
//! - prints reports
//! - writes optional exports

use clap::Parser;
use log::warn;

use crate::cli::{CalibrateArgs, ClassifyArgs, Cli, Command, DemoArgs, ScanArgs};
use crate::domain::{CalibrationConfig, HillParams, TrimPolicy};
use crate::error::QcError;
use crate::io::RowError;
use crate::report::ClassCounts;

/// Entry point for the `doseqc` binary.
pub fn run() -> Result<(), QcError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Classify(args) => handle_classify(args),
        Command::Calibrate(args) => handle_calibrate(args),
        Command::Scan(args) => handle_scan(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_classify(args: ClassifyArgs) -> Result<(), QcError> {
    let ingested = crate::io::load_table_csv(&args.input)?;
    warn_row_errors(&ingested.row_errors);

    let mut dataset = ingested.dataset;

    // Store exports are not consistent about header casing.
    let canonical = |name: &str| {
        crate::io::resolve_column(&dataset, name).unwrap_or_else(|| name.to_string())
    };
    let mut classify_opts = args.classify_options();
    classify_opts.requested_col = canonical(&classify_opts.requested_col);
    classify_opts.actual_col = canonical(&classify_opts.actual_col);
    classify_opts.tolerance_col = canonical(&classify_opts.tolerance_col);
    let mut duration_opts = args.duration_options();
    duration_opts.start_col = canonical(&duration_opts.start_col);
    duration_opts.end_col = canonical(&duration_opts.end_col);

    let classes = crate::classify::classify_dataset(&mut dataset, &classify_opts)?;
    let dataset = crate::classify::apply_duration(&dataset, &duration_opts)?;

    let counts = ClassCounts::tally(&classes);
    println!("{}", crate::report::format_classify_summary(&counts));
    if args.top > 0 {
        println!("{}", crate::report::format_record_table(&dataset, args.top));
    }

    if let Some(path) = &args.export {
        crate::io::write_dataset_csv(path, &dataset)?;
        println!("Wrote classified table: {}", path.display());
    }
    Ok(())
}

fn handle_calibrate(args: CalibrateArgs) -> Result<(), QcError> {
    let (samples, row_errors) = crate::io::load_calibration_csv(&args.input)?;
    warn_row_errors(&row_errors);

    let fit = crate::fit::fit_calibration(&samples, &args.config())?;
    println!("{}", crate::report::format_fit_summary(&fit));

    if let Some(path) = &args.export_figure {
        crate::io::write_figure_json(path, &fit.figure)?;
        println!("Wrote calibration figure: {}", path.display());
    }
    Ok(())
}

fn handle_scan(args: ScanArgs) -> Result<(), QcError> {
    let batch = crate::io::load_scan_csv(&args.input)?;
    let raw_samples = batch.len();

    let trimmed = crate::scan::trim_scan(&batch, &args.trim_policy())?;
    let bundle = crate::scan::reconstruct_surface(&trimmed, &args.offsets(), &args.geometry())?;

    println!("{}", crate::report::format_scan_summary(&bundle, raw_samples));

    if let Some(path) = &args.export_figure {
        let mut figure = crate::plot::FigureSpec::new(
            "Material Surface",
            "Cross position",
            "Travel position",
        )
        .with_zaxis("Fill height");
        for trace in bundle.into_traces() {
            figure.push(trace);
        }
        crate::io::write_figure_json(path, &figure)?;
        println!("Wrote surface figure: {}", path.display());
    }
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), QcError> {
    // Records.
    let mut dataset = crate::data::demo_records(args.seed, args.records)?;
    let classes =
        crate::classify::classify_dataset(&mut dataset, &Default::default())?;
    let dataset = crate::classify::apply_duration(&dataset, &Default::default())?;
    let counts = ClassCounts::tally(&classes);
    println!("{}", crate::report::format_classify_summary(&counts));
    println!("{}", crate::report::format_record_table(&dataset, 10));

    // Calibration.
    let samples = crate::data::demo_calibration(args.seed, args.samples)?;
    let config = CalibrationConfig {
        degree_max: 3,
        ..CalibrationConfig::default()
    };
    let fit = crate::fit::fit_calibration(&samples, &config)?;
    println!("{}", crate::report::format_fit_summary(&fit));

    // Scan.
    let batch = crate::data::demo_scan(args.seed, args.scan_points)?;
    let raw_samples = batch.len();
    let trimmed = crate::scan::trim_scan(&batch, &TrimPolicy::Hill(HillParams::default()))?;
    let bundle = crate::scan::reconstruct_surface(
        &trimmed,
        &demo_offsets(),
        &Default::default(),
    )?;
    println!("{}", crate::report::format_scan_summary(&bundle, raw_samples));

    if let Some(path) = &args.export {
        crate::io::write_dataset_csv(path, &dataset)?;
        println!("Wrote demo table: {}", path.display());
    }
    Ok(())
}

fn demo_offsets() -> crate::domain::SensorOffsets {
    crate::domain::SensorOffsets {
        x_left: 50.0,
        x_mid: 183.5,
        x_right: 317.0,
        y_left: 0.0,
        y_mid: 0.0,
        y_right: 0.0,
    }
}

fn warn_row_errors(errors: &[RowError]) {
    for err in errors {
        warn!("line {}: {}", err.line, err.message);
    }
    if !errors.is_empty() {
        warn!("skipped {} malformed row(s)", errors.len());
    }
}
