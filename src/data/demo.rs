//! Deterministic demo generators.
//!
//! Each generator is seeded so repeated runs with the same seed produce
//! identical datasets, which keeps demo output and doc examples stable.

use chrono::NaiveDate;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CalibrationSample, ScanBatch};
use crate::error::QcError;
use crate::table::{Cell, TabularDataset};

/// Generate a dosing record table with `count` rows.
///
/// Most rows land inside tolerance; a handful are seeded as over-dose,
/// under-dose, container fills, and malformed rows so that every
/// deviation class shows up in demo output.
pub fn demo_records(seed: u64, count: usize) -> Result<TabularDataset, QcError> {
    if count == 0 {
        return Err(QcError::precondition("count", "demo row count must be > 0"));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.5)
        .map_err(|e| QcError::precondition("noise", format!("distribution error: {e}")))?;

    let base = NaiveDate::from_ymd_opt(2024, 3, 11)
        .and_then(|d| d.and_hms_opt(6, 0, 0))
        .ok_or_else(|| QcError::precondition("base", "invalid demo base timestamp"))?;

    let mut requested = Vec::with_capacity(count);
    let mut actual = Vec::with_capacity(count);
    let mut tolerance = Vec::with_capacity(count);
    let mut start = Vec::with_capacity(count);
    let mut end = Vec::with_capacity(count);

    let mut cursor = base;
    for i in 0..count {
        let req = rng.gen_range(80.0..400.0_f64);
        let tol = 5.0;
        let act = match i % 17 {
            3 => req * 1.12,                       // over-dose
            7 => req * 0.88,                       // under-dose
            11 => {
                // container fill: negative request, arbitrary actual
                requested.push(Cell::Float(-1.0));
                actual.push(Cell::Float(rng.gen_range(0.0..50.0)));
                tolerance.push(Cell::Float(tol));
                let dur = rng.gen_range(5.0..120.0_f64);
                start.push(Cell::Timestamp(cursor));
                end.push(Cell::Timestamp(
                    cursor + chrono::Duration::milliseconds((dur * 1000.0) as i64),
                ));
                cursor += chrono::Duration::seconds(rng.gen_range(180..600));
                continue;
            }
            13 => {
                // sensor dropout: actual missing
                requested.push(Cell::Float(req));
                actual.push(Cell::Null);
                tolerance.push(Cell::Float(tol));
                start.push(Cell::Timestamp(cursor));
                end.push(Cell::Null);
                cursor += chrono::Duration::seconds(rng.gen_range(180..600));
                continue;
            }
            _ => req + noise.sample(&mut rng),
        };
        requested.push(Cell::Float(req));
        actual.push(Cell::Float(act));
        tolerance.push(Cell::Float(tol));

        let dur = rng.gen_range(5.0..120.0_f64);
        start.push(Cell::Timestamp(cursor));
        end.push(Cell::Timestamp(
            cursor + chrono::Duration::milliseconds((dur * 1000.0) as i64),
        ));
        cursor += chrono::Duration::seconds(rng.gen_range(180..600));
    }

    TabularDataset::from_columns(vec![
        ("Requested".to_string(), requested),
        ("Actual".to_string(), actual),
        ("TolerancePercent".to_string(), tolerance),
        ("StartTime".to_string(), start),
        ("EndTime".to_string(), end),
    ])
}

/// Generate calibration samples along a known opening/flow law.
///
/// Flow follows `flow = 2.5 * opening^1.4` with multiplicative noise, so
/// a low-degree polynomial in `log10(flow)` recovers the relation well.
pub fn demo_calibration(seed: u64, count: usize) -> Result<Vec<CalibrationSample>, QcError> {
    if count < 2 {
        return Err(QcError::precondition(
            "count",
            "calibration demo needs at least 2 samples",
        ));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.02)
        .map_err(|e| QcError::precondition("noise", format!("distribution error: {e}")))?;

    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        let opening = 5.0 + 90.0 * (i as f64) / ((count - 1) as f64);
        let flow = 2.5 * opening.powf(1.4) * (1.0 + noise.sample(&mut rng));
        let weight_hint = rng.gen_range(6.0..14.0);
        samples.push(CalibrationSample {
            flow: flow.max(f64::MIN_POSITIVE),
            opening,
            weight_hint,
        });
    }
    Ok(samples)
}

/// Generate a three-channel scan with a filled-hill profile.
///
/// Each channel is a flat baseline, a steep rise, a noisy plateau near
/// 500, a steep fall, and a flat tail. Plateau noise stays well below
/// the default plateau margin so hill trimming finds the window.
pub fn demo_scan(seed: u64, len: usize) -> Result<ScanBatch, QcError> {
    if len < 20 {
        return Err(QcError::precondition("len", "scan demo needs at least 20 points"));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 2.0)
        .map_err(|e| QcError::precondition("noise", format!("distribution error: {e}")))?;

    let ramp = (len / 10).max(3);
    let lead = len / 8;
    let tail = len / 8;
    let plateau = len - lead - tail - 2 * ramp;

    let channel = |level: f64, rng: &mut StdRng| -> Vec<f64> {
        let mut out = Vec::with_capacity(len);
        out.extend(std::iter::repeat(0.0).take(lead));
        for i in 0..ramp {
            out.push(level * ((i + 1) as f64) / (ramp as f64));
        }
        for _ in 0..plateau {
            out.push(level + noise.sample(rng));
        }
        for i in 0..ramp {
            out.push(level * ((ramp - i - 1) as f64) / (ramp as f64));
        }
        out.extend(std::iter::repeat(0.0).take(tail));
        out
    };

    Ok(ScanBatch {
        left: channel(480.0, &mut rng),
        mid: channel(510.0, &mut rng),
        right: channel(495.0, &mut rng),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_dataset;
    use crate::domain::{ClassifyOptions, DeviationClass};

    #[test]
    fn records_are_deterministic_per_seed() {
        let a = demo_records(7, 40).unwrap();
        let b = demo_records(7, 40).unwrap();
        assert_eq!(a.n_rows(), b.n_rows());
        let fa = a.numeric_column("Actual").unwrap();
        let fb = b.numeric_column("Actual").unwrap();
        assert_eq!(fa, fb);
    }

    #[test]
    fn records_cover_all_classes() {
        let mut ds = demo_records(1, 60).unwrap();
        let classes = classify_dataset(&mut ds, &ClassifyOptions::default()).unwrap();
        for want in [
            DeviationClass::Normal,
            DeviationClass::Over,
            DeviationClass::Under,
            DeviationClass::Fill,
            DeviationClass::Unclassifiable,
        ] {
            assert!(classes.contains(&want), "missing class {want:?}");
        }
    }

    #[test]
    fn calibration_flows_are_positive_and_increasing_on_average() {
        let samples = demo_calibration(3, 30).unwrap();
        assert_eq!(samples.len(), 30);
        assert!(samples.iter().all(|s| s.flow > 0.0));
        assert!(samples.last().unwrap().flow > samples.first().unwrap().flow);
    }

    #[test]
    fn scan_channels_share_length() {
        let batch = demo_scan(11, 120).unwrap();
        assert_eq!(batch.left.len(), 120);
        assert_eq!(batch.mid.len(), 120);
        assert_eq!(batch.right.len(), 120);
        let peak = batch.mid.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak > 400.0);
    }

    #[test]
    fn tiny_requests_are_rejected() {
        assert!(demo_records(0, 0).is_err());
        assert!(demo_calibration(0, 1).is_err());
        assert!(demo_scan(0, 5).is_err());
    }
}
