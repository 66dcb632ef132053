//! Deviation classification against the tolerance band.
//!
//! Given `requested`, `actual` and `tolerance_percent` columns, two columns
//! are produced:
//!
//! - the tolerance as a physical amount (`requested * tol / 100`)
//! - the 4-way deviation class (plus `Unclassifiable` for malformed rows)
//!
//! Classification precedence (first match wins):
//!
//! 1. `requested < 0`  -> `Fill` (fill-to-box mode, no numeric target)
//! 2. `actual > upper` -> `Over`
//! 3. `actual < lower` -> `Under`
//! 4. otherwise        -> `Normal`
//!
//! The Fill check runs before the band test on purpose: a negative requested
//! amount makes the band meaningless even when the numbers would happen to
//! fall inside it. Band comparisons are strict, so boundary values classify
//! `Normal`, and `tolerance_percent = 0` collapses the band to a point
//! (any deviation at all is Over/Under — intentional).
//!
//! A malformed row (missing/non-numeric inputs) becomes `Unclassifiable`
//! with a `Null` tolerance instead of aborting the batch.

use crate::domain::{ClassifyOptions, DeviationClass};
use crate::error::QcError;
use crate::table::{Cell, TabularDataset};

/// Classify one record.
///
/// Only the inputs the first matching rule needs have to be numeric: a `Fill`
/// row is classified from `requested` alone.
pub fn classify_record(
    requested: Option<f64>,
    actual: Option<f64>,
    tolerance_percent: Option<f64>,
) -> DeviationClass {
    let Some(requested) = requested else {
        return DeviationClass::Unclassifiable;
    };
    if requested < 0.0 {
        return DeviationClass::Fill;
    }
    let (Some(actual), Some(tol)) = (actual, tolerance_percent) else {
        return DeviationClass::Unclassifiable;
    };

    let lower = requested * (1.0 - tol / 100.0);
    let upper = requested * (1.0 + tol / 100.0);
    if actual > upper {
        DeviationClass::Over
    } else if actual < lower {
        DeviationClass::Under
    } else {
        DeviationClass::Normal
    }
}

/// Tolerance in physical units, `None` when either input is missing.
pub fn tolerance_physical(requested: Option<f64>, tolerance_percent: Option<f64>) -> Option<f64> {
    Some(requested? * tolerance_percent? / 100.0)
}

/// Classify every row of `dataset`, writing the tolerance and class columns
/// named in `opts` (overwriting in place if they already exist).
///
/// Pure function of the input columns: re-running with the same options
/// yields identical output columns. Returns the per-row classes for
/// reporting.
pub fn classify_dataset(
    dataset: &mut TabularDataset,
    opts: &ClassifyOptions,
) -> Result<Vec<DeviationClass>, QcError> {
    let requested = dataset.numeric_column(&opts.requested_col)?;
    let actual = dataset.numeric_column(&opts.actual_col)?;
    let tolerance = dataset.numeric_column(&opts.tolerance_col)?;

    let n = dataset.n_rows();
    let mut classes = Vec::with_capacity(n);
    let mut tol_cells = Vec::with_capacity(n);
    let mut class_cells = Vec::with_capacity(n);

    for i in 0..n {
        let class = classify_record(requested[i], actual[i], tolerance[i]);
        let tol_phys = tolerance_physical(requested[i], tolerance[i]);

        tol_cells.push(match tol_phys {
            Some(v) => Cell::Float(v),
            None => Cell::Null,
        });
        class_cells.push(Cell::Int(class.code()));
        classes.push(class);
    }

    dataset.set_column(&opts.tolerance_out_col, tol_cells)?;
    dataset.set_column(&opts.class_out_col, class_cells)?;
    Ok(classes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_wins_over_band_for_any_negative_request() {
        // Even when actual would sit inside (or far outside) the band.
        for actual in [-1.0, 0.0, 5.0, 1e6] {
            assert_eq!(
                classify_record(Some(-1.0), Some(actual), Some(5.0)),
                DeviationClass::Fill
            );
        }
        // Fill needs no actual/tolerance at all.
        assert_eq!(classify_record(Some(-2.5), None, None), DeviationClass::Fill);
    }

    #[test]
    fn band_edges_classify_normal() {
        // requested=100, tol=5% -> band [95, 105]; strict comparisons.
        assert_eq!(
            classify_record(Some(100.0), Some(105.0), Some(5.0)),
            DeviationClass::Normal
        );
        assert_eq!(
            classify_record(Some(100.0), Some(95.0), Some(5.0)),
            DeviationClass::Normal
        );
        assert_eq!(
            classify_record(Some(100.0), Some(105.1), Some(5.0)),
            DeviationClass::Over
        );
        assert_eq!(
            classify_record(Some(100.0), Some(94.9), Some(5.0)),
            DeviationClass::Under
        );
    }

    #[test]
    fn zero_tolerance_collapses_the_band_to_a_point() {
        assert_eq!(
            classify_record(Some(100.0), Some(100.0), Some(0.0)),
            DeviationClass::Normal
        );
        assert_eq!(
            classify_record(Some(100.0), Some(100.0001), Some(0.0)),
            DeviationClass::Over
        );
        assert_eq!(
            classify_record(Some(100.0), Some(99.9999), Some(0.0)),
            DeviationClass::Under
        );
    }

    #[test]
    fn malformed_rows_become_unclassifiable_not_errors() {
        assert_eq!(classify_record(None, Some(1.0), Some(5.0)), DeviationClass::Unclassifiable);
        assert_eq!(classify_record(Some(1.0), None, Some(5.0)), DeviationClass::Unclassifiable);
        assert_eq!(classify_record(Some(1.0), Some(1.0), None), DeviationClass::Unclassifiable);
    }

    #[test]
    fn classify_dataset_writes_columns_and_is_idempotent() {
        let mut ds = TabularDataset::from_columns([
            (
                "Requested".to_string(),
                vec![Cell::Float(100.0), Cell::Float(-1.0), Cell::Text("?".to_string())],
            ),
            (
                "Actual".to_string(),
                vec![Cell::Float(106.0), Cell::Float(42.0), Cell::Float(1.0)],
            ),
            (
                "TolerancePercent".to_string(),
                vec![Cell::Float(5.0), Cell::Float(5.0), Cell::Float(5.0)],
            ),
        ])
        .unwrap();

        let opts = ClassifyOptions::default();
        let classes = classify_dataset(&mut ds, &opts).unwrap();
        assert_eq!(
            classes,
            vec![
                DeviationClass::Over,
                DeviationClass::Fill,
                DeviationClass::Unclassifiable
            ]
        );

        // tolerance_physical = 100 * 5 / 100 = 5.0; Null for the malformed row.
        let tol = ds.column("TolerancePhysical").unwrap().to_vec();
        assert_eq!(tol[0], Cell::Float(5.0));
        assert_eq!(tol[2], Cell::Null);

        // One malformed row never aborts the batch.
        let first = ds.column("DeviationClass").unwrap().to_vec();
        let classes2 = classify_dataset(&mut ds, &opts).unwrap();
        assert_eq!(classes, classes2);
        assert_eq!(ds.column("DeviationClass").unwrap(), first.as_slice());
    }
}
