//! CSV ingest and normalization.
//!
//! The telemetry store is an external collaborator; this module consumes its
//! CSV exports and turns them into the core's in-memory shapes.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors, named column)
//! - **Row-level validation** where the downstream contract tolerates it
//!   (dosing/calibration rows: skip + report); **batch-level abort** where it
//!   does not (sensor scans: a partial batch is meaningless)
//! - **Deterministic behavior** (no hidden coercions beyond the typed parse)

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;
use log::warn;

use crate::domain::{CalibrationSample, ScanBatch};
use crate::error::QcError;
use crate::table::{Cell, TabularDataset};

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based CSV line number (header is line 1).
    pub line: usize,
    pub message: String,
}

/// A loaded dataset plus everything that went wrong while loading it.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub dataset: TabularDataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a CSV into a typed [`TabularDataset`].
///
/// Every header becomes a column (BOM-stripped, whitespace-trimmed); each
/// cell is parsed as timestamp, then number, then kept as text; empty cells
/// become `Null`. Structurally broken CSV rows are collected as row errors,
/// not fatal.
pub fn load_table_csv(path: &Path) -> Result<IngestedTable, QcError> {
    let file = File::open(path)
        .map_err(|e| QcError::Io(format!("failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| QcError::Io(format!("failed to read CSV headers: {e}")))?
        .iter()
        .map(clean_header)
        .collect();

    if headers.is_empty() {
        return Err(QcError::Io(format!("CSV '{}' has no header row", path.display())));
    }

    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header; CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        for (col, cells) in columns.iter_mut().enumerate() {
            cells.push(parse_cell(record.get(col).unwrap_or("")));
        }
    }

    if !row_errors.is_empty() {
        warn!(
            "{}: skipped {} of {rows_read} rows",
            path.display(),
            row_errors.len()
        );
    }

    let dataset = TabularDataset::from_columns(headers.into_iter().zip(columns))?;
    Ok(IngestedTable {
        dataset,
        row_errors,
        rows_read,
    })
}

/// Load calibration samples from a `Flow`/`Opening`[/`Weight`] CSV.
///
/// Rows with missing or non-numeric values are skipped and reported; a
/// missing `Weight` column defaults every hint to 1.0.
pub fn load_calibration_csv(
    path: &Path,
) -> Result<(Vec<CalibrationSample>, Vec<RowError>), QcError> {
    let file = File::open(path)
        .map_err(|e| QcError::Io(format!("failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| QcError::Io(format!("failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let flow_idx = require_header(&header_map, "flow")?;
    let opening_idx = require_header(&header_map, "opening")?;
    let weight_idx = header_map.get("weight").copied();

    let mut samples = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let flow = parse_f64_field(&record, flow_idx);
        let opening = parse_f64_field(&record, opening_idx);
        let weight_hint = match weight_idx {
            Some(i) => parse_f64_field(&record, i),
            None => Some(1.0),
        };

        match (flow, opening, weight_hint) {
            (Some(flow), Some(opening), Some(weight_hint)) => samples.push(CalibrationSample {
                flow,
                opening,
                weight_hint,
            }),
            _ => row_errors.push(RowError {
                line,
                message: "missing/non-numeric flow, opening or weight".to_string(),
            }),
        }
    }

    Ok((samples, row_errors))
}

/// Load a three-channel scan batch from a `Left`/`Mid`/`Right` CSV.
///
/// Unlike the record loaders, any malformed row aborts the load: a scan with
/// holes cannot be reconstructed.
pub fn load_scan_csv(path: &Path) -> Result<ScanBatch, QcError> {
    let file = File::open(path)
        .map_err(|e| QcError::Io(format!("failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| QcError::Io(format!("failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let left_idx = require_header(&header_map, "left")?;
    let mid_idx = require_header(&header_map, "mid")?;
    let right_idx = require_header(&header_map, "right")?;

    let mut batch = ScanBatch::default();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record =
            result.map_err(|e| QcError::Io(format!("CSV parse error at line {line}: {e}")))?;

        let read = |name: &'static str, col: usize| {
            parse_f64_field(&record, col).ok_or_else(|| {
                QcError::precondition(
                    name,
                    format!("missing/non-numeric reading at line {line}"),
                )
            })
        };
        batch.left.push(read("left", left_idx)?);
        batch.mid.push(read("mid", mid_idx)?);
        batch.right.push(read("right", right_idx)?);
    }

    if batch.is_empty() {
        return Err(QcError::EmptyData(format!(
            "scan CSV '{}' has no data rows",
            path.display()
        )));
    }
    Ok(batch)
}

/// Case-insensitive lookup of an existing column name in a dataset.
pub fn resolve_column(dataset: &TabularDataset, wanted: &str) -> Option<String> {
    dataset
        .column_names()
        .find(|name| name.eq_ignore_ascii_case(wanted))
        .map(str::to_string)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (clean_header(name).to_ascii_lowercase(), idx))
        .collect()
}

fn require_header(header_map: &HashMap<String, usize>, name: &'static str) -> Result<usize, QcError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| QcError::precondition("column", format!("missing column `{name}`")))
}

fn clean_header(name: &str) -> String {
    // Excel and friends sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header; without stripping it, schema checks report the column
    // as missing.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_f64_field(record: &StringRecord, idx: usize) -> Option<f64> {
    let s = record.get(idx)?.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Typed cell parse: timestamp, then number, then text; empty is `Null`.
fn parse_cell(s: &str) -> Cell {
    let s = s.trim();
    if s.is_empty() {
        return Cell::Null;
    }
    if let Some(ts) = parse_timestamp(s) {
        return Cell::Timestamp(ts);
    }
    if let Ok(v) = s.parse::<f64>() {
        if v.is_finite() {
            return Cell::Float(v);
        }
    }
    Cell::Text(s.to_string())
}

/// Accept the store's export format plus common ISO variants.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FMTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];
    FMTS.iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("dosing-qc-test-{name}"));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn table_csv_parses_typed_cells() {
        let path = write_temp(
            "table.csv",
            "Requested,Actual,StartTime,Note\n\
             10.5,10.4,2024-01-01 00:00:00,ok\n\
             ,x,not-a-date,\n",
        );
        let ingested = load_table_csv(&path).unwrap();
        let ds = &ingested.dataset;

        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.column("Requested").unwrap()[0], Cell::Float(10.5));
        assert!(ds.column("StartTime").unwrap()[0].as_timestamp().is_some());
        assert_eq!(ds.column("Requested").unwrap()[1], Cell::Null);
        assert_eq!(ds.column("Actual").unwrap()[1], Cell::Text("x".to_string()));
        assert_eq!(
            ds.column("StartTime").unwrap()[1],
            Cell::Text("not-a-date".to_string())
        );
    }

    #[test]
    fn calibration_rows_with_bad_values_are_reported_not_fatal() {
        let path = write_temp(
            "calib.csv",
            "Flow,Opening,Weight\n1.0,2.0,5.0\nbad,2.0,5.0\n10.0,3.0,6.0\n",
        );
        let (samples, errors) = load_calibration_csv(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 3);
    }

    #[test]
    fn scan_csv_aborts_on_any_malformed_row() {
        let path = write_temp("scan.csv", "Left,Mid,Right\n1,2,3\n4,,6\n");
        let err = load_scan_csv(&path).unwrap_err();
        assert!(matches!(err, QcError::Precondition { field: "mid", .. }));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn headers_are_matched_case_insensitively_with_bom() {
        let path = write_temp("bom.csv", "\u{feff}flow,OPENING\n1.0,2.0\n");
        let (samples, errors) = load_calibration_csv(&path).unwrap();
        assert_eq!(samples.len(), 1);
        assert!(errors.is_empty());
        assert_eq!(samples[0].weight_hint, 1.0);
    }

    #[test]
    fn resolve_column_ignores_ascii_case() {
        let path = write_temp("resolve.csv", "requested,ACTUAL\n1.0,1.0\n");
        let ingested = load_table_csv(&path).unwrap();
        assert_eq!(
            resolve_column(&ingested.dataset, "Requested").as_deref(),
            Some("requested")
        );
        assert_eq!(
            resolve_column(&ingested.dataset, "Actual").as_deref(),
            Some("ACTUAL")
        );
        assert!(resolve_column(&ingested.dataset, "Missing").is_none());
    }

    #[test]
    fn timestamp_formats_accepted() {
        assert!(parse_timestamp("2024-01-01 00:00:45").is_some());
        assert!(parse_timestamp("2024-01-01T00:00:45").is_some());
        assert!(parse_timestamp("2024-01-01 00:00:45.250").is_some());
        assert!(parse_timestamp("01/02/2024").is_none());
    }
}
