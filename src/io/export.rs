//! Result exports.
//!
//! - classified record datasets to CSV (spreadsheet-friendly)
//! - figure specifications to JSON (the rendering collaborator's input)

use std::fs::File;
use std::path::Path;

use crate::error::QcError;
use crate::plot::FigureSpec;
use crate::table::{Cell, TabularDataset};

/// Write a dataset to CSV, one column per dataset column, in order.
pub fn write_dataset_csv(path: &Path, dataset: &TabularDataset) -> Result<(), QcError> {
    let file = File::create(path).map_err(|e| {
        QcError::Io(format!("failed to create CSV '{}': {e}", path.display()))
    })?;
    let mut writer = csv::Writer::from_writer(file);

    let columns: Vec<(&str, &[Cell])> = dataset.iter_columns().collect();
    writer
        .write_record(columns.iter().map(|(name, _)| *name))
        .map_err(|e| QcError::Io(format!("failed to write CSV header: {e}")))?;

    for row in 0..dataset.n_rows() {
        let record: Vec<String> = columns
            .iter()
            .map(|(_, cells)| format_cell(&cells[row]))
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| QcError::Io(format!("failed to write CSV row {}: {e}", row + 1)))?;
    }

    writer
        .flush()
        .map_err(|e| QcError::Io(format!("failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// Write a figure specification as pretty JSON.
pub fn write_figure_json(path: &Path, figure: &FigureSpec) -> Result<(), QcError> {
    let file = File::create(path).map_err(|e| {
        QcError::Io(format!("failed to create figure JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, figure)
        .map_err(|e| QcError::Io(format!("failed to write figure JSON: {e}")))?;
    Ok(())
}

fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Float(v) => format!("{v}"),
        Cell::Int(v) => format!("{v}"),
        Cell::Text(s) => s.clone(),
        Cell::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        Cell::Null => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn dataset_round_trips_through_csv() {
        let ds = TabularDataset::from_columns([
            (
                "Requested".to_string(),
                vec![Cell::Float(10.5), Cell::Null],
            ),
            (
                "DeviationClass".to_string(),
                vec![Cell::Int(1), Cell::Int(-1)],
            ),
            (
                "StartTime".to_string(),
                vec![
                    Cell::Timestamp(
                        NaiveDate::from_ymd_opt(2024, 1, 1)
                            .unwrap()
                            .and_hms_opt(8, 30, 0)
                            .unwrap(),
                    ),
                    Cell::Text("n/a".to_string()),
                ],
            ),
        ])
        .unwrap();

        let path = std::env::temp_dir().join("dosing-qc-test-export.csv");
        write_dataset_csv(&path, &ds).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), "Requested,DeviationClass,StartTime");
        assert_eq!(lines.next().unwrap(), "10.5,1,2024-01-01 08:30:00");
        assert_eq!(lines.next().unwrap(), ",-1,n/a");
    }
}
