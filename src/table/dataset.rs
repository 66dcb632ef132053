//! In-memory tabular dataset.
//!
//! Design rules (they are what downstream code relies on):
//!
//! - all columns have the same length; a violation is a named precondition error
//! - row order is significant and is never reordered implicitly
//! - columns may be added or overwritten, never removed by core operations
//! - overwriting keeps the column's position; new columns append at the end

use chrono::NaiveDateTime;

use crate::error::QcError;

/// One cell of a dataset column.
///
/// The telemetry store is loosely typed, so a column may legitimately mix
/// numbers with nulls (e.g. a tolerance that was never configured). Core
/// operations decide per contract whether a non-numeric cell poisons the row
/// (classification: no, marks it unclassifiable) or the batch (scans: yes).
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Float(f64),
    Int(i64),
    Text(String),
    Timestamp(NaiveDateTime),
    Null,
}

impl Cell {
    /// Numeric view; `None` for non-numeric or non-finite cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) if v.is_finite() => Some(*v),
            Cell::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    cells: Vec<Cell>,
}

/// An ordered collection of named, equal-length columns.
#[derive(Debug, Clone, Default)]
pub struct TabularDataset {
    columns: Vec<Column>,
}

impl TabularDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, cells)` pairs; all columns must have equal length
    /// and names must be unique.
    pub fn from_columns(
        columns: impl IntoIterator<Item = (String, Vec<Cell>)>,
    ) -> Result<Self, QcError> {
        let mut out = Self::new();
        for (name, cells) in columns {
            out.set_column(&name, cells)?;
        }
        Ok(out)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Column names in their stable order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// `(name, cells)` pairs in their stable order.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[Cell])> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.cells.as_slice()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.cells.as_slice())
    }

    /// Column that must exist; the error names the missing column.
    pub fn require_column(&self, name: &str) -> Result<&[Cell], QcError> {
        self.column(name)
            .ok_or_else(|| QcError::precondition("column", format!("missing column `{name}`")))
    }

    /// Add a new column or overwrite an existing one in place.
    ///
    /// The replacement must match the row count of the dataset (unless the
    /// dataset is still empty, which establishes the row count).
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) -> Result<(), QcError> {
        if !self.columns.is_empty() && cells.len() != self.n_rows() {
            return Err(QcError::precondition(
                "column",
                format!(
                    "column `{name}` has {} rows, dataset has {}",
                    cells.len(),
                    self.n_rows()
                ),
            ));
        }
        if let Some(col) = self.columns.iter_mut().find(|c| c.name == name) {
            col.cells = cells;
        } else {
            self.columns.push(Column {
                name: name.to_string(),
                cells,
            });
        }
        Ok(())
    }

    /// New dataset containing only the given rows, in the given order.
    ///
    /// Out-of-range indices are a precondition error (never silently skipped,
    /// since callers use this to implement row filters).
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self, QcError> {
        let n = self.n_rows();
        if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
            return Err(QcError::precondition(
                "rows",
                format!("row index {bad} out of range (dataset has {n} rows)"),
            ));
        }
        let columns = self.columns.iter().map(|c| {
            (
                c.name.clone(),
                indices.iter().map(|&i| c.cells[i].clone()).collect(),
            )
        });
        Self::from_columns(columns)
    }

    /// Numeric view of a column: `None` per cell where not a finite number.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>, QcError> {
        Ok(self.require_column(name)?.iter().map(Cell::as_f64).collect())
    }

    /// Strictly numeric column; any non-numeric cell fails with the column named.
    ///
    /// This is the scan-side contract: a partial surface is meaningless, so a
    /// malformed batch aborts instead of dropping rows.
    pub fn numeric_column_strict(&self, name: &str) -> Result<Vec<f64>, QcError> {
        let cells = self.require_column(name)?;
        let mut out = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            match cell.as_f64() {
                Some(v) => out.push(v),
                None => {
                    return Err(QcError::precondition(
                        "column",
                        format!("column `{name}` has a non-numeric value at row {i}"),
                    ));
                }
            }
        }
        Ok(out)
    }
}
