//! Terminal report formatting.

use crate::domain::DeviationClass;
use crate::fit::CalibrationFit;
use crate::scan::SurfaceBundle;
use crate::table::{Cell, TabularDataset};

/// Per-class record counts for one classified batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub normal: usize,
    pub over: usize,
    pub under: usize,
    pub fill: usize,
    pub unclassifiable: usize,
}

impl ClassCounts {
    pub fn tally(classes: &[DeviationClass]) -> Self {
        let mut counts = Self::default();
        for class in classes {
            match class {
                DeviationClass::Normal => counts.normal += 1,
                DeviationClass::Over => counts.over += 1,
                DeviationClass::Under => counts.under += 1,
                DeviationClass::Fill => counts.fill += 1,
                DeviationClass::Unclassifiable => counts.unclassifiable += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.normal + self.over + self.under + self.fill + self.unclassifiable
    }
}

/// Format the classification run summary.
pub fn format_classify_summary(counts: &ClassCounts) -> String {
    let mut out = String::new();
    out.push_str("=== doseqc - Dosing Classification ===\n");
    out.push_str(&format!("Records: {}\n", counts.total()));
    out.push_str(&format!(
        "  {:<16} {}\n",
        DeviationClass::Normal.display_name(),
        counts.normal
    ));
    out.push_str(&format!(
        "  {:<16} {}\n",
        DeviationClass::Over.display_name(),
        counts.over
    ));
    out.push_str(&format!(
        "  {:<16} {}\n",
        DeviationClass::Under.display_name(),
        counts.under
    ));
    out.push_str(&format!(
        "  {:<16} {}\n",
        DeviationClass::Fill.display_name(),
        counts.fill
    ));
    if counts.unclassifiable > 0 {
        out.push_str(&format!(
            "  {:<16} {}\n",
            DeviationClass::Unclassifiable.display_name(),
            counts.unclassifiable
        ));
    }
    out
}

/// Format up to `limit` rows of a dataset as a fixed-width table.
pub fn format_record_table(dataset: &TabularDataset, limit: usize) -> String {
    let columns: Vec<(&str, &[Cell])> = dataset.iter_columns().collect();
    if columns.is_empty() {
        return "(no columns)\n".to_string();
    }

    let mut out = String::new();
    for (name, _) in &columns {
        out.push_str(&format!("{:>14} ", truncate(name, 14)));
    }
    out.push('\n');
    for _ in &columns {
        out.push_str(&format!("{:->14} ", ""));
    }
    out.push('\n');

    let n = dataset.n_rows().min(limit);
    for row in 0..n {
        for (_, cells) in &columns {
            out.push_str(&format!("{:>14} ", truncate(&format_cell(&cells[row]), 14)));
        }
        out.push('\n');
    }
    if dataset.n_rows() > limit {
        out.push_str(&format!("... ({} more rows)\n", dataset.n_rows() - limit));
    }
    out
}

/// Format the calibration fit diagnostics.
pub fn format_fit_summary(fit: &CalibrationFit) -> String {
    let mut out = String::new();
    out.push_str("=== doseqc - Flow Calibration ===\n");
    out.push_str(&format!("Samples: {}\n", fit.n_samples));
    out.push_str("\nFitted curves:\n");
    for degree_fit in &fit.fits {
        out.push_str(&format!(
            "  {:<22} RMSE={:.4}  coeffs={}\n",
            degree_fit.display_name(),
            degree_fit.rmse,
            fmt_vec(&degree_fit.coeffs)
        ));
    }
    out
}

/// Format the reconstruction summary.
pub fn format_scan_summary(bundle: &SurfaceBundle, raw_samples: usize) -> String {
    let mut out = String::new();
    out.push_str("=== doseqc - Surface Reconstruction ===\n");
    out.push_str(&format!("Scan samples: {raw_samples} raw, {} trimmed\n", bundle.samples()));
    out.push_str(&format!(
        "Traces: {} ({} mesh cells)\n",
        bundle.traces().len(),
        bundle.mesh_cells()
    ));
    for trace in bundle.traces() {
        let z = trace.z().unwrap_or(&[]);
        let z_min = z.iter().copied().fold(f64::INFINITY, f64::min);
        let z_max = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        out.push_str(&format!(
            "  {:<18} x={:<8.1} z=[{z_min:.1}, {z_max:.1}]\n",
            trace.label(),
            trace.x().first().copied().unwrap_or(f64::NAN),
        ));
    }
    out
}

fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Float(v) => format!("{v:.3}"),
        Cell::Int(v) => format!("{v}"),
        Cell::Text(s) => s.clone(),
        Cell::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        Cell::Null => String::new(),
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
