//! Validated trace descriptors.
//!
//! A trace is immutable once constructed: every constructor and configurator
//! re-establishes the one invariant that matters downstream —
//! `len(x) == len(y) == len(z)` (when z is present) — so a descriptor that
//! exists is always safe to hand to the renderer or the mesh builder.

use serde::Serialize;

use crate::error::QcError;

/// How the renderer should draw a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Lines,
    Markers,
    #[serde(rename = "markers+lines")]
    MarkersLines,
}

/// Line dash pattern; a missing dash means solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dash,
    Dot,
}

/// Marker sizing: one size for the whole trace, or one per sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerSize {
    Uniform(f64),
    PerPoint(Vec<f64>),
}

/// Visual style hints passed through to the renderer unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStyle {
    pub color: String,
    pub dash: LineDash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_size: Option<MarkerSize>,
}

impl Default for TraceStyle {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
            dash: LineDash::Solid,
            marker_size: None,
        }
    }
}

/// Fixed palette for calibration curves, indexed by polynomial degree.
///
/// Ten entries cover the full allowed degree range, so no cycling is needed.
pub const DEGREE_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Palette color for a degree in `1..=10`.
pub fn degree_color(degree: usize) -> Option<&'static str> {
    if (1..=DEGREE_PALETTE.len()).contains(&degree) {
        Some(DEGREE_PALETTE[degree - 1])
    } else {
        None
    }
}

/// One named, ordered coordinate sequence ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceDescriptor {
    label: String,
    x: Vec<f64>,
    y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    z: Option<Vec<f64>>,
    render_mode: RenderMode,
    style: TraceStyle,
}

impl TraceDescriptor {
    /// A 2-D trace drawn as lines with default style.
    pub fn new(label: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Result<Self, QcError> {
        let trace = Self {
            label: label.into(),
            x,
            y,
            z: None,
            render_mode: RenderMode::Lines,
            style: TraceStyle::default(),
        };
        trace.check_lengths()?;
        Ok(trace)
    }

    /// A 3-D trace (surface reconstruction output).
    pub fn new_3d(
        label: impl Into<String>,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    ) -> Result<Self, QcError> {
        let trace = Self {
            label: label.into(),
            x,
            y,
            z: Some(z),
            render_mode: RenderMode::Lines,
            style: TraceStyle::default(),
        };
        trace.check_lengths()?;
        Ok(trace)
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.style.color = color.into();
        self
    }

    pub fn with_dash(mut self, dash: LineDash) -> Self {
        self.style.dash = dash;
        self
    }

    /// Attach marker sizing; per-point sizes must match the trace length.
    pub fn with_marker_size(mut self, size: MarkerSize) -> Result<Self, QcError> {
        if let MarkerSize::PerPoint(sizes) = &size {
            if sizes.len() != self.len() {
                return Err(QcError::TraceLengthMismatch {
                    label: self.label.clone(),
                    expected: self.len(),
                    got: sizes.len(),
                });
            }
        }
        self.style.marker_size = Some(size);
        Ok(self)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> Option<&[f64]> {
        self.z.as_deref()
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn style(&self) -> &TraceStyle {
        &self.style
    }

    /// Number of samples (all coordinate sequences share it).
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn check_lengths(&self) -> Result<(), QcError> {
        let expected = self.x.len();
        if self.y.len() != expected {
            return Err(QcError::TraceLengthMismatch {
                label: self.label.clone(),
                expected,
                got: self.y.len(),
            });
        }
        if let Some(z) = &self.z {
            if z.len() != expected {
                return Err(QcError::TraceLengthMismatch {
                    label: self.label.clone(),
                    expected,
                    got: z.len(),
                });
            }
        }
        Ok(())
    }
}
