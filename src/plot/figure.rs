//! Figure specification handed to the external renderer.
//!
//! This is the whole contract with the charting side: traces plus the axis,
//! title and legend hints the renderer needs to lay them out. Serialized to
//! JSON by `io::export`.

use serde::Serialize;

use crate::plot::trace::TraceDescriptor;

/// Where the legend box is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A complete renderable figure description.
#[derive(Debug, Clone, Serialize)]
pub struct FigureSpec {
    pub title: String,
    pub xaxis_title: String,
    pub yaxis_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zaxis_title: Option<String>,
    pub legend: LegendCorner,
    /// Render the x axis on a log scale (calibration plots).
    pub log_x: bool,
    pub traces: Vec<TraceDescriptor>,
}

impl FigureSpec {
    pub fn new(
        title: impl Into<String>,
        xaxis_title: impl Into<String>,
        yaxis_title: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            xaxis_title: xaxis_title.into(),
            yaxis_title: yaxis_title.into(),
            zaxis_title: None,
            legend: LegendCorner::TopRight,
            log_x: false,
            traces: Vec::new(),
        }
    }

    pub fn with_zaxis(mut self, title: impl Into<String>) -> Self {
        self.zaxis_title = Some(title.into());
        self
    }

    pub fn with_legend(mut self, corner: LegendCorner) -> Self {
        self.legend = corner;
        self
    }

    pub fn with_log_x(mut self) -> Self {
        self.log_x = true;
        self
    }

    pub fn push(&mut self, trace: TraceDescriptor) {
        self.traces.push(trace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_serializes_with_style_hints() {
        let mut fig = FigureSpec::new("Calibration", "Flow", "Opening").with_log_x();
        fig.push(TraceDescriptor::new("Linear Regression", vec![1.0], vec![2.0]).unwrap());

        let json = serde_json::to_value(&fig).unwrap();
        assert_eq!(json["log_x"], true);
        assert_eq!(json["legend"], "top_right");
        assert_eq!(json["traces"][0]["label"], "Linear Regression");
        assert_eq!(json["traces"][0]["render_mode"], "lines");
        // z is omitted entirely for 2-D traces.
        assert!(json["traces"][0].get("z").is_none());
    }
}
