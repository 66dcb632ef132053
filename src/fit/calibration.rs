//! Flow/opening calibration curves on a logarithmic flow domain.
//!
//! Material flow spans orders of magnitude while the slide opening responds
//! roughly linearly in `log10(flow)`, so all fitting happens on transformed
//! data:
//!
//! 1. `x = log10(flow)` (flow must be strictly positive — precondition)
//! 2. build an evaluation grid of `bins` points over `[min(x), max(x)]`
//! 3. for each degree in the closed range, least-squares fit `opening ~ x`
//! 4. map the grid back through `10^x` so the renderer can use a log axis
//!
//! Degree 1 is the production default and keeps its historical label
//! "Linear Regression"; higher degrees are labeled by degree. An explicitly
//! requested degree with too few samples is a fit error for the whole call —
//! skipping it silently would hide a configuration mistake.

use rayon::prelude::*;

use crate::domain::{CalibrationConfig, CalibrationSample};
use crate::error::QcError;
use crate::math::{eval_polynomial, fit_polynomial, lin_space};
use crate::plot::{
    degree_color, FigureSpec, MarkerSize, RenderMode, TraceDescriptor,
};

/// Maximum supported polynomial degree (and palette size).
pub const MAX_DEGREE: usize = 10;

/// Diagnostics for one fitted degree.
#[derive(Debug, Clone)]
pub struct DegreeFit {
    pub degree: usize,
    /// Coefficients in `log10(flow)` space, low-to-high order.
    pub coeffs: Vec<f64>,
    pub rmse: f64,
}

impl DegreeFit {
    /// Predicted opening for a given flow (> 0).
    pub fn predict(&self, flow: f64) -> f64 {
        eval_polynomial(&self.coeffs, flow.log10())
    }

    pub fn display_name(&self) -> String {
        if self.degree == 1 {
            "Linear Regression".to_string()
        } else {
            format!("Polynomial Degree {}", self.degree)
        }
    }
}

/// Complete calibration output: per-degree fits plus the renderable figure.
#[derive(Debug, Clone)]
pub struct CalibrationFit {
    pub fits: Vec<DegreeFit>,
    pub figure: FigureSpec,
    pub n_samples: usize,
}

/// Fit calibration curves for every degree in `config`'s closed range.
pub fn fit_calibration(
    samples: &[CalibrationSample],
    config: &CalibrationConfig,
) -> Result<CalibrationFit, QcError> {
    validate_config(config)?;

    if samples.is_empty() {
        return Err(QcError::EmptyData(
            "no calibration samples to fit".to_string(),
        ));
    }
    for (i, s) in samples.iter().enumerate() {
        if !(s.flow.is_finite() && s.flow > 0.0) {
            return Err(QcError::precondition(
                "flow",
                format!("must be finite and > 0 before log transform (row {i}: {})", s.flow),
            ));
        }
        if !s.opening.is_finite() {
            return Err(QcError::precondition(
                "opening",
                format!("non-finite value at row {i}"),
            ));
        }
    }

    let x: Vec<f64> = samples.iter().map(|s| s.flow.log10()).collect();
    let y: Vec<f64> = samples.iter().map(|s| s.opening).collect();

    let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if x_max <= x_min {
        return Err(QcError::precondition(
            "flow",
            "needs at least two distinct flow values to span an evaluation grid",
        ));
    }
    let grid = lin_space(x_min, x_max, config.bins)?;
    let flow_grid: Vec<f64> = grid.iter().map(|&v| 10f64.powf(v)).collect();

    // Each degree is an independent least-squares problem.
    let fits: Vec<DegreeFit> = (config.degree_min..=config.degree_max)
        .into_par_iter()
        .map(|degree| {
            let coeffs = fit_polynomial(&x, &y, degree)?;
            let sse: f64 = x
                .iter()
                .zip(y.iter())
                .map(|(&xi, &yi)| {
                    let r = yi - eval_polynomial(&coeffs, xi);
                    r * r
                })
                .sum();
            let rmse = (sse / x.len() as f64).sqrt();
            Ok(DegreeFit { degree, coeffs, rmse })
        })
        .collect::<Result<_, QcError>>()?;

    let mut figure = FigureSpec::new("Flow Calibration", "Flow", "Slide Opening").with_log_x();

    let observations = TraceDescriptor::new(
        "Measurements",
        samples.iter().map(|s| s.flow).collect(),
        y.clone(),
    )?
    .with_mode(RenderMode::Markers)
    .with_color("black")
    .with_marker_size(MarkerSize::PerPoint(
        samples.iter().map(|s| s.weight_hint).collect(),
    ))?;
    figure.push(observations);

    for fit in &fits {
        let curve_y: Vec<f64> = grid.iter().map(|&v| eval_polynomial(&fit.coeffs, v)).collect();
        let color = degree_color(fit.degree)
            .ok_or_else(|| QcError::precondition("degree_range", "degree exceeds palette"))?;
        figure.push(
            TraceDescriptor::new(fit.display_name(), flow_grid.clone(), curve_y)?
                .with_color(color),
        );
    }

    Ok(CalibrationFit {
        fits,
        figure,
        n_samples: samples.len(),
    })
}

fn validate_config(config: &CalibrationConfig) -> Result<(), QcError> {
    if config.degree_min < 1 || config.degree_min > config.degree_max {
        return Err(QcError::precondition(
            "degree_range",
            format!(
                "requires 1 <= min <= max, got [{}, {}]",
                config.degree_min, config.degree_max
            ),
        ));
    }
    if config.degree_max > MAX_DEGREE {
        return Err(QcError::precondition(
            "degree_range",
            format!("max degree is {MAX_DEGREE}, got {}", config.degree_max),
        ));
    }
    if config.bins < 2 {
        return Err(QcError::precondition("bins", "must be >= 2"));
    }
    Ok(())
}
