//! Surface reconstruction from three trimmed sensor channels.
//!
//! The sensors measure distance down to the material at three fixed
//! cross-axis positions while the box travels underneath. Reconstruction:
//!
//! 1. subtract each channel's installation baseline (`y_*` offsets) so all
//!    three share a common zero reference
//! 2. lay the samples out along the travel axis on an even grid over
//!    `[0, travel_length]`
//! 3. extend the profile to the physical walls by two-point linear
//!    extrapolation from the (mid, side) pair per sample
//! 4. emit seven equal-length 3-D traces ordered across the box, ready for
//!    strip-wise mesh triangulation by the renderer
//!
//! The mesh builder walks adjacent traces and connects sample `i` of one to
//! samples `i` and `i+1` of the next, so every trace MUST have the same
//! length and share the axis grid; [`SurfaceBundle`] checks that on
//! construction and fails fast instead of producing a corrupted mesh.

use crate::domain::{BoxGeometry, ScanBatch, SensorOffsets};
use crate::error::QcError;
use crate::math::lin_space;
use crate::plot::{LineDash, TraceDescriptor};
use crate::scan::trim::validate_batch;

/// The seven traces of one reconstruction, left wall to right wall.
#[derive(Debug, Clone)]
pub struct SurfaceBundle {
    traces: Vec<TraceDescriptor>,
    /// Shared sample count of every trace.
    n: usize,
}

impl SurfaceBundle {
    /// Wrap reconstruction output, enforcing the mesh invariant.
    pub fn new(traces: Vec<TraceDescriptor>) -> Result<Self, QcError> {
        let Some(first) = traces.first() else {
            return Err(QcError::EmptyData("surface bundle has no traces".to_string()));
        };
        let n = first.len();
        for trace in &traces {
            if trace.len() != n {
                return Err(QcError::TraceLengthMismatch {
                    label: trace.label().to_string(),
                    expected: n,
                    got: trace.len(),
                });
            }
        }
        Ok(Self { traces, n })
    }

    pub fn traces(&self) -> &[TraceDescriptor] {
        &self.traces
    }

    pub fn into_traces(self) -> Vec<TraceDescriptor> {
        self.traces
    }

    /// Samples per trace.
    pub fn samples(&self) -> usize {
        self.n
    }

    /// Grid cells the mesh builder will triangulate (two triangles each).
    pub fn mesh_cells(&self) -> usize {
        (self.traces.len() - 1) * self.n.saturating_sub(1)
    }
}

/// Reconstruct the material surface from a trimmed scan batch.
pub fn reconstruct_surface(
    batch: &ScanBatch,
    offsets: &SensorOffsets,
    geometry: &BoxGeometry,
) -> Result<SurfaceBundle, QcError> {
    validate_batch(batch)?;
    validate_offsets(offsets)?;
    validate_geometry(geometry)?;

    let n = batch.len();
    if n < 2 {
        return Err(QcError::EmptyData(format!(
            "need at least 2 scan samples to reconstruct, got {n}"
        )));
    }

    // 1) Common zero reference.
    let left: Vec<f64> = batch.left.iter().map(|v| v - offsets.y_left).collect();
    let mid: Vec<f64> = batch.mid.iter().map(|v| v - offsets.y_mid).collect();
    let right: Vec<f64> = batch.right.iter().map(|v| v - offsets.y_right).collect();

    // 2) Along-axis coordinate.
    let axis = lin_space(0.0, geometry.travel_length, n)?;

    // 3) Wall extrapolation per sample.
    let edge_left: Vec<f64> = mid
        .iter()
        .zip(left.iter())
        .map(|(&m, &s)| wall_value(m, s, offsets.x_mid, offsets.x_left, 0.0))
        .collect();
    let edge_right: Vec<f64> = mid
        .iter()
        .zip(right.iter())
        .map(|(&m, &s)| wall_value(m, s, offsets.x_mid, offsets.x_right, geometry.width))
        .collect();

    let zeros = vec![0.0; n];
    let const_x = |x: f64| vec![x; n];

    // 4) Traces ordered across the box, so adjacent pairs form mesh strips.
    let traces = vec![
        TraceDescriptor::new_3d("Left Wall Zero", const_x(0.0), axis.clone(), zeros.clone())?
            .with_color("gray")
            .with_dash(LineDash::Dash),
        TraceDescriptor::new_3d("Left Wall Edge", const_x(0.0), axis.clone(), edge_left)?
            .with_color("purple"),
        TraceDescriptor::new_3d("Left Sensor", const_x(offsets.x_left), axis.clone(), left)?
            .with_color("blue"),
        TraceDescriptor::new_3d("Mid Sensor", const_x(offsets.x_mid), axis.clone(), mid)?
            .with_color("green"),
        TraceDescriptor::new_3d("Right Sensor", const_x(offsets.x_right), axis.clone(), right)?
            .with_color("red"),
        TraceDescriptor::new_3d(
            "Right Wall Edge",
            const_x(geometry.width),
            axis.clone(),
            edge_right,
        )?
        .with_color("purple"),
        TraceDescriptor::new_3d("Right Wall Zero", const_x(geometry.width), axis, zeros)?
            .with_color("gray")
            .with_dash(LineDash::Dash),
    ];

    SurfaceBundle::new(traces)
}

/// Two-point slope-intercept extrapolation from (mid, side) to a wall.
fn wall_value(mid: f64, side: f64, x_mid: f64, x_side: f64, x_wall: f64) -> f64 {
    let slope = (mid - side) / (x_mid - x_side);
    slope * (x_wall - x_side) + side
}

fn validate_offsets(offsets: &SensorOffsets) -> Result<(), QcError> {
    let values = [
        offsets.x_left,
        offsets.x_mid,
        offsets.x_right,
        offsets.y_left,
        offsets.y_mid,
        offsets.y_right,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(QcError::precondition("offsets", "all offsets must be finite"));
    }
    if offsets.x_mid == offsets.x_left {
        return Err(QcError::precondition(
            "x_left",
            "must differ from x_mid (wall extrapolation divides by the spacing)",
        ));
    }
    if offsets.x_mid == offsets.x_right {
        return Err(QcError::precondition(
            "x_right",
            "must differ from x_mid (wall extrapolation divides by the spacing)",
        ));
    }
    Ok(())
}

fn validate_geometry(geometry: &BoxGeometry) -> Result<(), QcError> {
    if !(geometry.width.is_finite() && geometry.width > 0.0) {
        return Err(QcError::precondition("width", "must be finite and > 0"));
    }
    if !(geometry.travel_length.is_finite() && geometry.travel_length > 0.0) {
        return Err(QcError::precondition(
            "travel_length",
            "must be finite and > 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets() -> SensorOffsets {
        SensorOffsets {
            x_left: 60.0,
            x_mid: 183.0,
            x_right: 300.0,
            y_left: 0.0,
            y_mid: 0.0,
            y_right: 0.0,
        }
    }

    fn flat_batch(value: f64, n: usize) -> ScanBatch {
        ScanBatch {
            left: vec![value; n],
            mid: vec![value; n],
            right: vec![value; n],
        }
    }

    #[test]
    fn flat_surface_extrapolates_to_the_same_constant() {
        // No tilt: all channels identical, so both wall edges must equal the
        // constant everywhere.
        let bundle =
            reconstruct_surface(&flat_batch(120.0, 8), &offsets(), &BoxGeometry::default())
                .unwrap();

        assert_eq!(bundle.traces().len(), 7);
        assert_eq!(bundle.samples(), 8);
        for label in ["Left Wall Edge", "Right Wall Edge"] {
            let trace = bundle
                .traces()
                .iter()
                .find(|t| t.label() == label)
                .unwrap();
            for &z in trace.z().unwrap() {
                assert!((z - 120.0).abs() < 1e-9, "{label}: {z}");
            }
        }
    }

    #[test]
    fn baselines_shift_each_channel_to_a_common_zero() {
        let batch = flat_batch(100.0, 4);
        let offsets = SensorOffsets {
            y_left: 10.0,
            y_mid: 20.0,
            y_right: 30.0,
            ..offsets()
        };
        let bundle =
            reconstruct_surface(&batch, &offsets, &BoxGeometry::default()).unwrap();

        let z_of = |label: &str| {
            bundle
                .traces()
                .iter()
                .find(|t| t.label() == label)
                .unwrap()
                .z()
                .unwrap()[0]
        };
        assert!((z_of("Left Sensor") - 90.0).abs() < 1e-12);
        assert!((z_of("Mid Sensor") - 80.0).abs() < 1e-12);
        assert!((z_of("Right Sensor") - 70.0).abs() < 1e-12);
    }

    #[test]
    fn wall_extrapolation_follows_the_two_point_slope() {
        // mid=100 at x=183, side=80 at x=60: slope = 20/123; at the wall
        // (x=0) the line continues below the side sensor.
        let value = wall_value(100.0, 80.0, 183.0, 60.0, 0.0);
        let slope: f64 = 20.0 / 123.0;
        assert!((value - (slope * -60.0 + 80.0)).abs() < 1e-12);
    }

    #[test]
    fn axis_spans_the_travel_length() {
        let bundle =
            reconstruct_surface(&flat_batch(50.0, 5), &offsets(), &BoxGeometry::default())
                .unwrap();
        let axis = bundle.traces()[0].y();
        assert!((axis[0] - 0.0).abs() < 1e-12);
        assert!((axis[4] - 570.0).abs() < 1e-12);
    }

    #[test]
    fn zero_guides_are_dashed_and_at_the_walls() {
        let bundle =
            reconstruct_surface(&flat_batch(50.0, 4), &offsets(), &BoxGeometry::default())
                .unwrap();
        let first = &bundle.traces()[0];
        let last = &bundle.traces()[6];
        assert_eq!(first.style().dash, LineDash::Dash);
        assert_eq!(last.style().dash, LineDash::Dash);
        assert!(first.x().iter().all(|&x| x == 0.0));
        assert!(last.x().iter().all(|&x| x == 367.0));
        assert!(first.z().unwrap().iter().all(|&z| z == 0.0));
    }

    #[test]
    fn bundle_rejects_mismatched_trace_lengths() {
        let ok = TraceDescriptor::new_3d("a", vec![0.0; 3], vec![0.0; 3], vec![0.0; 3]).unwrap();
        let bad = TraceDescriptor::new_3d("b", vec![0.0; 2], vec![0.0; 2], vec![0.0; 2]).unwrap();
        let err = SurfaceBundle::new(vec![ok, bad]).unwrap_err();
        match err {
            QcError::TraceLengthMismatch { label, expected, got } => {
                assert_eq!(label, "b");
                assert_eq!((expected, got), (3, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn degenerate_sensor_spacing_is_a_precondition_error() {
        let offsets = SensorOffsets {
            x_left: 183.0,
            ..offsets()
        };
        let err = reconstruct_surface(&flat_batch(1.0, 4), &offsets, &BoxGeometry::default())
            .unwrap_err();
        assert!(matches!(err, QcError::Precondition { field: "x_left", .. }));
    }
}
