//! Tessellation of sub-curves into parameter-tagged line segments.

use prim_math::{Aabb3, Bounded, LineSegment, Point3};

use crate::basis::Basis;
use crate::curves::CurvesPrimitive;
use crate::stencil::Stencil;

/// A piece of a tessellated sub-curve.
///
/// The segment approximates the sub-curve over `[v_min, v_max)`; a point at
/// segment parameter `t` maps back to `v = lerp(v_min, v_max, t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSegment {
    pub line: LineSegment,
    pub curve_index: usize,
    pub v_min: f64,
    pub v_max: f64,
}

impl CurveSegment {
    pub fn v_at(&self, t: f64) -> f64 {
        self.v_min + (self.v_max - self.v_min) * t
    }
}

impl Bounded for CurveSegment {
    fn aabb(&self) -> Aabb3 {
        self.line.aabb()
    }
}

/// Convert one sub-curve into an ordered run of segments covering `v ∈ [0, 1)`.
///
/// Linear curves produce one segment per vertex interval. Cubic curves split
/// each span into `segments_per_span` equal parameter intervals and connect
/// the curve positions at the interval boundaries.
///
/// # Arguments
/// * `curve_index` - Index of the sub-curve, stored on each segment
/// * `vertices` - The sub-curve's control vertices
/// * `basis` - Basis shared by the primitive
/// * `periodic` - Whether the sub-curve wraps back to its first vertex
/// * `segments_per_span` - Subdivisions per cubic span (ignored for linear curves)
pub fn tessellate_curve(
    curve_index: usize,
    vertices: &[Point3],
    basis: Basis,
    periodic: bool,
    segments_per_span: usize,
) -> Vec<CurveSegment> {
    let num_vertices = vertices.len();
    let num_spans = basis.num_segments(periodic, num_vertices);
    if num_spans == 0 {
        return Vec::new();
    }

    let stencil = Stencil::new(basis, periodic);
    let per_span = if basis.is_linear() {
        1
    } else {
        segments_per_span.max(1)
    };
    let total = (num_spans * per_span) as f64;

    let mut segments = Vec::with_capacity(num_spans * per_span);
    for span in 0..num_spans {
        let indices = stencil.vertex_indices(num_vertices, span);
        let mut cvs = [Point3::ZERO; 4];
        for (cv, &i) in cvs.iter_mut().zip(indices.iter()).take(stencil.width()) {
            *cv = vertices[i];
        }

        let mut prev = basis.evaluate(&cvs, 0.0);
        for j in 0..per_span {
            let t1 = (j + 1) as f64 / per_span as f64;
            let next = basis.evaluate(&cvs, t1);
            let k = span * per_span + j;
            segments.push(CurveSegment {
                line: LineSegment::new(prev, next),
                curve_index,
                v_min: k as f64 / total,
                v_max: (k + 1) as f64 / total,
            });
            prev = next;
        }
    }

    segments
}

/// Tessellate every sub-curve of `curves`, reading control vertices from `positions`.
///
/// `positions` must hold one entry per vertex of `curves`.
pub fn tessellate_curves(
    curves: &CurvesPrimitive,
    positions: &[Point3],
    segments_per_span: usize,
) -> Vec<CurveSegment> {
    curves
        .spans()
        .into_iter()
        .enumerate()
        .flat_map(|(curve_index, span)| {
            tessellate_curve(
                curve_index,
                &positions[span.vertices],
                curves.basis(),
                curves.periodic(),
                segments_per_span,
            )
        })
        .collect()
}
