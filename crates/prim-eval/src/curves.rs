//! Closest-point, point-at, and arc-length queries on curves primitives.

use std::fmt;

use prim_core::{EvaluatorId, EvaluatorSettings, PrimError, Result};
use prim_geometry::{
    tessellate_curves, CurveSegment, CurveSpan, CurvesPrimitive, Interpolation, Stencil,
    TypedValue, POSITION,
};
use prim_index::{Bvh, LazyIndex};
use prim_math::{Aabb3, Point3, Ray, Vector3};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::handle::{check_sampleable, AttributeHandle};
use crate::sampler::{sample_curve, sample_curve_derivative, CurveSample};
use crate::{PrimitiveEvaluator, QueryResult};

/// Query engine over a defensive copy of a [`CurvesPrimitive`].
///
/// The segment BVH is built on the first [`CurvesEvaluator::closest_point`]
/// call and reused for the evaluator's lifetime. All queries take `&self`,
/// so one evaluator can be shared across threads.
#[derive(Debug)]
pub struct CurvesEvaluator {
    id: EvaluatorId,
    curves: CurvesPrimitive,
    positions: Vec<Point3>,
    spans: Vec<CurveSpan>,
    stencil: Stencil,
    settings: EvaluatorSettings,
    index: LazyIndex<Bvh<CurveSegment>>,
}

impl CurvesEvaluator {
    /// Evaluate `curves` using its `"P"` attribute and default settings.
    pub fn new(curves: &CurvesPrimitive) -> Result<Self> {
        Self::with_settings(curves, POSITION, EvaluatorSettings::default())
    }

    /// Evaluate `curves` using the Vertex attribute `position` as control vertices.
    pub fn with_settings(
        curves: &CurvesPrimitive,
        position: &str,
        settings: EvaluatorSettings,
    ) -> Result<Self> {
        curves.validate_topology()?;

        let variable = curves.variable(position).ok_or_else(|| {
            PrimError::Construction(format!("missing position attribute '{}'", position))
        })?;
        if variable.interpolation != Interpolation::Vertex {
            return Err(PrimError::Construction(format!(
                "position attribute '{}' must be Vertex, found {:?}",
                position, variable.interpolation
            )));
        }
        let positions = variable.data.as_vec3().ok_or_else(|| {
            PrimError::Construction(format!(
                "position attribute '{}' must hold vec3 data, found {}",
                position,
                variable.data.type_name()
            ))
        })?;
        if positions.len() != curves.num_vertices() {
            return Err(PrimError::Construction(format!(
                "position attribute '{}' has {} values for {} vertices",
                position,
                positions.len(),
                curves.num_vertices()
            )));
        }

        let id = EvaluatorId::fresh();
        trace!(evaluator = %id, curves = curves.num_curves(), vertices = positions.len(), "curves evaluator");
        Ok(Self {
            id,
            positions: positions.to_vec(),
            spans: curves.spans(),
            stencil: curves.stencil(),
            settings: settings.sanitized(),
            curves: curves.clone(),
            index: LazyIndex::new(),
        })
    }

    pub fn id(&self) -> EvaluatorId {
        self.id
    }

    pub fn curves(&self) -> &CurvesPrimitive {
        &self.curves
    }

    pub fn settings(&self) -> &EvaluatorSettings {
        &self.settings
    }

    pub fn num_curves(&self) -> usize {
        self.spans.len()
    }

    pub fn is_index_built(&self) -> bool {
        self.index.is_built()
    }

    /// Bounds of the control vertices, which enclose every curve of a convex-hull basis.
    pub fn bound(&self) -> Option<Aabb3> {
        Aabb3::from_points(&self.positions)
    }

    fn segment_index(&self) -> &Bvh<CurveSegment> {
        self.index.get_or_build(|| {
            let segments =
                tessellate_curves(&self.curves, &self.positions, self.settings.segments_per_span);
            debug!(evaluator = %self.id, segments = segments.len(), "tessellated curves");
            Bvh::build(segments)
        })
    }

    /// Closest location on any sub-curve to `query`.
    ///
    /// The search runs on the tessellated curves; the recovered `v` is then
    /// evaluated exactly, so the reported position lies on the true curve.
    /// Returns `None` only when there is no geometry (or `query` is not finite).
    pub fn closest_point(&self, query: Point3) -> Option<CurveResult<'_>> {
        if !query.is_finite() {
            return None;
        }
        let hit = self.segment_index().nearest(query, |segment| {
            let t = segment.line.closest_parameter(query);
            let d2 = (segment.line.point_at(t) - query).length_squared();
            Some((d2, (segment.curve_index, segment.v_at(t))))
        })?;
        let (curve_index, v) = hit.value;
        self.result_at(curve_index, v.clamp(0.0, 1.0))
    }

    /// [`CurvesEvaluator::closest_point`] for many queries, spread over the rayon pool.
    pub fn closest_points(&self, queries: &[Point3]) -> Vec<Option<CurveResult<'_>>> {
        queries.par_iter().map(|&q| self.closest_point(q)).collect()
    }

    /// Location at parameter `v` of sub-curve `curve_index`.
    ///
    /// Returns `None` if the index is out of range or `v` is outside `[0, 1]`.
    pub fn point_at(&self, curve_index: usize, v: f64) -> Option<CurveResult<'_>> {
        if !(0.0..=1.0).contains(&v) {
            return None;
        }
        self.result_at(curve_index, v)
    }

    /// Length of sub-curve `curve_index` between `v_start` and `v_end`.
    ///
    /// Both parameters are clamped into `[0, 1]` and the order does not
    /// matter. Linear curves are measured exactly. Cubic curves are measured
    /// along a polyline with `arc_length_samples_per_span` samples per span,
    /// which underestimates the true length by O(h²) in the sample spacing.
    /// An out-of-range `curve_index` has length zero.
    pub fn arc_length(&self, curve_index: usize, v_start: f64, v_end: f64) -> f64 {
        let Some(span) = self.spans.get(curve_index) else {
            return 0.0;
        };
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        let (a, b) = {
            let (a, b) = (clamp(v_start), clamp(v_end));
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        };
        if a == b || span.num_segments == 0 {
            return 0.0;
        }

        if self.curves.basis().is_linear() {
            self.linear_arc_length(span, a, b)
        } else {
            self.sampled_arc_length(curve_index, span, a, b)
        }
    }

    /// Full length of sub-curve `curve_index`.
    pub fn curve_length(&self, curve_index: usize) -> f64 {
        self.arc_length(curve_index, 0.0, 1.0)
    }

    fn linear_arc_length(&self, span: &CurveSpan, a: f64, b: f64) -> f64 {
        let ns = span.num_segments;
        let (va, vb) = (a * ns as f64, b * ns as f64);
        let first = va.floor() as usize;
        let last = (vb.ceil() as usize).min(ns);
        let vertices = &self.positions[span.vertices.clone()];

        (first..last)
            .map(|segment| {
                let overlap = vb.min((segment + 1) as f64) - va.max(segment as f64);
                if overlap <= 0.0 {
                    return 0.0;
                }
                let [i0, i1, ..] = self.stencil.vertex_indices(vertices.len(), segment);
                (vertices[i1] - vertices[i0]).length() * overlap
            })
            .sum()
    }

    fn sampled_arc_length(&self, curve_index: usize, span: &CurveSpan, a: f64, b: f64) -> f64 {
        let per_span = self.settings.arc_length_samples_per_span as f64;
        let samples = (((b - a) * span.num_segments as f64 * per_span).ceil() as usize).max(1);

        let position = |v: f64| {
            self.result_at(curve_index, v)
                .map(|r| r.position())
                .unwrap_or(Point3::ZERO)
        };

        let mut prev = position(a);
        let mut length = 0.0;
        for i in 1..=samples {
            let next = position(a + (b - a) * i as f64 / samples as f64);
            length += (next - prev).length();
            prev = next;
        }
        length
    }

    /// Attribute handle for `name`, valid for results of this evaluator only.
    pub fn attribute(&self, name: &str) -> Result<AttributeHandle> {
        let variable = self
            .curves
            .variable(name)
            .ok_or_else(|| PrimError::AttributeNotFound(name.to_string()))?;
        self.curves.validate_variable(name, variable)?;
        check_sampleable(name, variable)?;
        Ok(AttributeHandle::new(self.id, name, variable.interpolation))
    }

    /// Ray queries are not supported on curves.
    pub fn intersect_ray(&self, _ray: &Ray) -> Result<Option<CurveResult<'_>>> {
        Err(PrimError::UnsupportedOperation(
            "ray intersection against curves".to_string(),
        ))
    }

    fn result_at(&self, curve_index: usize, v: f64) -> Option<CurveResult<'_>> {
        let span = self.spans.get(curve_index)?;
        if span.num_segments == 0 {
            return None;
        }
        let basis = self.curves.basis();
        let location = Stencil::locate(span.num_segments, v);
        let width = self.stencil.width();

        let local = self
            .stencil
            .vertex_indices(span.num_vertices(), location.segment);
        let mut vertex_indices = [0; 4];
        for (dst, &src) in vertex_indices.iter_mut().zip(local.iter()).take(width) {
            *dst = span.vertices.start + src;
        }
        let [w0, w1] = self
            .stencil
            .varying_indices(span.num_segments, location.segment);

        Some(CurveResult {
            evaluator: self,
            v,
            sample: CurveSample {
                curve_index,
                segment: location.segment,
                t: location.t,
                width,
                vertex_indices,
                coefficients: basis.coefficients(location.t),
                derivative_coefficients: basis.derivative_coefficients(location.t),
                varying_indices: [span.varying.start + w0, span.varying.start + w1],
                dt_dv: span.num_segments as f64,
            },
        })
    }
}

impl PrimitiveEvaluator for CurvesEvaluator {
    type Hit<'a> = CurveResult<'a>;

    fn closest_point(&self, query: Point3) -> Option<CurveResult<'_>> {
        CurvesEvaluator::closest_point(self, query)
    }

    fn intersect_ray(&self, ray: &Ray) -> Result<Option<CurveResult<'_>>> {
        CurvesEvaluator::intersect_ray(self, ray)
    }

    fn attribute(&self, name: &str) -> Result<AttributeHandle> {
        CurvesEvaluator::attribute(self, name)
    }

    fn bound(&self) -> Option<Aabb3> {
        CurvesEvaluator::bound(self)
    }
}

/// A location on one sub-curve of a [`CurvesEvaluator`].
#[derive(Clone, Copy)]
pub struct CurveResult<'a> {
    evaluator: &'a CurvesEvaluator,
    v: f64,
    sample: CurveSample,
}

impl<'a> CurveResult<'a> {
    pub fn curve_index(&self) -> usize {
        self.sample.curve_index
    }

    /// Normalized parameter along the sub-curve.
    pub fn v(&self) -> f64 {
        self.v
    }

    /// Span of the sub-curve containing the location.
    pub fn segment(&self) -> usize {
        self.sample.segment
    }

    /// Local parameter within [`CurveResult::segment`].
    pub fn segment_t(&self) -> f64 {
        self.sample.t
    }

    /// Derivative of a Vertex attribute with respect to `v`.
    pub fn derivative(&self, handle: &AttributeHandle) -> Result<TypedValue> {
        let variable = handle.resolve(self.evaluator.id, self.evaluator.curves.variables())?;
        sample_curve_derivative(handle.name(), variable, &self.sample)
    }

    fn weighted_position(&self, weights: &[f64; 4]) -> Point3 {
        let s = &self.sample;
        s.vertex_indices
            .iter()
            .zip(weights.iter())
            .take(s.width)
            .fold(Point3::ZERO, |acc, (&i, &w)| {
                acc + w * self.evaluator.positions[i]
            })
    }
}

impl QueryResult for CurveResult<'_> {
    fn position(&self) -> Point3 {
        self.weighted_position(&self.sample.coefficients)
    }

    /// `dP/dv`, unnormalized.
    fn tangent(&self) -> Result<Vector3> {
        Ok(self.weighted_position(&self.sample.derivative_coefficients) * self.sample.dt_dv)
    }

    fn attribute(&self, handle: &AttributeHandle) -> Result<TypedValue> {
        let variable = handle.resolve(self.evaluator.id, self.evaluator.curves.variables())?;
        sample_curve(handle.name(), variable, &self.sample)
    }

    fn owner_index(&self) -> usize {
        self.sample.curve_index
    }
}

impl PartialEq for CurveResult<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.evaluator, other.evaluator)
            && self.v == other.v
            && self.sample == other.sample
    }
}

impl fmt::Debug for CurveResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveResult")
            .field("evaluator", &self.evaluator.id)
            .field("curve_index", &self.sample.curve_index)
            .field("v", &self.v)
            .field("segment", &self.sample.segment)
            .field("t", &self.sample.t)
            .finish()
    }
}
