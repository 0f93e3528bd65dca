//! Mapping from a span of a sub-curve to the vertex and varying values it reads.

use crate::basis::Basis;

/// Index pattern of a curves primitive, fixed by its basis and periodicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stencil {
    Linear,
    LinearPeriodic,
    Cubic { step: usize },
    CubicPeriodic { step: usize },
}

/// Position of a parameter inside a sub-curve: which span, and where in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanLocation {
    pub segment: usize,
    pub t: f64,
}

impl Stencil {
    pub fn new(basis: Basis, periodic: bool) -> Self {
        match (basis.is_linear(), periodic) {
            (true, false) => Stencil::Linear,
            (true, true) => Stencil::LinearPeriodic,
            (false, false) => Stencil::Cubic { step: basis.step() },
            (false, true) => Stencil::CubicPeriodic { step: basis.step() },
        }
    }

    pub fn is_periodic(self) -> bool {
        matches!(self, Stencil::LinearPeriodic | Stencil::CubicPeriodic { .. })
    }

    /// Number of vertices read per span.
    pub fn width(self) -> usize {
        match self {
            Stencil::Linear | Stencil::LinearPeriodic => 2,
            Stencil::Cubic { .. } | Stencil::CubicPeriodic { .. } => 4,
        }
    }

    /// Curve-local vertex indices read by `segment`; only the first [`Stencil::width`] are meaningful.
    pub fn vertex_indices(self, num_vertices: usize, segment: usize) -> [usize; 4] {
        match self {
            Stencil::Linear => [segment, segment + 1, 0, 0],
            Stencil::LinearPeriodic => [segment, (segment + 1) % num_vertices, 0, 0],
            Stencil::Cubic { step } => {
                let first = segment * step;
                [first, first + 1, first + 2, first + 3]
            }
            Stencil::CubicPeriodic { step } => {
                let first = segment * step;
                [
                    first % num_vertices,
                    (first + 1) % num_vertices,
                    (first + 2) % num_vertices,
                    (first + 3) % num_vertices,
                ]
            }
        }
    }

    /// Curve-local varying indices bounding `segment`.
    pub fn varying_indices(self, num_segments: usize, segment: usize) -> [usize; 2] {
        if self.is_periodic() {
            [segment, (segment + 1) % num_segments]
        } else {
            [segment, segment + 1]
        }
    }

    /// Number of varying values a sub-curve with `num_segments` spans carries.
    pub fn varying_count(self, num_segments: usize) -> usize {
        if self.is_periodic() || num_segments == 0 {
            num_segments
        } else {
            num_segments + 1
        }
    }

    /// Split a normalized parameter `v` into a span index and a local parameter.
    ///
    /// `v == 1` lands at the end of the last span rather than past it.
    pub fn locate(num_segments: usize, v: f64) -> SpanLocation {
        let vv = v * num_segments as f64;
        let segment = (vv.floor().max(0.0) as usize).min(num_segments.saturating_sub(1));
        SpanLocation {
            segment,
            t: vv - segment as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_variant_selection() {
        assert_eq!(Stencil::new(Basis::Linear, false), Stencil::Linear);
        assert_eq!(Stencil::new(Basis::Linear, true), Stencil::LinearPeriodic);
        assert_eq!(Stencil::new(Basis::Bezier, false), Stencil::Cubic { step: 3 });
        assert_eq!(Stencil::new(Basis::BSpline, true), Stencil::CubicPeriodic { step: 1 });
    }

    #[test]
    fn test_periodic_indices_wrap() {
        let s = Stencil::new(Basis::BSpline, true);
        assert_eq!(s.vertex_indices(5, 3), [3, 4, 0, 1]);
        assert_eq!(s.varying_indices(5, 4), [4, 0]);

        let s = Stencil::new(Basis::Linear, true);
        assert_eq!(&s.vertex_indices(3, 2)[..s.width()], &[2, 0]);
    }

    #[test]
    fn test_open_indices() {
        let s = Stencil::new(Basis::Bezier, false);
        assert_eq!(s.vertex_indices(7, 1), [3, 4, 5, 6]);
        assert_eq!(s.varying_indices(2, 1), [1, 2]);
        assert_eq!(s.varying_count(2), 3);
        assert_eq!(Stencil::new(Basis::Bezier, true).varying_count(2), 2);
    }

    #[test]
    fn test_locate() {
        let loc = Stencil::locate(4, 0.5);
        assert_eq!(loc.segment, 2);
        assert_relative_eq!(loc.t, 0.0);

        let loc = Stencil::locate(4, 1.0);
        assert_eq!(loc.segment, 3);
        assert_relative_eq!(loc.t, 1.0);

        let loc = Stencil::locate(2, 0.3);
        assert_eq!(loc.segment, 0);
        assert_relative_eq!(loc.t, 0.6, epsilon = 1e-12);
    }
}
