//! Line segments and their closest-point queries.

use crate::{Aabb3, Bounded, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Squared lengths at or below this are treated as a single point.
const DEGENERATE_LENGTH_SQUARED: f64 = 1e-24;

/// A straight segment from `start` to `end`, parameterized over `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point3,
    pub end: Point3,
}

impl LineSegment {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Vector3 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction().length_squared() <= DEGENERATE_LENGTH_SQUARED
    }

    pub fn point_at(&self, t: f64) -> Point3 {
        self.start.lerp(self.end, t)
    }

    /// Parameter in `[0, 1]` of the point on the segment closest to `p`.
    pub fn closest_parameter(&self, p: Point3) -> f64 {
        let d = self.direction();
        let len2 = d.length_squared();
        if len2 <= DEGENERATE_LENGTH_SQUARED {
            return 0.0;
        }
        ((p - self.start).dot(d) / len2).clamp(0.0, 1.0)
    }

    pub fn closest_point(&self, p: Point3) -> Point3 {
        self.point_at(self.closest_parameter(p))
    }

    pub fn distance_squared(&self, p: Point3) -> f64 {
        (p - self.closest_point(p)).length_squared()
    }

    /// Parameters `(s, t)` of the closest pair of points between `self` and `other`.
    ///
    /// `s` parameterizes `self` and `t` parameterizes `other`. For parallel
    /// segments any closest pair may be returned.
    pub fn closest_parameters(&self, other: &LineSegment) -> (f64, f64) {
        let d1 = self.direction();
        let d2 = other.direction();
        let r = self.start - other.start;
        let a = d1.length_squared();
        let e = d2.length_squared();
        let f = d2.dot(r);

        if a <= DEGENERATE_LENGTH_SQUARED && e <= DEGENERATE_LENGTH_SQUARED {
            return (0.0, 0.0);
        }
        if a <= DEGENERATE_LENGTH_SQUARED {
            return (0.0, (f / e).clamp(0.0, 1.0));
        }

        let c = d1.dot(r);
        if e <= DEGENERATE_LENGTH_SQUARED {
            return ((-c / a).clamp(0.0, 1.0), 0.0);
        }

        let b = d1.dot(d2);
        let denom = a * e - b * b;
        let mut s = if denom > 0.0 {
            ((b * f - c * e) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut t = (b * s + f) / e;

        if t < 0.0 {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else if t > 1.0 {
            t = 1.0;
            s = ((b - c) / a).clamp(0.0, 1.0);
        }

        (s, t)
    }

    /// Closest pair of points between two segments.
    pub fn closest_points(&self, other: &LineSegment) -> (Point3, Point3) {
        let (s, t) = self.closest_parameters(other);
        (self.point_at(s), other.point_at(t))
    }

    pub fn distance_squared_to_segment(&self, other: &LineSegment) -> f64 {
        let (p, q) = self.closest_points(other);
        (p - q).length_squared()
    }
}

impl Bounded for LineSegment {
    fn aabb(&self) -> Aabb3 {
        Aabb3::new(self.start.min(self.end), self.start.max(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::dvec3;

    #[test]
    fn test_closest_parameter_interior() {
        let seg = LineSegment::new(dvec3(0.0, 0.0, 0.0), dvec3(2.0, 0.0, 0.0));
        assert_relative_eq!(seg.closest_parameter(dvec3(1.5, 3.0, 0.0)), 0.75);
        assert_relative_eq!(seg.distance_squared(dvec3(1.5, 3.0, 0.0)), 9.0);
    }

    #[test]
    fn test_closest_parameter_clamps_to_endpoints() {
        let seg = LineSegment::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0));
        assert_eq!(seg.closest_parameter(dvec3(-4.0, 1.0, 0.0)), 0.0);
        assert_eq!(seg.closest_parameter(dvec3(7.0, -1.0, 0.0)), 1.0);
        assert_relative_eq!(seg.distance_squared(dvec3(2.0, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn test_degenerate_segment() {
        let p = dvec3(1.0, 1.0, 1.0);
        let seg = LineSegment::new(p, p);
        assert!(seg.is_degenerate());
        assert_eq!(seg.closest_parameter(dvec3(5.0, 5.0, 5.0)), 0.0);
        assert_relative_eq!(seg.distance_squared(dvec3(1.0, 1.0, 3.0)), 4.0);
    }

    #[test]
    fn test_crossing_segments() {
        let a = LineSegment::new(dvec3(-1.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0));
        let b = LineSegment::new(dvec3(0.0, -1.0, 2.0), dvec3(0.0, 1.0, 2.0));
        let (s, t) = a.closest_parameters(&b);
        assert_relative_eq!(s, 0.5);
        assert_relative_eq!(t, 0.5);
        assert_relative_eq!(a.distance_squared_to_segment(&b), 4.0);
    }

    #[test]
    fn test_parallel_segments() {
        let a = LineSegment::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0));
        let b = LineSegment::new(dvec3(0.5, 1.0, 0.0), dvec3(3.0, 1.0, 0.0));
        assert_relative_eq!(a.distance_squared_to_segment(&b), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_disjoint_endpoints() {
        let a = LineSegment::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0));
        let b = LineSegment::new(dvec3(2.0, 1.0, 0.0), dvec3(3.0, 5.0, 0.0));
        let (p, q) = a.closest_points(&b);
        assert!((p - dvec3(1.0, 0.0, 0.0)).length() < 1e-12);
        assert!((q - dvec3(2.0, 1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_segment_bounds() {
        let seg = LineSegment::new(dvec3(1.0, -2.0, 3.0), dvec3(-1.0, 4.0, 0.0));
        let b = seg.aabb();
        assert_eq!(b.min, dvec3(-1.0, -2.0, 0.0));
        assert_eq!(b.max, dvec3(1.0, 4.0, 3.0));
    }
}
