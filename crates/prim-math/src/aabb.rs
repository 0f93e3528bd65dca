use crate::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Point3,
    pub max: Point3,
}

/// Anything that can report an axis-aligned bound of itself.
pub trait Bounded {
    fn aabb(&self) -> Aabb3;
}

impl Aabb3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// An inverted box that any `include` call will overwrite.
    pub fn empty() -> Self {
        Self {
            min: Point3::splat(f64::INFINITY),
            max: Point3::splat(f64::NEG_INFINITY),
        }
    }

    pub fn from_point(p: Point3) -> Self {
        Self { min: p, max: p }
    }

    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let mut aabb = Self::from_point(first);
        for &p in rest {
            aabb.include_point(p);
        }
        Some(aabb)
    }

    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    /// Index of the axis with the largest extent (0 = x, 1 = y, 2 = z).
    pub fn longest_axis(&self) -> usize {
        let e = self.extents();
        if e.x >= e.y && e.x >= e.z {
            0
        } else if e.y >= e.z {
            1
        } else {
            2
        }
    }

    pub fn include_point(&mut self, p: Point3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn include(&mut self, other: &Self) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Squared distance from `p` to the box; zero when `p` is inside.
    ///
    /// This is a lower bound on the squared distance from `p` to anything the box encloses.
    pub fn distance_squared(&self, p: Point3) -> f64 {
        let dx = (self.min.x - p.x).max(0.0).max(p.x - self.max.x);
        let dy = (self.min.y - p.y).max(0.0).max(p.y - self.max.y);
        let dz = (self.min.z - p.z).max(0.0).max(p.z - self.max.z);
        dx * dx + dy * dy + dz * dz
    }
}

impl Bounded for Point3 {
    fn aabb(&self) -> Aabb3 {
        Aabb3::from_point(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec3;

    #[test]
    fn test_from_points() {
        let pts = vec![dvec3(1.0, 2.0, 3.0), dvec3(-1.0, 5.0, 0.0), dvec3(3.0, -1.0, 2.0)];
        let aabb = Aabb3::from_points(&pts).unwrap();
        assert_eq!(aabb.min, dvec3(-1.0, -1.0, 0.0));
        assert_eq!(aabb.max, dvec3(3.0, 5.0, 3.0));
        assert!(Aabb3::from_points(&[]).is_none());
    }

    #[test]
    fn test_empty_include() {
        let mut aabb = Aabb3::empty();
        assert!(aabb.min.x > aabb.max.x);
        aabb.include(&Aabb3::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 1.0, 1.0)));
        assert_eq!(aabb.min, dvec3(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, dvec3(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_distance_squared() {
        let aabb = Aabb3::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 1.0, 1.0));
        assert_eq!(aabb.distance_squared(dvec3(0.5, 0.5, 0.5)), 0.0);
        assert!((aabb.distance_squared(dvec3(3.0, 0.5, 0.5)) - 4.0).abs() < 1e-12);
        assert!((aabb.distance_squared(dvec3(2.0, 2.0, 0.5)) - 2.0).abs() < 1e-12);
        let p = dvec3(-2.0, 0.25, 4.0);
        let clamped = p.clamp(aabb.min, aabb.max);
        assert!((aabb.distance_squared(p) - (p - clamped).length_squared()).abs() < 1e-12);
    }

    #[test]
    fn test_longest_axis() {
        assert_eq!(Aabb3::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 5.0, 2.0)).longest_axis(), 1);
        assert_eq!(Aabb3::new(dvec3(0.0, 0.0, 0.0), dvec3(1.0, 1.0, 9.0)).longest_axis(), 2);
        assert_eq!(Aabb3::new(dvec3(0.0, 0.0, 0.0), dvec3(3.0, 1.0, 1.0)).longest_axis(), 0);
    }
}
