pub mod aabb;
pub mod ray;
pub mod segment;

pub use glam::{DVec2, DVec3};
pub use aabb::{Aabb3, Bounded};
pub use ray::Ray;
pub use segment::LineSegment;

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
