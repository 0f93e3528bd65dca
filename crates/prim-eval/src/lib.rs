//! Spatial queries over curves and points primitives.
//!
//! An evaluator takes a snapshot of a primitive at construction, builds its
//! acceleration structure on first use, and then answers queries from any
//! number of threads. Query results borrow the evaluator and can sample any
//! attribute of the primitive through an [`AttributeHandle`].

pub mod curves;
pub mod handle;
pub mod points;
mod sampler;

pub use curves::{CurveResult, CurvesEvaluator};
pub use handle::AttributeHandle;
pub use points::{PointResult, PointsEvaluator};

pub use prim_core::{EvaluatorSettings, PrimError, Result};
pub use prim_geometry::{
    AttributeData, Basis, CurvesPrimitive, Interpolation, PointsPrimitive, PrimitiveVariable,
    TypedValue, POSITION,
};
pub use prim_math::{Aabb3, Point3, Ray, Vector3};

/// A location found by an evaluator query.
pub trait QueryResult {
    fn position(&self) -> Point3;

    fn tangent(&self) -> Result<Vector3>;

    /// Value of the handle's attribute at this location.
    ///
    /// Fails with [`PrimError::InvalidHandle`] if the handle was issued by a
    /// different evaluator.
    fn attribute(&self, handle: &AttributeHandle) -> Result<TypedValue>;

    /// Index of the sub-curve (or point group) this location belongs to.
    fn owner_index(&self) -> usize;
}

/// Queries common to every primitive evaluator.
pub trait PrimitiveEvaluator: Send + Sync {
    type Hit<'a>: QueryResult
    where
        Self: 'a;

    /// Closest location to `query`, or `None` if the primitive has no geometry.
    fn closest_point(&self, query: Point3) -> Option<Self::Hit<'_>>;

    fn intersect_ray(&self, ray: &Ray) -> Result<Option<Self::Hit<'_>>>;

    fn attribute(&self, name: &str) -> Result<AttributeHandle>;

    fn bound(&self) -> Option<Aabb3>;
}
