//! Closest-point queries on point clouds.

use std::fmt;

use prim_core::{EvaluatorId, PrimError, Result};
use prim_geometry::{Interpolation, PointsPrimitive, TypedValue, POSITION};
use prim_index::{KdTree, LazyIndex};
use prim_math::{Aabb3, Point3, Ray, Vector3};
use rayon::prelude::*;
use tracing::trace;

use crate::handle::{check_sampleable, AttributeHandle};
use crate::sampler::sample_point;
use crate::{PrimitiveEvaluator, QueryResult};

/// Query engine over a defensive copy of a [`PointsPrimitive`].
#[derive(Debug)]
pub struct PointsEvaluator {
    id: EvaluatorId,
    points: PointsPrimitive,
    positions: Vec<Point3>,
    index: LazyIndex<KdTree>,
}

impl PointsEvaluator {
    pub fn new(points: &PointsPrimitive) -> Result<Self> {
        Self::with_position(points, POSITION)
    }

    /// Evaluate `points` using the Vertex attribute `position` as point positions.
    pub fn with_position(points: &PointsPrimitive, position: &str) -> Result<Self> {
        let variable = points.variable(position).ok_or_else(|| {
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
        if positions.len() != points.num_points() {
            return Err(PrimError::Construction(format!(
                "position attribute '{}' has {} values for {} points",
                position,
                positions.len(),
                points.num_points()
            )));
        }

        let id = EvaluatorId::fresh();
        trace!(evaluator = %id, points = positions.len(), "points evaluator");
        Ok(Self {
            id,
            positions: positions.to_vec(),
            points: points.clone(),
            index: LazyIndex::new(),
        })
    }

    pub fn id(&self) -> EvaluatorId {
        self.id
    }

    pub fn points(&self) -> &PointsPrimitive {
        &self.points
    }

    pub fn num_points(&self) -> usize {
        self.positions.len()
    }

    pub fn is_index_built(&self) -> bool {
        self.index.is_built()
    }

    pub fn bound(&self) -> Option<Aabb3> {
        Aabb3::from_points(&self.positions)
    }

    /// The nearest point to `query`. Equidistant points resolve to the lowest index.
    ///
    /// Returns `None` only for an empty cloud or a query that is not finite.
    pub fn closest_point(&self, query: Point3) -> Option<PointResult<'_>> {
        if !query.is_finite() {
            return None;
        }
        let tree = self.index.get_or_build(|| KdTree::build(&self.positions));
        let hit = tree.nearest(query)?;
        Some(PointResult {
            evaluator: self,
            point_index: hit.index,
        })
    }

    pub fn closest_points(&self, queries: &[Point3]) -> Vec<Option<PointResult<'_>>> {
        queries.par_iter().map(|&q| self.closest_point(q)).collect()
    }

    /// Result for point `index`, or `None` if out of range.
    pub fn point_at(&self, index: usize) -> Option<PointResult<'_>> {
        (index < self.positions.len()).then_some(PointResult {
            evaluator: self,
            point_index: index,
        })
    }

    pub fn attribute(&self, name: &str) -> Result<AttributeHandle> {
        let variable = self
            .points
            .variable(name)
            .ok_or_else(|| PrimError::AttributeNotFound(name.to_string()))?;
        self.points.validate_variable(name, variable)?;
        check_sampleable(name, variable)?;
        Ok(AttributeHandle::new(self.id, name, variable.interpolation))
    }

    /// Ray queries are not supported on points.
    pub fn intersect_ray(&self, _ray: &Ray) -> Result<Option<PointResult<'_>>> {
        Err(PrimError::UnsupportedOperation(
            "ray intersection against points".to_string(),
        ))
    }
}

impl PrimitiveEvaluator for PointsEvaluator {
    type Hit<'a> = PointResult<'a>;

    fn closest_point(&self, query: Point3) -> Option<PointResult<'_>> {
        PointsEvaluator::closest_point(self, query)
    }

    fn intersect_ray(&self, ray: &Ray) -> Result<Option<PointResult<'_>>> {
        PointsEvaluator::intersect_ray(self, ray)
    }

    fn attribute(&self, name: &str) -> Result<AttributeHandle> {
        PointsEvaluator::attribute(self, name)
    }

    fn bound(&self) -> Option<Aabb3> {
        PointsEvaluator::bound(self)
    }
}

/// One point of a [`PointsEvaluator`].
#[derive(Clone, Copy)]
pub struct PointResult<'a> {
    evaluator: &'a PointsEvaluator,
    point_index: usize,
}

impl PointResult<'_> {
    pub fn point_index(&self) -> usize {
        self.point_index
    }
}

impl QueryResult for PointResult<'_> {
    fn position(&self) -> Point3 {
        self.evaluator.positions[self.point_index]
    }

    /// Points have no tangent.
    fn tangent(&self) -> Result<Vector3> {
        Err(PrimError::UnsupportedOperation(
            "tangent of a point".to_string(),
        ))
    }

    fn attribute(&self, handle: &AttributeHandle) -> Result<TypedValue> {
        let variable = handle.resolve(self.evaluator.id, self.evaluator.points.variables())?;
        sample_point(handle.name(), variable, self.point_index)
    }

    /// Points form a single group.
    fn owner_index(&self) -> usize {
        0
    }
}

impl PartialEq for PointResult<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.evaluator, other.evaluator) && self.point_index == other.point_index
    }
}

impl fmt::Debug for PointResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointResult")
            .field("evaluator", &self.evaluator.id)
            .field("point_index", &self.point_index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prim_geometry::{AttributeData, PrimitiveVariable};
    use prim_math::DVec3;

    #[test]
    fn test_two_points() {
        let points = PointsPrimitive::new(vec![DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0)]);
        let eval = PointsEvaluator::new(&points).unwrap();
        let hit = eval.closest_point(DVec3::new(9.0, 0.0, 0.0)).unwrap();
        assert_eq!(hit.point_index(), 1);
        assert_eq!(hit.owner_index(), 0);
        assert_eq!(hit.position(), DVec3::new(10.0, 0.0, 0.0));
        assert!(matches!(hit.tangent(), Err(PrimError::UnsupportedOperation(_))));
    }

    #[test]
    fn test_empty_cloud() {
        let eval = PointsEvaluator::new(&PointsPrimitive::new(Vec::new())).unwrap();
        assert!(eval.closest_point(DVec3::ZERO).is_none());
        assert!(eval.bound().is_none());
        assert!(eval.point_at(0).is_none());
    }

    #[test]
    fn test_position_must_be_vec3() {
        let points = PointsPrimitive::new(vec![DVec3::ZERO]).with_variable(
            POSITION,
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Float(vec![1.0])),
        );
        assert!(matches!(PointsEvaluator::new(&points), Err(PrimError::Construction(_))));
    }
}
