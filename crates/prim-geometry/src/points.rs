//! Point clouds.

use prim_core::{PrimError, Result, Validate};
use prim_math::{Aabb3, Point3};

use crate::attribute::{AttributeData, Interpolation, PrimitiveVariable, VariableMap};
use crate::curves::POSITION;

/// A flat collection of points forming a single point group.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsPrimitive {
    num_points: usize,
    variables: VariableMap,
}

impl PointsPrimitive {
    /// Build a point cloud with `positions` stored as the Vertex attribute `"P"`.
    pub fn new(positions: Vec<Point3>) -> Self {
        let num_points = positions.len();
        let mut variables = VariableMap::new();
        variables.insert(
            POSITION.to_string(),
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Vec3(positions)),
        );
        Self {
            num_points,
            variables,
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, variable: PrimitiveVariable) -> Self {
        self.set_variable(name, variable);
        self
    }

    pub fn set_variable(&mut self, name: impl Into<String>, variable: PrimitiveVariable) {
        self.variables.insert(name.into(), variable);
    }

    pub fn variable(&self, name: &str) -> Option<&PrimitiveVariable> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Expected number of values for an attribute of the given interpolation.
    pub fn variable_size(&self, interpolation: Interpolation) -> usize {
        match interpolation {
            Interpolation::Constant | Interpolation::Uniform => 1,
            Interpolation::Vertex | Interpolation::Varying | Interpolation::FaceVarying => {
                self.num_points
            }
        }
    }

    pub fn bound(&self, name: &str) -> Option<Aabb3> {
        Aabb3::from_points(self.variable(name)?.data.as_vec3()?)
    }

    pub fn validate_variable(&self, name: &str, variable: &PrimitiveVariable) -> Result<()> {
        let expected = self.variable_size(variable.interpolation);
        let actual = variable.data.len();
        if expected != actual {
            return Err(PrimError::AttributeTypeMismatch(format!(
                "attribute '{}' ({:?}) has {} values, expected {}",
                name, variable.interpolation, actual, expected
            )));
        }
        Ok(())
    }
}

impl Validate for PointsPrimitive {
    fn validate(&self) -> Result<()> {
        for (name, variable) in &self.variables {
            self.validate_variable(name, variable)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prim_math::DVec3;

    #[test]
    fn test_sizes() {
        let points = PointsPrimitive::new(vec![DVec3::ZERO, DVec3::X, DVec3::Y]);
        assert_eq!(points.num_points(), 3);
        assert_eq!(points.variable_size(Interpolation::Uniform), 1);
        assert_eq!(points.variable_size(Interpolation::Varying), 3);
        points.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_short_buffers() {
        let points = PointsPrimitive::new(vec![DVec3::ZERO, DVec3::X]).with_variable(
            "radius",
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Float(vec![0.5])),
        );
        assert!(matches!(points.validate(), Err(PrimError::AttributeTypeMismatch(_))));
    }
}
