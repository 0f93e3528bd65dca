//! Curve collections: many sub-curves sharing one vertex buffer, basis, and periodicity.

use std::ops::Range;

use prim_core::{PrimError, Result, Validate};
use prim_math::{Aabb3, Point3};
use tracing::warn;

use crate::attribute::{AttributeData, Interpolation, PrimitiveVariable, VariableMap};
use crate::basis::Basis;
use crate::stencil::Stencil;

/// Name of the position attribute created by [`CurvesPrimitive::new`].
pub const POSITION: &str = "P";

/// A collection of sub-curves.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvesPrimitive {
    verts_per_curve: Vec<usize>,
    basis: Basis,
    periodic: bool,
    variables: VariableMap,
}

/// Where one sub-curve's data lives in the shared buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveSpan {
    pub vertices: Range<usize>,
    pub varying: Range<usize>,
    pub num_segments: usize,
}

impl CurveSpan {
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }
}

impl CurvesPrimitive {
    /// Build a curves primitive with `positions` stored as the Vertex attribute `"P"`.
    pub fn new(
        verts_per_curve: Vec<usize>,
        basis: Basis,
        periodic: bool,
        positions: Vec<Point3>,
    ) -> Result<Self> {
        let mut variables = VariableMap::new();
        variables.insert(
            POSITION.to_string(),
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Vec3(positions)),
        );
        let curves = Self {
            verts_per_curve,
            basis,
            periodic,
            variables,
        };
        curves.validate_topology()?;
        Ok(curves)
    }

    /// A primitive with no sub-curves and an empty `"P"`.
    pub fn empty(basis: Basis, periodic: bool) -> Self {
        let mut variables = VariableMap::new();
        variables.insert(
            POSITION.to_string(),
            PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Vec3(Vec::new())),
        );
        Self {
            verts_per_curve: Vec::new(),
            basis,
            periodic,
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

    pub fn verts_per_curve(&self) -> &[usize] {
        &self.verts_per_curve
    }

    pub fn basis(&self) -> Basis {
        self.basis
    }

    pub fn periodic(&self) -> bool {
        self.periodic
    }

    pub fn stencil(&self) -> Stencil {
        Stencil::new(self.basis, self.periodic)
    }

    pub fn num_curves(&self) -> usize {
        self.verts_per_curve.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.verts_per_curve.iter().sum()
    }

    pub fn num_segments(&self, curve_index: usize) -> Option<usize> {
        let n = *self.verts_per_curve.get(curve_index)?;
        Some(self.basis.num_segments(self.periodic, n))
    }

    /// Buffer ranges of every sub-curve, in order.
    pub fn spans(&self) -> Vec<CurveSpan> {
        let stencil = self.stencil();
        let mut vertex_offset = 0;
        let mut varying_offset = 0;
        self.verts_per_curve
            .iter()
            .map(|&n| {
                let num_segments = self.basis.num_segments(self.periodic, n);
                let varying_len = stencil.varying_count(num_segments);
                let span = CurveSpan {
                    vertices: vertex_offset..vertex_offset + n,
                    varying: varying_offset..varying_offset + varying_len,
                    num_segments,
                };
                vertex_offset += n;
                varying_offset += varying_len;
                span
            })
            .collect()
    }

    /// Expected number of values for an attribute of the given interpolation.
    pub fn variable_size(&self, interpolation: Interpolation) -> usize {
        match interpolation {
            Interpolation::Constant => 1,
            Interpolation::Uniform => self.num_curves(),
            Interpolation::Vertex => self.num_vertices(),
            Interpolation::Varying | Interpolation::FaceVarying => {
                let stencil = self.stencil();
                self.verts_per_curve
                    .iter()
                    .map(|&n| stencil.varying_count(self.basis.num_segments(self.periodic, n)))
                    .sum()
            }
        }
    }

    /// Bounds of the control vertices of the attribute `name`, if it holds positions.
    pub fn bound(&self, name: &str) -> Option<Aabb3> {
        Aabb3::from_points(self.variable(name)?.data.as_vec3()?)
    }

    /// Check vertex counts against the basis minimum.
    pub fn validate_topology(&self) -> Result<()> {
        let min = self.basis.min_vertices(self.periodic);
        for (i, &n) in self.verts_per_curve.iter().enumerate() {
            if n < min {
                return Err(PrimError::Topology(format!(
                    "curve {} has {} vertices, {:?} basis (periodic = {}) needs at least {}",
                    i, n, self.basis, self.periodic, min
                )));
            }
            let trailing = self.basis.trailing_vertices(self.periodic, n);
            if trailing > 0 {
                warn!(
                    curve = i,
                    vertices = n,
                    trailing,
                    "curve has vertices beyond its last whole span"
                );
            }
        }
        Ok(())
    }

    /// Check one attribute's length against the size its interpolation requires.
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

impl Validate for CurvesPrimitive {
    fn validate(&self) -> Result<()> {
        self.validate_topology()?;
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

    fn line_points(n: usize) -> Vec<Point3> {
        (0..n).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_new_rejects_short_curves() {
        let err = CurvesPrimitive::new(vec![3], Basis::BSpline, false, line_points(3)).unwrap_err();
        assert!(matches!(err, PrimError::Topology(_)));
        let err = CurvesPrimitive::new(vec![1], Basis::Linear, false, line_points(1)).unwrap_err();
        assert!(matches!(err, PrimError::Topology(_)));
        assert!(CurvesPrimitive::new(vec![3], Basis::BSpline, true, line_points(3)).is_ok());
    }

    #[test]
    fn test_spans_and_sizes() {
        let curves =
            CurvesPrimitive::new(vec![4, 6], Basis::BSpline, false, line_points(10)).unwrap();
        let spans = curves.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].vertices, 0..4);
        assert_eq!(spans[1].vertices, 4..10);
        assert_eq!(spans[0].num_segments, 1);
        assert_eq!(spans[1].num_segments, 3);
        assert_eq!(spans[0].varying, 0..2);
        assert_eq!(spans[1].varying, 2..6);

        assert_eq!(curves.variable_size(Interpolation::Constant), 1);
        assert_eq!(curves.variable_size(Interpolation::Uniform), 2);
        assert_eq!(curves.variable_size(Interpolation::Vertex), 10);
        assert_eq!(curves.variable_size(Interpolation::Varying), 6);
        assert_eq!(curves.variable_size(Interpolation::FaceVarying), 6);
    }

    #[test]
    fn test_periodic_varying_size() {
        let curves = CurvesPrimitive::new(vec![5], Basis::Linear, true, line_points(5)).unwrap();
        assert_eq!(curves.variable_size(Interpolation::Varying), 5);
        assert_eq!(curves.num_segments(0), Some(5));
        assert_eq!(curves.num_segments(1), None);
    }

    #[test]
    fn test_validate_checks_variable_sizes() {
        let curves = CurvesPrimitive::new(vec![3], Basis::Linear, false, line_points(3))
            .unwrap()
            .with_variable(
                "width",
                PrimitiveVariable::new(Interpolation::Vertex, AttributeData::Float(vec![1.0; 3])),
            );
        curves.validate().unwrap();

        let broken = curves.with_variable(
            "id",
            PrimitiveVariable::new(Interpolation::Uniform, AttributeData::Int(vec![1, 2])),
        );
        assert!(matches!(broken.validate(), Err(PrimError::AttributeTypeMismatch(_))));
    }

    #[test]
    fn test_bound() {
        let curves = CurvesPrimitive::new(vec![3], Basis::Linear, false, line_points(3)).unwrap();
        let b = curves.bound(POSITION).unwrap();
        assert_eq!(b.min, DVec3::ZERO);
        assert_eq!(b.max, DVec3::new(2.0, 0.0, 0.0));
        assert!(CurvesPrimitive::empty(Basis::Linear, false).bound(POSITION).is_none());
    }
}
