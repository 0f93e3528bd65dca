//! Reconstruction of attribute values at a recovered parametrization.

use prim_core::{PrimError, Result};
use prim_geometry::{AttributeData, Interpolation, PrimitiveVariable, TypedValue};

/// Everything needed to sample any curve attribute at one location.
///
/// Indices are absolute into the primitive's buffers; only the first
/// `width` vertex entries are meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CurveSample {
    pub curve_index: usize,
    pub segment: usize,
    pub t: f64,
    pub width: usize,
    pub vertex_indices: [usize; 4],
    pub coefficients: [f64; 4],
    pub derivative_coefficients: [f64; 4],
    pub varying_indices: [usize; 2],
    /// Rate of change of the span parameter with respect to `v`.
    pub dt_dv: f64,
}

fn value_at(name: &str, data: &AttributeData, index: usize) -> Result<TypedValue> {
    data.get(index).ok_or_else(|| {
        PrimError::AttributeTypeMismatch(format!("attribute '{}' has no value {}", name, index))
    })
}

fn blended(
    name: &str,
    data: &AttributeData,
    indices: &[usize],
    weights: &[f64],
) -> Result<TypedValue> {
    data.weighted_sum(indices, weights).ok_or_else(|| {
        PrimError::AttributeTypeMismatch(format!(
            "{} attribute '{}' cannot be interpolated",
            data.type_name(),
            name
        ))
    })
}

pub(crate) fn sample_curve(
    name: &str,
    variable: &PrimitiveVariable,
    s: &CurveSample,
) -> Result<TypedValue> {
    let data = &variable.data;
    match variable.interpolation {
        Interpolation::Constant => value_at(name, data, 0),
        Interpolation::Uniform => value_at(name, data, s.curve_index),
        Interpolation::Vertex => blended(
            name,
            data,
            &s.vertex_indices[..s.width],
            &s.coefficients[..s.width],
        ),
        Interpolation::Varying | Interpolation::FaceVarying => {
            blended(name, data, &s.varying_indices, &[1.0 - s.t, s.t])
        }
    }
}

/// Derivative of a Vertex attribute with respect to `v`.
pub(crate) fn sample_curve_derivative(
    name: &str,
    variable: &PrimitiveVariable,
    s: &CurveSample,
) -> Result<TypedValue> {
    if variable.interpolation != Interpolation::Vertex {
        return Err(PrimError::UnsupportedOperation(format!(
            "derivative of {:?} attribute '{}'",
            variable.interpolation, name
        )));
    }
    let mut weights = [0.0; 4];
    for (w, &c) in weights.iter_mut().zip(s.derivative_coefficients.iter()) {
        *w = c * s.dt_dv;
    }
    match variable.data {
        AttributeData::Float(_) | AttributeData::Vec2(_) | AttributeData::Vec3(_) => blended(
            name,
            &variable.data,
            &s.vertex_indices[..s.width],
            &weights[..s.width],
        ),
        AttributeData::Int(_) | AttributeData::Str(_) => {
            Err(PrimError::AttributeTypeMismatch(format!(
                "{} attribute '{}' has no derivative",
                variable.data.type_name(),
                name
            )))
        }
    }
}

pub(crate) fn sample_point(
    name: &str,
    variable: &PrimitiveVariable,
    point_index: usize,
) -> Result<TypedValue> {
    let index = match variable.interpolation {
        Interpolation::Constant | Interpolation::Uniform => 0,
        Interpolation::Vertex | Interpolation::Varying | Interpolation::FaceVarying => point_index,
    };
    value_at(name, &variable.data, index)
}
