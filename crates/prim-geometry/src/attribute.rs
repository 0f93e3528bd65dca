//! Typed per-element attribute storage ("primitive variables").

use std::collections::BTreeMap;

use prim_math::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Rule deciding how stored values map onto a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    /// One value for the whole primitive.
    Constant,
    /// One value per sub-curve (curves) or per point group (points).
    Uniform,
    /// One value per control vertex, blended with the curve basis.
    Vertex,
    /// One value per span boundary, blended linearly.
    Varying,
    /// Same layout and blending as `Varying`.
    FaceVarying,
}

/// A typed buffer of attribute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeData {
    Float(Vec<f64>),
    Int(Vec<i32>),
    Vec2(Vec<DVec2>),
    Vec3(Vec<DVec3>),
    Str(Vec<String>),
}

/// A single sampled attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Float(f64),
    Int(i32),
    Vec2(DVec2),
    Vec3(DVec3),
    Str(String),
}

/// Attribute buffer together with its interpolation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveVariable {
    pub interpolation: Interpolation,
    pub data: AttributeData,
}

/// Named attributes of a primitive, ordered by name.
pub type VariableMap = BTreeMap<String, PrimitiveVariable>;

impl PrimitiveVariable {
    pub fn new(interpolation: Interpolation, data: AttributeData) -> Self {
        Self {
            interpolation,
            data,
        }
    }
}

impl AttributeData {
    pub fn len(&self) -> usize {
        match self {
            AttributeData::Float(v) => v.len(),
            AttributeData::Int(v) => v.len(),
            AttributeData::Vec2(v) => v.len(),
            AttributeData::Vec3(v) => v.len(),
            AttributeData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeData::Float(_) => "float",
            AttributeData::Int(_) => "int",
            AttributeData::Vec2(_) => "vec2",
            AttributeData::Vec3(_) => "vec3",
            AttributeData::Str(_) => "string",
        }
    }

    /// Whether values of this type can be blended.
    pub fn is_interpolable(&self) -> bool {
        !matches!(self, AttributeData::Str(_))
    }

    pub fn as_vec3(&self) -> Option<&[DVec3]> {
        match self {
            AttributeData::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn get(&self, index: usize) -> Option<TypedValue> {
        Some(match self {
            AttributeData::Float(v) => TypedValue::Float(*v.get(index)?),
            AttributeData::Int(v) => TypedValue::Int(*v.get(index)?),
            AttributeData::Vec2(v) => TypedValue::Vec2(*v.get(index)?),
            AttributeData::Vec3(v) => TypedValue::Vec3(*v.get(index)?),
            AttributeData::Str(v) => TypedValue::Str(v.get(index)?.clone()),
        })
    }

    /// Blend the values at `indices` with the matching `weights`.
    ///
    /// Ints are blended in `f64` and rounded to the nearest integer. Returns
    /// `None` for strings or when an index is out of range.
    pub fn weighted_sum(&self, indices: &[usize], weights: &[f64]) -> Option<TypedValue> {
        let pairs = indices.iter().copied().zip(weights.iter().copied());
        Some(match self {
            AttributeData::Float(v) => {
                let mut acc = 0.0;
                for (i, w) in pairs {
                    acc += w * v.get(i)?;
                }
                TypedValue::Float(acc)
            }
            AttributeData::Int(v) => {
                let mut acc = 0.0;
                for (i, w) in pairs {
                    acc += w * f64::from(*v.get(i)?);
                }
                TypedValue::Int(acc.round() as i32)
            }
            AttributeData::Vec2(v) => {
                let mut acc = DVec2::ZERO;
                for (i, w) in pairs {
                    acc += w * *v.get(i)?;
                }
                TypedValue::Vec2(acc)
            }
            AttributeData::Vec3(v) => {
                let mut acc = DVec3::ZERO;
                for (i, w) in pairs {
                    acc += w * *v.get(i)?;
                }
                TypedValue::Vec3(acc)
            }
            AttributeData::Str(_) => return None,
        })
    }
}

impl TypedValue {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            TypedValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            TypedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<DVec2> {
        match self {
            TypedValue::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<DVec3> {
        match self {
            TypedValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Str(v) => Some(v),
            _ => None,
        }
    }
}
