//! Primitive geometry: curve bases, curves and points primitives, attributes, tessellation.

pub mod attribute;
pub mod basis;
pub mod curves;
pub mod points;
pub mod stencil;
pub mod tessellate;

pub use attribute::{AttributeData, Interpolation, PrimitiveVariable, TypedValue, VariableMap};
pub use basis::Basis;
pub use curves::{CurveSpan, CurvesPrimitive, POSITION};
pub use points::PointsPrimitive;
pub use stencil::{SpanLocation, Stencil};
pub use tessellate::{tessellate_curve, tessellate_curves, CurveSegment};
