use prim_core::{EvaluatorId, PrimError, Result};
use prim_geometry::{Interpolation, PrimitiveVariable, VariableMap};

/// A validated reference to one attribute of one evaluator.
///
/// Obtained from an evaluator's `attribute` method, which checks that the
/// attribute exists, has the size its interpolation requires, and can be
/// sampled with that interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeHandle {
    owner: EvaluatorId,
    name: String,
    interpolation: Interpolation,
}

impl AttributeHandle {
    pub(crate) fn new(owner: EvaluatorId, name: &str, interpolation: Interpolation) -> Self {
        Self {
            owner,
            name: name.to_string(),
            interpolation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn owner(&self) -> EvaluatorId {
        self.owner
    }

    /// Look the handle's attribute up in `variables`, which must belong to `owner`.
    pub(crate) fn resolve<'a>(
        &self,
        owner: EvaluatorId,
        variables: &'a VariableMap,
    ) -> Result<&'a PrimitiveVariable> {
        if self.owner != owner {
            return Err(PrimError::InvalidHandle(format!(
                "handle for '{}' was issued by {}, not {}",
                self.name, self.owner, owner
            )));
        }
        variables
            .get(&self.name)
            .ok_or_else(|| PrimError::AttributeNotFound(self.name.clone()))
    }
}

/// Reject string attributes whose interpolation would require blending.
pub(crate) fn check_sampleable(name: &str, variable: &PrimitiveVariable) -> Result<()> {
    let blends = !matches!(
        variable.interpolation,
        Interpolation::Constant | Interpolation::Uniform
    );
    if blends && !variable.data.is_interpolable() {
        return Err(PrimError::AttributeTypeMismatch(format!(
            "{} attribute '{}' cannot use {:?} interpolation",
            variable.data.type_name(),
            name,
            variable.interpolation
        )));
    }
    Ok(())
}
