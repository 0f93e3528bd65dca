use crate::error::Result;

/// Validate structural integrity of a primitive before it is evaluated.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
