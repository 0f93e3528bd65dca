use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PrimError {
    #[error("Construction error: {0}")]
    Construction(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Attribute type mismatch: {0}")]
    AttributeTypeMismatch(String),

    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Invalid attribute handle: {0}")]
    InvalidHandle(String),
}

pub type Result<T> = std::result::Result<T, PrimError>;
