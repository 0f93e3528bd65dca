pub mod error;
pub mod id;
pub mod settings;
pub mod traits;

pub use error::{PrimError, Result};
pub use id::EvaluatorId;
pub use settings::EvaluatorSettings;
pub use traits::Validate;
