use crate::error::ValidationError;

/// Result of a structural check
pub type ValidationResult<T> = Result<T, ValidationError>;
