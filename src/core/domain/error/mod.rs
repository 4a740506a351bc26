use thiserror::Error;

/// The main error type for OpenNebula fact collection.
///
/// Every variant is terminal for an invocation: there is no retry,
/// no partial result and no degraded mode.
#[derive(Error, Debug)]
pub enum OneError {
    /// Missing connection parameters or an unusable client configuration
    ///
    /// # Fields
    /// * `0` - A description of what is missing or conflicting
    #[error("{0}")]
    Configuration(String),

    /// No VM matched the requested name, or some requested ids were not found
    ///
    /// # Fields
    /// * `0` - A message naming every unmatched name or id
    #[error("{0}")]
    NotFound(String),

    /// Transport, HTTP or XML-RPC level failure reported by the endpoint
    ///
    /// # Fields
    /// * `0` - A description of the remote failure
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// A response or detail document did not have the expected shape
    ///
    /// # Fields
    /// * `0` - A description of what could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation { source: ValidationError },
}

impl From<ValidationError> for OneError {
    fn from(error: ValidationError) -> Self {
        OneError::Validation { source: error }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a OneError
pub type OneResult<T> = Result<T, OneError>;
