use geostore_types::{Identifier, TypeError};

/// Errors from driver operations.
///
/// Backends map their own faults (permission denial, network failure,
/// missing identifiers) onto these kinds so callers see one error surface
/// regardless of backend.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A required value was missing.
    #[error("required argument missing: {0}")]
    NullArgument(&'static str),

    /// A required string was empty.
    #[error("argument must not be empty: {0}")]
    EmptyArgument(&'static str),

    /// An index addressed past the end of a collection.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The backend cannot perform the requested operation.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    /// No feature is stored under the identifier.
    #[error("feature not found: {0}")]
    NotFound(Identifier),

    /// Encoding or decoding a stored record failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Any other backend fault.
    #[error("backend error: {0}")]
    Backend(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] TypeError),
}

impl DriverError {
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
