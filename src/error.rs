//! Engine error types.

use thiserror::Error;

use crate::executor::ExecError;

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while configuring a view or answering a request.
#[derive(Error, Debug)]
pub enum GridError {
    /// The view is misconfigured (missing root, empty projection, malformed
    /// join, orphaned parameter).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A projection entry names a key the fetched record does not carry.
    #[error("projection mismatch: field '{field}' reads '{key}', which the fetched row does not contain")]
    ProjectionMismatch { field: String, key: String },

    /// A request parameter could not be normalised to a safe value.
    #[error("invalid request parameter {name}={value:?}: {reason}")]
    InvalidRequestParameter {
        name: String,
        value: String,
        reason: String,
    },

    /// The data engine rejected or failed to run a query.
    #[error(transparent)]
    Execution(#[from] ExecError),
}

impl GridError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_param(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRequestParameter {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the request rather than the view.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequestParameter { .. })
    }
}
