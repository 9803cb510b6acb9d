//! Error types for the topographic map crates.

use thiserror::Error;

/// Result type alias using TopoError.
pub type TopoResult<T> = Result<T, TopoError>;

/// Primary error type.
///
/// The synthesis and contouring algorithms themselves never fail; these
/// variants cover grid construction, parameter validation, cancellation and
/// the encoding/IO edges of the pipeline.
#[derive(Debug, Error)]
pub enum TopoError {
    // === Input Errors ===
    #[error("Invalid height grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Pipeline Errors ===
    #[error("Contour generation cancelled")]
    Cancelled,

    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Encoding failed: {0}")]
    EncodeError(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TopoError {
    /// Shorthand for an [`TopoError::InvalidParameter`].
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        TopoError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than the
    /// environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TopoError::InvalidGrid(_) | TopoError::InvalidParameter { .. }
        )
    }
}

impl From<serde_json::Error> for TopoError {
    fn from(err: serde_json::Error) -> Self {
        TopoError::EncodeError(format!("JSON error: {}", err))
    }
}
