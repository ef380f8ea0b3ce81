//! Error types for foreground/background separation operations

use thiserror::Error;

/// Result type alias for separation operations
pub type Result<T> = std::result::Result<T, SeparationError>;

/// Error types for foreground/background separation operations
#[derive(Error, Debug)]
pub enum SeparationError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode or encode errors at the container-format boundary
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid input buffer (zero dimensions, mismatched data length).
    /// Fatal: retrying with the same input cannot succeed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// External segmentation/detection provider not ready or failed.
    /// Absorbed by the pipeline as a trigger for the heuristic fallback.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Failure inside a pipeline stage. Absorbed once by the heuristic
    /// retry; surfaced only when the heuristic path itself fails.
    #[error("Processing error: {0}")]
    Processing(String),
}

impl SeparationError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new provider-unavailable error
    pub fn provider_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create processing error with stage context
    pub fn processing_stage(stage: &str, details: &str, input_info: Option<&str>) -> Self {
        let input_context = match input_info {
            Some(info) => format!(" (input: {})", info),
            None => String::new(),
        };

        Self::Processing(format!(
            "Processing failed at stage '{}'{}: {}",
            stage, input_context, details
        ))
    }

    /// Whether the pipeline may absorb this error and fall back to the
    /// heuristic path. `InvalidInput` is the only error class that must
    /// surface unconditionally.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidInput(_) | Self::InvalidConfig(_))
    }
}
