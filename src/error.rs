//! Error types for the image harvest pipeline

use thiserror::Error;

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Error types for acquisition and post-processing operations
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or processing errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Transport-level failure raised by a discovery or download collaborator.
    ///
    /// Consumes an acquisition attempt and is retried; never fatal to a keyword.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A filename carried no digit run while rank-based sorting was requested.
    ///
    /// Hard error for the affected keyword.
    #[error("No rank token in filename '{file_name}'")]
    MissingRank {
        /// Name of the offending file
        file_name: String,
    },

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HarvestError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a missing-rank error for a filename
    pub fn missing_rank<S: Into<String>>(file_name: S) -> Self {
        Self::MissingRank {
            file_name: file_name.into(),
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Whether this error is a retryable collaborator transport failure
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
