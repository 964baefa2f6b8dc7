//! Error types for background removal operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for background removal operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// Error types for background removal operations
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Input file or folder does not exist
    #[error("Input not found: {}", .0.display())]
    NotFound(PathBuf),

    /// File extension outside the supported set
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Input/output errors (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Backend inference errors
    #[error("Inference error: {0}")]
    Inference(String),

    /// Model loading or initialization errors
    #[error("Model error: {0}")]
    Model(String),

    /// Model download errors
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tensor or pixel processing errors
    #[error("Processing error: {0}")]
    Processing(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BgRemovalError {
    /// Create a new not-found error
    pub fn not_found<P: AsRef<Path>>(path: P) -> Self {
        Self::NotFound(path.as_ref().to_path_buf())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            error.kind(),
            format!(
                "Failed to {} '{}': {}",
                operation,
                path.as_ref().display(),
                error
            ),
        ))
    }

    /// Create network error with operation context
    pub fn network_error<S: Into<String>, E: std::fmt::Display>(context: S, error: E) -> Self {
        Self::Network(format!("{}: {}", context.into(), error))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Create model error with troubleshooting context
    pub fn model_error_with_context<P: AsRef<Path>>(
        operation: &str,
        model_path: P,
        error: &str,
        suggestions: &[&str],
    ) -> Self {
        let suggestion_text = if suggestions.is_empty() {
            String::new()
        } else {
            format!(" Suggestions: {}", suggestions.join(", "))
        };

        Self::Model(format!(
            "Failed to {} model '{}': {}.{}",
            operation,
            model_path.as_ref().display(),
            error,
            suggestion_text
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BgRemovalError::invalid_config("test config error");
        assert!(matches!(err, BgRemovalError::InvalidConfig(_)));

        let err = BgRemovalError::unsupported_format(".gif");
        assert!(matches!(err, BgRemovalError::UnsupportedFormat(_)));

        let err = BgRemovalError::inference("boom");
        assert!(matches!(err, BgRemovalError::Inference(_)));
    }

    #[test]
    fn test_error_display() {
        let err = BgRemovalError::not_found("photos/missing.jpg");
        assert_eq!(err.to_string(), "Input not found: photos/missing.jpg");

        let err = BgRemovalError::unsupported_format(".gif");
        assert_eq!(err.to_string(), "Unsupported format: .gif");
    }

    #[test]
    fn test_contextual_errors() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = BgRemovalError::file_io_error("write output", Path::new("/out/a.png"), &io_error);
        let text = err.to_string();
        assert!(text.contains("write output"));
        assert!(text.contains("/out/a.png"));

        let err = BgRemovalError::config_value_error("contrast factor", -1.0, "> 0");
        assert!(err.to_string().contains("contrast factor"));

        let err = BgRemovalError::model_error_with_context(
            "load",
            Path::new("/models/u2net.onnx"),
            "file not found",
            &["run with --only-download"],
        );
        let text = err.to_string();
        assert!(text.contains("/models/u2net.onnx"));
        assert!(text.contains("Suggestions"));
    }
}
