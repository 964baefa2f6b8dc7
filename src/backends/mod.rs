//! Backend implementations for different inference engines
//!
//! - ONNX Runtime backend (high performance, GPU acceleration)
//! - Tract backend (pure Rust, no external dependencies)

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(feature = "tract")]
pub mod tract;

// Test utilities for backend testing
#[cfg(test)]
pub mod test_utils;

#[cfg(feature = "onnx")]
pub use self::onnx::OnnxBackend;

#[cfg(feature = "tract")]
pub use self::tract::TractBackend;

use crate::config::BackendType;
use crate::error::{BgRemovalError, Result};
use crate::inference::InferenceBackend;

/// Create an uninitialized backend of the requested type
///
/// # Errors
/// - The backend was not compiled in (feature disabled)
pub fn create_backend(backend_type: BackendType) -> Result<Box<dyn InferenceBackend>> {
    match backend_type {
        #[cfg(feature = "onnx")]
        BackendType::Onnx => Ok(Box::new(OnnxBackend::new())),
        #[cfg(feature = "tract")]
        BackendType::Tract => Ok(Box::new(TractBackend::new())),
        #[allow(unreachable_patterns)]
        other => Err(BgRemovalError::invalid_config(format!(
            "Backend '{other}' is not available in this build"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "tract")]
    #[test]
    fn test_create_tract_backend() {
        let backend = create_backend(BackendType::Tract).unwrap();
        assert_eq!(backend.name(), "tract");
        assert!(!backend.is_initialized());
    }

    #[cfg(feature = "onnx")]
    #[test]
    fn test_create_onnx_backend() {
        let backend = create_backend(BackendType::Onnx).unwrap();
        assert_eq!(backend.name(), "onnx");
    }
}
