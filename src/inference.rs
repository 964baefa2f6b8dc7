//! Inference backend abstraction

use crate::{config::RemovalConfig, error::Result};
use ndarray::Array4;

// Use instant crate for cross-platform time compatibility
use instant::Duration;

/// Trait for inference backends
pub trait InferenceBackend {
    /// Load the model and prepare the backend for inference
    ///
    /// Returns the model load time on first initialization and `None` when
    /// the backend was already initialized.
    ///
    /// # Errors
    /// - Model bytes are not a valid ONNX graph
    /// - Execution provider or thread configuration is rejected
    fn initialize(&mut self, config: &RemovalConfig, model_bytes: &[u8])
        -> Result<Option<Duration>>;

    /// Run inference on an NCHW input tensor
    ///
    /// # Errors
    /// - Backend not initialized
    /// - Model inference failures
    /// - Output is not a 4-D tensor
    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>>;

    /// Check if backend is initialized
    fn is_initialized(&self) -> bool;

    /// Short backend name for diagnostics
    fn name(&self) -> &'static str;
}
