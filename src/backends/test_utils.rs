//! Mock inference backend for exercising the segmentation session
//!
//! Produces a deterministic circular mask at the input tensor's resolution so
//! sessions can be tested without model files or native runtimes.

use crate::{
    config::RemovalConfig,
    error::{BgRemovalError, Result},
    inference::InferenceBackend,
};
use instant::Duration;
use ndarray::Array4;
use std::sync::{Arc, Mutex};

/// Mock backend recording the calls made on it
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    initialized: bool,
    call_history: Arc<Mutex<Vec<String>>>,
    should_fail_init: bool,
    should_fail_inference: bool,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose `initialize` fails
    #[must_use]
    pub fn new_failing_init() -> Self {
        Self {
            should_fail_init: true,
            ..Self::default()
        }
    }

    /// Backend whose `infer` fails
    #[must_use]
    pub fn new_failing_inference() -> Self {
        Self {
            should_fail_inference: true,
            ..Self::default()
        }
    }

    /// Shared handle to the call history, usable after the backend is boxed
    #[must_use]
    pub fn call_history(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.call_history)
    }

    fn record_call(&self, method: &str) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(method.to_string());
        }
    }

    /// Circular mask with soft edges in 0..1
    fn generate_mock_output(input: &Array4<f32>) -> Array4<f32> {
        let (batch, _, height, width) = input.dim();
        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;
        let radius = (width.min(height) as f32 / 3.0).max(1.0);

        Array4::from_shape_fn((batch, 1, height, width), |(_, _, y, x)| {
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let distance = (dx * dx + dy * dy).sqrt();
            ((radius - distance) / radius).clamp(0.0, 1.0)
        })
    }
}

impl InferenceBackend for MockBackend {
    fn initialize(
        &mut self,
        _config: &RemovalConfig,
        model_bytes: &[u8],
    ) -> Result<Option<Duration>> {
        self.record_call("initialize");

        if self.should_fail_init {
            return Err(BgRemovalError::model("Mock initialization failure"));
        }
        if model_bytes.is_empty() {
            return Err(BgRemovalError::model("Empty model data"));
        }
        if self.initialized {
            return Ok(None);
        }

        self.initialized = true;
        Ok(Some(Duration::from_millis(1)))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        self.record_call("infer");

        if !self.initialized {
            return Err(BgRemovalError::internal("Backend not initialized"));
        }
        if self.should_fail_inference {
            return Err(BgRemovalError::inference("Mock inference failure"));
        }
        if input.dim().1 != 3 {
            return Err(BgRemovalError::inference(format!(
                "Expected 3 input channels, got {}",
                input.dim().1
            )));
        }

        Ok(Self::generate_mock_output(input))
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_lifecycle() {
        let mut backend = MockBackend::new();
        let history = backend.call_history();
        let config = RemovalConfig::default();

        assert!(backend.infer(&Array4::zeros((1, 3, 8, 8))).is_err());
        assert!(backend.initialize(&config, b"model").unwrap().is_some());
        assert!(backend.initialize(&config, b"model").unwrap().is_none());

        let output = backend.infer(&Array4::zeros((1, 3, 12, 10))).unwrap();
        assert_eq!(output.dim(), (1, 1, 12, 10));
        assert!(output.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(output[[0, 0, 6, 5]] > 0.9);
        assert_eq!(output[[0, 0, 0, 0]], 0.0);

        assert_eq!(
            *history.lock().unwrap(),
            vec!["infer", "initialize", "initialize", "infer"]
        );
    }

    #[test]
    fn test_mock_failure_modes() {
        let config = RemovalConfig::default();
        assert!(MockBackend::new_failing_init().initialize(&config, b"m").is_err());

        let mut failing = MockBackend::new_failing_inference();
        failing.initialize(&config, b"m").unwrap();
        assert!(failing.infer(&Array4::zeros((1, 3, 4, 4))).is_err());
    }
}
