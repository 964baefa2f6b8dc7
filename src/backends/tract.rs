//! Tract backend for segmentation models
//!
//! Pure Rust inference through `tract-onnx`. Slower than ONNX Runtime but has
//! no native dependencies, which makes it the portable fallback.

use crate::config::RemovalConfig;
use crate::error::{BgRemovalError, Result};
use crate::inference::InferenceBackend;
use log;
use ndarray::Array4;
use tract_onnx::prelude::*;

/// Type alias for the complex Tract model type to reduce complexity warnings
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

// Use instant crate for cross-platform time compatibility
use instant::{Duration, Instant};

/// Tract backend for running segmentation models using pure Rust inference
#[derive(Debug, Default)]
pub struct TractBackend {
    model: Option<TractModel>,
    initialized: bool,
}

impl TractBackend {
    /// List Tract execution providers: only the CPU
    #[must_use]
    pub fn list_providers() -> Vec<(String, bool, String)> {
        log::debug!("🔍 Tract Backend System Analysis:");
        log::debug!("  - Platform: {os}", os = std::env::consts::OS);
        log::debug!("  - Architecture: {arch}", arch = std::env::consts::ARCH);

        vec![(
            "CPU".to_string(),
            true,
            "Pure Rust CPU inference with no external dependencies".to_string(),
        )]
    }

    /// Create a new uninitialized Tract backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn load_model(&mut self, config: &RemovalConfig, model_bytes: &[u8]) -> Result<Duration> {
        let model_load_start = Instant::now();
        let [width, height] = config.model.preprocessing_config().target_size;

        log::info!("🚀 Initializing Tract backend for {}", config.model);
        #[allow(clippy::cast_precision_loss)] // Precision loss acceptable for logging display
        let size_mb = model_bytes.len() as f64 / (1024.0 * 1024.0);
        log::debug!("📏 Model size: {size_mb:.2} MB");

        // Pin the symbolic input dimensions so the graph can be optimized
        let model = onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .map_err(|e| BgRemovalError::model(format!("Failed to load ONNX model: {e}")))?
            .with_input_fact(
                0,
                f32::fact([1, 3, height as usize, width as usize]).into(),
            )
            .map_err(|e| BgRemovalError::model(format!("Failed to set input shape: {e}")))?
            .into_optimized()
            .map_err(|e| BgRemovalError::model(format!("Failed to optimize model: {e}")))?
            .into_runnable()
            .map_err(|e| {
                BgRemovalError::model(format!("Failed to create runnable model: {e}"))
            })?;

        self.model = Some(model);
        self.initialized = true;

        let model_load_time = model_load_start.elapsed();
        log::info!(
            "✅ Tract backend initialized in {}ms",
            model_load_time.as_millis()
        );

        Ok(model_load_time)
    }
}

impl InferenceBackend for TractBackend {
    fn initialize(
        &mut self,
        config: &RemovalConfig,
        model_bytes: &[u8],
    ) -> Result<Option<Duration>> {
        if self.initialized {
            return Ok(None);
        }

        let model_load_time = self.load_model(config, model_bytes)?;
        Ok(Some(model_load_time))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| BgRemovalError::inference("Tract model not initialized"))?;

        log::debug!("🔮 Running Tract inference on {:?}", input.shape());
        let inference_start = Instant::now();

        let outputs = model
            .run(tvec![Tensor::from(input.clone()).into()])
            .map_err(|e| BgRemovalError::inference(format!("Tract inference failed: {e}")))?;

        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| BgRemovalError::inference("No output tensor found"))?
            .into_arc_tensor();

        let output_data = output_tensor.to_array_view::<f32>().map_err(|e| {
            BgRemovalError::inference(format!("Failed to convert output tensor: {e}"))
        })?;

        let output_shape = output_data.shape().to_vec();
        if output_shape.len() != 4 {
            return Err(BgRemovalError::inference(format!(
                "Expected 4D output tensor, got {}D",
                output_shape.len()
            )));
        }

        let output_array = Array4::from_shape_vec(
            (
                output_shape[0],
                output_shape[1],
                output_shape[2],
                output_shape[3],
            ),
            output_data.to_owned().into_raw_vec_and_offset().0,
        )
        .map_err(|e| {
            BgRemovalError::inference(format!("Failed to reshape output tensor: {e}"))
        })?;

        log::debug!(
            "✅ Tract inference completed in {}ms",
            inference_start.elapsed().as_millis()
        );

        Ok(output_array)
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn name(&self) -> &'static str {
        "tract"
    }
}
