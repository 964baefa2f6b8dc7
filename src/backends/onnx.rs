//! ONNX Runtime backend for segmentation models
//!
//! Runs the rembg ONNX graphs through ONNX Runtime with support for the CPU,
//! CUDA and CoreML execution providers.

use crate::config::{ExecutionProvider, RemovalConfig};
use crate::error::{BgRemovalError, Result};
use crate::inference::InferenceBackend;
use log;
use ndarray::Array4;
use ort::execution_providers::{
    CUDAExecutionProvider, CoreMLExecutionProvider, ExecutionProvider as OrtExecutionProvider,
};
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::{self, value::Value};

// Use instant crate for cross-platform time compatibility
use instant::{Duration, Instant};

/// ONNX Runtime backend for running segmentation models
#[derive(Debug, Default)]
pub struct OnnxBackend {
    session: Option<Session>,
    initialized: bool,
}

impl OnnxBackend {
    /// List all ONNX Runtime execution providers with availability status and descriptions
    ///
    /// Returns `(name, available, description)` tuples.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use bgremover::backends::OnnxBackend;
    ///
    /// for (name, available, description) in OnnxBackend::list_providers() {
    ///     println!("{}: {} - {}", name, if available { "✅" } else { "❌" }, description);
    /// }
    /// ```
    #[must_use]
    pub fn list_providers() -> Vec<(String, bool, String)> {
        log::debug!("🔍 System Hardware Analysis:");
        log::debug!("  - Platform: {os}", os = std::env::consts::OS);
        log::debug!("  - Architecture: {arch}", arch = std::env::consts::ARCH);
        log::debug!("  - CPU cores: {cores}", cores = available_cores(1));

        let cuda_available = cuda_available();
        if cuda_available {
            log::info!("✅ CUDA execution provider is available");
        } else {
            log::debug!("❌ CUDA execution provider is not available");
        }

        let coreml_available = coreml_available();
        if coreml_available {
            log::info!("✅ CoreML execution provider is available");
        } else {
            #[cfg(target_os = "macos")]
            log::warn!("❌ CoreML execution provider is not available on this Mac");
            #[cfg(not(target_os = "macos"))]
            log::debug!("❌ CoreML execution provider is only available on macOS");
        }

        vec![
            (
                "CPU".to_string(),
                true,
                "Always available, uses CPU for inference".to_string(),
            ),
            (
                "CUDA".to_string(),
                cuda_available,
                "NVIDIA GPU acceleration (requires CUDA toolkit and compatible GPU)".to_string(),
            ),
            (
                "CoreML".to_string(),
                coreml_available,
                "Apple Silicon GPU acceleration (macOS only)".to_string(),
            ),
        ]
    }

    /// Create a new uninitialized ONNX backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn configure_providers(
        builder: SessionBuilder,
        provider: ExecutionProvider,
    ) -> Result<SessionBuilder> {
        let builder = match provider {
            ExecutionProvider::Auto => {
                // CUDA > CoreML > CPU
                let mut providers = Vec::new();
                if cuda_available() {
                    log::info!("🚀 CUDA execution provider is available and will be used");
                    providers.push(CUDAExecutionProvider::default().build());
                }
                if coreml_available() {
                    log::info!("🍎 CoreML execution provider is available and will be used");
                    providers.push(CoreMLExecutionProvider::default().with_subgraphs(true).build());
                }

                if providers.is_empty() {
                    log::info!("No hardware acceleration available, using CPU");
                    builder
                } else {
                    builder.with_execution_providers(providers).map_err(|e| {
                        BgRemovalError::inference(format!(
                            "Failed to set auto execution providers: {e}"
                        ))
                    })?
                }
            },
            ExecutionProvider::Cpu => {
                log::info!("Using CPU execution provider");
                builder
            },
            ExecutionProvider::Cuda => {
                if cuda_available() {
                    log::info!("Using CUDA execution provider");
                    builder
                        .with_execution_providers([CUDAExecutionProvider::default().build()])
                        .map_err(|e| {
                            BgRemovalError::inference(format!(
                                "Failed to set CUDA execution provider: {e}"
                            ))
                        })?
                } else {
                    log::warn!(
                        "CUDA execution provider requested but not available, falling back to CPU"
                    );
                    builder
                }
            },
            ExecutionProvider::CoreMl => {
                if coreml_available() {
                    log::info!("🍎 Using CoreML execution provider (explicitly requested)");
                    builder
                        .with_execution_providers([CoreMLExecutionProvider::default()
                            .with_subgraphs(true)
                            .build()])
                        .map_err(|e| {
                            BgRemovalError::inference(format!(
                                "Failed to set CoreML execution provider: {e}"
                            ))
                        })?
                } else {
                    log::warn!(
                        "CoreML execution provider requested but not available, falling back to CPU"
                    );
                    builder
                }
            },
        };
        Ok(builder)
    }

    fn load_model(&mut self, config: &RemovalConfig, model_bytes: &[u8]) -> Result<Duration> {
        let model_load_start = Instant::now();

        let session_builder = Session::builder()
            .map_err(|e| {
                BgRemovalError::inference(format!("Failed to create session builder: {e}"))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                BgRemovalError::inference(format!("Failed to set optimization level: {e}"))
            })?;

        let session_builder = Self::configure_providers(session_builder, config.execution_provider)?;

        // 0 means auto-detect
        let intra_threads = if config.intra_threads > 0 {
            config.intra_threads
        } else {
            available_cores(8)
        };
        let inter_threads = if config.inter_threads > 0 {
            config.inter_threads
        } else {
            (available_cores(8) / 4).max(1)
        };

        let session = session_builder
            .with_intra_threads(intra_threads)
            .map_err(|e| BgRemovalError::inference(format!("Failed to set intra threads: {e}")))?
            .with_inter_threads(inter_threads)
            .map_err(|e| BgRemovalError::inference(format!("Failed to set inter threads: {e}")))?
            .commit_from_memory(model_bytes)
            .map_err(|e| {
                BgRemovalError::model(format!("Failed to create session from model data: {e}"))
            })?;

        log::debug!("✅ ONNX Runtime session created successfully");
        log::debug!("  - Requested provider: {}", config.execution_provider);
        log::debug!(
            "  - Threading: {intra_threads} intra-op threads, {inter_threads} inter-op threads"
        );
        #[allow(clippy::cast_precision_loss)] // Precision loss acceptable for logging display
        let size_mb = model_bytes.len() as f64 / (1024.0 * 1024.0);
        log::debug!("  - Model: {} ({size_mb:.2} MB)", config.model);

        self.session = Some(session);
        self.initialized = true;

        let model_load_time = model_load_start.elapsed();
        log::info!(
            "📊 Model loading complete: {:.0}ms",
            model_load_time.as_secs_f64() * 1000.0
        );

        Ok(model_load_time)
    }
}

impl InferenceBackend for OnnxBackend {
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
        if !self.initialized {
            return Err(BgRemovalError::internal("Backend not initialized"));
        }

        let session = self
            .session
            .as_mut()
            .ok_or_else(|| BgRemovalError::internal("ONNX session not initialized"))?;

        let inference_start = Instant::now();
        log::debug!("🚀 Starting inference with input shape: {:?}", input.dim());

        let input_value = Value::from_array(input.clone()).map_err(|e| {
            BgRemovalError::processing(format!("Failed to convert input tensor: {e}"))
        })?;

        // Positional inputs, the rembg graphs name their tensors differently
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| BgRemovalError::inference(format!("ONNX inference failed: {e}")))?;

        let output_tensor = {
            let keys: Vec<_> = outputs.keys().collect();
            let Some(first_key) = keys.first() else {
                return Err(BgRemovalError::processing("No output tensors found"));
            };
            outputs
                .get(first_key)
                .ok_or_else(|| BgRemovalError::processing("First output tensor not found"))?
                .try_extract_array::<f32>()
                .map_err(|e| {
                    BgRemovalError::processing(format!("Failed to extract output tensor: {e}"))
                })?
        };

        let output_shape = output_tensor.shape().to_vec();
        if output_shape.len() != 4 {
            return Err(BgRemovalError::processing(format!(
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
            output_tensor.view().to_owned().into_raw_vec_and_offset().0,
        )
        .map_err(|e| BgRemovalError::processing(format!("Failed to reshape output tensor: {e}")))?;

        log::debug!(
            "📊 Inference complete: {:.2}ms, output shape {:?}",
            inference_start.elapsed().as_secs_f64() * 1000.0,
            output_array.dim()
        );

        Ok(output_array)
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

fn cuda_available() -> bool {
    OrtExecutionProvider::is_available(&CUDAExecutionProvider::default()).unwrap_or(false)
}

fn coreml_available() -> bool {
    OrtExecutionProvider::is_available(&CoreMLExecutionProvider::default()).unwrap_or(false)
}

fn available_cores(fallback: usize) -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(fallback)
}
