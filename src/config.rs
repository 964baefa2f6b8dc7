//! Configuration types for background removal operations

use crate::error::{BgRemovalError, Result};
use crate::models::ModelKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default contrast multiplier applied before segmentation
pub const DEFAULT_CONTRAST_FACTOR: f32 = 1.1;
/// Default unsharp mask Gaussian radius
pub const DEFAULT_SHARPEN_RADIUS: f32 = 1.0;
/// Default unsharp mask strength in percent
pub const DEFAULT_SHARPEN_PERCENT: u32 = 150;
/// Default unsharp mask threshold in 8-bit levels
pub const DEFAULT_SHARPEN_THRESHOLD: u8 = 3;
/// Default alpha smoothing kernel size (square, odd)
pub const DEFAULT_ALPHA_BLUR_KERNEL: u32 = 3;
/// Default alpha smoothing Gaussian sigma
pub const DEFAULT_ALPHA_BLUR_SIGMA: f32 = 0.5;

/// Execution provider options for ONNX Runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionProvider {
    /// Auto-detect best available provider (CUDA > `CoreML` > CPU)
    #[default]
    Auto,
    /// CPU execution (always available)
    Cpu,
    /// NVIDIA CUDA GPU acceleration
    Cuda,
    /// Apple Silicon acceleration
    CoreMl,
}

impl std::fmt::Display for ExecutionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda => write!(f, "cuda"),
            Self::CoreMl => write!(f, "coreml"),
        }
    }
}

/// Inference engine used to run the segmentation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendType {
    /// ONNX Runtime backend (supports GPU acceleration)
    #[default]
    Onnx,
    /// Tract backend (pure Rust, no external dependencies)
    Tract,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Onnx => write!(f, "onnx"),
            Self::Tract => write!(f, "tract"),
        }
    }
}

/// Fixed parameters of the cosmetic enhancement filters
///
/// Missing fields fall back to the defaults when deserialized, so a JSON file
/// only needs to name the parameters it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementConfig {
    /// Contrast multiplier around the image mean (1.0 = unchanged)
    pub contrast_factor: f32,
    /// Gaussian radius of the unsharp mask
    pub sharpen_radius: f32,
    /// Unsharp mask strength in percent
    pub sharpen_percent: u32,
    /// Minimum per-channel difference the unsharp mask acts on
    pub sharpen_threshold: u8,
    /// Side length of the alpha smoothing kernel (odd)
    pub alpha_blur_kernel: u32,
    /// Sigma of the alpha smoothing Gaussian
    pub alpha_blur_sigma: f32,
    /// Encode the final PNG with maximum compression
    pub optimize_output: bool,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            contrast_factor: DEFAULT_CONTRAST_FACTOR,
            sharpen_radius: DEFAULT_SHARPEN_RADIUS,
            sharpen_percent: DEFAULT_SHARPEN_PERCENT,
            sharpen_threshold: DEFAULT_SHARPEN_THRESHOLD,
            alpha_blur_kernel: DEFAULT_ALPHA_BLUR_KERNEL,
            alpha_blur_sigma: DEFAULT_ALPHA_BLUR_SIGMA,
            optimize_output: true,
        }
    }
}

impl EnhancementConfig {
    /// Load enhancement parameters from a JSON file
    ///
    /// # Errors
    /// - File cannot be read
    /// - File is not valid JSON for this structure
    /// - Parameters fail validation
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BgRemovalError::file_io_error("read enhancement config", path, &e))?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            BgRemovalError::invalid_config(format!(
                "Failed to parse enhancement config '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate filter parameters
    ///
    /// # Errors
    /// - Negative or non-finite contrast factor, radius or sigma
    /// - Even or zero alpha kernel size
    pub fn validate(&self) -> Result<()> {
        if !self.contrast_factor.is_finite() || self.contrast_factor < 0.0 {
            return Err(BgRemovalError::config_value_error(
                "contrast factor",
                self.contrast_factor,
                ">= 0",
            ));
        }

        if !self.sharpen_radius.is_finite() || self.sharpen_radius < 0.0 {
            return Err(BgRemovalError::config_value_error(
                "sharpen radius",
                self.sharpen_radius,
                ">= 0",
            ));
        }

        if self.alpha_blur_kernel == 0 || self.alpha_blur_kernel % 2 == 0 {
            return Err(BgRemovalError::config_value_error(
                "alpha blur kernel",
                self.alpha_blur_kernel,
                "odd sizes >= 1",
            ));
        }

        if !self.alpha_blur_sigma.is_finite() || self.alpha_blur_sigma <= 0.0 {
            return Err(BgRemovalError::config_value_error(
                "alpha blur sigma",
                self.alpha_blur_sigma,
                "> 0",
            ));
        }

        Ok(())
    }
}

/// Configuration for background removal operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalConfig {
    /// Segmentation model to load
    pub model: ModelKind,

    /// Inference engine
    pub backend_type: BackendType,

    /// Execution provider for ONNX Runtime
    pub execution_provider: ExecutionProvider,

    /// Run the input and output enhancement stages
    pub enhance: bool,

    /// Parameters of the enhancement stages
    pub enhancement: EnhancementConfig,

    /// Number of intra-op threads for inference (0 = auto)
    pub intra_threads: usize,

    /// Number of inter-op threads for inference (0 = auto)
    pub inter_threads: usize,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            backend_type: BackendType::default(),
            execution_provider: ExecutionProvider::default(),
            enhance: true,
            enhancement: EnhancementConfig::default(),
            intra_threads: 0,
            inter_threads: 0,
        }
    }
}

impl RemovalConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use bgremover::{ModelKind, RemovalConfig};
    ///
    /// let config = RemovalConfig::builder()
    ///     .model(ModelKind::U2NetHumanSeg)
    ///     .enhance(false)
    ///     .build()
    ///     .unwrap();
    /// assert!(!config.enhance);
    /// ```
    #[must_use]
    pub fn builder() -> RemovalConfigBuilder {
        RemovalConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Tract backend combined with a GPU execution provider
    /// - Invalid enhancement parameters
    pub fn validate(&self) -> Result<()> {
        if self.backend_type == BackendType::Tract
            && !matches!(
                self.execution_provider,
                ExecutionProvider::Cpu | ExecutionProvider::Auto
            )
        {
            return Err(BgRemovalError::invalid_config(format!(
                "Tract backend only supports CPU execution, got '{}'",
                self.execution_provider
            )));
        }

        self.enhancement.validate()
    }
}

/// Builder for `RemovalConfig`
#[derive(Debug, Default)]
pub struct RemovalConfigBuilder {
    config: RemovalConfig,
}

impl RemovalConfigBuilder {
    /// Set the segmentation model
    #[must_use]
    pub fn model(mut self, model: ModelKind) -> Self {
        self.config.model = model;
        self
    }

    /// Set the inference backend
    #[must_use]
    pub fn backend_type(mut self, backend_type: BackendType) -> Self {
        self.config.backend_type = backend_type;
        self
    }

    /// Set execution provider
    #[must_use]
    pub fn execution_provider(mut self, provider: ExecutionProvider) -> Self {
        self.config.execution_provider = provider;
        self
    }

    /// Enable or disable both enhancement stages
    #[must_use]
    pub fn enhance(mut self, enhance: bool) -> Self {
        self.config.enhance = enhance;
        self
    }

    /// Override enhancement parameters
    #[must_use]
    pub fn enhancement(mut self, enhancement: EnhancementConfig) -> Self {
        self.config.enhancement = enhancement;
        self
    }

    /// Set both intra and inter threads (0 = auto-detect)
    #[must_use]
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.intra_threads = threads;
        self.config.inter_threads = if threads > 0 { (threads / 2).max(1) } else { 0 };
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// - Any error reported by [`RemovalConfig::validate`]
    pub fn build(self) -> Result<RemovalConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enhancement_parameters() {
        let config = EnhancementConfig::default();
        assert!((config.contrast_factor - 1.1).abs() < f32::EPSILON);
        assert!((config.sharpen_radius - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.sharpen_percent, 150);
        assert_eq!(config.sharpen_threshold, 3);
        assert_eq!(config.alpha_blur_kernel, 3);
        assert!((config.alpha_blur_sigma - 0.5).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_enhancement_validation() {
        let config = EnhancementConfig {
            alpha_blur_kernel: 4,
            ..EnhancementConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EnhancementConfig {
            alpha_blur_sigma: 0.0,
            ..EnhancementConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EnhancementConfig {
            contrast_factor: f32::NAN,
            ..EnhancementConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_override() {
        let config: EnhancementConfig =
            serde_json::from_str(r#"{ "contrast_factor": 1.3, "optimize_output": false }"#)
                .unwrap();
        assert!((config.contrast_factor - 1.3).abs() < f32::EPSILON);
        assert!(!config.optimize_output);
        assert_eq!(config.sharpen_percent, DEFAULT_SHARPEN_PERCENT);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enhance.json");
        std::fs::write(&path, r#"{ "sharpen_threshold": 8 }"#).unwrap();
        let config = EnhancementConfig::from_json_file(&path).unwrap();
        assert_eq!(config.sharpen_threshold, 8);

        std::fs::write(&path, "not json").unwrap();
        assert!(EnhancementConfig::from_json_file(&path).is_err());
    }

    #[test]
    fn test_builder() {
        let config = RemovalConfig::builder()
            .model(ModelKind::Silueta)
            .backend_type(BackendType::Tract)
            .execution_provider(ExecutionProvider::Cpu)
            .enhance(false)
            .num_threads(8)
            .build()
            .unwrap();

        assert_eq!(config.model, ModelKind::Silueta);
        assert_eq!(config.backend_type, BackendType::Tract);
        assert!(!config.enhance);
        assert_eq!(config.intra_threads, 8);
        assert_eq!(config.inter_threads, 4);
    }

    #[test]
    fn test_tract_rejects_gpu_provider() {
        let result = RemovalConfig::builder()
            .backend_type(BackendType::Tract)
            .execution_provider(ExecutionProvider::Cuda)
            .build();
        assert!(result.is_err());
    }
}
