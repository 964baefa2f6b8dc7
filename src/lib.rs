#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Background Remover Library
//!
//! Removes the background of still images with U2-Net family segmentation
//! models, running on ONNX Runtime or the pure Rust Tract engine.
//!
//! Each image goes through up to three stages:
//!
//! 1. **Input enhancement** (optional): contrast boost and unsharp mask
//! 2. **Segmentation**: the model predicts a foreground mask that becomes the
//!    alpha channel of an RGBA cut-out
//! 3. **Output enhancement** (optional): light Gaussian smoothing of the alpha
//!    channel and an optimized PNG encode
//!
//! Enhancement never fails a run. If a filter cannot be applied the stage
//! returns its input unchanged and reports through a [`DiagnosticHook`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgremover::{BackgroundRemover, ModelDownloader, ModelKind, ModelSession, RemovalConfig};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RemovalConfig::builder()
//!     .model(ModelKind::IsNetGeneralUse)
//!     .build()?;
//!
//! // Download and cache the model (one-time setup)
//! let downloader = ModelDownloader::new()?;
//! downloader.ensure_model(config.model, false).await?;
//!
//! let session = ModelSession::from_cache(&config, downloader.cache())?;
//! let mut remover = BackgroundRemover::new(session, &config);
//!
//! let written = remover.process_file(Path::new("photo.jpg"), None)?;
//! println!("Saved {}", written.display());
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `onnx` (default): ONNX Runtime backend with GPU acceleration support
//! - `tract` (default): Pure Rust backend
//! - `cli` (default): Command-line interface, progress bars and tracing subscriber
//! - `webp-support` (default): WebP input support
//! - `tracing-json`: JSON log output for the CLI
//!
//! ## Backend Selection
//!
//! ```rust,no_run
//! use bgremover::backends::{OnnxBackend, TractBackend};
//!
//! // ONNX Runtime backend with GPU acceleration
//! #[cfg(feature = "onnx")]
//! let onnx_backend = OnnxBackend::new();
//!
//! // Pure Rust backend
//! #[cfg(feature = "tract")]
//! let tract_backend = TractBackend::new();
//! ```

pub mod backends;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod download;
pub mod enhance;
pub mod error;
pub mod inference;
pub mod models;
pub mod processor;
pub mod segmentation;
pub mod services;
pub mod tracing_config;
pub mod utils;

pub use cache::{format_size, CachedModelInfo, ModelCache};
pub use config::{BackendType, EnhancementConfig, ExecutionProvider, RemovalConfig};
pub use download::ModelDownloader;
pub use enhance::{DiagnosticHook, EnhancementStage, Enhancer, TracingDiagnostics};
pub use error::{BgRemovalError, Result};
pub use inference::InferenceBackend;
pub use models::{ModelKind, PreprocessingConfig};
pub use processor::{list_supported_files, BackgroundRemover, DEFAULT_BATCH_OUTPUT_DIR};
pub use segmentation::{ModelSession, Segmenter};
pub use services::{
    ConsoleProgressReporter, FormatValidator, ImageIOService, NoOpProgressReporter,
    ProgressReporter,
};
pub use utils::{ExecutionProviderManager, ImagePreprocessor, ProviderInfo};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;
pub use tracing_config::{TracingConfig, TracingFormat};
