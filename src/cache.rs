//! Model cache management for downloaded models
//!
//! Each model lives as a single `<name>.onnx` file inside the cache directory:
//! - `$BGREMOVER_CACHE_DIR/models/` when the variable is set
//! - otherwise the platform cache dir, e.g. `~/.cache/bgremover/models/`

use crate::error::{BgRemovalError, Result};
use crate::models::ModelKind;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the cache root
pub const CACHE_DIR_ENV: &str = "BGREMOVER_CACHE_DIR";

/// Information about a cached model
#[derive(Debug, Clone)]
pub struct CachedModelInfo {
    /// Model kind the file belongs to
    pub model: ModelKind,
    /// Path to the cached ONNX file
    pub path: PathBuf,
    /// Size of the file in bytes
    pub size_bytes: u64,
}

/// Model cache manager
#[derive(Debug, Clone)]
pub struct ModelCache {
    cache_dir: PathBuf,
}

impl ModelCache {
    /// Create a cache manager at the default location, creating the directory
    ///
    /// # Errors
    /// - No platform cache directory and no override set
    /// - Failed to create cache directory
    pub fn new() -> Result<Self> {
        let cache_dir = Self::default_cache_dir()?;
        Self::at(cache_dir)
    }

    /// Create a cache manager rooted at `cache_dir/models`
    ///
    /// # Errors
    /// - Failed to create cache directory
    pub fn with_custom_cache_dir(cache_dir: &Path) -> Result<Self> {
        Self::at(cache_dir.join("models"))
    }

    fn at(cache_dir: PathBuf) -> Result<Self> {
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).map_err(|e| {
                BgRemovalError::file_io_error("create cache directory", &cache_dir, &e)
            })?;
        }
        Ok(Self { cache_dir })
    }

    fn default_cache_dir() -> Result<PathBuf> {
        if let Ok(cache_override) = std::env::var(CACHE_DIR_ENV) {
            return Ok(PathBuf::from(cache_override).join("models"));
        }

        Ok(dirs::cache_dir()
            .ok_or_else(|| {
                BgRemovalError::invalid_config(format!(
                    "Failed to determine cache directory. Set {CACHE_DIR_ENV} environment variable."
                ))
            })?
            .join("bgremover")
            .join("models"))
    }

    /// Directory holding the model files
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of a model's ONNX file (may not exist)
    #[must_use]
    pub fn model_path(&self, model: ModelKind) -> PathBuf {
        self.cache_dir.join(model.file_name())
    }

    /// A model is cached when its file exists and is non-empty
    #[must_use]
    pub fn is_model_cached(&self, model: ModelKind) -> bool {
        fs::metadata(self.model_path(model)).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
    }

    /// Read a cached model's bytes
    ///
    /// # Errors
    /// - Model is not in the cache
    /// - File cannot be read
    pub fn load_model(&self, model: ModelKind) -> Result<Vec<u8>> {
        let path = self.model_path(model);
        if !self.is_model_cached(model) {
            let download_hint = format!("run `bgremover --only-download --model {model}`");
            return Err(BgRemovalError::model_error_with_context(
                "load",
                &path,
                "not present in the model cache",
                &[download_hint.as_str()],
            ));
        }

        fs::read(&path).map_err(|e| BgRemovalError::file_io_error("read model file", &path, &e))
    }

    /// All known models present in the cache, in `ModelKind::ALL` order
    ///
    /// # Errors
    /// - Failed to read file metadata
    pub fn scan_cached_models(&self) -> Result<Vec<CachedModelInfo>> {
        let mut models = Vec::new();

        for model in ModelKind::ALL {
            if !self.is_model_cached(model) {
                continue;
            }
            let path = self.model_path(model);
            let size_bytes = fs::metadata(&path)
                .map_err(|e| BgRemovalError::file_io_error("read model metadata", &path, &e))?
                .len();
            models.push(CachedModelInfo {
                model,
                path,
                size_bytes,
            });
        }

        Ok(models)
    }

    /// Remove one model from the cache
    ///
    /// Returns `true` if a file was removed.
    ///
    /// # Errors
    /// - Failed to remove the file
    pub fn clear_model(&self, model: ModelKind) -> Result<bool> {
        let path = self.model_path(model);
        if !path.exists() {
            return Ok(false);
        }

        log::info!("Removing cached model: {model}");
        fs::remove_file(&path)
            .map_err(|e| BgRemovalError::file_io_error("remove cached model", &path, &e))?;
        Ok(true)
    }

    /// Remove every cached model, returning the removed kinds
    ///
    /// # Errors
    /// - Failed to remove a model file
    pub fn clear_all(&self) -> Result<Vec<ModelKind>> {
        let mut removed = Vec::new();
        for model in ModelKind::ALL {
            if self.clear_model(model)? {
                removed.push(model);
            }
        }
        Ok(removed)
    }
}

/// Format file size in human-readable format
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    let unit = UNITS.get(unit_index).unwrap_or(&"B");
    if unit_index == 0 {
        format!("{bytes} {unit}")
    } else {
        format!("{size:.1} {unit}")
    }
}
