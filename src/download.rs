//! Model downloading into the local cache
//!
//! Models are streamed into a uniquely named temporary file inside the cache
//! directory and renamed into place once complete, so an interrupted download
//! never leaves a file that looks cached.

use crate::cache::ModelCache;
use crate::error::{BgRemovalError, Result};
use crate::models::ModelKind;
use futures_util::stream::TryStreamExt;
#[cfg(feature = "cli")]
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;

/// Progress bar abstraction that works with and without CLI features
#[derive(Debug)]
pub enum ProgressIndicator {
    #[cfg(feature = "cli")]
    Indicatif(ProgressBar),
    NoOp,
}

impl ProgressIndicator {
    fn create(show_progress: bool) -> Self {
        #[cfg(feature = "cli")]
        if show_progress {
            let pb = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            return Self::Indicatif(pb);
        }
        let _ = show_progress;
        Self::NoOp
    }

    /// Set message for progress indicator
    pub fn set_message(&self, msg: String) {
        match self {
            #[cfg(feature = "cli")]
            Self::Indicatif(pb) => pb.set_message(msg),
            Self::NoOp => {
                let _ = msg;
            },
        }
    }

    /// Set length for progress indicator
    pub fn set_length(&self, len: u64) {
        match self {
            #[cfg(feature = "cli")]
            Self::Indicatif(pb) => pb.set_length(len),
            Self::NoOp => {
                let _ = len;
            },
        }
    }

    /// Set position for progress indicator
    pub fn set_position(&self, pos: u64) {
        match self {
            #[cfg(feature = "cli")]
            Self::Indicatif(pb) => pb.set_position(pos),
            Self::NoOp => {
                let _ = pos;
            },
        }
    }

    /// Finish progress indicator with message
    pub fn finish_with_message(&self, msg: String) {
        match self {
            #[cfg(feature = "cli")]
            Self::Indicatif(pb) => pb.finish_with_message(msg),
            Self::NoOp => {
                let _ = msg;
            },
        }
    }
}

/// Model downloader with progress reporting
#[derive(Debug)]
pub struct ModelDownloader {
    client: Client,
    cache: ModelCache,
}

impl ModelDownloader {
    /// Create a downloader writing into the default cache
    ///
    /// # Errors
    /// - Failed to create HTTP client
    /// - Failed to initialize model cache
    pub fn new() -> Result<Self> {
        Self::with_cache(ModelCache::new()?)
    }

    /// Create a downloader writing into the given cache
    ///
    /// # Errors
    /// - Failed to create HTTP client
    pub fn with_cache(cache: ModelCache) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // 5 minute timeout
            .build()
            .map_err(|e| BgRemovalError::network_error("Failed to create HTTP client", e))?;

        Ok(Self { client, cache })
    }

    /// Make sure a model is present in the cache, downloading it if missing
    ///
    /// Returns the path of the cached ONNX file.
    ///
    /// # Errors
    /// - Network errors or non-success HTTP status
    /// - File system errors while writing the cache
    pub async fn ensure_model(&self, model: ModelKind, show_progress: bool) -> Result<PathBuf> {
        let final_path = self.cache.model_path(model);

        if self.cache.is_model_cached(model) {
            log::info!("Model already cached: {model}");
            return Ok(final_path);
        }

        log::info!("Downloading model {model} from {}", model.download_url());
        self.download_to(&model.download_url(), &final_path, show_progress)
            .await?;
        log::info!("Successfully downloaded model: {model}");

        Ok(final_path)
    }

    /// Download a URL to `final_path` through a temporary sibling file
    ///
    /// # Errors
    /// - Network errors or non-success HTTP status
    /// - File system errors during write or rename
    pub async fn download_to(&self, url: &str, final_path: &Path, show_progress: bool) -> Result<()> {
        let temp_path = Self::temp_path_for(final_path);
        let progress = ProgressIndicator::create(show_progress);

        if let Some(name) = final_path.file_name() {
            progress.set_message(format!("Downloading {}", name.to_string_lossy()));
        }

        match self.download_file(url, &temp_path, &progress).await {
            Ok(()) => {
                fs::rename(&temp_path, final_path).map_err(|e| {
                    BgRemovalError::file_io_error("move downloaded model to cache", final_path, &e)
                })?;
                progress.finish_with_message("✅ Download complete".to_string());
                Ok(())
            },
            Err(e) => {
                if temp_path.exists() {
                    if let Err(cleanup_err) = fs::remove_file(&temp_path) {
                        log::warn!("Failed to cleanup temp file: {cleanup_err}");
                    }
                }
                progress.finish_with_message("❌ Download failed".to_string());
                Err(e)
            },
        }
    }

    fn temp_path_for(final_path: &Path) -> PathBuf {
        let name = final_path
            .file_name()
            .map_or_else(|| "model".into(), |n| n.to_string_lossy());
        final_path.with_file_name(format!(".{name}.{}.part", uuid::Uuid::new_v4()))
    }

    async fn download_file(
        &self,
        url: &str,
        local_path: &Path,
        progress: &ProgressIndicator,
    ) -> Result<()> {
        log::debug!("Downloading: {} -> {}", url, local_path.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BgRemovalError::network_error(format!("Failed to download {url}"), e))?;

        if !response.status().is_success() {
            return Err(BgRemovalError::network_error(
                format!("Failed to download {url}"),
                format!("HTTP status {}", response.status()),
            ));
        }

        let total_size = response.content_length();
        if let Some(total) = total_size {
            progress.set_length(total);
        }

        let mut file = tokio::fs::File::create(local_path)
            .await
            .map_err(|e| BgRemovalError::file_io_error("create file", local_path, &e))?;

        let mut stream = StreamReader::new(
            response
                .bytes_stream()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
        );

        let mut downloaded = 0u64;
        let mut buffer = vec![0; 64 * 1024];

        loop {
            let bytes_read = stream
                .read(&mut buffer)
                .await
                .map_err(|e| BgRemovalError::network_error("Failed to read download stream", e))?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(buffer.get(..bytes_read).unwrap_or(&[]))
                .await
                .map_err(|e| BgRemovalError::file_io_error("write to file", local_path, &e))?;

            downloaded += bytes_read as u64;
            progress.set_position(downloaded);
        }

        file.flush()
            .await
            .map_err(|e| BgRemovalError::file_io_error("flush file", local_path, &e))?;

        if downloaded == 0 {
            return Err(BgRemovalError::network_error(
                format!("Failed to download {url}"),
                "empty response body",
            ));
        }

        log::debug!("Downloaded {downloaded} bytes to {}", local_path.display());
        Ok(())
    }

    /// Get the model cache for other operations
    #[must_use]
    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }
}
