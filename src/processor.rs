//! Single-file and batch background removal pipelines
//!
//! [`BackgroundRemover`] composes format validation, the optional enhancement
//! stages and a [`Segmenter`]. Files are processed one at a time; a failure
//! aborts only the file it happened on.

use crate::{
    config::RemovalConfig,
    enhance::{DiagnosticHook, Enhancer},
    error::{BgRemovalError, Result},
    segmentation::Segmenter,
    services::{FormatValidator, ImageIOService, NoOpProgressReporter, ProgressReporter},
};
use instant::Instant;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Name of the directory created inside a batch input folder by default
pub const DEFAULT_BATCH_OUTPUT_DIR: &str = "no_background";

/// Background removal pipelines around a segmenter
pub struct BackgroundRemover<S: Segmenter> {
    segmenter: S,
    enhancer: Option<Enhancer>,
    reporter: Arc<dyn ProgressReporter>,
}

impl<S: Segmenter> BackgroundRemover<S> {
    /// Create a remover with enhancement enabled per `config` and silent reporting
    #[must_use]
    pub fn new(segmenter: S, config: &RemovalConfig) -> Self {
        let enhancer = config
            .enhance
            .then(|| Enhancer::new(config.enhancement.clone()));

        Self {
            segmenter,
            enhancer,
            reporter: Arc::new(NoOpProgressReporter),
        }
    }

    /// Report pipeline events to `reporter`
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Route swallowed enhancement failures to `hook`
    #[must_use]
    pub fn with_diagnostics(mut self, hook: Arc<dyn DiagnosticHook>) -> Self {
        self.enhancer = self.enhancer.map(|enhancer| enhancer.with_hook(hook));
        self
    }

    /// Whether the enhancement stages run
    #[must_use]
    pub fn enhancement_enabled(&self) -> bool {
        self.enhancer.is_some()
    }

    /// Access the underlying segmenter
    pub fn segmenter(&self) -> &S {
        &self.segmenter
    }

    /// Run enhancement and segmentation on an in-memory image
    ///
    /// # Errors
    /// - Segmentation fails
    pub fn process_bytes(&mut self, bytes: &[u8]) -> Result<Vec<u8>> {
        let Some(enhancer) = &self.enhancer else {
            return self.segmenter.segment(bytes);
        };

        let enhanced = enhancer.enhance_input(bytes);
        let segmented = self.segmenter.segment(&enhanced)?;
        Ok(enhancer.enhance_output(&segmented))
    }

    /// Remove the background of one file, writing a PNG
    ///
    /// Without `output` the result goes next to the input as
    /// `<stem>_no_bg.png`. Returns the written path.
    ///
    /// # Errors
    /// - Input does not exist (`NotFound`)
    /// - Extension outside the supported set (`UnsupportedFormat`)
    /// - Read, segmentation or write failure
    #[instrument(skip_all, fields(input = %input.display()))]
    pub fn process_file(&mut self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let start = Instant::now();

        if !input.exists() {
            return Err(BgRemovalError::not_found(input));
        }
        if !FormatValidator::is_supported(input) {
            let extension = FormatValidator::extension_of(input).unwrap_or_default();
            return Err(BgRemovalError::unsupported_format(format!(
                "'{}' ({}). Supported formats: {}",
                input.display(),
                if extension.is_empty() { "no extension" } else { extension.as_str() },
                crate::services::SUPPORTED_EXTENSIONS.join(", ")
            )));
        }

        let output_path = output.map_or_else(
            || FormatValidator::default_output_path(input),
            Path::to_path_buf,
        );

        let bytes = ImageIOService::read_bytes(input)?;
        let result = self.process_bytes(&bytes)?;
        ImageIOService::write_bytes(&output_path, &result)?;

        info!(
            output = %output_path.display(),
            elapsed_ms = start.elapsed().as_millis(),
            "Background removed"
        );
        Ok(output_path)
    }

    /// Process one file and report the outcome instead of returning the error
    pub fn remove_background(&mut self, input: &Path, output: Option<&Path>) -> Option<PathBuf> {
        match self.process_file(input, output) {
            Ok(path) => {
                self.reporter.file_completed(input, &path);
                Some(path)
            },
            Err(e) => {
                warn!(input = %input.display(), error = %e, "Processing failed");
                self.reporter.file_failed(input, &e.to_string());
                None
            },
        }
    }

    /// Process every supported file directly inside `folder`
    ///
    /// Results are written to `output_folder`, or `<folder>/no_background`,
    /// which is created only when there is something to process. Returns the
    /// paths written; files that fail are reported and skipped.
    ///
    /// # Errors
    /// - `folder` does not exist or is not a directory
    /// - Directory listing or output directory creation fails
    #[instrument(skip_all, fields(folder = %folder.display()))]
    pub fn batch_remove(
        &mut self,
        folder: &Path,
        output_folder: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        if !folder.exists() {
            return Err(BgRemovalError::not_found(folder));
        }
        if !folder.is_dir() {
            return Err(BgRemovalError::invalid_config(format!(
                "Batch input '{}' is not a directory",
                folder.display()
            )));
        }

        let inputs = list_supported_files(folder)?;
        if inputs.is_empty() {
            self.reporter.batch_empty(folder);
            return Ok(Vec::new());
        }

        let output_dir = output_folder.map_or_else(
            || folder.join(DEFAULT_BATCH_OUTPUT_DIR),
            Path::to_path_buf,
        );
        fs::create_dir_all(&output_dir).map_err(|e| {
            BgRemovalError::file_io_error("create output directory", &output_dir, &e)
        })?;

        let total = inputs.len();
        self.reporter.batch_started(total);
        debug!(total, output_dir = %output_dir.display(), "Starting batch");

        let mut written = Vec::with_capacity(total);
        for (index, input) in inputs.iter().enumerate() {
            self.reporter.batch_item(index + 1, total, input);
            let output = FormatValidator::output_path_in(&output_dir, input);
            if let Some(path) = self.remove_background(input, Some(&output)) {
                written.push(path);
            }
        }

        self.reporter.batch_finished(written.len(), total);
        info!(succeeded = written.len(), total, "Batch finished");
        Ok(written)
    }
}

/// Regular files with a supported extension, in directory listing order
///
/// # Errors
/// - Directory cannot be read
pub fn list_supported_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(folder)
        .map_err(|e| BgRemovalError::file_io_error("read input directory", folder, &e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| BgRemovalError::file_io_error("read directory entry", folder, &e))?
            .path();
        if path.is_file() && FormatValidator::is_supported(&path) {
            files.push(path);
        }
    }
    Ok(files)
}
