//! Segmentation model invocation
//!
//! A [`Segmenter`] turns encoded image bytes into an encoded RGBA PNG whose
//! alpha channel is the predicted foreground mask. [`ModelSession`] is the
//! model-backed implementation; the pipelines only see the trait.

use crate::backends::create_backend;
use crate::cache::ModelCache;
use crate::config::RemovalConfig;
use crate::error::Result;
use crate::inference::InferenceBackend;
use crate::models::{ModelKind, PreprocessingConfig};
use crate::services::ImageIOService;
use crate::utils::ImagePreprocessor;
use image::DynamicImage;
use instant::Instant;

/// Produces a foreground cut-out from encoded image bytes
pub trait Segmenter {
    /// Segment one image
    ///
    /// # Errors
    /// - Bytes cannot be decoded
    /// - Model inference fails
    fn segment(&mut self, bytes: &[u8]) -> Result<Vec<u8>>;
}

/// A loaded segmentation model, reused across every image of a run
pub struct ModelSession {
    model: ModelKind,
    backend: Box<dyn InferenceBackend>,
    preprocessing: PreprocessingConfig,
}

impl std::fmt::Debug for ModelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSession")
            .field("model", &self.model)
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}

impl ModelSession {
    /// Load the configured model from the cache into the configured backend
    ///
    /// # Errors
    /// - Model not present in the cache
    /// - Backend unavailable in this build or fails to load the model
    pub fn from_cache(config: &RemovalConfig, cache: &ModelCache) -> Result<Self> {
        let model_bytes = cache.load_model(config.model)?;
        let backend = create_backend(config.backend_type)?;
        Self::with_backend(config, backend, &model_bytes)
    }

    /// Initialize a session around an existing backend
    ///
    /// # Errors
    /// - Backend fails to load the model bytes
    pub fn with_backend(
        config: &RemovalConfig,
        mut backend: Box<dyn InferenceBackend>,
        model_bytes: &[u8],
    ) -> Result<Self> {
        if let Some(load_time) = backend.initialize(config, model_bytes)? {
            tracing::info!(
                model = %config.model,
                backend = backend.name(),
                load_ms = load_time.as_millis(),
                "Model session ready"
            );
        }

        Ok(Self {
            model: config.model,
            backend,
            preprocessing: config.model.preprocessing_config(),
        })
    }

    /// Model this session runs
    #[must_use]
    pub fn model(&self) -> ModelKind {
        self.model
    }

    /// Segment a decoded image, returning the RGBA cut-out
    ///
    /// # Errors
    /// - Model inference fails or returns an unusable tensor
    pub fn segment_image(&mut self, image: &DynamicImage) -> Result<DynamicImage> {
        let start = Instant::now();
        let (width, height) = (image.width(), image.height());

        let input = ImagePreprocessor::preprocess_for_inference(image, &self.preprocessing)?;
        let output = self.backend.infer(&input)?;
        let mask = ImagePreprocessor::mask_from_output(&output, width, height)?;
        let cutout = ImagePreprocessor::apply_mask(image, &mask)?;

        tracing::debug!(
            model = %self.model,
            width,
            height,
            elapsed_ms = start.elapsed().as_millis(),
            "Segmented image"
        );

        Ok(DynamicImage::ImageRgba8(cutout))
    }
}

impl Segmenter for ModelSession {
    fn segment(&mut self, bytes: &[u8]) -> Result<Vec<u8>> {
        let image = ImageIOService::load_from_bytes(bytes)?;
        let cutout = self.segment_image(&image)?;
        ImageIOService::encode_png(&cutout, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_utils::MockBackend;
    use crate::error::BgRemovalError;
    use image::{Rgb, RgbImage};

    fn session_with(backend: MockBackend) -> ModelSession {
        ModelSession::with_backend(&RemovalConfig::default(), Box::new(backend), b"model").unwrap()
    }

    fn jpeg_like_input(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        ImageIOService::encode_png(&DynamicImage::ImageRgb8(image), false).unwrap()
    }

    #[test]
    fn test_segment_produces_rgba_png_with_input_dimensions() {
        let mut session = session_with(MockBackend::new());

        let output = session.segment(&jpeg_like_input(120, 80)).unwrap();
        let decoded = ImageIOService::load_from_bytes(&output).unwrap();

        assert_eq!(&output[..4], b"\x89PNG");
        assert_eq!((decoded.width(), decoded.height()), (120, 80));
        assert!(decoded.color().has_alpha());

        let rgba = decoded.to_rgba8();
        // Mock mask is a centred disc
        assert_eq!(rgba.get_pixel(0, 0).0[3], 0);
        assert!(rgba.get_pixel(60, 40).0[3] > 200);
        // Colour channels are the source pixels
        assert_eq!(&rgba.get_pixel(60, 40).0[..3], &[60, 40, 128]);
    }

    #[test]
    fn test_session_is_reused_across_calls() {
        let backend = MockBackend::new();
        let history = backend.call_history();
        let mut session = session_with(backend);

        session.segment(&jpeg_like_input(20, 20)).unwrap();
        session.segment(&jpeg_like_input(30, 10)).unwrap();

        assert_eq!(
            *history.lock().unwrap(),
            vec!["initialize", "infer", "infer"]
        );
    }

    #[test]
    fn test_segment_rejects_undecodable_bytes() {
        let mut session = session_with(MockBackend::new());
        let err = session.segment(b"garbage").unwrap_err();
        assert!(matches!(err, BgRemovalError::Image(_)));
    }

    #[test]
    fn test_inference_failure_propagates() {
        let mut session = session_with(MockBackend::new_failing_inference());
        let err = session.segment(&jpeg_like_input(10, 10)).unwrap_err();
        assert!(matches!(err, BgRemovalError::Inference(_)));
    }

    #[test]
    fn test_initialization_failure_propagates() {
        let result = ModelSession::with_backend(
            &RemovalConfig::default(),
            Box::new(MockBackend::new_failing_init()),
            b"model",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_cache_requires_cached_model() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::with_custom_cache_dir(temp_dir.path()).unwrap();
        let err = ModelSession::from_cache(&RemovalConfig::default(), &cache).unwrap_err();
        assert!(matches!(err, BgRemovalError::Model(_)));
    }
}
