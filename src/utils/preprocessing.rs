//! Tensor conversion around segmentation inference
//!
//! Turns decoded images into normalized NCHW tensors and model outputs back
//! into alpha masks at the source resolution.

use crate::{
    error::{BgRemovalError, Result},
    models::PreprocessingConfig,
};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, RgbImage, RgbaImage};
use ndarray::Array4;

/// Image to tensor and tensor to mask conversions
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Preprocess image for model inference
    ///
    /// - RGB conversion
    /// - Stretch resize to the model's square input (Lanczos3)
    /// - Scale by the brightest channel value, then normalize with the model's
    ///   mean and std
    /// - NCHW layout with batch size 1
    ///
    /// # Errors
    /// - Zero target size in the preprocessing configuration
    pub fn preprocess_for_inference(
        image: &DynamicImage,
        preprocessing_config: &PreprocessingConfig,
    ) -> Result<Array4<f32>> {
        let [width, height] = preprocessing_config.target_size;
        if width == 0 || height == 0 {
            return Err(BgRemovalError::processing(
                "Model input size must be non-zero",
            ));
        }

        let rgb = image.to_rgb8();
        let resized = imageops::resize(&rgb, width, height, FilterType::Lanczos3);

        Ok(Self::image_to_tensor(&resized, preprocessing_config))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn image_to_tensor(image: &RgbImage, preprocessing_config: &PreprocessingConfig) -> Array4<f32> {
        let max_value = image
            .as_raw()
            .iter()
            .copied()
            .max()
            .map_or(1.0, |max| f32::from(max).max(1e-6));

        let mean = preprocessing_config.normalization_mean;
        let std = preprocessing_config.normalization_std;
        let (width, height) = image.dimensions();

        Array4::from_shape_fn(
            (1, 3, height as usize, width as usize),
            |(_, channel, y, x)| {
                let value = image.get_pixel(x as u32, y as u32).0[channel];
                (f32::from(value) / max_value - mean[channel]) / std[channel]
            },
        )
    }

    /// Build an 8-bit mask from the first channel of a model output
    ///
    /// Values are min-max normalized to 0..255 and resized to the source
    /// dimensions with Lanczos3. A constant prediction yields an empty mask.
    ///
    /// # Errors
    /// - Output tensor has no batch or channel entries
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn mask_from_output(output: &Array4<f32>, width: u32, height: u32) -> Result<GrayImage> {
        let (batch, channels, out_height, out_width) = output.dim();
        if batch == 0 || channels == 0 || out_height == 0 || out_width == 0 {
            return Err(BgRemovalError::processing(format!(
                "Empty model output with shape {:?}",
                output.dim()
            )));
        }

        let prediction = output.slice(ndarray::s![0, 0, .., ..]);
        let (min, max) = prediction
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;

        let mask = GrayImage::from_fn(out_width as u32, out_height as u32, |x, y| {
            let value = prediction[[y as usize, x as usize]];
            let normalized = if range > f32::EPSILON {
                (value - min) / range
            } else {
                0.0
            };
            Luma([(normalized * 255.0).clamp(0.0, 255.0) as u8])
        });

        if mask.dimensions() == (width, height) {
            return Ok(mask);
        }
        Ok(imageops::resize(&mask, width, height, FilterType::Lanczos3))
    }

    /// Combine the source colour channels with a mask as alpha
    ///
    /// # Errors
    /// - Mask dimensions differ from the image
    pub fn apply_mask(image: &DynamicImage, mask: &GrayImage) -> Result<RgbaImage> {
        if image.width() != mask.width() || image.height() != mask.height() {
            return Err(BgRemovalError::processing(format!(
                "Mask {}x{} does not match image {}x{}",
                mask.width(),
                mask.height(),
                image.width(),
                image.height()
            )));
        }

        let mut rgba = image.to_rgba8();
        for (pixel, alpha) in rgba.pixels_mut().zip(mask.pixels()) {
            pixel.0[3] = alpha.0[0];
        }
        Ok(rgba)
    }
}
