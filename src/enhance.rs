//! Best-effort cosmetic enhancement around segmentation
//!
//! Both stages take encoded bytes and return encoded bytes. Their internal
//! failures never escape: when decoding or filtering fails the original buffer
//! is returned untouched and the error is handed to a [`DiagnosticHook`].

use crate::config::EnhancementConfig;
use crate::error::Result;
use crate::services::ImageIOService;
use image::{imageops, DynamicImage, ImageBuffer, Luma, Rgb, RgbImage, RgbaImage};
use imageproc::definitions::Image;
use std::fmt;
use std::sync::Arc;

/// Which enhancement stage produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhancementStage {
    /// Contrast and sharpening before segmentation
    Input,
    /// Alpha smoothing after segmentation
    Output,
}

impl fmt::Display for EnhancementStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input enhancement"),
            Self::Output => f.write_str("output enhancement"),
        }
    }
}

/// Observer for enhancement failures that were absorbed
pub trait DiagnosticHook: Send + Sync {
    /// Called once per swallowed failure, before the original bytes are returned
    fn enhancement_failed(&self, stage: EnhancementStage, error: &crate::BgRemovalError);
}

/// Default hook: emits a `tracing` warning
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticHook for TracingDiagnostics {
    fn enhancement_failed(&self, stage: EnhancementStage, error: &crate::BgRemovalError) {
        tracing::warn!(%stage, %error, "Enhancement skipped, passing image through unchanged");
    }
}

/// Input and output enhancement stages with their parameters
#[derive(Clone)]
pub struct Enhancer {
    config: EnhancementConfig,
    hook: Arc<dyn DiagnosticHook>,
}

impl fmt::Debug for Enhancer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enhancer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Enhancer {
    fn default() -> Self {
        Self::new(EnhancementConfig::default())
    }
}

impl Enhancer {
    /// Create an enhancer reporting failures through `tracing`
    #[must_use]
    pub fn new(config: EnhancementConfig) -> Self {
        Self {
            config,
            hook: Arc::new(TracingDiagnostics),
        }
    }

    /// Replace the diagnostic hook
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn DiagnosticHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Enhancement parameters in use
    #[must_use]
    pub fn config(&self) -> &EnhancementConfig {
        &self.config
    }

    /// Contrast boost and unsharp mask, re-encoded as PNG
    ///
    /// Returns the input unchanged if any step fails.
    #[must_use]
    pub fn enhance_input(&self, bytes: &[u8]) -> Vec<u8> {
        self.best_effort(EnhancementStage::Input, bytes, |b| {
            try_enhance_input(b, &self.config)
        })
    }

    /// Alpha edge smoothing, re-encoded as PNG
    ///
    /// Returns the input unchanged if any step fails.
    #[must_use]
    pub fn enhance_output(&self, bytes: &[u8]) -> Vec<u8> {
        self.best_effort(EnhancementStage::Output, bytes, |b| {
            try_enhance_output(b, &self.config)
        })
    }

    fn best_effort<F>(&self, stage: EnhancementStage, bytes: &[u8], op: F) -> Vec<u8>
    where
        F: FnOnce(&[u8]) -> Result<Vec<u8>>,
    {
        match op(bytes) {
            Ok(enhanced) => {
                tracing::debug!(%stage, before = bytes.len(), after = enhanced.len(), "Enhanced");
                enhanced
            },
            Err(error) => {
                self.hook.enhancement_failed(stage, &error);
                bytes.to_vec()
            },
        }
    }
}

/// Fallible input enhancement: decode, force RGB, contrast, sharpen, encode
///
/// # Errors
/// - Bytes cannot be decoded
/// - PNG encoding fails
pub fn try_enhance_input(bytes: &[u8], config: &EnhancementConfig) -> Result<Vec<u8>> {
    let image = ImageIOService::load_from_bytes(bytes)?;
    let rgb = match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    };

    let contrasted = adjust_contrast(&rgb, config.contrast_factor);
    let sharpened = unsharp_mask(
        &contrasted,
        config.sharpen_radius,
        config.sharpen_percent,
        config.sharpen_threshold,
    );

    ImageIOService::encode_png(&DynamicImage::ImageRgb8(sharpened), false)
}

/// Fallible output enhancement: decode, smooth alpha if present, encode
///
/// # Errors
/// - Bytes cannot be decoded
/// - PNG encoding fails
pub fn try_enhance_output(bytes: &[u8], config: &EnhancementConfig) -> Result<Vec<u8>> {
    let image = ImageIOService::load_from_bytes(bytes)?;

    let image = if image.color().has_alpha() {
        let smoothed = smooth_alpha(
            &image.to_rgba8(),
            config.alpha_blur_kernel,
            config.alpha_blur_sigma,
        );
        DynamicImage::ImageRgba8(smoothed)
    } else {
        image
    };

    ImageIOService::encode_png(&image, config.optimize_output)
}

/// Scale contrast around the image's mean grey level
///
/// Every channel becomes `mean + factor * (value - mean)`, truncated into
/// 0..=255. `mean` is the rounded average of the 16-bit fixed point ITU-R 601
/// luma, itself rounded per pixel.
#[must_use]
pub fn adjust_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return image.clone();
    }

    let luma_sum: u64 = image.pixels().map(|Rgb(rgb)| u64::from(luma(*rgb))).sum();
    let mean = (luma_sum as f64 / pixel_count as f64 + 0.5).floor() as f32;

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for channel in &mut pixel.0 {
            *channel = truncate_u8(mean + factor * (f32::from(*channel) - mean));
        }
    }
    out
}

fn luma([r, g, b]: [u8; 3]) -> u8 {
    let weighted = u32::from(r) * 19_595 + u32::from(g) * 38_470 + u32::from(b) * 7_471;
    ((weighted + 0x8000) >> 16) as u8
}

/// Unsharp mask with a Gaussian reference blur
///
/// Channels whose difference from the blurred reference is below `threshold`
/// are left alone; the rest move away from the reference by `percent`% of the
/// difference.
#[must_use]
pub fn unsharp_mask(image: &RgbImage, radius: f32, percent: u32, threshold: u8) -> RgbImage {
    if radius <= 0.0 || percent == 0 {
        return image.clone();
    }

    let blurred = imageops::blur(image, radius);
    let amount = percent as f32 / 100.0;
    let threshold = i16::from(threshold);

    let mut out = image.clone();
    for (pixel, reference) in out.pixels_mut().zip(blurred.pixels()) {
        for (channel, blurred_channel) in pixel.0.iter_mut().zip(reference.0) {
            let diff = i16::from(*channel) - i16::from(blurred_channel);
            if diff.abs() >= threshold {
                *channel = clamp_u8(f32::from(*channel) + f32::from(diff) * amount);
            }
        }
    }
    out
}

/// Blur only the alpha channel of an RGBA image with a square Gaussian
///
/// Borders are mirrored without repeating the edge pixel (`dcb|abcd|cba`).
/// Colour channels are copied through untouched.
#[must_use]
pub fn smooth_alpha(image: &RgbaImage, kernel_size: u32, sigma: f32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let kernel = gaussian_kernel(kernel_size, sigma);
    let pad = kernel.len() as u32 / 2;

    // Filter in f32 so rounding happens once, after both passes
    let padded: Image<Luma<f32>> =
        ImageBuffer::from_fn(width + 2 * pad, height + 2 * pad, |x, y| {
            let src_x = reflect_101(i64::from(x) - i64::from(pad), width);
            let src_y = reflect_101(i64::from(y) - i64::from(pad), height);
            Luma([f32::from(image.get_pixel(src_x, src_y).0[3])])
        });
    let blurred = imageproc::filter::separable_filter_equal(&padded, &kernel);

    let mut out = image.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        pixel.0[3] = clamp_u8(blurred.get_pixel(x + pad, y + pad).0[0]);
    }
    out
}

fn reflect_101(index: i64, len: u32) -> u32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (i64::from(len) - 1);
    let folded = index.rem_euclid(period);
    if folded < i64::from(len) {
        folded as u32
    } else {
        (period - folded) as u32
    }
}

/// Normalized 1-D Gaussian weights of odd length `size`
///
/// Applied separably along both axes this yields the `size`×`size` kernel.
#[must_use]
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let radius = (size.max(1) / 2) as i32;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let weights: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / two_sigma_sq).exp())
        .collect();
    let sum: f32 = weights.iter().sum();

    weights.into_iter().map(|w| w / sum).collect()
}

fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn truncate_u8(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}
