//! Image I/O operations service
//!
//! Keeps file access and PNG encoding out of the pipeline logic so the
//! pipeline can be exercised against in-memory buffers.

use crate::error::{BgRemovalError, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Read the raw bytes of an image file
    ///
    /// # Errors
    /// - File does not exist (`NotFound`)
    /// - File cannot be read
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(BgRemovalError::not_found(path_ref));
        }

        std::fs::read(path_ref)
            .map_err(|e| BgRemovalError::file_io_error("read image file", path_ref, &e))
    }

    /// Write encoded image bytes, replacing any existing file
    ///
    /// # Errors
    /// - Parent directory does not exist or is not writable
    pub fn write_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
        let path_ref = path.as_ref();
        std::fs::write(path_ref, bytes)
            .map_err(|e| BgRemovalError::file_io_error("write output image", path_ref, &e))?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path_ref.display());
        Ok(())
    }

    /// Decode an image from bytes, guessing the format from content
    ///
    /// # Errors
    /// - Bytes are not a decodable image
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(BgRemovalError::from)
    }

    /// Encode an image as PNG
    ///
    /// With `optimize` set, the encoder uses maximum compression and adaptive
    /// row filtering; otherwise the encoder defaults are used.
    ///
    /// # Errors
    /// - Encoder rejects the pixel layout
    ///
    /// # Examples
    /// ```rust
    /// use bgremover::services::ImageIOService;
    /// use image::DynamicImage;
    ///
    /// let image = DynamicImage::new_rgba8(4, 4);
    /// let png = ImageIOService::encode_png(&image, true)?;
    /// assert_eq!(&png[..4], b"\x89PNG");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn encode_png(image: &DynamicImage, optimize: bool) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());

        if optimize {
            let encoder = PngEncoder::new_with_quality(
                &mut buffer,
                CompressionType::Best,
                FilterType::Adaptive,
            );
            image.write_with_encoder(encoder)?;
        } else {
            image.write_to(&mut buffer, image::ImageFormat::Png)?;
        }

        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_read_missing_file_is_not_found() {
        let err = ImageIOService::read_bytes("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, BgRemovalError::NotFound(_)));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        ImageIOService::write_bytes(&path, b"abc").unwrap();
        assert_eq!(ImageIOService::read_bytes(&path).unwrap(), b"abc");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(ImageIOService::write_bytes(&path, b"abc").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_encode_png_preserves_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40])));
        for optimize in [true, false] {
            let png = ImageIOService::encode_png(&image, optimize).unwrap();
            let decoded = ImageIOService::load_from_bytes(&png).unwrap();
            assert!(decoded.color().has_alpha());
            assert_eq!(decoded.to_rgba8().get_pixel(2, 1), &Rgba([10, 20, 30, 40]));
        }
    }

    #[test]
    fn test_load_garbage_fails() {
        assert!(ImageIOService::load_from_bytes(b"not an image").is_err());
    }
}
