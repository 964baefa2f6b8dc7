//! Input format validation and output naming
//!
//! Formats are recognized by file extension only; file contents are never
//! sniffed here.

use std::path::{Path, PathBuf};

/// Extensions (lower-case, without the dot) accepted as input images
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// Suffix appended to the input stem when deriving an output file name
pub const OUTPUT_SUFFIX: &str = "_no_bg";

/// Extension of every produced file
pub const OUTPUT_EXTENSION: &str = "png";

/// Service for validating input formats and deriving output paths
pub struct FormatValidator;

impl FormatValidator {
    /// Lower-cased extension of a path, if it has one
    #[must_use]
    pub fn extension_of(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// Check whether a path carries one of the supported image extensions
    ///
    /// # Examples
    /// ```rust
    /// use bgremover::services::FormatValidator;
    /// use std::path::Path;
    ///
    /// assert!(FormatValidator::is_supported(Path::new("photo.JPG")));
    /// assert!(!FormatValidator::is_supported(Path::new("clip.gif")));
    /// ```
    #[must_use]
    pub fn is_supported(path: &Path) -> bool {
        Self::extension_of(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Output file name for an input: `<stem>_no_bg.png`
    #[must_use]
    pub fn output_file_name(input: &Path) -> String {
        let stem = input
            .file_stem()
            .map_or_else(|| "output".into(), |stem| stem.to_string_lossy());
        format!("{stem}{OUTPUT_SUFFIX}.{OUTPUT_EXTENSION}")
    }

    /// Default output path, next to the input file
    #[must_use]
    pub fn default_output_path(input: &Path) -> PathBuf {
        input.with_file_name(Self::output_file_name(input))
    }

    /// Output path for an input inside a designated directory
    #[must_use]
    pub fn output_path_in(dir: &Path, input: &Path) -> PathBuf {
        dir.join(Self::output_file_name(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        for name in [
            "a.jpg", "a.jpeg", "a.png", "a.bmp", "a.tiff", "a.webp", "A.PNG", "b.JpEg",
        ] {
            assert!(FormatValidator::is_supported(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["a.gif", "a.tif", "a.txt", "noext", ".png.bak", "dir/"] {
            assert!(!FormatValidator::is_supported(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            FormatValidator::default_output_path(Path::new("shots/photo.jpg")),
            PathBuf::from("shots/photo_no_bg.png")
        );
        assert_eq!(
            FormatValidator::default_output_path(Path::new("portrait.webp")),
            PathBuf::from("portrait_no_bg.png")
        );
    }

    #[test]
    fn test_output_path_in_directory() {
        assert_eq!(
            FormatValidator::output_path_in(Path::new("out"), Path::new("in/cat.tiff")),
            PathBuf::from("out/cat_no_bg.png")
        );
    }
}
