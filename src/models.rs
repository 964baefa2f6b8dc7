//! Segmentation model catalogue
//!
//! The set of supported models is closed: every model the tool can load is a
//! variant of [`ModelKind`], so an unsupported model name is rejected where the
//! name is parsed rather than deep inside session creation.

use crate::error::{BgRemovalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Release location of the pretrained U2-Net family weights
const MODEL_RELEASE_URL: &str = "https://github.com/danielgatis/rembg/releases/download/v0.0.0";

/// ImageNet channel means shared by every supported model
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet channel standard deviations used by the U2-Net variants
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Supported segmentation models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelKind {
    /// General purpose U2-Net
    #[default]
    #[serde(rename = "u2net")]
    U2Net,
    /// U2-Net trained for human segmentation
    #[serde(rename = "u2net_human_seg")]
    U2NetHumanSeg,
    /// `ISNet` (DIS) high quality general use model
    #[serde(rename = "isnet-general-use")]
    IsNetGeneralUse,
    /// Compact U2-Net variant tuned for objects
    #[serde(rename = "silueta")]
    Silueta,
}

/// Model-specific preprocessing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Square model input size as `[width, height]`
    pub target_size: [u32; 2],
    /// Per-channel mean subtracted after scaling to 0..1
    pub normalization_mean: [f32; 3],
    /// Per-channel standard deviation divided after mean subtraction
    pub normalization_std: [f32; 3],
}

impl ModelKind {
    /// Every supported model, in CLI listing order
    pub const ALL: [Self; 4] = [
        Self::U2Net,
        Self::U2NetHumanSeg,
        Self::IsNetGeneralUse,
        Self::Silueta,
    ];

    /// Canonical model name, as accepted by `--model`
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::U2Net => "u2net",
            Self::U2NetHumanSeg => "u2net_human_seg",
            Self::IsNetGeneralUse => "isnet-general-use",
            Self::Silueta => "silueta",
        }
    }

    /// Short human readable description
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::U2Net => "General purpose (default)",
            Self::U2NetHumanSeg => "Better for humans",
            Self::IsNetGeneralUse => "High quality general use",
            Self::Silueta => "Good for objects",
        }
    }

    /// File name of the ONNX weights inside the model cache
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.onnx", self.name())
    }

    /// URL the ONNX weights are downloaded from
    #[must_use]
    pub fn download_url(self) -> String {
        format!("{}/{}", MODEL_RELEASE_URL, self.file_name())
    }

    /// Preprocessing parameters the model was trained with
    #[must_use]
    pub fn preprocessing_config(self) -> PreprocessingConfig {
        match self {
            Self::U2Net | Self::U2NetHumanSeg | Self::Silueta => PreprocessingConfig {
                target_size: [320, 320],
                normalization_mean: IMAGENET_MEAN,
                normalization_std: IMAGENET_STD,
            },
            Self::IsNetGeneralUse => PreprocessingConfig {
                target_size: [1024, 1024],
                normalization_mean: [0.5, 0.5, 0.5],
                normalization_std: [1.0, 1.0, 1.0],
            },
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = BgRemovalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|kind| kind.name()).collect();
                BgRemovalError::invalid_config(format!(
                    "Unknown model '{}'. Available models: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn test_unknown_model_rejected() {
        let err = "u2netp".parse::<ModelKind>().unwrap_err();
        assert!(matches!(err, BgRemovalError::InvalidConfig(_)));
        assert!(err.to_string().contains("isnet-general-use"));
    }

    #[test]
    fn test_default_is_general_purpose() {
        assert_eq!(ModelKind::default(), ModelKind::U2Net);
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            ModelKind::Silueta.download_url(),
            "https://github.com/danielgatis/rembg/releases/download/v0.0.0/silueta.onnx"
        );
        assert_eq!(ModelKind::U2NetHumanSeg.file_name(), "u2net_human_seg.onnx");
    }

    #[test]
    fn test_preprocessing_sizes() {
        assert_eq!(ModelKind::U2Net.preprocessing_config().target_size, [320, 320]);
        let isnet = ModelKind::IsNetGeneralUse.preprocessing_config();
        assert_eq!(isnet.target_size, [1024, 1024]);
        assert_eq!(isnet.normalization_mean, [0.5, 0.5, 0.5]);
        assert_eq!(isnet.normalization_std, [1.0, 1.0, 1.0]);

        let u2net = ModelKind::U2Net.preprocessing_config();
        assert_eq!(u2net.normalization_mean, [0.485, 0.456, 0.406]);
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&ModelKind::IsNetGeneralUse).unwrap();
        assert_eq!(json, "\"isnet-general-use\"");
        let kind: ModelKind = serde_json::from_str("\"u2net_human_seg\"").unwrap();
        assert_eq!(kind, ModelKind::U2NetHumanSeg);
    }
}
