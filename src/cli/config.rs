//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::{
    config::{EnhancementConfig, RemovalConfig},
    models::ModelKind,
    utils::ExecutionProviderManager,
};
use anyhow::{Context, Result};

/// Convert CLI arguments to a `RemovalConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `RemovalConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<RemovalConfig> {
        let (backend_type, execution_provider) =
            ExecutionProviderManager::parse_provider_string(&cli.execution_provider)
                .context("Invalid execution provider format")?;

        let enhancement = match &cli.config {
            Some(path) => EnhancementConfig::from_json_file(path)
                .with_context(|| format!("Failed to load '{}'", path.display()))?,
            None => EnhancementConfig::default(),
        };

        let config = RemovalConfig::builder()
            .model(cli.model.map(ModelKind::from).unwrap_or_default())
            .backend_type(backend_type)
            .execution_provider(execution_provider)
            .enhance(!cli.no_enhance)
            .enhancement(enhancement)
            .num_threads(cli.threads)
            .build()
            .context("Invalid configuration")?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::main_impl::CliModel;
    use crate::config::{BackendType, ExecutionProvider};
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["bgremover"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_cli_config_conversion() {
        let config = CliConfigBuilder::from_cli(&parse(&["photo.jpg"])).unwrap();

        assert_eq!(config.model, ModelKind::U2Net);
        assert_eq!(config.backend_type, BackendType::Onnx);
        assert_eq!(config.execution_provider, ExecutionProvider::Auto);
        assert!(config.enhance);
        assert_eq!(config.enhancement, EnhancementConfig::default());
        assert_eq!(config.intra_threads, 0);
    }

    #[test]
    fn test_no_enhance_and_model() {
        let mut cli = parse(&["photo.jpg", "--no-enhance"]);
        cli.model = Some(CliModel::Silueta);

        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert!(!config.enhance);
        assert_eq!(config.model, ModelKind::Silueta);
    }

    #[test]
    fn test_threads_and_tract() {
        let config =
            CliConfigBuilder::from_cli(&parse(&["photo.jpg", "-e", "tract:cpu", "-t", "8"]))
                .unwrap();
        assert_eq!(config.backend_type, BackendType::Tract);
        assert_eq!(config.execution_provider, ExecutionProvider::Cpu);
        assert_eq!(config.intra_threads, 8);
        assert_eq!(config.inter_threads, 4);
    }

    #[test]
    fn test_invalid_provider_rejected() {
        let cli = parse(&["photo.jpg", "-e", "invalid:provider"]);
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }

    #[test]
    fn test_enhancement_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enhance.json");
        std::fs::write(
            &path,
            r#"{
                "contrast_factor": 1.3,
                "sharpen_radius": 2.0,
                "sharpen_percent": 120,
                "sharpen_threshold": 5,
                "alpha_blur_kernel": 5,
                "alpha_blur_sigma": 1.0,
                "optimize_output": false
            }"#,
        )
        .unwrap();

        let cli = parse(&["photo.jpg", "--config", path.to_str().unwrap()]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.enhancement.alpha_blur_kernel, 5);
        assert_eq!(config.enhancement.sharpen_percent, 120);
        assert!(!config.enhancement.optimize_output);

        std::fs::write(&path, "not json").unwrap();
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }
}
