//! Background removal command-line interface

use super::config::CliConfigBuilder;
use crate::{
    cache::{format_size, ModelCache},
    download::ModelDownloader,
    models::ModelKind,
    processor::BackgroundRemover,
    segmentation::ModelSession,
    services::ConsoleProgressReporter,
    utils::ExecutionProviderManager,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

/// High-quality background remover
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgremover")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image file or folder path
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output file or folder path
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Segmentation model to use for background removal [default: u2net]
    #[arg(short, long, value_enum)]
    pub model: Option<CliModel>,

    /// Disable quality enhancement
    #[arg(long)]
    pub no_enhance: bool,

    /// Process all images in folder
    #[arg(long)]
    pub batch: bool,

    /// Execution provider in format backend:provider (e.g., onnx:auto, onnx:coreml, tract:cpu)
    #[arg(short, long, default_value = "onnx:auto")]
    pub execution_provider: String,

    /// Number of threads (0 = auto-detect optimal threading)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON file overriding enhancement parameters
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List cached models and exit
    #[arg(long)]
    pub list_models: bool,

    /// Download the selected model but don't process any images
    #[arg(long)]
    pub only_download: bool,

    /// Clear cached models (combine with --model to clear a specific model)
    #[arg(long)]
    pub clear_cache: bool,

    /// Show execution provider diagnostics and exit
    #[arg(long)]
    pub show_providers: bool,
}

/// Model names accepted on the command line
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliModel {
    /// General purpose
    #[value(name = "u2net")]
    U2Net,
    /// Human segmentation
    #[value(name = "u2net_human_seg")]
    U2NetHumanSeg,
    /// High quality general use
    #[value(name = "isnet-general-use")]
    IsNetGeneralUse,
    /// Object focused
    #[value(name = "silueta")]
    Silueta,
}

impl From<CliModel> for ModelKind {
    fn from(model: CliModel) -> Self {
        match model {
            CliModel::U2Net => Self::U2Net,
            CliModel::U2NetHumanSeg => Self::U2NetHumanSeg,
            CliModel::IsNetGeneralUse => Self::IsNetGeneralUse,
            CliModel::Silueta => Self::Silueta,
        }
    }
}

/// Run the CLI, returning the process exit code
///
/// # Errors
/// Top-level failures: invalid arguments, model download or session creation,
/// a missing batch folder. The caller maps them to exit code 1.
pub async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    crate::tracing_config::init_cli_tracing(cli.verbose)
        .context("Failed to initialize tracing")?;

    if cli.show_providers {
        show_provider_diagnostics();
        return Ok(ExitCode::SUCCESS);
    }

    if cli.list_models {
        list_cached_models()?;
        return Ok(ExitCode::SUCCESS);
    }

    if cli.clear_cache {
        clear_cache_models(cli.model.map(ModelKind::from))?;
        return Ok(ExitCode::SUCCESS);
    }

    if cli.only_download {
        let model = cli.model.map(ModelKind::from).unwrap_or_default();
        download_model_only(model).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(input) = cli.input.as_deref() else {
        print_usage();
        return Ok(ExitCode::SUCCESS);
    };

    let config = CliConfigBuilder::from_cli(&cli).context("Invalid configuration")?;
    debug!(?config, "Resolved configuration");

    println!(
        "🚀 Initializing Background Remover with {} model...",
        config.model
    );

    let downloader = ModelDownloader::new().context("Failed to create model downloader")?;
    downloader
        .ensure_model(config.model, true)
        .await
        .with_context(|| format!("Failed to download model '{}'", config.model))?;

    let session = ModelSession::from_cache(&config, downloader.cache())
        .context("Failed to create model session")?;

    let mut remover = BackgroundRemover::new(session, &config)
        .with_reporter(Arc::new(ConsoleProgressReporter::new(cli.verbose > 0)));

    if is_batch_input(input, cli.batch) {
        let written = remover
            .batch_remove(input, cli.output.as_deref())
            .with_context(|| format!("Batch processing of '{}' failed", input.display()))?;
        info!(count = written.len(), "Batch complete");
        return Ok(ExitCode::SUCCESS);
    }

    match remover.remove_background(input, cli.output.as_deref()) {
        Some(_) => Ok(ExitCode::SUCCESS),
        None => Ok(ExitCode::FAILURE),
    }
}

fn print_usage() {
    println!("🎯 High-Quality Background Remover");
    println!("{}", "=".repeat(40));
    println!("\nUsage examples:");
    println!("bgremover image.jpg");
    println!("bgremover image.jpg -o output.png");
    println!("bgremover folder/ --batch");
    println!("bgremover image.jpg -m u2net_human_seg");
    println!("\nModels are downloaded on first use. Run `bgremover --help` for all options.");
}

fn show_provider_diagnostics() {
    println!("🔍 Backend and Execution Provider Diagnostics");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let cpu_count = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    println!("💻 System: {cpu_count} CPU cores detected");

    println!("\n🔧 Available Backends:");
    println!("  • onnx: ONNX Runtime backend (default) - Full hardware acceleration support");
    println!("  • tract: Pure Rust backend - No external dependencies");

    println!("\n🚀 Execution Providers:");
    for provider_info in ExecutionProviderManager::list_all_providers() {
        let status = if provider_info.available {
            "✅ Available"
        } else {
            "❌ Not Available"
        };
        println!(
            "  • {}: {} - {}",
            provider_info.name, status, provider_info.description
        );
    }

    println!("\n💡 Usage Examples:");
    println!("  --execution-provider onnx:auto    # Auto-select best ONNX provider (default)");
    println!("  --execution-provider onnx:coreml  # Use Apple CoreML (macOS)");
    println!("  --execution-provider onnx:cuda    # Use NVIDIA CUDA");
    println!("  --execution-provider onnx:cpu     # Force ONNX CPU execution");
    println!("  --execution-provider tract:cpu    # Use pure Rust Tract backend");
}

fn list_cached_models() -> Result<()> {
    let cache = ModelCache::new().context("Failed to initialize model cache")?;
    let cached = cache
        .scan_cached_models()
        .context("Failed to list cached models")?;

    println!("📦 Models (cache: {})", cache.cache_dir().display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for model in ModelKind::ALL {
        let entry = cached.iter().find(|info| info.model == model);
        let status = entry.map_or_else(
            || "not downloaded".to_string(),
            |info| format!("cached, {}", format_size(info.size_bytes)),
        );
        println!("  • {:<18} {} ({status})", model.name(), model.description());
    }

    println!("\n💡 To download a model ahead of time:");
    println!("  bgremover --only-download --model isnet-general-use");
    Ok(())
}

async fn download_model_only(model: ModelKind) -> Result<()> {
    let downloader = ModelDownloader::new().context("Failed to create model downloader")?;
    let path = downloader
        .ensure_model(model, true)
        .await
        .with_context(|| format!("Failed to download model '{model}'"))?;

    println!("✅ Model {model} available at {}", path.display());
    Ok(())
}

fn clear_cache_models(model: Option<ModelKind>) -> Result<()> {
    let cache = ModelCache::new().context("Failed to initialize model cache")?;

    if let Some(model) = model {
        if cache.clear_model(model)? {
            println!("🗑️  Removed cached model {model}");
        } else {
            println!("Model {model} was not cached");
        }
        return Ok(());
    }

    let removed = cache.clear_all().context("Failed to clear model cache")?;
    if removed.is_empty() {
        println!("Cache is already empty");
    } else {
        println!("🗑️  Removed {} cached model(s)", removed.len());
    }
    Ok(())
}

/// Whether a path should be processed in batch mode
#[must_use]
pub fn is_batch_input(path: &Path, force_batch: bool) -> bool {
    force_batch || path.is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["bgremover", "photo.jpg"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("photo.jpg")));
        assert_eq!(cli.model, None);
        assert_eq!(cli.execution_provider, "onnx:auto");
        assert!(!cli.no_enhance);
        assert!(!cli.batch);
    }

    #[test]
    fn test_parse_without_input() {
        let cli = Cli::try_parse_from(["bgremover"]).unwrap();
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_parse_full() {
        let cli = Cli::try_parse_from([
            "bgremover",
            "shots/",
            "-o",
            "out/",
            "-m",
            "u2net_human_seg",
            "--no-enhance",
            "--batch",
            "-e",
            "tract:cpu",
            "-t",
            "4",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(PathBuf::from("out/")));
        assert_eq!(cli.model, Some(CliModel::U2NetHumanSeg));
        assert!(cli.no_enhance);
        assert!(cli.batch);
        assert_eq!(cli.execution_provider, "tract:cpu");
        assert_eq!(cli.threads, 4);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_model_names() {
        for (name, kind) in [
            ("u2net", ModelKind::U2Net),
            ("u2net_human_seg", ModelKind::U2NetHumanSeg),
            ("isnet-general-use", ModelKind::IsNetGeneralUse),
            ("silueta", ModelKind::Silueta),
        ] {
            let cli = Cli::try_parse_from(["bgremover", "x.png", "-m", name]).unwrap();
            assert_eq!(cli.model.map(ModelKind::from), Some(kind));
        }
        assert!(Cli::try_parse_from(["bgremover", "x.png", "-m", "birefnet"]).is_err());
    }

    #[test]
    fn test_batch_detection() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_batch_input(dir.path(), false));
        assert!(is_batch_input(Path::new("anything.jpg"), true));
        assert!(!is_batch_input(&dir.path().join("file.jpg"), false));
    }
}
