//! Background remover CLI tool
//!
//! Removes image backgrounds with U2-Net family segmentation models, running
//! on ONNX Runtime or Tract.

#[cfg(feature = "cli")]
use bgremover::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> std::process::ExitCode {
    match cli::main().await {
        Ok(code) => code,
        Err(e) => {
            println!("❌ Error: {e:#}");
            std::process::ExitCode::FAILURE
        },
    }
}

#[cfg(not(feature = "cli"))]
fn main() -> std::process::ExitCode {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::ExitCode::FAILURE
}
