// Command-line driver: runs one manifest-described conversion job.
// The lib.rs file is the public API; everything here is wiring.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use image_converter_lib::{Manifest, convert_images};
use image_converter_lib::utils::format_bytes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)          // Keep colored output
        .with_writer(std::io::stderr)
        .compact();               // Use compact formatter instead of pretty

    subscriber.init();

    let manifest_path = std::env::args_os()
        .nth(1)
        .context("usage: image-converter <manifest.json>")?;

    info!("=== Image converter starting ===");

    let manifest = Manifest::load(&manifest_path)
        .await
        .with_context(|| format!("loading manifest {}", manifest_path.to_string_lossy()))?;

    let summary = convert_images(manifest).await.context("conversion job failed")?;

    let mut written_bytes = 0u64;
    for path in &summary.written {
        if let Ok(meta) = tokio::fs::metadata(path).await {
            written_bytes += meta.len();
        }
    }

    info!(
        "Done: {} converted, {} failed, {} skipped, {} written",
        summary.report.succeeded,
        summary.report.failed,
        summary.skipped.len(),
        format_bytes(written_bytes)
    );
    if let Some(archive) = &summary.archive {
        info!("Archive: {}", archive.display());
    }

    if summary.report.failed > 0 {
        std::process::exit(2);
    }
    Ok(())
}
