//! Conversion of a single source image.
//!
//! Decode, resample and encode are CPU-bound, so each conversion runs inside
//! `tokio::task::spawn_blocking` and the caller awaits it before moving on.

use std::sync::Arc;
use tracing::debug;

use crate::core::{ConversionConfig, ConversionResult};
use crate::utils::{ConverterResult, OutputFormat};

use super::codec::{ImageCodec, check_surface};
use super::geometry::resolve;

/// Converts `source` using a snapshot of the session configuration.
///
/// `natural_w`/`natural_h` are the source dimensions recorded when the file
/// was added; the target size is resolved from them, not from the decoded
/// raster.
pub async fn convert(
    codec: Arc<dyn ImageCodec>,
    source: Arc<[u8]>,
    natural_w: u32,
    natural_h: u32,
    config: ConversionConfig,
) -> ConverterResult<ConversionResult> {
    tokio::task::spawn_blocking(move || {
        convert_blocking(codec.as_ref(), &source, natural_w, natural_h, &config)
    })
    .await?
}

/// Runs on the blocking pool.
fn convert_blocking(
    codec: &dyn ImageCodec,
    source: &[u8],
    natural_w: u32,
    natural_h: u32,
    config: &ConversionConfig,
) -> ConverterResult<ConversionResult> {
    let raster = codec.decode(source)?;
    let target = resolve(natural_w, natural_h, config);
    check_surface(target)?;

    debug!(
        "Rendering {}×{} → {} as {}",
        natural_w, natural_h, target, config.output_format
    );

    let surface = codec.render(raster, target);
    let bytes = codec.encode(&surface, &config.output_format, config.effective_quality())?;

    Ok(ConversionResult {
        bytes,
        width: target.width,
        height: target.height,
    })
}

/// Replaces the last extension of `name` with the canonical one for `format`.
///
/// Only the final `.segment` is stripped, and only when it is non-empty:
/// `archive.tar.gz` becomes `archive.tar.png`, `notes.` keeps its dot.
pub fn make_output_name(name: &str, format: &OutputFormat) -> String {
    let base = match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => &name[..idx],
        _ => name,
    };
    format!("{base}.{}", format.extension())
}
