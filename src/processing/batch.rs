//! Sequential batch runs over the registry.
//!
//! Entries are converted one at a time in insertion order. Each entry gets a
//! fresh configuration snapshot, and its outcome is recorded on the entry
//! before the next progress event goes out.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::core::{Artifact, BatchReport, ConversionConfig, Dimensions, EntryId, Progress, ProgressType};
use crate::utils::{ConverterError, ConverterResult, format_bytes};

use super::codec::ImageCodec;
use super::convert::{convert, make_output_name};
use super::registry::FileRegistry;

/// Drives conversions over the registry, one entry at a time.
///
/// Per-entry decode/encode failures are recorded on the entry and never
/// abort a batch.
pub struct BatchController {
    codec: Arc<dyn ImageCodec>,
}

impl BatchController {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self { codec }
    }

    /// Converts every entry registered when the run starts, in insertion order.
    ///
    /// The configuration is read from `config` right before each entry, so a
    /// change published mid-batch applies to the entries not yet started.
    /// `progress_callback` gets a `Start` event and then one event per entry;
    /// the last one is always at 100%.
    pub async fn run_all(
        &self,
        registry: &mut FileRegistry,
        config: &watch::Receiver<ConversionConfig>,
        mut progress_callback: impl FnMut(&Progress),
    ) -> BatchReport {
        let ids = registry.ids();
        let total = ids.len();
        let mut report = BatchReport::default();

        if total == 0 {
            debug!("Nothing to convert");
            return report;
        }

        info!("Converting batch of {} images", total);
        progress_callback(&Progress::new(ProgressType::Start, 0, total, "processing"));

        for (idx, id) in ids.into_iter().enumerate() {
            let completed = idx + 1;
            let snapshot = config.borrow().clone();
            let outcome = self.convert_entry(registry, id, &snapshot).await;

            let file_name = registry
                .get(id)
                .map(|entry| entry.name().to_string())
                .unwrap_or_default();

            let progress = match outcome {
                Ok(summary) => {
                    report.succeeded += 1;
                    let progress_type = if completed == total {
                        ProgressType::Complete
                    } else {
                        ProgressType::Progress
                    };
                    Progress::new(progress_type, completed, total, "processing")
                        .with_file_name(file_name)
                        .with_metadata(serde_json::json!({
                            "outputName": summary.file_name,
                            "width": summary.width,
                            "height": summary.height,
                            "outputSize": summary.bytes,
                        }))
                }
                Err(e) => {
                    report.failed += 1;
                    Progress::new(ProgressType::Error, completed, total, "error")
                        .with_file_name(file_name)
                        .with_error(e.to_string())
                }
            };

            progress_callback(&progress);
        }

        if report.failed > 0 {
            warn!(
                "Batch completed with {} failed images out of {}",
                report.failed, total
            );
        } else {
            info!("Batch completed successfully: {} images converted", report.succeeded);
        }

        report
    }

    /// Converts a single entry with the given configuration snapshot.
    ///
    /// The outcome is recorded on the entry either way; on success a summary
    /// of the stored artifact is returned as well.
    pub async fn convert_entry(
        &self,
        registry: &mut FileRegistry,
        id: EntryId,
        config: &ConversionConfig,
    ) -> ConverterResult<ArtifactSummary> {
        registry.set_converting(id)?;

        let (name, source, natural) = {
            let entry = registry.get(id).ok_or(ConverterError::UnknownEntry(id))?;
            (entry.name().to_string(), entry.source_bytes(), entry.natural_size())
        };

        let result = match natural {
            Some(Dimensions { width, height }) => {
                convert(Arc::clone(&self.codec), source, width, height, config.clone()).await
            }
            None => Err(ConverterError::decode(format!(
                "{name}: image dimensions are unknown"
            ))),
        };

        match result {
            Ok(converted) => {
                let artifact = Artifact {
                    file_name: make_output_name(&name, &config.output_format),
                    bytes: converted.bytes,
                    width: converted.width,
                    height: converted.height,
                };
                let summary = ArtifactSummary::from(&artifact);
                debug!(
                    "{} converted to {} ({}, {})",
                    name,
                    summary.file_name,
                    artifact.dimensions(),
                    format_bytes(summary.bytes as u64)
                );
                registry.set_ready(id, artifact)?;
                Ok(summary)
            }
            Err(e) => {
                if e.is_per_entry() {
                    warn!("Conversion failed for {}: {}", name, e);
                } else {
                    warn!("Conversion of {} did not complete: {}", name, e);
                }
                // Either way the entry must not stay in Converting
                registry.set_failed(id, e.to_string())?;
                Err(e)
            }
        }
    }
}

/// What a successful conversion stored, without copying the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// Encoded size in bytes
    pub bytes: usize,
}

impl From<&Artifact> for ArtifactSummary {
    fn from(artifact: &Artifact) -> Self {
        Self {
            file_name: artifact.file_name.clone(),
            width: artifact.width,
            height: artifact.height,
            bytes: artifact.bytes.len(),
        }
    }
}
