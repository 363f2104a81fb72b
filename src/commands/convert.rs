//! Manifest-driven conversion job.

use std::path::PathBuf;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::{BatchReport, Manifest, ProgressType, Session, SourceFile};
use crate::utils::{
    ConverterError, ConverterResult, format_bytes, is_image_path, read_source, write_artifact,
};

/// What a job produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Conversion outcome over the registered inputs
    pub report: BatchReport,
    /// Inputs that were not images or could not be read
    pub skipped: Vec<PathBuf>,
    /// Individually written artifacts
    pub written: Vec<PathBuf>,
    /// Archive path, when one was requested and anything converted
    pub archive: Option<PathBuf>,
}

/// Converts every input of `manifest` and writes the results.
///
/// Inputs that are not images or cannot be read are skipped. Conversion
/// failures are counted in the report. An archive with nothing to export is
/// skipped with a warning; any other export or write error is returned.
///
/// # Arguments
/// * `manifest` - Settings, inputs and output locations for the job
///
/// # Returns
/// The batch report plus the paths that were written.
pub async fn convert_images(manifest: Manifest) -> ConverterResult<RunSummary> {
    let mut session = Session::new();
    session.replace_config(manifest.settings.clone())?;

    let mut sources: Vec<SourceFile> = Vec::with_capacity(manifest.inputs.len());
    let mut skipped = Vec::new();
    for input in &manifest.inputs {
        if !is_image_path(input) {
            warn!("Skipping non-image input {}", input.display());
            skipped.push(input.clone());
            continue;
        }
        match read_source(input).await {
            Ok(source) => sources.push(source),
            Err(e) => {
                warn!("Skipping {}: {}", input.display(), e);
                skipped.push(input.clone());
            }
        }
    }

    session.add_files(sources);

    let report = session
        .convert_all(|progress| match progress.progress_type {
            ProgressType::Start => debug!("Starting {} conversions", progress.total_tasks),
            ProgressType::Error => warn!(
                "[{}%] {} failed: {}",
                progress.progress_percentage,
                progress.file_name.as_deref().unwrap_or_default(),
                progress.error.as_deref().unwrap_or_default()
            ),
            _ => info!(
                "[{}%] {} converted",
                progress.progress_percentage,
                progress.file_name.as_deref().unwrap_or_default()
            ),
        })
        .await;

    let mut written = Vec::new();
    if manifest.write_individual {
        for artifact in session.registry().all().iter().filter_map(|e| e.artifact()) {
            write_artifact(&manifest.output_dir, artifact).await?;
            written.push(manifest.output_dir.join(&artifact.file_name));
        }
    }

    let archive = match &manifest.archive_name {
        Some(name) => match session.export(name).await {
            Ok(exported) => {
                tokio::fs::create_dir_all(&manifest.output_dir).await?;
                let path = manifest.output_dir.join(&exported.file_name);
                tokio::fs::write(&path, &exported.bytes).await?;
                info!(
                    "Wrote {} ({} files, {})",
                    path.display(),
                    exported.entries,
                    format_bytes(exported.bytes.len() as u64)
                );
                Some(path)
            }
            Err(ConverterError::EmptyExport) => {
                warn!("No converted images, archive not written");
                None
            }
            Err(e) => return Err(e),
        },
        None => None,
    };

    Ok(RunSummary {
        report,
        skipped,
        written,
        archive,
    })
}
