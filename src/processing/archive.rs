//! Bundles converted artifacts into a single ZIP archive.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use tracing::{debug, info, warn};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::utils::{ConverterError, ConverterResult, format_bytes};

use super::registry::FileRegistry;

/// Archive name used when the caller leaves it blank
pub const DEFAULT_ARCHIVE_NAME: &str = "converted_images";

/// A packed archive and the file name it should be saved under.
#[derive(Debug, Clone)]
pub struct ExportedArchive {
    /// `<archive name>.zip`
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Number of files inside the archive
    pub entries: usize,
}

/// Packs every ready entry of `registry` into one archive.
///
/// Entries keep registry order. When two entries resolve to the same output
/// name the later one's bytes win and the archive holds a single file.
pub async fn export(registry: &FileRegistry, archive_name: &str) -> ConverterResult<ExportedArchive> {
    let files = collect_ready(registry)?;
    let file_name = archive_file_name(archive_name);

    debug!("Packing {} files into {}", files.len(), file_name);
    let entries = files.len();
    let bytes = tokio::task::spawn_blocking(move || pack(files)).await??;

    info!("Archive {} ready ({})", file_name, format_bytes(bytes.len() as u64));
    Ok(ExportedArchive {
        file_name,
        bytes,
        entries,
    })
}

/// `<name>.zip`, falling back to [`DEFAULT_ARCHIVE_NAME`] for blank names.
pub fn archive_file_name(archive_name: &str) -> String {
    let name = archive_name.trim();
    let name = if name.is_empty() { DEFAULT_ARCHIVE_NAME } else { name };
    format!("{name}.zip")
}

/// Ready artifacts as `(name, bytes)`, deduplicated by name.
fn collect_ready(registry: &FileRegistry) -> ConverterResult<Vec<(String, Vec<u8>)>> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for artifact in registry.all().iter().filter_map(|entry| entry.artifact()) {
        match positions.get(&artifact.file_name) {
            Some(&idx) => {
                warn!("Duplicate output name {}, keeping the later file", artifact.file_name);
                files[idx].1 = artifact.bytes.clone();
            }
            None => {
                positions.insert(artifact.file_name.clone(), files.len());
                files.push((artifact.file_name.clone(), artifact.bytes.clone()));
            }
        }
    }

    if files.is_empty() {
        return Err(ConverterError::EmptyExport);
    }
    Ok(files)
}

/// Runs on the blocking pool.
fn pack(files: Vec<(String, Vec<u8>)>) -> ConverterResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in files {
        writer.start_file(name, options)?;
        writer
            .write_all(&bytes)
            .map_err(|e| ConverterError::archive(format!("Failed to write archive entry: {e}")))?;
    }

    Ok(writer.finish()?.into_inner())
}
