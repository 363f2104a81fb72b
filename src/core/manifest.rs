//! Job description consumed by the command-line driver.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::core::ConversionConfig;
use crate::processing::DEFAULT_ARCHIVE_NAME;
use crate::utils::{ConverterError, ConverterResult, validate_settings};

/// Everything needed to run one conversion job without interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Conversion settings for every input
    #[serde(default)]
    pub settings: ConversionConfig,
    /// Input image paths, relative ones resolved against the manifest's directory
    pub inputs: Vec<PathBuf>,
    /// Directory receiving converted files and the archive
    pub output_dir: PathBuf,
    /// Archive name without extension; `null` skips the archive
    #[serde(default = "default_archive_name")]
    pub archive_name: Option<String>,
    /// Whether each converted file is also written on its own
    #[serde(default = "default_write_individual")]
    pub write_individual: bool,
}

fn default_archive_name() -> Option<String> {
    Some(DEFAULT_ARCHIVE_NAME.to_string())
}

fn default_write_individual() -> bool {
    true
}

impl Manifest {
    /// Reads, parses and validates a manifest file.
    pub async fn load(path: impl AsRef<Path>) -> ConverterResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConverterError::io(format!("Cannot read manifest {}: {e}", path.display())))?;

        let manifest = Self::from_json(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(manifest.relative_to(base))
    }

    pub fn from_json(text: &str) -> ConverterResult<Self> {
        let manifest: Self = serde_json::from_str(text)
            .map_err(|e| ConverterError::validation(format!("Invalid manifest: {e}")))?;
        validate_settings(&manifest.settings)?;
        Ok(manifest)
    }

    /// Resolves relative input and output paths against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        for input in &mut self.inputs {
            if input.is_relative() {
                *input = base.join(&*input);
            }
        }
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
        self
    }
}
