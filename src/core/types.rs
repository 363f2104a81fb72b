//! Core types for conversion settings, sources and results.

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::utils::OutputFormat;

/// Configuration shared by every conversion in a session.
///
/// Conversions never read this while it can change: each one receives a
/// cloned snapshot taken just before it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionConfig {
    /// Target container for re-encoding
    pub output_format: OutputFormat,
    /// Encoder quality in [0, 1], only used by lossy formats
    pub quality: f32,
    /// Derive the missing dimension from the source ratio
    pub keep_aspect_ratio: bool,
    /// Target width in pixels, `None` keeps the source width
    pub explicit_width: Option<u32>,
    /// Target height in pixels, `None` keeps the source height
    pub explicit_height: Option<u32>,
    /// Uniform downscale cap applied after width/height resolution
    pub max_dimension: Option<u32>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Jpeg,
            quality: 0.8,
            keep_aspect_ratio: true,
            explicit_width: None,
            explicit_height: None,
            max_dimension: None,
        }
    }
}

impl ConversionConfig {
    /// Quality handed to the encoder; lossless formats always get 1.0.
    pub fn effective_quality(&self) -> f32 {
        if self.output_format.is_lossy() {
            self.quality
        } else {
            1.0
        }
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Stable handle to a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub(crate) usize);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A user-supplied file: its name and original bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Output of one conversion before it is attached to an entry.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Converted output held by a ready entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Source name with the extension of the output format
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Artifact {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Aggregate outcome of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_ignored_for_lossless() {
        let png = ConversionConfig {
            output_format: OutputFormat::Png,
            quality: 0.3,
            ..ConversionConfig::default()
        };
        assert_eq!(png.effective_quality(), 1.0);

        let webp = ConversionConfig {
            output_format: OutputFormat::Webp,
            quality: 0.3,
            ..ConversionConfig::default()
        };
        assert_eq!(webp.effective_quality(), 0.3);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let config: ConversionConfig =
            serde_json::from_str(r#"{"outputFormat":"image/png","explicitWidth":640}"#).unwrap();
        assert_eq!(config.output_format, OutputFormat::Png);
        assert_eq!(config.explicit_width, Some(640));
        assert_eq!(config.explicit_height, None);
        assert_eq!(config.quality, 0.8);
        assert!(config.keep_aspect_ratio);
    }
}
