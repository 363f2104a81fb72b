use std::fmt;
use std::path::Path;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::utils::ConverterError;

/// Output container selected for re-encoding.
///
/// Serialized as a MIME type so unknown `image/*` identifiers survive a
/// settings round trip as [`OutputFormat::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
    Other(String),
}

impl OutputFormat {
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Other(mime) => mime,
        }
    }

    /// Whether the quality setting trades fidelity for size in this format
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Webp)
    }

    /// Canonical file extension, without the dot.
    ///
    /// Unknown formats use their MIME subtype, or `img` when there is none.
    pub fn extension(&self) -> &str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Other(mime) => match mime.split('/').nth(1) {
                Some(subtype) if !subtype.is_empty() => subtype,
                _ => "img",
            },
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

impl FromStr for OutputFormat {
    type Err = ConverterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_lowercase();
        match value.as_str() {
            "image/jpeg" | "jpeg" | "jpg" => Ok(Self::Jpeg),
            "image/png" | "png" => Ok(Self::Png),
            "image/webp" | "webp" => Ok(Self::Webp),
            "" => Err(ConverterError::validation("Output format cannot be empty")),
            other if other.contains('/') => Ok(Self::Other(other.to_string())),
            other => Err(ConverterError::validation(format!(
                "Unsupported output format: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = ConverterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutputFormat> for String {
    fn from(format: OutputFormat) -> Self {
        format.mime_type().to_string()
    }
}

/// Check whether a path looks like an image the converter can take as input
pub fn is_image_path(path: impl AsRef<Path>) -> bool {
    match path.as_ref().extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy().to_lowercase();
            matches!(
                ext.as_str(),
                "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp"
            )
        }
        None => false,
    }
}

/// Human-readable byte size: `0 B`, `1.5 KB`, `2.25 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);

    // Two decimals with trailing zeros dropped
    let mut number = format!("{value:.2}");
    if number.contains('.') {
        number = number.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{number} {}", UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mime_and_short_names() {
        assert_eq!("image/jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
        assert_eq!(
            "image/bmp".parse::<OutputFormat>().unwrap(),
            OutputFormat::Other("image/bmp".to_string())
        );
        assert!("tiff".parse::<OutputFormat>().is_err());
        assert!("".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn extension_falls_back_to_subtype() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Other("image/bmp".into()).extension(), "bmp");
        assert_eq!(OutputFormat::Other("image/".into()).extension(), "img");
        assert_eq!(OutputFormat::Other("weird".into()).extension(), "img");
    }

    #[test]
    fn lossy_formats() {
        assert!(OutputFormat::Jpeg.is_lossy());
        assert!(OutputFormat::Webp.is_lossy());
        assert!(!OutputFormat::Png.is_lossy());
        assert!(!OutputFormat::Other("image/gif".into()).is_lossy());
    }

    #[test]
    fn defaults_to_jpeg() {
        assert_eq!(OutputFormat::default(), OutputFormat::Jpeg);
    }

    #[test]
    fn serializes_as_mime_string() {
        let json = serde_json::to_string(&OutputFormat::Webp).unwrap();
        assert_eq!(json, "\"image/webp\"");
        let parsed: OutputFormat = serde_json::from_str("\"png\"").unwrap();
        assert_eq!(parsed, OutputFormat::Png);
    }

    #[test]
    fn image_paths() {
        assert!(is_image_path("a/b/photo.JPG"));
        assert!(is_image_path("x.webp"));
        assert!(!is_image_path("notes.txt"));
        assert!(!is_image_path("README"));
    }

    #[test]
    fn byte_sizes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 256 * 1024), "5.25 MB");
    }
}
