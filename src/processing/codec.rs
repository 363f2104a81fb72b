//! Decode, resample and encode primitives behind a swappable seam.
//!
//! [`RasterCodec`] is the default implementation on top of the `image` crate.
//! Quality arrives in [0, 1] and is mapped to each encoder's own scale.
//! Targets larger than [`MAX_SURFACE_BYTES`] are refused before anything is
//! allocated for them.

use std::io::Cursor;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::core::Dimensions;
use crate::utils::{ConverterError, ConverterResult, OutputFormat};

type Result<T> = ConverterResult<T>;

/// Largest render surface, as RGBA8 bytes (16384×16384 pixels).
pub const MAX_SURFACE_BYTES: u64 = 1 << 30;

/// Fails with an encode error when `target` would not fit in [`MAX_SURFACE_BYTES`].
pub fn check_surface(target: Dimensions) -> Result<()> {
    let bytes = u64::from(target.width)
        .checked_mul(u64::from(target.height))
        .and_then(|pixels| pixels.checked_mul(4));
    match bytes {
        Some(bytes) if bytes <= MAX_SURFACE_BYTES => Ok(()),
        _ => Err(ConverterError::encode(format!("Target surface too large: {target}"))),
    }
}

/// Image primitives used by the conversion task.
pub trait ImageCodec: Send + Sync {
    /// Reads the natural dimensions without decoding pixel data.
    fn probe(&self, bytes: &[u8]) -> Result<Dimensions>;

    /// Rasterizes `bytes` into an in-memory image.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;

    /// Draws `image` onto a surface of exactly `target`.
    fn render(&self, image: DynamicImage, target: Dimensions) -> DynamicImage {
        if image.width() == target.width && image.height() == target.height {
            return image;
        }
        image.resize_exact(target.width, target.height, FilterType::Lanczos3)
    }

    /// Encodes `image` into `format`. `quality` is already 1.0 for lossless formats.
    fn encode(&self, image: &DynamicImage, format: &OutputFormat, quality: f32) -> Result<Vec<u8>>;
}

/// Default codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    fn probe(&self, bytes: &[u8]) -> Result<Dimensions> {
        let (width, height) = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ConverterError::decode(format!("Cannot read image header: {e}")))?
            .into_dimensions()
            .map_err(|e| ConverterError::decode(format!("Cannot read image header: {e}")))?;
        Ok(Dimensions::new(width, height))
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes)
            .map_err(|e| ConverterError::decode(format!("Failed to decode image: {e}")))
    }

    fn encode(&self, image: &DynamicImage, format: &OutputFormat, quality: f32) -> Result<Vec<u8>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ConverterError::encode("Cannot encode a zero-area surface"));
        }

        match format {
            OutputFormat::Jpeg => encode_jpeg(image, quality),
            OutputFormat::Png => encode_png(image),
            OutputFormat::Webp => encode_webp(image, quality),
            OutputFormat::Other(mime) => encode_other(image, mime),
        }
    }
}

/// Maps [0, 1] onto the JPEG encoder's 1-100 scale.
fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encodes as baseline JPEG. Alpha is dropped since JPEG cannot carry it.
fn encode_jpeg(image: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality));
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| ConverterError::encode(format!("JPEG encode failed: {e}")))?;
    Ok(bytes)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_with_encoder(PngEncoder::new(&mut bytes))
        .map_err(|e| ConverterError::encode(format!("PNG encode failed: {e}")))?;
    Ok(bytes)
}

/// Maps [0, 1] onto libwebp's 0-100 scale.
fn webp_quality(quality: f32) -> f32 {
    quality.clamp(0.0, 1.0) * 100.0
}

/// Encodes as lossy WebP through libwebp.
fn encode_webp(image: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    let memory = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(false, webp_quality(quality))
        .map_err(|e| ConverterError::encode(format!("WebP encode failed: {e:?}")))?;
    Ok(memory.to_vec())
}

/// Encodes into any other container the `image` crate can write.
fn encode_other(image: &DynamicImage, mime: &str) -> Result<Vec<u8>> {
    let format = ImageFormat::from_mime_type(mime)
        .ok_or_else(|| ConverterError::encode(format!("Unsupported output format: {mime}")))?;

    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, format)
        .map_err(|e| ConverterError::encode(format!("{mime} encode failed: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn sample(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 120, 200])))
    }

    #[test]
    fn png_roundtrip_keeps_dimensions() {
        let codec = RasterCodec;
        let bytes = codec.encode(&sample(7, 3), &OutputFormat::Png, 1.0).unwrap();
        assert_eq!(codec.probe(&bytes).unwrap(), Dimensions::new(7, 3));
        assert_eq!(codec.decode(&bytes).unwrap().width(), 7);
    }

    #[test]
    fn jpeg_accepts_alpha_input() {
        let codec = RasterCodec;
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 128])));
        let bytes = codec.encode(&rgba, &OutputFormat::Jpeg, 0.5).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn webp_container_is_written() {
        let codec = RasterCodec;
        let bytes = codec.encode(&sample(5, 5), &OutputFormat::Webp, 0.8).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::WebP);
    }

    /// Deterministic high-entropy content so lossy settings make a difference.
    fn noisy(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(2_654_435_761).wrapping_add(y.wrapping_mul(40_503));
            Rgb([(v >> 3) as u8, (v >> 11) as u8, (v >> 19) as u8])
        }))
    }

    #[test]
    fn webp_quality_changes_output_size() {
        let codec = RasterCodec;
        let image = noisy(64, 64);
        let low = codec.encode(&image, &OutputFormat::Webp, 0.05).unwrap();
        let high = codec.encode(&image, &OutputFormat::Webp, 0.95).unwrap();

        assert_eq!(image::guess_format(&low).unwrap(), ImageFormat::WebP);
        assert!(low.len() < high.len(), "q0.05 = {} bytes, q0.95 = {} bytes", low.len(), high.len());
        assert_eq!(webp_quality(0.8), 80.0);
    }

    #[test]
    fn surface_limit() {
        assert!(check_surface(Dimensions::new(16384, 16384)).is_ok());
        assert!(matches!(
            check_surface(Dimensions::new(16384, 16385)),
            Err(ConverterError::Encode(_))
        ));
        assert!(matches!(
            check_surface(Dimensions::new(u32::MAX, u32::MAX)),
            Err(ConverterError::Encode(_))
        ));
    }

    #[test]
    fn other_formats_by_mime() {
        let codec = RasterCodec;
        let bmp = codec
            .encode(&sample(2, 2), &OutputFormat::Other("image/bmp".into()), 1.0)
            .unwrap();
        assert_eq!(image::guess_format(&bmp).unwrap(), ImageFormat::Bmp);

        let unknown = codec.encode(&sample(2, 2), &OutputFormat::Other("image/x-nope".into()), 1.0);
        assert!(matches!(unknown, Err(ConverterError::Encode(_))));
    }

    #[test]
    fn zero_area_is_refused() {
        let codec = RasterCodec;
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            codec.encode(&empty, &OutputFormat::Png, 1.0),
            Err(ConverterError::Encode(_))
        ));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let codec = RasterCodec;
        assert!(matches!(codec.probe(b"not an image"), Err(ConverterError::Decode(_))));
        assert!(matches!(codec.decode(b"not an image"), Err(ConverterError::Decode(_))));
    }

    #[test]
    fn render_hits_exact_target() {
        let codec = RasterCodec;
        let out = codec.render(sample(10, 10), Dimensions::new(4, 9));
        assert_eq!((out.width(), out.height()), (4, 9));
    }

    #[test]
    fn quality_mapping() {
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(0.8), 80);
        assert_eq!(jpeg_quality(1.0), 100);
    }
}
