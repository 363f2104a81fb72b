//! Session state: the live settings, the registered files and the codec.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::core::{BatchReport, ConversionConfig, Dimensions, EntryId, Progress, SourceFile};
use crate::processing::{
    ArtifactSummary, BatchController, ExportedArchive, FileRegistry, ImageCodec, RasterCodec,
    export,
};
use crate::utils::{ConverterResult, OutputFormat, validate_settings};

/// One conversion session.
///
/// The settings live in a `watch` channel: setters publish a new value and
/// every conversion works on the snapshot it took when it started.
pub struct Session {
    config: watch::Sender<ConversionConfig>,
    registry: FileRegistry,
    codec: Arc<dyn ImageCodec>,
    controller: BatchController,
    /// Natural size of the first file of the most recent `add_files` call.
    reference_size: Option<Dimensions>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session with default settings and the `image`-backed codec.
    pub fn new() -> Self {
        Self::with_codec(Arc::new(RasterCodec))
    }

    pub fn with_codec(codec: Arc<dyn ImageCodec>) -> Self {
        let (config, _) = watch::channel(ConversionConfig::default());
        Self {
            config,
            registry: FileRegistry::new(),
            controller: BatchController::new(Arc::clone(&codec)),
            codec,
            reference_size: None,
        }
    }

    /// Snapshot of the current settings.
    pub fn config(&self) -> ConversionConfig {
        self.config.borrow().clone()
    }

    /// Receiver that always observes the latest settings.
    pub fn subscribe(&self) -> watch::Receiver<ConversionConfig> {
        self.config.subscribe()
    }

    /// Replaces all settings at once after validating them.
    pub fn replace_config(&self, config: ConversionConfig) -> ConverterResult<()> {
        validate_settings(&config)?;
        self.config.send_replace(config);
        Ok(())
    }

    pub fn set_output_format(&self, format: OutputFormat) {
        self.config.send_modify(|config| config.output_format = format);
    }

    /// Sets the encoder quality, clamped to [0, 1].
    pub fn set_quality(&self, quality: f32) {
        let quality = if quality.is_nan() { 1.0 } else { quality.clamp(0.0, 1.0) };
        self.config.send_modify(|config| config.quality = quality);
    }

    pub fn set_keep_aspect_ratio(&self, keep: bool) {
        self.config.send_modify(|config| config.keep_aspect_ratio = keep);
    }

    /// Sets the target width.
    ///
    /// With aspect ratio kept and a reference image loaded, the height is
    /// filled in from the reference image's ratio (not each file's own).
    pub fn set_explicit_width(&self, width: Option<u32>) {
        let width = width.filter(|w| *w > 0);
        let reference = self.reference_size;
        self.config.send_modify(|config| {
            config.explicit_width = width;
            if let (true, Some(w), Some(size)) = (config.keep_aspect_ratio, width, reference) {
                if size.width > 0 {
                    let ratio = f64::from(size.height) / f64::from(size.width);
                    config.explicit_height = Some(scaled_side(w, ratio));
                }
            }
        });
    }

    /// Sets the target height; the mirror image of [`Session::set_explicit_width`].
    pub fn set_explicit_height(&self, height: Option<u32>) {
        let height = height.filter(|h| *h > 0);
        let reference = self.reference_size;
        self.config.send_modify(|config| {
            config.explicit_height = height;
            if let (true, Some(h), Some(size)) = (config.keep_aspect_ratio, height, reference) {
                if size.height > 0 {
                    let ratio = f64::from(size.width) / f64::from(size.height);
                    config.explicit_width = Some(scaled_side(h, ratio));
                }
            }
        });
    }

    pub fn set_max_dimension(&self, max_dimension: Option<u32>) {
        let max_dimension = max_dimension.filter(|m| *m > 0);
        self.config.send_modify(|config| config.max_dimension = max_dimension);
    }

    /// Natural size used for the width/height auto-fill.
    pub fn reference_size(&self) -> Option<Dimensions> {
        self.reference_size
    }

    /// Registers `files` in order and reads their natural sizes.
    ///
    /// Files whose header cannot be read are still registered; converting
    /// them fails with a decode error. The first file of the call becomes the
    /// auto-fill reference when its header is readable.
    pub fn add_files(&mut self, files: Vec<SourceFile>) -> Vec<EntryId> {
        let mut ids = Vec::with_capacity(files.len());

        for (idx, file) in files.into_iter().enumerate() {
            let natural = match self.codec.probe(&file.bytes) {
                Ok(size) => {
                    debug!("Loaded '{}': {}", file.name, size);
                    Some(size)
                }
                Err(e) => {
                    warn!("Cannot read '{}': {}", file.name, e);
                    None
                }
            };

            if let (0, Some(size)) = (idx, natural) {
                self.reference_size = Some(size);
            }
            ids.push(self.registry.add(file, natural));
        }

        info!("Registered {} files ({} total)", ids.len(), self.registry.len());
        ids
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Converts one entry with the current settings.
    pub async fn convert_entry(&mut self, id: EntryId) -> ConverterResult<ArtifactSummary> {
        let snapshot = self.config();
        self.controller
            .convert_entry(&mut self.registry, id, &snapshot)
            .await
    }

    /// Converts every registered entry, reporting progress after each one.
    pub async fn convert_all(&mut self, progress_callback: impl FnMut(&Progress)) -> BatchReport {
        let config = self.subscribe();
        self.controller
            .run_all(&mut self.registry, &config, progress_callback)
            .await
    }

    /// Packs every ready entry into `<archive_name>.zip`.
    pub async fn export(&self, archive_name: &str) -> ConverterResult<ExportedArchive> {
        export(&self.registry, archive_name).await
    }

    /// Forgets every registered file and the auto-fill reference.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.reference_size = None;
    }
}

fn scaled_side(side: u32, ratio: f64) -> u32 {
    ((f64::from(side) * ratio).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use image::{ImageFormat, Rgb, RgbImage};
    use crate::processing::EntryStatus;
    use crate::utils::ConverterError;

    fn png(name: &str, width: u32, height: u32) -> SourceFile {
        let mut cursor = Cursor::new(Vec::new());
        RgbImage::from_pixel(width, height, Rgb([0, 0, 0]))
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        SourceFile::new(name, cursor.into_inner())
    }

    #[test]
    fn first_file_of_each_add_is_the_reference() {
        let mut session = Session::new();
        session.add_files(vec![png("wide.png", 200, 100), png("tall.png", 100, 200)]);
        assert_eq!(session.reference_size(), Some(Dimensions::new(200, 100)));

        session.add_files(vec![png("square.png", 50, 50)]);
        assert_eq!(session.reference_size(), Some(Dimensions::new(50, 50)));
    }

    #[test]
    fn unreadable_first_file_keeps_previous_reference() {
        let mut session = Session::new();
        session.add_files(vec![png("wide.png", 200, 100)]);
        let ids = session.add_files(vec![SourceFile::new("bad.png", b"nope".to_vec())]);

        assert_eq!(session.reference_size(), Some(Dimensions::new(200, 100)));
        assert!(session.registry().get(ids[0]).unwrap().natural_size().is_none());
    }

    #[test]
    fn width_autofills_height_from_reference() {
        let mut session = Session::new();
        session.add_files(vec![png("wide.png", 200, 100), png("tall.png", 100, 200)]);

        session.set_explicit_width(Some(80));
        let config = session.config();
        assert_eq!(config.explicit_width, Some(80));
        // Ratio of wide.png, even though tall.png has a different one
        assert_eq!(config.explicit_height, Some(40));

        session.set_explicit_height(Some(30));
        assert_eq!(session.config().explicit_width, Some(60));
    }

    #[test]
    fn no_autofill_without_aspect_or_reference() {
        let session = Session::new();
        session.set_explicit_width(Some(80));
        assert_eq!(session.config().explicit_height, None);

        let mut session = Session::new();
        session.add_files(vec![png("wide.png", 200, 100)]);
        session.set_keep_aspect_ratio(false);
        session.set_explicit_width(Some(80));
        assert_eq!(session.config().explicit_height, None);
    }

    #[test]
    fn setters_normalise_values() {
        let session = Session::new();
        session.set_quality(3.0);
        assert_eq!(session.config().quality, 1.0);
        session.set_quality(-1.0);
        assert_eq!(session.config().quality, 0.0);

        session.set_max_dimension(Some(0));
        assert_eq!(session.config().max_dimension, None);

        let invalid = ConversionConfig {
            quality: 2.0,
            ..ConversionConfig::default()
        };
        assert!(matches!(
            session.replace_config(invalid),
            Err(ConverterError::Validation(_))
        ));
    }

    #[test]
    fn subscribers_see_updates() {
        let session = Session::new();
        let rx = session.subscribe();
        session.set_output_format(OutputFormat::Png);
        assert_eq!(rx.borrow().output_format, OutputFormat::Png);
    }

    #[tokio::test]
    async fn convert_then_export() {
        let mut session = Session::new();
        let ids = session.add_files(vec![png("a.png", 10, 10), png("b.png", 20, 10)]);
        session.set_output_format(OutputFormat::Webp);
        session.set_max_dimension(Some(8));

        let report = session.convert_all(|_| {}).await;
        assert_eq!(report, BatchReport { succeeded: 2, failed: 0 });

        let b = session.registry().get(ids[1]).unwrap();
        assert!(matches!(b.status(), EntryStatus::Ready(a) if a.width == 8 && a.height == 4));

        let archive = session.export("  ").await.unwrap();
        assert_eq!(archive.file_name, "converted_images.zip");
        assert_eq!(archive.entries, 2);

        session.clear();
        assert!(session.registry().is_empty());
        assert!(session.reference_size().is_none());
        assert_eq!(session.export("x").await.unwrap_err(), ConverterError::EmptyExport);
    }

    #[tokio::test]
    async fn single_convert_uses_current_settings() {
        let mut session = Session::new();
        let ids = session.add_files(vec![png("a.png", 40, 20)]);
        session.set_output_format(OutputFormat::Png);
        session.set_explicit_height(Some(10));

        let summary = session.convert_entry(ids[0]).await.unwrap();
        assert_eq!(summary.file_name, "a.png");
        // Auto-filled width from the 2:1 reference
        assert_eq!((summary.width, summary.height), (20, 10));
    }
}
