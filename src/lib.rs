// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod commands;

// Public exports for external consumers
pub use core::{
    Artifact, BatchReport, ConversionConfig, ConversionResult, Dimensions, EntryId, Manifest,
    Progress, ProgressType, Session, SourceFile,
};
pub use processing::{BatchController, EntryStatus, ExportedArchive, FileRegistry, ImageCodec, RasterCodec};
pub use utils::{ConverterError, ConverterResult, OutputFormat};
pub use commands::*;

// This library file is the public API of the crate.
// The command-line entry point is in main.rs.
