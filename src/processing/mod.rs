//! The conversion pipeline.
//!
//! # Architecture
//!
//! - [`geometry`]: target size from source size and resize settings.
//! - [`codec`]: decode/resample/encode seam and its `image`-backed default.
//! - [`convert`]: one source to one artifact, plus output naming.
//! - [`registry`]: ordered entries and their lifecycle.
//! - [`batch`]: sequential runs over the registry with progress.
//! - [`archive`]: ZIP export of ready entries.

pub mod archive;
pub mod batch;
pub mod codec;
pub mod convert;
pub mod geometry;
pub mod registry;

pub use archive::{DEFAULT_ARCHIVE_NAME, ExportedArchive, archive_file_name, export};
pub use batch::{ArtifactSummary, BatchController};
pub use codec::{ImageCodec, RasterCodec};
pub use convert::{convert, make_output_name};
pub use geometry::resolve;
pub use registry::{EntryStatus, FileEntry, FileRegistry};
