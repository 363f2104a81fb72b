//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`Session`]: live settings, registered files and the codec
//! - [`ConversionConfig`]: settings shared by every conversion
//! - [`Artifact`]: converted output held by a ready entry
//! - [`Progress`]: progress tracking for batch runs
//! - [`Manifest`]: job description for the command-line driver

mod manifest;
mod progress;
mod state;
mod types;

pub use manifest::Manifest;
pub use progress::{Progress, ProgressType};
pub use state::Session;
pub use types::{
    Artifact, BatchReport, ConversionConfig, ConversionResult, Dimensions, EntryId, SourceFile,
};
