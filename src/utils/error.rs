//! Error types for the image converter.
//!
//! Provides a single error enum using `thiserror` for ergonomic error handling.

use std::io;
use serde::Serialize;
use thiserror::Error;

use crate::core::EntryId;

/// Main error type for the converter.
///
/// Decode and encode failures are captured per entry by the batch controller
/// and never abort a batch; everything else is returned to the caller.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ConverterError {
    /// Source bytes could not be rasterized
    #[error("Decode error: {0}")]
    Decode(String),

    /// The encoder refused the surface or the target format
    #[error("Encode error: {0}")]
    Encode(String),

    /// Archive export was requested with no converted entries
    #[error("Nothing to export: convert at least one image first")]
    EmptyExport,

    /// Archive packing failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Settings or input validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// No entry with this id exists in the registry
    #[error("Unknown entry: {0}")]
    UnknownEntry(EntryId),

    /// A status change that the entry lifecycle does not allow
    #[error("Entry {id} cannot go from {from} to {to}")]
    InvalidTransition {
        id: EntryId,
        from: &'static str,
        to: &'static str,
    },

    /// Blocking task failed to complete
    #[error("Processing error: {0}")]
    Processing(String),
}

/// Convenience result type for converter operations.
pub type ConverterResult<T> = Result<T, ConverterError>;

// Helper methods for error creation
impl ConverterError {
    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode<T: Into<String>>(msg: T) -> Self {
        Self::Encode(msg.into())
    }

    pub fn archive<T: Into<String>>(msg: T) -> Self {
        Self::Archive(msg.into())
    }

    pub fn io<T: Into<String>>(msg: T) -> Self {
        Self::IO(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    pub fn processing<T: Into<String>>(msg: T) -> Self {
        Self::Processing(msg.into())
    }

    /// Whether this error belongs to a single entry rather than the whole operation.
    pub fn is_per_entry(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Encode(_))
    }
}

// Convert std::io::Error to ConverterError
impl From<io::Error> for ConverterError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<zip::result::ZipError> for ConverterError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ConverterError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Processing(format!("Task panicked: {err}"))
    }
}
