//! Ordered collection of registered files and their conversion state.

use std::fmt;
use std::sync::Arc;

use crate::core::{Artifact, Dimensions, EntryId, SourceFile};
use crate::utils::{ConverterError, ConverterResult};

/// Lifecycle of one entry.
///
/// `Idle → Converting → Ready | Failed`, and `Ready | Failed → Converting`
/// for a re-conversion. Entering `Converting` discards the previous outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EntryStatus {
    #[default]
    Idle,
    Converting,
    Ready(Artifact),
    Failed(String),
}

impl EntryStatus {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Converting => "converting",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Ready(artifact) => Some(artifact),
            _ => None,
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(artifact) => write!(f, "ready ({})", artifact.dimensions()),
            Self::Failed(error) => write!(f, "failed: {error}"),
            other => f.write_str(other.name()),
        }
    }
}

/// One registered file.
#[derive(Debug, Clone)]
pub struct FileEntry {
    id: EntryId,
    source: SourceFile,
    natural: Option<Dimensions>,
    status: EntryStatus,
}

impl FileEntry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn source_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.source.bytes)
    }

    /// Natural size, known once the header was read successfully
    pub fn natural_size(&self) -> Option<Dimensions> {
        self.natural
    }

    pub fn status(&self) -> &EntryStatus {
        &self.status
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.status.artifact()
    }
}

/// Registered files in insertion order.
///
/// Entries are only ever removed by [`FileRegistry::clear`].
#[derive(Debug, Default)]
pub struct FileRegistry {
    entries: Vec<FileEntry>,
    next_id: usize,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an idle entry for `source`.
    ///
    /// `natural` is the header size, or `None` when the header was unreadable.
    pub fn add(&mut self, source: SourceFile, natural: Option<Dimensions>) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(FileEntry {
            id,
            source,
            natural,
            status: EntryStatus::Idle,
        });
        id
    }

    pub fn get(&self, id: EntryId) -> Option<&FileEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn all(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ready_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.status.is_ready()).count()
    }

    pub fn set_converting(&mut self, id: EntryId) -> ConverterResult<()> {
        self.transition(id, EntryStatus::Converting)
    }

    /// Stores `artifact`, replacing whatever the entry held before.
    pub fn set_ready(&mut self, id: EntryId, artifact: Artifact) -> ConverterResult<()> {
        self.transition(id, EntryStatus::Ready(artifact))
    }

    pub fn set_failed(&mut self, id: EntryId, error: impl Into<String>) -> ConverterResult<()> {
        self.transition(id, EntryStatus::Failed(error.into()))
    }

    /// Drops every entry. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn entry_mut(&mut self, id: EntryId) -> ConverterResult<&mut FileEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(ConverterError::UnknownEntry(id))
    }

    fn transition(&mut self, id: EntryId, next: EntryStatus) -> ConverterResult<()> {
        let entry = self.entry_mut(id)?;
        let allowed = match (&entry.status, &next) {
            (EntryStatus::Converting, EntryStatus::Converting) => false,
            (_, EntryStatus::Converting) => true,
            (EntryStatus::Converting, EntryStatus::Ready(_) | EntryStatus::Failed(_)) => true,
            _ => false,
        };

        if !allowed {
            return Err(ConverterError::InvalidTransition {
                id,
                from: entry.status.name(),
                to: next.name(),
            });
        }

        entry.status = next;
        Ok(())
    }
}
