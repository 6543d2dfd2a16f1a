//! The authoritative-text seam between the sync engine and its host.
//!
//! This module provides the storage boundary for feature documents:
//! - `DocumentStore` - trait the reconciler drives edits through
//! - `MemoryStore` - in-process store used by hosts that own their text
//!   buffer, and by the unit tests
//! - `FileStore` - document file on disk with atomic replacement
//!
//! A store owns the single source-of-truth string for one document. The
//! engine never keeps a second copy; every operation re-reads through
//! [`DocumentStore::text`].

use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::Result;

/// Identifier for one write issued by this process.
///
/// Every outgoing replace is tagged with a fresh id; the change-observation
/// path uses it to recognize (and suppress) that exact write's echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteId(Uuid);

impl WriteId {
    /// Generate a fresh write id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WriteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A text mutation observed on a store.
///
/// `origin` is `Some` when the mutation was issued through
/// [`DocumentStore::replace`] by this process, `None` for externally-sourced
/// edits (another tool, undo/redo in the host editor, a hand edit on disk).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Identity of the mutated document.
    pub uri: String,
    /// The write that caused this mutation, if it was ours.
    pub origin: Option<WriteId>,
}

impl ChangeEvent {
    /// An externally-sourced mutation.
    pub fn external(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            origin: None,
        }
    }

    /// A mutation caused by one of our own writes.
    pub fn tagged(uri: impl Into<String>, origin: WriteId) -> Self {
        Self {
            uri: uri.into(),
            origin: Some(origin),
        }
    }
}

/// Trait for stores that hold a document's authoritative text.
///
/// Contract: `replace` swaps the entire text atomically (all or nothing), and
/// each successful `replace` results in exactly one [`ChangeEvent`] tagged
/// with the given origin reaching the change-observation path. A failed
/// replace leaves the text at its prior value and produces no event.
pub trait DocumentStore {
    /// Identity of the document this store holds.
    fn uri(&self) -> &str;

    /// Read the current authoritative text.
    fn text(&self) -> Result<String>;

    /// Atomically replace the entire document text.
    fn replace(&mut self, text: &str, origin: WriteId) -> Result<()>;

    /// Flush to durable storage. No transformation of content.
    fn persist(&mut self) -> Result<()>;
}

/// In-process document store.
///
/// Queues every mutation as a [`ChangeEvent`] for the embedder to pump into
/// the session ([`drain_events`](MemoryStore::drain_events)); host-side edits
/// enter through [`apply_external_edit`](MemoryStore::apply_external_edit).
#[derive(Debug)]
pub struct MemoryStore {
    uri: String,
    text: String,
    events: VecDeque<ChangeEvent>,
    persist_count: usize,
}

impl MemoryStore {
    /// Create a store holding `text` under the given document identity.
    pub fn new(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            text: text.into(),
            events: VecDeque::new(),
            persist_count: 0,
        }
    }

    /// Apply an edit that did not come from the reconciler (models another
    /// tool or undo/redo mutating the host buffer).
    pub fn apply_external_edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.events.push_back(ChangeEvent::external(self.uri.clone()));
    }

    /// Drain the queued change events in arrival order.
    pub fn drain_events(&mut self) -> Vec<ChangeEvent> {
        self.events.drain(..).collect()
    }

    /// How many times `persist` has been called.
    pub fn persist_count(&self) -> usize {
        self.persist_count
    }
}

impl DocumentStore for MemoryStore {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn replace(&mut self, text: &str, origin: WriteId) -> Result<()> {
        self.text = text.to_string();
        self.events
            .push_back(ChangeEvent::tagged(self.uri.clone(), origin));
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        self.persist_count += 1;
        Ok(())
    }
}

/// Document file on disk.
///
/// `replace` writes a sibling temp file and renames it over the target, so a
/// crash mid-write never leaves a half-written document. The filesystem
/// cannot carry a write tag, so the store remembers the ids of its own writes
/// in arrival order; the watch glue attributes the next change signal via
/// [`take_pending_write`](FileStore::take_pending_write).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    uri: String,
    pending_writes: VecDeque<WriteId>,
}

impl FileStore {
    /// Open a store over the document file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let uri = path.display().to_string();
        Self {
            path,
            uri,
            pending_writes: VecDeque::new(),
        }
    }

    /// Path of the document file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pop the id of the oldest of our writes that has not yet been matched
    /// to a filesystem change signal. `None` means the signal was an
    /// external edit.
    pub fn take_pending_write(&mut self) -> Option<WriteId> {
        self.pending_writes.pop_front()
    }

    /// Build the [`ChangeEvent`] for the next filesystem change signal on
    /// this document, attributing it to the oldest unmatched write if there
    /// is one.
    pub fn next_change_event(&mut self) -> ChangeEvent {
        match self.take_pending_write() {
            Some(id) => ChangeEvent::tagged(self.uri.clone(), id),
            None => ChangeEvent::external(self.uri.clone()),
        }
    }
}

impl DocumentStore for FileStore {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn text(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }

    fn replace(&mut self, text: &str, origin: WriteId) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| crate::Error::Io(e.error))?;
        self.pending_writes.push_back(origin);
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        fs::File::open(&self.path)?.sync_all()?;
        Ok(())
    }
}
