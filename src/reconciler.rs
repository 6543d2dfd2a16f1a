//! Edit application over a document's authoritative text.
//!
//! The reconciler owns the write side of the sync loop. Every edit is a
//! read-modify-write through the header codec: re-parse the current text
//! (never a cached copy), merge in the change, re-serialize, and replace the
//! whole document in one atomic edit. Whole-document replacement keeps the
//! codec's fixed-format output authoritative and avoids drift between the
//! header and body sections.
//!
//! Each write is tagged with a fresh [`WriteId`] registered in a
//! [`WriteGuard`] shared with the document's change notifier. The notifier
//! settles the id when the write's echo arrives; a rejected write cancels its
//! id immediately since no echo will come. Either way the guard is cleared on
//! every path, so no later notification can be misattributed.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::Result;
use crate::frontmatter::{Frontmatter, FrontmatterPatch, codec};
use crate::store::{DocumentStore, WriteId};

/// Shared registry of in-flight writes for one document.
///
/// Clones share state. Suppression is per write id rather than a blanket
/// is-writing flag, so only the exact echo of each write is swallowed even if
/// change callbacks arrive out of order or after the write call returns.
#[derive(Debug, Clone, Default)]
pub struct WriteGuard {
    inflight: Arc<Mutex<HashSet<WriteId>>>,
}

impl WriteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh write. Must be called before the replace is issued.
    pub fn begin(&self) -> WriteId {
        let id = WriteId::new();
        self.lock().insert(id);
        id
    }

    /// Drop a write whose replace failed; its echo will never arrive.
    pub fn cancel(&self, id: WriteId) {
        self.lock().remove(&id);
    }

    /// Consume a write id carried by an arriving change event. Returns `true`
    /// if the event was the echo of one of our writes.
    pub fn settle(&self, id: WriteId) -> bool {
        self.lock().remove(&id)
    }

    /// Number of writes still awaiting their echo.
    pub fn inflight_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<WriteId>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Applies UI-originated edits to one document's authoritative text.
pub struct Reconciler<S: DocumentStore> {
    store: S,
    guard: WriteGuard,
}

impl<S: DocumentStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            guard: WriteGuard::new(),
        }
    }

    /// Handle to the write guard, for wiring up this document's notifier.
    pub fn guard(&self) -> WriteGuard {
        self.guard.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Re-derive the current (header, body) pair from the authoritative text.
    pub fn current(&self) -> Result<(Frontmatter, String)> {
        Ok(codec::parse(&self.store.text()?))
    }

    /// Replace the body, keeping the current header (modulo the `modified`
    /// stamp the codec applies on write).
    pub fn apply_body_edit(&mut self, new_body: &str) -> Result<()> {
        let text = self.store.text()?;
        let (header, _) = codec::parse(&text);
        self.write(&header, new_body)
    }

    /// Shallow-merge `patch` over the current header, keeping the body.
    pub fn apply_metadata_edit(&mut self, patch: &FrontmatterPatch) -> Result<()> {
        let text = self.store.text()?;
        let (mut header, body) = codec::parse(&text);
        patch.apply(&mut header);
        self.write(&header, &body)
    }

    /// Force-flush the store to durable storage.
    pub fn request_persist(&mut self) -> Result<()> {
        self.store.persist()
    }

    fn write(&mut self, header: &Frontmatter, body: &str) -> Result<()> {
        let text = codec::serialize(header, body);
        let id = self.guard.begin();
        debug!(uri = self.store.uri(), write_id = %id, "replacing document text");
        match self.store.replace(&text, id) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.guard.cancel(id);
                debug!(uri = self.store.uri(), write_id = %id, "write rejected, id cancelled");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::frontmatter::{Status, codec};
    use crate::store::MemoryStore;

    fn seeded_store() -> MemoryStore {
        let input = "---\nid: \"FEAT-001\"\ntitle: \"X\"\nstatus: \"todo\"\npriority: \"high\"\nassignee: null\ndueDate: null\ncreated: \"2024-01-01T00:00:00.000Z\"\nmodified: \"2024-01-01T00:00:00.000Z\"\nlabels: []\norder: 0\n---\nBody text.";
        MemoryStore::new("doc://feat-001", input)
    }

    #[test]
    fn test_body_edit_keeps_header() {
        let mut rec = Reconciler::new(seeded_store());
        rec.apply_body_edit("New body.\n").unwrap();

        let (header, body) = rec.current().unwrap();
        assert_eq!(body, "New body.\n");
        assert_eq!(header.id, "FEAT-001");
        assert_eq!(header.title, "X");
        assert_eq!(header.status, Status::Todo);
    }

    #[test]
    fn test_metadata_edit_merges_and_keeps_body() {
        let mut rec = Reconciler::new(seeded_store());
        let patch = FrontmatterPatch {
            status: Some(Status::Done),
            ..Default::default()
        };
        rec.apply_metadata_edit(&patch).unwrap();

        let (header, body) = rec.current().unwrap();
        assert_eq!(header.status, Status::Done);
        assert_eq!(header.id, "FEAT-001");
        assert_eq!(header.title, "X");
        assert_eq!(body, "Body text.");
    }

    #[test]
    fn test_metadata_edit_restamps_modified() {
        let mut rec = Reconciler::new(seeded_store());
        let before = rec.current().unwrap().0.modified;
        rec.apply_metadata_edit(&FrontmatterPatch::default())
            .unwrap();
        let after = rec.current().unwrap().0.modified;
        assert!(after > before);
    }

    #[test]
    fn test_headerless_document_gains_canonical_header() {
        let mut rec = Reconciler::new(MemoryStore::new("doc://new", "just prose"));
        rec.apply_body_edit("just prose").unwrap();

        let text = rec.store().text().unwrap();
        assert!(text.starts_with("---\nid: \"unknown\"\ntitle: \"Untitled\"\n"));
        assert_eq!(codec::parse(&text).1, "just prose");
    }

    #[test]
    fn test_successful_write_stays_inflight_until_settled() {
        let mut rec = Reconciler::new(seeded_store());
        let guard = rec.guard();
        rec.apply_body_edit("b").unwrap();
        assert_eq!(guard.inflight_count(), 1);

        let events = rec.store_mut().drain_events();
        assert_eq!(events.len(), 1);
        let origin = events[0].origin.expect("own write must be tagged");
        assert!(guard.settle(origin));
        assert_eq!(guard.inflight_count(), 0);
    }

    struct RejectingStore {
        inner: MemoryStore,
    }

    impl DocumentStore for RejectingStore {
        fn uri(&self) -> &str {
            self.inner.uri()
        }
        fn text(&self) -> Result<String> {
            self.inner.text()
        }
        fn replace(&mut self, _text: &str, _origin: WriteId) -> Result<()> {
            Err(Error::WriteRejected("store offline".to_string()))
        }
        fn persist(&mut self) -> Result<()> {
            self.inner.persist()
        }
    }

    #[test]
    fn test_failed_write_clears_guard_and_leaves_text() {
        let mut rec = Reconciler::new(RejectingStore {
            inner: seeded_store(),
        });
        let guard = rec.guard();
        let before = rec.store().text().unwrap();

        let err = rec.apply_body_edit("lost").unwrap_err();
        assert!(matches!(err, Error::WriteRejected(_)));
        assert_eq!(guard.inflight_count(), 0);
        assert_eq!(rec.store().text().unwrap(), before);
    }
}
