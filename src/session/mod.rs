//! One editing session: the bridge between a panel UI and its document.
//!
//! A `Session` owns the reconciler and notifier for exactly one open
//! document and dispatches inbound [`UiMessage`]s to the core operations.
//! The write guard is created per session, so suppression state can never
//! leak between documents even when a host opens several panels at once.

pub mod protocol;

use tracing::debug;

use crate::Result;
use crate::frontmatter::FrontmatterPatch;
use crate::notifier::ChangeNotifier;
use crate::reconciler::Reconciler;
use crate::session::protocol::{HostMessage, UiMessage};
use crate::store::{ChangeEvent, DocumentStore};

/// Host-side endpoint of the panel message bridge for one document.
pub struct Session<S: DocumentStore> {
    reconciler: Reconciler<S>,
    notifier: ChangeNotifier,
    file_name: String,
}

impl<S: DocumentStore> Session<S> {
    /// Open a session over `store`. `file_name` is the display name sent to
    /// the panel in the `init` snapshot.
    pub fn open(store: S, file_name: impl Into<String>) -> Self {
        let reconciler = Reconciler::new(store);
        let notifier = ChangeNotifier::new(reconciler.store().uri().to_string(), reconciler.guard());
        Self {
            reconciler,
            notifier,
            file_name: file_name.into(),
        }
    }

    /// Dispatch one inbound panel message, returning the reply to send back,
    /// if any.
    ///
    /// Unknown message kinds and collaborator-owned kinds (`startWithAI`) are
    /// acknowledged and ignored.
    pub fn handle_message(&mut self, msg: UiMessage) -> Result<Option<HostMessage>> {
        match msg {
            UiMessage::Ready => {
                let (frontmatter, content) = self.reconciler.current()?;
                Ok(Some(HostMessage::Init {
                    content,
                    frontmatter,
                    file_name: self.file_name.clone(),
                }))
            }
            UiMessage::ContentUpdate { content } => {
                self.reconciler.apply_body_edit(&content)?;
                Ok(None)
            }
            UiMessage::FrontmatterUpdate { frontmatter } => {
                // full replace at this boundary: the panel sends the
                // complete record
                let patch = FrontmatterPatch::from(frontmatter);
                self.reconciler.apply_metadata_edit(&patch)?;
                Ok(None)
            }
            UiMessage::RequestSave => {
                self.reconciler.request_persist()?;
                Ok(None)
            }
            UiMessage::StartWithAi { agent, .. } => {
                debug!(%agent, "agent launch is owned by the host, ignoring");
                Ok(None)
            }
            UiMessage::Unknown => {
                debug!("ignoring unknown message kind");
                Ok(None)
            }
        }
    }

    /// Dispatch one inbound message from its JSON wire form, returning the
    /// JSON-encoded reply, if any.
    pub fn handle_raw(&mut self, json: &str) -> Result<Option<String>> {
        let msg: UiMessage = serde_json::from_str(json)?;
        match self.handle_message(msg)? {
            Some(reply) => Ok(Some(serde_json::to_string(&reply)?)),
            None => Ok(None),
        }
    }

    /// Feed one store mutation event through the notifier, returning the
    /// `contentChanged` notification to forward, if the event was an
    /// external edit of this document.
    pub fn handle_change(&mut self, event: &ChangeEvent) -> Result<Option<HostMessage>> {
        let text = self.reconciler.store().text()?;
        Ok(self.notifier.observe(event, &text))
    }

    pub fn reconciler(&self) -> &Reconciler<S> {
        &self.reconciler
    }

    pub fn store(&self) -> &S {
        self.reconciler.store()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.reconciler.store_mut()
    }
}
