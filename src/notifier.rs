//! Externally-sourced change detection with self-write suppression.
//!
//! The notifier watches mutation events on the authoritative text and turns
//! the ones that did not originate from this document's reconciler into
//! `contentChanged` notifications for the panel UI. Suppressing our own
//! writes is a correctness requirement, not an optimization: echoing the
//! panel's edit back to it would corrupt cursor state or spin an infinite
//! notify loop if the panel reapplies every notification.
//!
//! External tools are assumed to edit body prose, not the header block, so
//! the notification carries only the body. The codec tolerates header edits
//! either way.

use tracing::debug;

use crate::frontmatter::codec;
use crate::reconciler::WriteGuard;
use crate::session::protocol::HostMessage;
use crate::store::ChangeEvent;

/// Turns store mutation events into panel notifications for one document.
pub struct ChangeNotifier {
    uri: String,
    guard: WriteGuard,
}

impl ChangeNotifier {
    /// Create a notifier for the document at `uri`, sharing the guard of
    /// that document's reconciler.
    pub fn new(uri: impl Into<String>, guard: WriteGuard) -> Self {
        Self {
            uri: uri.into(),
            guard,
        }
    }

    /// Identity of the document this notifier observes.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Inspect one mutation event against the current authoritative text.
    ///
    /// Returns the `contentChanged` notification to forward to the panel, or
    /// `None` when the event targets a different document or is the echo of
    /// one of our own writes.
    pub fn observe(&self, event: &ChangeEvent, current_text: &str) -> Option<HostMessage> {
        if event.uri != self.uri {
            return None;
        }
        if let Some(origin) = event.origin {
            if self.guard.settle(origin) {
                debug!(uri = %self.uri, write_id = %origin, "suppressed self-write echo");
                return None;
            }
        }
        let (_, body) = codec::parse(current_text);
        debug!(uri = %self.uri, "external mutation, notifying panel");
        Some(HostMessage::ContentChanged { content: body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WriteId;

    const URI: &str = "doc://feat-001";
    const TEXT: &str = "---\nid: \"FEAT-001\"\n---\nBody text.";

    #[test]
    fn test_self_write_echo_suppressed() {
        let guard = WriteGuard::new();
        let notifier = ChangeNotifier::new(URI, guard.clone());

        let id = guard.begin();
        let event = ChangeEvent::tagged(URI, id);
        assert_eq!(notifier.observe(&event, TEXT), None);
        assert_eq!(guard.inflight_count(), 0);
    }

    #[test]
    fn test_external_mutation_notifies_with_body() {
        let notifier = ChangeNotifier::new(URI, WriteGuard::new());
        let event = ChangeEvent::external(URI);
        let msg = notifier.observe(&event, TEXT).expect("must notify");
        assert_eq!(
            msg,
            HostMessage::ContentChanged {
                content: "Body text.".to_string()
            }
        );
    }

    #[test]
    fn test_exactly_one_notification_per_external_edit() {
        let guard = WriteGuard::new();
        let notifier = ChangeNotifier::new(URI, guard.clone());

        // self-write followed by an external edit: one notification total
        let id = guard.begin();
        let mut messages = Vec::new();
        messages.extend(notifier.observe(&ChangeEvent::tagged(URI, id), TEXT));
        messages.extend(notifier.observe(&ChangeEvent::external(URI), TEXT));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_other_document_ignored() {
        let notifier = ChangeNotifier::new(URI, WriteGuard::new());
        let event = ChangeEvent::external("doc://feat-999");
        assert_eq!(notifier.observe(&event, TEXT), None);
    }

    #[test]
    fn test_foreign_write_tag_treated_as_external() {
        // a tag we never issued is some other writer's edit
        let notifier = ChangeNotifier::new(URI, WriteGuard::new());
        let event = ChangeEvent::tagged(URI, WriteId::new());
        assert!(notifier.observe(&event, TEXT).is_some());
    }

    #[test]
    fn test_headerless_text_notifies_full_body() {
        let notifier = ChangeNotifier::new(URI, WriteGuard::new());
        let msg = notifier
            .observe(&ChangeEvent::external(URI), "plain prose")
            .unwrap();
        assert_eq!(
            msg,
            HostMessage::ContentChanged {
                content: "plain prose".to_string()
            }
        );
    }
}
