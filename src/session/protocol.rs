//! Message types for panel UI <-> host communication.
//!
//! This module defines the vocabulary exchanged between the panel UI process
//! and the host-side sync engine. Messages are JSON-encoded and use a `type`
//! field for discrimination. The bridge itself performs no transformation:
//! pure pass-through with type discrimination.
//!
//! ## UI → Host Messages ([`UiMessage`])
//! - `ready`: panel finished loading, requests the full current state
//! - `contentUpdate`: the body editor produced new body text
//! - `frontmatterUpdate`: the metadata form produced a full record
//! - `requestSave`: force-flush to durable storage
//! - `startWithAI`: launch an external coding agent (external collaborator)
//!
//! ## Host → UI Messages ([`HostMessage`])
//! - `init`: full state snapshot in response to `ready`
//! - `contentChanged`: the document body changed outside the panel
//! - `themeChanged`: host color theme flipped (emitted by the theme watcher,
//!   not by this engine)
//!
//! Unknown inbound message kinds deserialize to [`UiMessage::Unknown`] and
//! are silently ignored, so future message kinds never crash older builds.

use serde::{Deserialize, Serialize};

use crate::frontmatter::Frontmatter;

/// Messages sent from the panel UI to the host.
///
/// # Examples
///
/// ```json
/// {"type": "ready"}
/// {"type": "contentUpdate", "content": "New body text."}
/// {"type": "frontmatterUpdate", "frontmatter": {"id": "FEAT-001", ...}}
/// {"type": "requestSave"}
/// {"type": "startWithAI", "agent": "claude", "permissionMode": "ask"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiMessage {
    /// Panel finished loading; the host responds with `init`.
    Ready,

    /// The body editor produced new body text.
    ContentUpdate {
        /// Full replacement body text.
        content: String,
    },

    /// The metadata form produced a record.
    ///
    /// This is a full replace at the message boundary: the panel always
    /// sends the complete record, not a diff.
    FrontmatterUpdate {
        /// The complete metadata record.
        frontmatter: Frontmatter,
    },

    /// Force-flush the document to durable storage.
    RequestSave,

    /// Launch an external coding agent on this feature.
    ///
    /// Handled by an external collaborator; the sync engine acknowledges and
    /// ignores it.
    #[serde(rename = "startWithAI", rename_all = "camelCase")]
    StartWithAi {
        /// Agent identifier chosen in the panel.
        agent: String,
        /// Permission mode to launch the agent with.
        permission_mode: String,
    },

    /// Any message kind this build does not know about.
    #[serde(other)]
    Unknown,
}

/// Messages sent from the host to the panel UI.
///
/// # Examples
///
/// ```json
/// {"type": "init", "content": "Body.", "frontmatter": {...}, "fileName": "FEAT-001.md"}
/// {"type": "contentChanged", "content": "Body edited elsewhere."}
/// {"type": "themeChanged", "isDark": true}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// Full state snapshot, sent in response to `ready`.
    #[serde(rename_all = "camelCase")]
    Init {
        /// Current body text.
        content: String,
        /// Current metadata record.
        frontmatter: Frontmatter,
        /// Display name of the underlying document.
        file_name: String,
    },

    /// The document body changed from a source other than the panel.
    ContentChanged {
        /// The new body text.
        content: String,
    },

    /// Host color theme flipped. Produced by the external theme watcher;
    /// part of the vocabulary but never emitted by the sync engine.
    #[serde(rename_all = "camelCase")]
    ThemeChanged {
        /// Whether the new theme is dark.
        is_dark: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_serialization() {
        let msg = UiMessage::Ready;
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"ready"}"#);

        let parsed: UiMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_content_update_serialization() {
        let msg = UiMessage::ContentUpdate {
            content: "New body.".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"contentUpdate""#));
        assert!(json.contains(r#""content":"New body.""#));

        let parsed: UiMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_frontmatter_update_serialization() {
        let msg = UiMessage::FrontmatterUpdate {
            frontmatter: Frontmatter::new("FEAT-001", "X"),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"frontmatterUpdate""#));
        assert!(json.contains(r#""id":"FEAT-001""#));

        let parsed: UiMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_request_save_serialization() {
        let json = serde_json::to_string(&UiMessage::RequestSave).unwrap();
        assert_eq!(json, r#"{"type":"requestSave"}"#);
    }

    #[test]
    fn test_start_with_ai_wire_names() {
        let msg = UiMessage::StartWithAi {
            agent: "claude".to_string(),
            permission_mode: "ask".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"startWithAI""#));
        assert!(json.contains(r#""permissionMode":"ask""#));

        let parsed: UiMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_unknown_message_kind_tolerated() {
        let json = r#"{"type":"futureThing","payload":{"x":1}}"#;
        let parsed: UiMessage = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, UiMessage::Unknown);
    }

    #[test]
    fn test_init_serialization() {
        let msg = HostMessage::Init {
            content: "Body.".to_string(),
            frontmatter: Frontmatter::new("FEAT-001", "X"),
            file_name: "FEAT-001.md".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"init""#));
        assert!(json.contains(r#""fileName":"FEAT-001.md""#));

        let parsed: HostMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_content_changed_serialization() {
        let msg = HostMessage::ContentChanged {
            content: "External edit.".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"contentChanged""#));

        let parsed: HostMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_theme_changed_wire_names() {
        let msg = HostMessage::ThemeChanged { is_dark: true };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"themeChanged","isDark":true}"#);
    }
}
