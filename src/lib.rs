//! Featsync - frontmatter/content synchronization for feature documents.
//!
//! A feature document is a text file with a delimited metadata header
//! (frontmatter) followed by free-form body text. This library keeps such a
//! document synchronized between its authoritative store (a file on disk or a
//! host editor buffer) and a panel UI that edits the metadata and the body
//! independently:
//!
//! - [`frontmatter`] - the typed header record and its line-oriented codec
//! - [`store`] - the authoritative-text seam ([`store::DocumentStore`])
//! - [`reconciler`] - read-modify-write edit application with echo tagging
//! - [`notifier`] - externally-sourced change detection with self-write
//!   suppression
//! - [`session`] - the message contract with the UI process and its dispatch
//! - [`watch`] - filesystem watcher feeding external edits into a session

pub mod frontmatter;
pub mod notifier;
pub mod reconciler;
pub mod session;
pub mod store;
pub mod watch;

/// Library-level error type for featsync operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Store rejected write: {0}")]
    WriteRejected(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for featsync operations.
pub type Result<T> = std::result::Result<T, Error>;
