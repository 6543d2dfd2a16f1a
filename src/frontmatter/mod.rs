//! Typed representation of a feature document's metadata header.
//!
//! This module defines the core data structures:
//! - `Frontmatter` - the full header record persisted at the top of a document
//! - `Status` / `Priority` - board workflow enums
//! - `FrontmatterPatch` - a partial overlay applied during metadata edits
//!
//! The textual form of the header lives in the [`codec`] submodule.

pub mod codec;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board column a feature currently sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Backlog,
    Todo,
    InProgress,
    Review,
    Done,
}

impl Status {
    /// Parse a status token, returning `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "backlog" => Some(Self::Backlog),
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "review" => Some(Self::Review),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Get the string representation used on disk and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Feature priority level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Parse a priority token, returning `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Get the string representation used on disk and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The metadata header of a feature document.
///
/// Field names and order mirror the on-disk header block exactly; the wire
/// form (panel UI messages) uses the same names. Every field is defaulted on
/// deserialization so a partial or hand-mangled record never fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    /// Stable identifier (e.g., "FEAT-001"). Never regenerated by the codec;
    /// "unknown" marks a record whose id could not be read.
    pub id: String,

    /// Feature title.
    pub title: String,

    /// Current board column.
    pub status: Status,

    /// Priority level.
    pub priority: Priority,

    /// Assigned user. `Some("")` (present but empty) is distinct from `None`.
    pub assignee: Option<String>,

    /// Target date as an ISO date string; owned by the panel, persisted as-is.
    #[serde(rename = "dueDate")]
    pub due_date: Option<String>,

    /// Creation timestamp.
    pub created: DateTime<Utc>,

    /// Last write timestamp. Restamped unconditionally on every serialize;
    /// the value held here is never trusted when writing.
    pub modified: DateTime<Utc>,

    /// Display-ordered labels. Duplicates are preserved.
    pub labels: Vec<String>,

    /// Board-column sort key, owned by the board and merely persisted here.
    pub order: i64,
}

impl Default for Frontmatter {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: "unknown".to_string(),
            title: "Untitled".to_string(),
            status: Status::default(),
            priority: Priority::default(),
            assignee: None,
            due_date: None,
            created: now,
            modified: now,
            labels: Vec::new(),
            order: 0,
        }
    }
}

impl Frontmatter {
    /// Create a fresh record with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A partial metadata edit.
///
/// Each `Some` field overwrites the corresponding record field; `None` leaves
/// it untouched (shallow merge). `assignee` and `due_date` are doubly
/// optional so a patch can clear them (`Some(None)`) as well as leave them
/// alone (`None`). `modified` is absent on purpose: serialization stamps it.
#[derive(Debug, Clone, Default)]
pub struct FrontmatterPatch {
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee: Option<Option<String>>,
    pub due_date: Option<Option<String>>,
    pub created: Option<DateTime<Utc>>,
    pub labels: Option<Vec<String>>,
    pub order: Option<i64>,
}

impl FrontmatterPatch {
    /// Overlay this patch onto `base`, field by field.
    pub fn apply(&self, base: &mut Frontmatter) {
        if let Some(id) = &self.id {
            base.id = id.clone();
        }
        if let Some(title) = &self.title {
            base.title = title.clone();
        }
        if let Some(status) = self.status {
            base.status = status;
        }
        if let Some(priority) = self.priority {
            base.priority = priority;
        }
        if let Some(assignee) = &self.assignee {
            base.assignee = assignee.clone();
        }
        if let Some(due_date) = &self.due_date {
            base.due_date = due_date.clone();
        }
        if let Some(created) = self.created {
            base.created = created;
        }
        if let Some(labels) = &self.labels {
            base.labels = labels.clone();
        }
        if let Some(order) = self.order {
            base.order = order;
        }
    }
}

impl From<Frontmatter> for FrontmatterPatch {
    /// The full-replace patch used at the session boundary, where the panel
    /// always sends a complete record.
    fn from(fm: Frontmatter) -> Self {
        Self {
            id: Some(fm.id),
            title: Some(fm.title),
            status: Some(fm.status),
            priority: Some(fm.priority),
            assignee: Some(fm.assignee),
            due_date: Some(fm.due_date),
            created: Some(fm.created),
            labels: Some(fm.labels),
            order: Some(fm.order),
        }
    }
}
