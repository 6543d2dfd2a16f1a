//! Line-oriented codec for the delimited header block.
//!
//! A feature document starts with a header fenced by lines containing exactly
//! `---`, followed by the body text. The header grammar is a deliberately
//! restricted subset of YAML: `key: value` scalar lines plus one bracketed
//! list form for `labels`. The header is always machine-written in a fixed
//! shape, but humans hand-edit these files, so the parser is lenient to a
//! fault: any field it cannot read falls back to its default and parsing
//! never fails. The next serialize rewrites a fully well-formed header,
//! self-healing the document.
//!
//! [`serialize`] restamps `modified` to the current time on every call. This
//! is a mandatory side effect of writing, not a pass-through field.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::frontmatter::{Frontmatter, Priority, Status};

/// Split a document into its typed header and body text.
///
/// A document without a well-formed header (no opening fence on the first
/// line, or no closing fence at all) is a legal state, not an error: the
/// whole text becomes the body and the header takes its defaults.
pub fn parse(text: &str) -> (Frontmatter, String) {
    match split_document(text) {
        Some((header, body)) => (parse_header(header), body.to_string()),
        None => (Frontmatter::default(), text.to_string()),
    }
}

/// Render the canonical document text: fixed-order header block, blank line,
/// then `body` verbatim.
///
/// `modified` is stamped with the current time regardless of the record's
/// value; callers must accept this as an unconditional side effect. Only the
/// fixed field set is emitted, so unknown keys read from a hand-edited header
/// do not survive a rewrite.
pub fn serialize(fm: &Frontmatter, body: &str) -> String {
    serialize_at(fm, body, Utc::now())
}

/// [`serialize`] with an explicit `modified` stamp, for deterministic output.
pub fn serialize_at(fm: &Frontmatter, body: &str, modified: DateTime<Utc>) -> String {
    let mut out = String::with_capacity(body.len() + 256);
    out.push_str("---\n");
    out.push_str(&format!("id: \"{}\"\n", fm.id));
    out.push_str(&format!("title: \"{}\"\n", fm.title));
    out.push_str(&format!("status: \"{}\"\n", fm.status.as_str()));
    out.push_str(&format!("priority: \"{}\"\n", fm.priority.as_str()));
    out.push_str(&format!("assignee: {}\n", quoted_or_null(fm.assignee.as_deref())));
    out.push_str(&format!("dueDate: {}\n", quoted_or_null(fm.due_date.as_deref())));
    out.push_str(&format!("created: \"{}\"\n", timestamp(fm.created)));
    out.push_str(&format!("modified: \"{}\"\n", timestamp(modified)));
    out.push_str(&format!("labels: {}\n", label_list(&fm.labels)));
    out.push_str(&format!("order: {}\n", fm.order));
    out.push_str("---\n\n");
    out.push_str(body);
    out
}

/// Locate the header fences. Returns `(header_source, body)` with one leading
/// newline stripped from the body (the blank separator line serialize emits).
fn split_document(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---\n")?;
    let mut offset = 0usize;
    for line in rest.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let content = content.strip_suffix('\r').unwrap_or(content);
        if content == "---" {
            let header = &rest[..offset];
            let after = &rest[offset + line.len()..];
            let body = after.strip_prefix('\n').unwrap_or(after);
            return Some((header, body));
        }
        offset += line.len();
    }
    None
}

/// Extract every known field from the header source, defaulting field by
/// field on anything missing or unreadable.
fn parse_header(src: &str) -> Frontmatter {
    let mut fm = Frontmatter::default();
    if let Some(id) = scalar(src, "id") {
        fm.id = id;
    }
    if let Some(title) = scalar(src, "title") {
        fm.title = title;
    }
    if let Some(status) = scalar(src, "status").and_then(|v| Status::parse(&v)) {
        fm.status = status;
    }
    if let Some(priority) = scalar(src, "priority").and_then(|v| Priority::parse(&v)) {
        fm.priority = priority;
    }
    fm.assignee = scalar(src, "assignee");
    fm.due_date = scalar(src, "dueDate");
    if let Some(created) = scalar(src, "created").and_then(|v| parse_timestamp(&v)) {
        fm.created = created;
    }
    if let Some(modified) = scalar(src, "modified").and_then(|v| parse_timestamp(&v)) {
        fm.modified = modified;
    }
    fm.labels = string_list(src, "labels");
    fm.order = scalar(src, "order")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    fm
}

/// Find the first `key:` line and return its raw trimmed value.
fn raw_value<'a>(src: &'a str, key: &str) -> Option<&'a str> {
    for line in src.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(value) = line.strip_prefix(key).and_then(|rest| rest.strip_prefix(':')) {
            return Some(value.trim());
        }
    }
    None
}

/// Scalar field value: dequoted, with the literal token `null` normalized to
/// absent. A quoted `"null"` stays the string "null".
fn scalar(src: &str, key: &str) -> Option<String> {
    let value = raw_value(src, key)?;
    if value == "null" {
        return None;
    }
    Some(unquote(value).to_string())
}

/// Bracketed string list. Absent or malformed syntax yields an empty list,
/// never an error; empty elements are dropped.
fn string_list(src: &str, key: &str) -> Vec<String> {
    let Some(value) = raw_value(src, key) else {
        return Vec::new();
    };
    let Some(interior) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) else {
        return Vec::new();
    };
    interior
        .split(',')
        .map(|item| unquote(item.trim()).to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Strip one pair of matching surrounding quotes (`"` or `'`).
fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if s.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[s.len() - 1] == first {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn quoted_or_null(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("\"{v}\""),
        None => "null".to_string(),
    }
}

fn label_list(labels: &[String]) -> String {
    let quoted: Vec<String> = labels.iter().map(|l| format!("\"{l}\"")).collect();
    format!("[{}]", quoted.join(", "))
}

fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
