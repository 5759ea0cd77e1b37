//! Shape validation for records before they reach disk.
//!
//! # Responsibility
//! - Collect every rule violation of an item or registry entry.
//! - Give write paths one all-or-nothing gate.
//!
//! # Invariants
//! - Validation is pure; it never touches the filesystem or the clock.
//! - A batch is valid only if every record in it is valid.

use crate::model::item::Item;
use crate::model::list_entry::ListEntry;
use crate::time::{is_valid_due, parse_timestamp};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid slug regex"));

/// One failed rule, addressed by a dotted field path such as `tags[2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field_path: String,
    pub message: String,
}

impl Violation {
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field_path, self.message)
    }
}

/// All violations found in one record or batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .violations
            .iter()
            .map(Violation::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "validation failed: {joined}")
    }
}

impl Error for ValidationError {}

pub trait Validate {
    fn violations(&self) -> Vec<Violation>;

    fn validate(&self) -> Result<(), ValidationError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

/// Validates every record, prefixing field paths with `<label>[<index>]`.
pub fn validate_batch<T: Validate>(label: &str, records: &[T]) -> Result<(), ValidationError> {
    let violations: Vec<Violation> = records
        .iter()
        .enumerate()
        .flat_map(|(index, record)| {
            record.violations().into_iter().map(move |v| {
                Violation::new(format!("{label}[{index}].{}", v.field_path), v.message)
            })
        })
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

fn check_timestamps(created_at: &str, updated_at: &str, out: &mut Vec<Violation>) {
    let created = parse_timestamp(created_at);
    let updated = parse_timestamp(updated_at);
    if created.is_none() {
        out.push(Violation::new("created_at", "must be an RFC 3339 timestamp"));
    }
    if updated.is_none() {
        out.push(Violation::new("updated_at", "must be an RFC 3339 timestamp"));
    }
    if let (Some(created), Some(updated)) = (created, updated) {
        if updated < created {
            out.push(Violation::new("updated_at", "must not precede created_at"));
        }
    }
}

fn check_tags(tags: &[String], out: &mut Vec<Violation>) {
    for (index, tag) in tags.iter().enumerate() {
        if tag.trim().is_empty() {
            out.push(Violation::new(format!("tags[{index}]"), "must not be empty"));
        }
    }
}

impl Validate for Item {
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        if self.id.is_nil() {
            out.push(Violation::new("id", "must not be the nil UUID"));
        }
        if self.title.trim().is_empty() {
            out.push(Violation::new("title", "must not be empty"));
        }
        check_timestamps(&self.created_at, &self.updated_at, &mut out);
        if let Some(due) = &self.due {
            if !is_valid_due(due) {
                out.push(Violation::new(
                    "due",
                    "must be YYYY-MM-DD or an RFC 3339 timestamp",
                ));
            }
        }
        check_tags(&self.tags, &mut out);
        out
    }
}

impl Validate for ListEntry {
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        if !is_valid_slug(&self.slug) {
            out.push(Violation::new(
                "slug",
                "must be lowercase alphanumeric words joined by single hyphens",
            ));
        }
        if self.title.trim().is_empty() {
            out.push(Violation::new("title", "must not be empty"));
        }
        if self.path_jsonl.trim().is_empty() {
            out.push(Violation::new("path_jsonl", "must not be empty"));
        }
        if self.path_md.trim().is_empty() {
            out.push(Violation::new("path_md", "must not be empty"));
        }
        check_timestamps(&self.created_at, &self.updated_at, &mut out);
        match (&self.promoted, &self.promoted_at) {
            (true, None) => out.push(Violation::new(
                "promoted_at",
                "required when promoted is true",
            )),
            (false, Some(_)) => out.push(Violation::new(
                "promoted_at",
                "must be absent when promoted is false",
            )),
            (true, Some(at)) if parse_timestamp(at).is_none() => out.push(Violation::new(
                "promoted_at",
                "must be an RFC 3339 timestamp",
            )),
            _ => {}
        }
        check_tags(&self.tags, &mut out);
        out
    }
}
