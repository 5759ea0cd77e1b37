//! List item domain model.
//!
//! # Responsibility
//! - Define the canonical record stored one-per-line in a list file.
//! - Provide construction and mutation helpers that keep timestamps honest.
//!
//! # Invariants
//! - `id` is assigned once and survives moves between lists.
//! - `updated_at` advances on every mutation that changes a field.
//! - Unknown keys from older writers are kept in `extra` and written back
//!   in their original order.

use crate::time;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of an item across all lists.
pub type ItemId = Uuid;

/// Lifecycle state of an item. `Archived` is the closest thing to deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Open,
    Pinned,
    Done,
    Archived,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [Self::Open, Self::Pinned, Self::Done, Self::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pinned => "pinned",
            Self::Done => "done",
            Self::Archived => "archived",
        }
    }
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "pinned" => Ok(Self::Pinned),
            "done" => Ok(Self::Done),
            "archived" => Ok(Self::Archived),
            other => Err(format!(
                "unsupported status `{other}`; expected open|pinned|done|archived"
            )),
        }
    }
}

/// Item priority, serialized as the single letters `L`, `M`, `H`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "L")]
    Low,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "H")]
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "L",
            Self::Medium => "M",
            Self::High => "H",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Self::Low),
            "M" => Ok(Self::Medium),
            "H" => Ok(Self::High),
            other => Err(format!("unsupported priority `{other}`; expected L|M|H")),
        }
    }
}

/// One task/note/entry belonging to exactly one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub created_at: String,
    pub updated_at: String,
    pub title: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Ordered; duplicates are not collapsed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// ISO date (`YYYY-MM-DD`) or full timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    /// Free text; move provenance is appended here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Creates an open item with a fresh id and `created_at == updated_at`.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, time::now_iso())
    }

    /// Creates an item with caller-provided identity, used by import and
    /// deterministic alert paths.
    pub fn with_id(id: ItemId, title: impl Into<String>, created_at: impl Into<String>) -> Self {
        let created_at = created_at.into();
        Self {
            id,
            updated_at: created_at.clone(),
            created_at,
            title: title.into(),
            status: ItemStatus::Open,
            body: None,
            tags: Vec::new(),
            priority: None,
            project: None,
            due: None,
            notes: None,
            extra: Map::new(),
        }
    }

    /// Advances `updated_at` past its current value.
    pub fn touch(&mut self) {
        self.updated_at = time::advance_from(&self.updated_at);
    }

    /// Appends one provenance sentence to `notes`, keeping prior text.
    pub fn append_note(&mut self, sentence: &str) {
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {sentence}", existing.trim_end())
            }
            _ => sentence.to_string(),
        });
    }
}
