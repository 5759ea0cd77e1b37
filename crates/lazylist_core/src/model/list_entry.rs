//! Registry entry model: one record per list in `index.jsonl`.
//!
//! # Invariants
//! - `slug` is unique across the registry and never changes after creation.
//! - `promoted_at` is present exactly when `promoted` is true.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catalog record describing one list and where its files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub slug: String,
    pub title: String,
    /// Relative to the workspace root unless absolute.
    pub path_jsonl: String,
    /// Location of the (possibly retired) markdown mirror.
    pub path_md: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub promoted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ListEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|value| value == tag)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
