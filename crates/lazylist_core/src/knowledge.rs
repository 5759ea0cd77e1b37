//! Append-once knowledge facts.
//!
//! # Responsibility
//! - Record small subject/predicate/object facts produced by list workflows.
//!
//! # Invariants
//! - A fact id is written at most once; re-recording is a no-op.
//! - Facts written by other tools are preserved verbatim, whatever their shape.

use crate::store::{self, StoreResult};
use crate::time;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeFact {
    pub id: String,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub source: String,
    pub confidence: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl KnowledgeFact {
    /// Fact stating that a list has been promoted.
    pub fn list_promoted(slug: &str, at: &str) -> Self {
        Self {
            id: promotion_fact_id(slug),
            subject: slug.to_string(),
            predicate: "is_promoted".to_string(),
            object: "true".to_string(),
            source: "lists_promote".to_string(),
            confidence: 1.0,
            tags: vec!["list".to_string(), "promoted".to_string()],
            created_at: at.to_string(),
            updated_at: at.to_string(),
        }
    }
}

pub fn promotion_fact_id(slug: &str) -> String {
    format!("list_{slug}_promoted")
}

/// Facts file handle; every call re-reads the file.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    path: PathBuf,
}

impl KnowledgeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &str) -> StoreResult<bool> {
        let facts: Vec<Value> = store::read_all(&self.path)?;
        Ok(facts.iter().any(|fact| fact_id(fact) == Some(id)))
    }

    /// Appends `fact` unless its id already exists. Returns whether it was written.
    pub fn record_once(&self, fact: &KnowledgeFact) -> StoreResult<bool> {
        let mut facts: Vec<Value> = store::read_all(&self.path)?;
        if facts.iter().any(|existing| fact_id(existing) == Some(fact.id.as_str())) {
            info!(
                "event=fact_record module=knowledge status=skip reason=exists fact_id={}",
                fact.id
            );
            return Ok(false);
        }
        let encoded = serde_json::to_value(fact).map_err(|err| store::StoreError::Serialize {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        facts.push(encoded);
        store::write_all_preserving(&self.path, &facts, |fact| fact_id(fact).map(str::to_string))?;
        info!(
            "event=fact_record module=knowledge status=ok fact_id={} recorded_at={}",
            fact.id,
            time::now_iso()
        );
        Ok(true)
    }
}

fn fact_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}
