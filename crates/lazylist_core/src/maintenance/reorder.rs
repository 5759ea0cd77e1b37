//! Newest-first reorder migration for every registered list.
//!
//! Records are moved as their stored lines, so every record survives
//! byte-for-byte.

use super::{free_backup_path, with_suffix};
use crate::config::ListsPaths;
use crate::error::ListsResult;
use crate::registry::Registry;
use crate::service::WriteMode;
use crate::store::{self, IndexLock, StoreError};
use crate::time;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderedList {
    pub slug: String,
    pub item_count: usize,
    /// `None` in dry-run mode.
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorderReport {
    pub reordered: Vec<ReorderedList>,
    pub already_ordered: Vec<String>,
    /// Registered lists with no file on disk.
    pub missing: Vec<String>,
    pub failed: Vec<(String, String)>,
    /// Records with neither timestamp, keyed at the run's start time.
    pub untimed_records: usize,
}

impl ReorderReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sort key: `created_at`, else `updated_at`, else `None`.
fn record_time(record: &Value) -> Option<DateTime<Utc>> {
    ["created_at", "updated_at"]
        .iter()
        .find_map(|field| {
            record
                .get(field)
                .and_then(Value::as_str)
                .and_then(time::parse_timestamp)
        })
}

/// Sorts every registered list newest first under the index lock.
///
/// Lists already in order are left untouched. Changed lists get a copy of
/// the original at `<file>.backup` (numbered when taken) before the atomic
/// rewrite.
pub fn reorder_all(
    registry: &Registry,
    paths: &ListsPaths,
    mode: WriteMode,
) -> ListsResult<ReorderReport> {
    let _lock = IndexLock::acquire(&paths.lock_file)?;
    let run_time = Utc::now();
    let mut report = ReorderReport::default();

    for entry in registry.list_all() {
        let path = paths.resolve(&entry.path_jsonl);
        if !path.exists() {
            warn!(
                "event=list_reorder module=maintenance status=skip reason=missing_file slug={}",
                entry.slug
            );
            report.missing.push(entry.slug.clone());
            continue;
        }
        match reorder_file(&path, run_time, mode, &mut report.untimed_records) {
            Ok(Some(reordered)) => {
                info!(
                    "event=list_reorder module=maintenance status=ok mode={} slug={} item_count={}",
                    mode.as_str(),
                    entry.slug,
                    reordered.0
                );
                report.reordered.push(ReorderedList {
                    slug: entry.slug.clone(),
                    item_count: reordered.0,
                    backup: reordered.1,
                });
            }
            Ok(None) => report.already_ordered.push(entry.slug.clone()),
            Err(err) => {
                warn!(
                    "event=list_reorder module=maintenance status=error slug={} error_code={}",
                    entry.slug,
                    err.code()
                );
                report.failed.push((entry.slug.clone(), err.to_string()));
            }
        }
    }
    Ok(report)
}

/// Returns `Some((count, backup))` when the file needed reordering.
fn reorder_file(
    path: &Path,
    run_time: DateTime<Utc>,
    mode: WriteMode,
    untimed: &mut usize,
) -> Result<Option<(usize, Option<PathBuf>)>, StoreError> {
    let records: Vec<(Value, String)> = store::read_all_with_lines(path)?;
    let mut keyed: Vec<(DateTime<Utc>, String)> = Vec::with_capacity(records.len());
    for (record, line) in records {
        let key = match record_time(&record) {
            Some(at) => at,
            None => {
                *untimed += 1;
                warn!(
                    "event=record_untimed module=maintenance status=skip path={} record_id={}",
                    path.display(),
                    record.get("id").and_then(Value::as_str).unwrap_or("unknown")
                );
                run_time
            }
        };
        keyed.push((key, line));
    }

    if keyed.windows(2).all(|pair| pair[0].0 >= pair[1].0) {
        return Ok(None);
    }
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    let mut sorted = String::new();
    for (_, line) in &keyed {
        sorted.push_str(line);
        sorted.push('\n');
    }

    if !mode.is_live() {
        return Ok(Some((keyed.len(), None)));
    }
    let backup = free_backup_path(with_suffix(path, ".backup"));
    fs::copy(path, &backup).map_err(|err| StoreError::io(&backup, err))?;
    store::atomic_write(path, sorted.as_bytes())?;
    Ok(Some((keyed.len(), Some(backup))))
}
