//! Retirement of markdown mirrors for lists that used to be dual-written.
//!
//! # Invariants
//! - A markdown file is deleted only after its list's JSONL file parsed and
//!   a byte copy of the markdown reached the backup directory.
//! - Dry-run verifies and reports without touching any file.

use super::free_backup_path;
use crate::config::ListsPaths;
use crate::error::ListsResult;
use crate::registry::Registry;
use crate::service::WriteMode;
use crate::store::{self, IndexLock, StoreError};
use chrono::Utc;
use log::{info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// Markdown copied to `backup` and deleted (or would be, in dry-run).
    Retired {
        backup: PathBuf,
        record_count: usize,
    },
    /// JSONL valid, no markdown to retire.
    NoMirror { record_count: usize },
    /// Verification or backup failed; markdown left in place.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorResult {
    pub name: String,
    pub outcome: MirrorOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub mode: WriteMode,
    pub results: Vec<MirrorResult>,
}

impl ConsolidationReport {
    pub fn failed(&self) -> impl Iterator<Item = &MirrorResult> {
        self.results
            .iter()
            .filter(|result| matches!(result.outcome, MirrorOutcome::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Retires the markdown mirror of every name in `mirrored`.
///
/// Names are resolved through the registry when registered, else to
/// `<lists_dir>/<name>.{jsonl,md}`.
pub fn retire_mirrors(
    registry: &Registry,
    paths: &ListsPaths,
    mirrored: &[String],
    mode: WriteMode,
) -> ListsResult<ConsolidationReport> {
    let _lock = IndexLock::acquire(&paths.lock_file)?;
    let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let mut report = ConsolidationReport {
        mode,
        results: Vec::with_capacity(mirrored.len()),
    };

    for name in mirrored {
        let (jsonl_path, md_path) = match registry.find(name) {
            Some(entry) => (paths.resolve(&entry.path_jsonl), paths.resolve(&entry.path_md)),
            None => (
                paths.lists_dir.join(format!("{name}.jsonl")),
                paths.lists_dir.join(format!("{name}.md")),
            ),
        };
        let outcome = match retire_one(name, &jsonl_path, &md_path, paths, &stamp, mode) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    "event=mirror_retire module=maintenance status=error list={} error_code={}",
                    name,
                    err.code()
                );
                MirrorOutcome::Failed(err.to_string())
            }
        };
        report.results.push(MirrorResult {
            name: name.clone(),
            outcome,
        });
    }
    Ok(report)
}

fn retire_one(
    name: &str,
    jsonl_path: &Path,
    md_path: &Path,
    paths: &ListsPaths,
    stamp: &str,
    mode: WriteMode,
) -> Result<MirrorOutcome, StoreError> {
    // The source of truth must exist and parse; an empty file is valid.
    match jsonl_path.try_exists() {
        Ok(true) => {}
        Ok(false) => {
            return Ok(MirrorOutcome::Failed(format!(
                "JSONL not found: {}",
                jsonl_path.display()
            )))
        }
        Err(err) => return Err(StoreError::io(jsonl_path, err)),
    }
    let records: Vec<Value> = store::read_all(jsonl_path)?;
    let record_count = records.len();

    if !md_path.exists() {
        info!(
            "event=mirror_retire module=maintenance status=skip reason=no_mirror list={name} record_count={record_count}"
        );
        return Ok(MirrorOutcome::NoMirror { record_count });
    }

    let backup = free_backup_path(paths.backup_dir.join(format!("{name}.md.backup_{stamp}")));
    if !mode.is_live() {
        info!(
            "event=mirror_retire module=maintenance status=dry_run list={name} record_count={record_count}"
        );
        return Ok(MirrorOutcome::Retired {
            backup,
            record_count,
        });
    }

    fs::create_dir_all(&paths.backup_dir).map_err(|err| StoreError::io(&paths.backup_dir, err))?;
    fs::copy(md_path, &backup).map_err(|err| StoreError::io(&backup, err))?;
    fs::remove_file(md_path).map_err(|err| StoreError::io(md_path, err))?;
    info!(
        "event=mirror_retire module=maintenance status=ok list={name} record_count={record_count} backup={}",
        backup.display()
    );
    Ok(MirrorOutcome::Retired {
        backup,
        record_count,
    })
}
