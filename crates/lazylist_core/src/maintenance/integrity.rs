//! Read-only integrity check across the registry and every list file.

use crate::config::ListsPaths;
use crate::model::item::{Item, ItemId};
use crate::registry::Registry;
use crate::repo::registry_repo::RegistryRepository;
use crate::store;
use crate::validation::Validate;
use log::info;
use std::collections::{BTreeMap, BTreeSet};
use serde_json::Value;
use std::fs;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    CorruptRegistry,
    InvalidEntry,
    DuplicateSlug,
    CorruptList,
    InvalidItem,
    DuplicateItemId,
    /// A `.jsonl` file in the lists directory that no entry points at.
    OrphanFile,
    /// A record whose `id` is not a UUID, such as a legacy dated alert id.
    /// The whole list is unreadable until the record gets a UUID.
    NonUuidId,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CorruptRegistry => "corrupt_registry",
            Self::InvalidEntry => "invalid_entry",
            Self::DuplicateSlug => "duplicate_slug",
            Self::CorruptList => "corrupt_list",
            Self::InvalidItem => "invalid_item",
            Self::DuplicateItemId => "duplicate_item_id",
            Self::OrphanFile => "orphan_file",
            Self::NonUuidId => "non_uuid_id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityIssue {
    pub kind: IssueKind,
    pub slug: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub lists_checked: usize,
    pub items_checked: usize,
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, kind: IssueKind, slug: Option<&str>, message: String) {
        self.issues.push(IntegrityIssue {
            kind,
            slug: slug.map(str::to_string),
            message,
        });
    }
}

/// Checks everything reachable from the registry and reports every issue
/// found.
pub fn check<R: RegistryRepository>(registry_repo: &R, paths: &ListsPaths) -> IntegrityReport {
    let mut report = IntegrityReport::default();
    let registry: Registry = match registry_repo.load() {
        Ok(registry) => registry,
        Err(err) => {
            report.push(IssueKind::CorruptRegistry, None, err.to_string());
            return report;
        }
    };

    let mut seen_slugs = BTreeSet::new();
    let mut owners: BTreeMap<ItemId, Vec<String>> = BTreeMap::new();
    let mut registered_files = BTreeSet::new();

    for entry in registry.list_all() {
        report.lists_checked += 1;
        if !seen_slugs.insert(entry.slug.clone()) {
            report.push(
                IssueKind::DuplicateSlug,
                Some(&entry.slug),
                format!("slug `{}` is registered more than once", entry.slug),
            );
        }
        for violation in entry.violations() {
            report.push(IssueKind::InvalidEntry, Some(&entry.slug), violation.to_string());
        }

        let path = paths.resolve(&entry.path_jsonl);
        registered_files.insert(path.clone());
        let items: Vec<Item> = match store::read_all(&path) {
            Ok(items) => items,
            Err(err) => {
                let legacy_ids = non_uuid_ids(&path);
                if legacy_ids.is_empty() {
                    report.push(IssueKind::CorruptList, Some(&entry.slug), err.to_string());
                }
                for (position, id) in legacy_ids {
                    report.push(
                        IssueKind::NonUuidId,
                        Some(&entry.slug),
                        format!(
                            "{} record {position}: id `{id}` is not a UUID; assign one before using this list",
                            path.display()
                        ),
                    );
                }
                continue;
            }
        };
        for item in &items {
            report.items_checked += 1;
            for violation in item.violations() {
                report.push(
                    IssueKind::InvalidItem,
                    Some(&entry.slug),
                    format!("item {}: {violation}", item.id),
                );
            }
            owners.entry(item.id).or_default().push(entry.slug.clone());
        }
    }

    for (id, slugs) in owners.into_iter().filter(|(_, slugs)| slugs.len() > 1) {
        report.push(
            IssueKind::DuplicateItemId,
            None,
            format!("item {id} appears in {}", slugs.join(", ")),
        );
    }

    if let Ok(dir) = fs::read_dir(&paths.lists_dir) {
        let mut orphans: Vec<String> = dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
            .filter(|path| *path != paths.registry_file && !registered_files.contains(path))
            .map(|path| path.display().to_string())
            .collect();
        orphans.sort();
        for orphan in orphans {
            report.push(
                IssueKind::OrphanFile,
                None,
                format!("unregistered list file {orphan}"),
            );
        }
    }

    info!(
        "event=integrity_check module=maintenance status={} lists_checked={} items_checked={} issue_count={}",
        if report.is_clean() { "ok" } else { "error" },
        report.lists_checked,
        report.items_checked,
        report.issues.len()
    );
    report
}

/// 1-based position and id of every record whose string `id` does not
/// parse as a UUID. Empty when the file is not plain JSONL either.
fn non_uuid_ids(path: &Path) -> Vec<(usize, String)> {
    let records: Vec<Value> = match store::read_all(path) {
        Ok(records) => records,
        Err(_) => return Vec::new(),
    };
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let id = record.get("id")?.as_str()?;
            Uuid::parse_str(id).is_err().then(|| (index + 1, id.to_string()))
        })
        .collect()
}
