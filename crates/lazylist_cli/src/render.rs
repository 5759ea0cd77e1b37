//! Plain-text rendering of command results.

use lazylist_core::health::{AlertOutcome, HealthReport};
use lazylist_core::maintenance::consolidate::{ConsolidationReport, MirrorOutcome};
use lazylist_core::maintenance::integrity::IntegrityReport;
use lazylist_core::maintenance::reorder::ReorderReport;
use lazylist_core::service::item_service::{AddedItem, MovedItem, SetOutcome};
use lazylist_core::similarity::ScanReport;
use lazylist_core::{Item, ListEntry, Workspace, WriteMode};

const BODY_PREVIEW_CHARS: usize = 100;

fn dry_run_prefix(mode: WriteMode) -> &'static str {
    if mode.is_live() {
        ""
    } else {
        "[dry run] "
    }
}

pub fn created_list(entry: &ListEntry, workspace: &Workspace, mode: WriteMode) {
    println!("{}Created list '{}'", dry_run_prefix(mode), entry.slug);
    println!("Registry: {}", workspace.paths().registry_file.display());
    println!("JSONL: {}", workspace.paths().resolve(&entry.path_jsonl).display());
}

pub fn added(results: &[AddedItem], mode: WriteMode) {
    for (index, result) in results.iter().enumerate() {
        if results.len() > 1 {
            println!("--- Item {} ---", index + 1);
        }
        println!("{}Added item {} to '{}'", dry_run_prefix(mode), result.item.id, result.slug);
        println!("Rationale: {}", result.classification.rationale);
        if !result.item.tags.is_empty() {
            println!("Tags: {}", result.item.tags.join(", "));
        }
        if !result.questions.is_empty() {
            println!("Categorization uncertain; consider:");
            for question in &result.questions {
                println!("  {question}");
            }
        }
    }
}

pub fn moved(moved: &MovedItem, mode: WriteMode) {
    println!(
        "{}Moved item {} from '{}' to '{}'",
        dry_run_prefix(mode),
        moved.item.id,
        moved.source,
        moved.target
    );
    if moved.replaced_existing {
        println!("Replaced an existing copy in '{}'", moved.target);
    }
}

pub fn updated(list: &str, outcome: &SetOutcome, mode: WriteMode) {
    if outcome.changed {
        println!(
            "{}Updated item {} in list '{}'",
            dry_run_prefix(mode),
            outcome.item.id,
            list.trim()
        );
    } else {
        println!("No changes for item {} in list '{}'", outcome.item.id, list.trim());
    }
}

pub fn items(items: &[Item]) {
    for item in items {
        println!("ID: {}", item.id);
        println!("Title: {}", item.title);
        println!("Status: {}", item.status);
        if let Some(priority) = item.priority {
            println!("Priority: {priority}");
        }
        if !item.tags.is_empty() {
            println!("Tags: {}", item.tags.join(", "));
        }
        if let Some(body) = &item.body {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            let ellipsis = if body.chars().count() > BODY_PREVIEW_CHARS {
                "..."
            } else {
                ""
            };
            println!("Body: {preview}{ellipsis}");
        }
        println!("---");
    }
}

pub fn items_json(items: &[Item]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(items)
}

pub fn scan(report: &ScanReport, threshold: f64, verbose: bool) {
    for (slug, message) in &report.unreadable {
        eprintln!("warning: list '{slug}' scored without items: {message}");
    }
    if report.list_count < 2 {
        println!("Not enough lists to compare.");
        return;
    }
    println!(
        "Scanned {} lists for merge candidates (threshold: {threshold})",
        report.list_count
    );
    if report.candidates.is_empty() {
        println!("No merge candidates found.");
        return;
    }
    println!("Found {} potential merge candidates:", report.candidates.len());
    for candidate in &report.candidates {
        println!("{}", "-".repeat(40));
        println!("Merge suggestion: '{}' and '{}'", candidate.first, candidate.second);
        println!("  Similarity score: {:.2}", candidate.score);
        if verbose {
            println!("  Tag similarity:     {:.2}", candidate.breakdown.tag);
            println!("  Title similarity:   {:.2}", candidate.breakdown.title);
            println!("  Content similarity: {:.2}", candidate.breakdown.content);
        }
    }
}

pub fn health(report: &HealthReport) {
    println!("List count: {}", report.list_count);
    println!("Status: {}", report.status.as_str().to_uppercase());
    println!("Recommendations:");
    for line in &report.recommendations {
        println!("  {line}");
    }
}

pub fn alert(outcome: AlertOutcome, alert_list: &str, mode: WriteMode) {
    match outcome {
        AlertOutcome::Created(id) => {
            println!("{}Recorded alert {id} in '{alert_list}'", dry_run_prefix(mode));
        }
        AlertOutcome::AlreadyRecorded(id) => {
            println!("Alert {id} already recorded in '{alert_list}'");
        }
        AlertOutcome::NotNeeded => {}
    }
}

pub fn reorder(report: &ReorderReport) {
    println!("Reordered: {}", report.reordered.len());
    for list in &report.reordered {
        match &list.backup {
            Some(backup) => println!(
                "  - {} ({} items, backup {})",
                list.slug,
                list.item_count,
                backup.display()
            ),
            None => println!("  - {} ({} items, dry run)", list.slug, list.item_count),
        }
    }
    println!("Already ordered: {}", report.already_ordered.len());
    for slug in &report.missing {
        println!("Missing file: {slug}");
    }
    if report.untimed_records > 0 {
        println!("Records without timestamps: {}", report.untimed_records);
    }
    for (slug, message) in &report.failed {
        eprintln!("Failed: {slug}: {message}");
    }
}

pub fn consolidation(report: &ConsolidationReport) {
    for result in &report.results {
        match &result.outcome {
            MirrorOutcome::Retired {
                backup,
                record_count,
            } => println!(
                "{}Retired {} ({record_count} records, backup {})",
                dry_run_prefix(report.mode),
                result.name,
                backup.display()
            ),
            MirrorOutcome::NoMirror { record_count } => {
                println!("No markdown mirror for {} ({record_count} records)", result.name)
            }
            MirrorOutcome::Failed(message) => eprintln!("Failed: {}: {message}", result.name),
        }
    }
}

pub fn integrity(report: &IntegrityReport) {
    if report.is_clean() {
        println!(
            "No issues detected ({} lists, {} items).",
            report.lists_checked, report.items_checked
        );
        return;
    }
    println!("Issues found:");
    for issue in &report.issues {
        match &issue.slug {
            Some(slug) => println!("  [{}] {slug}: {}", issue.kind.as_str(), issue.message),
            None => println!("  [{}] {}", issue.kind.as_str(), issue.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::items_json;
    use lazylist_core::Item;
    use serde_json::Value;

    #[test]
    fn items_json_is_a_parseable_array() {
        let items = vec![Item::new("first"), Item::new("second")];
        let rendered = items_json(&items).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        let array = parsed.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[1]["title"], "second");
        assert!(parsed.get("error").is_none());
    }
}
