use lazylist_core::maintenance::consolidate::MirrorOutcome;
use lazylist_core::maintenance::integrity::IssueKind;
use lazylist_core::{ListsConfig, NewItem, NewList, Workspace, WriteMode};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

fn create(workspace: &Workspace, slug: &str) {
    workspace
        .registry_service()
        .create(
            &NewList {
                slug: slug.to_string(),
                title: slug.to_string(),
                tags: Vec::new(),
            },
            WriteMode::Live,
        )
        .unwrap();
}

fn workspace_with(config: ListsConfig, slugs: &[&str]) -> (TempDir, Workspace) {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::with_config(dir.path(), config);
    for slug in slugs {
        create(&workspace, slug);
    }
    (dir, workspace)
}

fn list_file(workspace: &Workspace, slug: &str) -> PathBuf {
    workspace.paths().lists_dir.join(format!("{slug}.jsonl"))
}

const OLDEST_FIRST: &str = concat!(
    "{\"id\":\"a\",\"title\":\"old\",\"created_at\":\"2025-01-01T00:00:00Z\",\"kept\":1}\n",
    "{\"id\":\"b\",\"title\":\"newer\",\"updated_at\":\"2025-03-01T00:00:00Z\"}\n",
    "{\"id\":\"c\",\"title\":\"undated\"}\n",
);

fn ids(path: &PathBuf) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| {
            let value: Value = serde_json::from_str(line).unwrap();
            value["id"].as_str().unwrap().to_string()
        })
        .collect()
}

#[test]
fn reorder_sorts_newest_first_and_keeps_backup() {
    let (_dir, workspace) = workspace_with(ListsConfig::default(), &["ideas"]);
    let path = list_file(&workspace, "ideas");
    fs::write(&path, OLDEST_FIRST).unwrap();

    let report = workspace.reorder(WriteMode::Live).unwrap();
    assert!(report.is_success());
    assert_eq!(report.reordered.len(), 1);
    assert_eq!(report.untimed_records, 1);
    assert_eq!(ids(&path), vec!["c", "b", "a"]);

    let backup = report.reordered[0].backup.clone().unwrap();
    assert_eq!(backup.file_name().unwrap(), "ideas.jsonl.backup");
    assert_eq!(fs::read_to_string(&backup).unwrap(), OLDEST_FIRST);

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"kept\":1"));
}

#[test]
fn reorder_is_idempotent() {
    let (_dir, workspace) = workspace_with(ListsConfig::default(), &["ideas"]);
    let path = list_file(&workspace, "ideas");
    fs::write(&path, OLDEST_FIRST).unwrap();
    workspace.reorder(WriteMode::Live).unwrap();
    let after_first = fs::read_to_string(&path).unwrap();

    let second = workspace.reorder(WriteMode::Live).unwrap();
    assert!(second.reordered.is_empty());
    assert_eq!(second.already_ordered, vec!["ideas".to_string()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
    assert!(!path.with_file_name("ideas.jsonl.backup.1").exists());
}

#[test]
fn reorder_dry_run_and_missing_files() {
    let (_dir, workspace) = workspace_with(ListsConfig::default(), &["ideas", "gone"]);
    let path = list_file(&workspace, "ideas");
    fs::write(&path, OLDEST_FIRST).unwrap();
    fs::remove_file(list_file(&workspace, "gone")).unwrap();

    let report = workspace.reorder(WriteMode::DryRun).unwrap();
    assert_eq!(report.reordered.len(), 1);
    assert!(report.reordered[0].backup.is_none());
    assert_eq!(report.missing, vec!["gone".to_string()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), OLDEST_FIRST);
}

#[test]
fn reorder_reports_corrupt_list_and_continues() {
    let (_dir, workspace) = workspace_with(ListsConfig::default(), &["broken", "ideas"]);
    fs::write(list_file(&workspace, "broken"), "{oops\n").unwrap();
    fs::write(list_file(&workspace, "ideas"), OLDEST_FIRST).unwrap();

    let report = workspace.reorder(WriteMode::Live).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failed[0].0, "broken");
    assert_eq!(report.reordered[0].slug, "ideas");
}

fn mirrored_config(names: &[&str]) -> ListsConfig {
    let mut config = ListsConfig::default();
    config.consolidation.mirrored_lists = names.iter().map(|name| name.to_string()).collect();
    config
}

#[test]
fn consolidate_backs_up_then_removes_markdown() {
    let (_dir, workspace) = workspace_with(mirrored_config(&["ideas", "tasks"]), &["ideas", "tasks"]);
    workspace
        .item_service()
        .unwrap()
        .add(Some("ideas"), NewItem::titled("one"), WriteMode::Live)
        .unwrap();
    let md = workspace.paths().lists_dir.join("ideas.md");
    fs::write(&md, "# Ideas\n").unwrap();

    let report = workspace.consolidate(WriteMode::Live).unwrap();
    assert!(report.is_success());
    match &report.results[0].outcome {
        MirrorOutcome::Retired {
            backup,
            record_count,
        } => {
            assert_eq!(*record_count, 1);
            assert!(backup.starts_with(&workspace.paths().backup_dir));
            assert_eq!(fs::read_to_string(backup).unwrap(), "# Ideas\n");
        }
        other => panic!("expected retirement, got {other:?}"),
    }
    assert!(!md.exists());
    assert_eq!(
        report.results[1].outcome,
        MirrorOutcome::NoMirror { record_count: 0 }
    );
}

#[test]
fn consolidate_dry_run_touches_nothing() {
    let (_dir, workspace) = workspace_with(mirrored_config(&["ideas"]), &["ideas"]);
    let md = workspace.paths().lists_dir.join("ideas.md");
    fs::write(&md, "# Ideas\n").unwrap();

    let report = workspace.consolidate(WriteMode::DryRun).unwrap();
    assert!(matches!(
        report.results[0].outcome,
        MirrorOutcome::Retired { .. }
    ));
    assert!(md.exists());
    assert!(!workspace.paths().backup_dir.exists());
}

#[test]
fn consolidate_keeps_markdown_when_jsonl_is_missing_or_corrupt() {
    let (_dir, workspace) = workspace_with(mirrored_config(&["ghost", "broken"]), &["broken"]);
    let lists_dir = workspace.paths().lists_dir.clone();
    fs::write(lists_dir.join("ghost.md"), "# Ghost\n").unwrap();
    fs::write(lists_dir.join("broken.md"), "# Broken\n").unwrap();
    fs::write(lists_dir.join("broken.jsonl"), "not json\n").unwrap();

    let report = workspace.consolidate(WriteMode::Live).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failed().count(), 2);
    assert!(lists_dir.join("ghost.md").exists());
    assert!(lists_dir.join("broken.md").exists());
}

#[test]
fn check_is_clean_for_fresh_workspace() {
    let (_dir, workspace) = workspace_with(ListsConfig::default(), &["ideas", "tasks"]);
    workspace
        .item_service()
        .unwrap()
        .add(Some("ideas"), NewItem::titled("fine"), WriteMode::Live)
        .unwrap();

    let report = workspace.check();
    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.lists_checked, 2);
    assert_eq!(report.items_checked, 1);
}

#[test]
fn check_reports_orphans_duplicates_and_corruption() {
    let (_dir, workspace) = workspace_with(ListsConfig::default(), &["ideas", "tasks", "broken"]);
    let id = Uuid::new_v4();
    let record = format!(
        "{{\"id\":\"{id}\",\"created_at\":\"2025-01-01T00:00:00Z\",\"updated_at\":\"2025-01-01T00:00:00Z\",\"title\":\"twin\"}}\n"
    );
    fs::write(list_file(&workspace, "ideas"), &record).unwrap();
    fs::write(list_file(&workspace, "tasks"), &record).unwrap();
    fs::write(list_file(&workspace, "broken"), "[]\n").unwrap();
    fs::write(list_file(&workspace, "stray"), "").unwrap();

    let report = workspace.check();
    let kinds: Vec<IssueKind> = report.issues.iter().map(|issue| issue.kind).collect();
    assert!(kinds.contains(&IssueKind::CorruptList));
    assert!(kinds.contains(&IssueKind::DuplicateItemId));
    assert!(kinds.contains(&IssueKind::OrphanFile));

    let orphan = report
        .issues
        .iter()
        .find(|issue| issue.kind == IssueKind::OrphanFile)
        .unwrap();
    assert!(orphan.message.contains("stray.jsonl"));
}

#[test]
fn check_reports_corrupt_registry() {
    let (_dir, workspace) = workspace_with(ListsConfig::default(), &[]);
    let registry = workspace.paths().registry_file.clone();
    fs::create_dir_all(registry.parent().unwrap()).unwrap();
    fs::write(&registry, "garbage\n").unwrap();

    let report = workspace.check();
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::CorruptRegistry);
}

#[test]
fn check_names_legacy_alert_ids() {
    let (_dir, workspace) = workspace_with(ListsConfig::default(), &["system-upgrades"]);
    let good = Uuid::new_v4();
    fs::write(
        list_file(&workspace, "system-upgrades"),
        format!(
            concat!(
                "{{\"id\":\"{}\",\"created_at\":\"2025-01-02T00:00:00Z\",\"updated_at\":\"2025-01-02T00:00:00Z\",\"title\":\"fine\"}}\n",
                "{{\"id\":\"phase3-lists-trigger-20250101\",\"created_at\":\"2025-01-01T00:00:00Z\",\"updated_at\":\"2025-01-01T00:00:00Z\",\"title\":\"List consolidation recommended\"}}\n"
            ),
            good
        ),
    )
    .unwrap();

    let report = workspace.check();
    assert_eq!(report.issues.len(), 1, "{:?}", report.issues);
    let issue = &report.issues[0];
    assert_eq!(issue.kind, IssueKind::NonUuidId);
    assert_eq!(issue.kind.as_str(), "non_uuid_id");
    assert_eq!(issue.slug.as_deref(), Some("system-upgrades"));
    assert!(issue.message.contains("record 2"));
    assert!(issue.message.contains("phase3-lists-trigger-20250101"));
}
