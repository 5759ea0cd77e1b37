use lazylist_core::{
    ClassificationRule, ItemFilter, ItemStatus, ItemUpdate, ListsConfig, ListsError, NewItem,
    NewList, Priority, Workspace, WriteMode,
};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;
use uuid::Uuid;

fn workspace_with(slugs: &[&str]) -> (TempDir, Workspace) {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::with_config(dir.path(), ListsConfig::default());
    let registry = workspace.registry_service();
    for slug in slugs {
        registry
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
    (dir, workspace)
}

fn raw_lines(workspace: &Workspace, slug: &str) -> Vec<Value> {
    let path = workspace.paths().lists_dir.join(format!("{slug}.jsonl"));
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn add_inserts_newest_first() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let service = workspace.item_service().unwrap();
    let first = service
        .add(Some("ideas"), NewItem::titled("first"), WriteMode::Live)
        .unwrap();
    let second = service
        .add(Some("ideas"), NewItem::titled("second"), WriteMode::Live)
        .unwrap();

    let items = service.list_items("ideas").unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, second.item.id);
    assert_eq!(items[1].id, first.item.id);
    assert_eq!(first.classification.rule, ClassificationRule::Explicit);
    assert!(first.questions.is_empty());
}

#[test]
fn add_with_blank_title_fails_before_writing() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let service = workspace.item_service().unwrap();
    let err = service
        .add(Some("ideas"), NewItem::titled("   "), WriteMode::Live)
        .unwrap_err();
    assert!(matches!(err, ListsError::EmptyTitle));
    assert!(service.list_items("ideas").unwrap().is_empty());
}

#[test]
fn add_to_unregistered_list_is_not_found() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let err = workspace
        .item_service()
        .unwrap()
        .add(Some("nowhere"), NewItem::titled("orphan"), WriteMode::Live)
        .unwrap_err();
    assert_eq!(err.code(), "list_not_found");
}

#[test]
fn add_rejects_invalid_due_date() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let request = NewItem {
        due: Some("next tuesday".to_string()),
        ..NewItem::titled("call the bank")
    };
    let err = workspace
        .item_service()
        .unwrap()
        .add(Some("ideas"), request, WriteMode::Live)
        .unwrap_err();
    assert_eq!(err.code(), "validation_failed");
}

#[test]
fn add_with_existing_explicit_id_is_a_conflict() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let service = workspace.item_service().unwrap();
    let id = Uuid::new_v4();
    let request = NewItem {
        id: Some(id),
        ..NewItem::titled("imported")
    };
    service
        .add(Some("ideas"), request.clone(), WriteMode::Live)
        .unwrap();
    let err = service
        .add(Some("ideas"), request, WriteMode::Live)
        .unwrap_err();
    assert!(matches!(err, ListsError::DuplicateItem { id: dup, .. } if dup == id));
}

#[test]
fn unlabelled_add_is_classified_and_tagged() {
    let (_dir, workspace) = workspace_with(&["ideas", "projects"]);
    let added = workspace
        .item_service()
        .unwrap()
        .add(
            None,
            NewItem::titled("Check https://github.com/rust-lang/rust for release notes"),
            WriteMode::Live,
        )
        .unwrap();

    assert_eq!(added.slug, "projects");
    assert!(matches!(added.classification.rule, ClassificationRule::Url(_)));
    assert_eq!(added.classification.rationale, "GitHub repository URL detected");
    assert!(!added.item.tags.is_empty());
    assert!(added.questions.is_empty());
}

#[test]
fn dry_run_add_leaves_file_untouched() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let service = workspace.item_service().unwrap();
    let added = service
        .add(Some("ideas"), NewItem::titled("maybe"), WriteMode::DryRun)
        .unwrap();
    assert_eq!(added.slug, "ideas");
    assert!(service.list_items("ideas").unwrap().is_empty());
}

#[test]
fn ingest_files_each_bullet_and_writes_lists_once() {
    let (_dir, workspace) = workspace_with(&["ideas", "system-upgrades"]);
    let service = workspace.item_service().unwrap();
    let added = service
        .ingest(
            "- upgrade the backup workflow\n- learn pottery\n* plan a garden",
            WriteMode::Live,
        )
        .unwrap();

    assert_eq!(added.len(), 3);
    assert_eq!(added[0].slug, "system-upgrades");
    assert_eq!(added[1].slug, "ideas");
    assert_eq!(added[2].slug, "ideas");
    assert_eq!(service.list_items("system-upgrades").unwrap().len(), 1);

    let ideas = service.list_items("ideas").unwrap();
    let titles: Vec<&str> = ideas.iter().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, vec!["plan a garden", "learn pottery"]);
}

#[test]
fn ingest_of_blank_text_is_empty_title() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let err = workspace
        .item_service()
        .unwrap()
        .ingest("  \n ", WriteMode::Live)
        .unwrap_err();
    assert!(matches!(err, ListsError::EmptyTitle));
}

#[test]
fn find_applies_every_filter() {
    let (_dir, workspace) = workspace_with(&["tasks"]);
    let service = workspace.item_service().unwrap();
    let urgent = NewItem {
        priority: Some(Priority::High),
        tags: vec!["home".to_string(), "money".to_string()],
        project: Some("house".to_string()),
        ..NewItem::titled("Pay the Roofer")
    };
    let relaxed = NewItem {
        priority: Some(Priority::Low),
        tags: vec!["home".to_string()],
        ..NewItem::titled("Water plants")
    };
    service.add(Some("tasks"), urgent, WriteMode::Live).unwrap();
    service.add(Some("tasks"), relaxed, WriteMode::Live).unwrap();

    let by_tag = ItemFilter {
        tags: vec!["home".to_string()],
        ..ItemFilter::default()
    };
    assert_eq!(service.find("tasks", &by_tag).unwrap().len(), 2);

    let narrow = ItemFilter {
        priority: Some(Priority::High),
        project: Some("house".to_string()),
        title_contains: Some("roofer".to_string()),
        tags: vec!["home".to_string(), "money".to_string()],
        ..ItemFilter::default()
    };
    let found = service.find("tasks", &narrow).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Pay the Roofer");

    let missing_project = ItemFilter {
        project: Some("garden".to_string()),
        ..ItemFilter::default()
    };
    assert!(service.find("tasks", &missing_project).unwrap().is_empty());
}

#[test]
fn set_without_changes_keeps_updated_at_and_file() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let service = workspace.item_service().unwrap();
    let added = service
        .add(Some("ideas"), NewItem::titled("steady"), WriteMode::Live)
        .unwrap();
    let before = raw_lines(&workspace, "ideas");

    let outcome = service
        .set(
            "ideas",
            added.item.id,
            &ItemUpdate {
                title: Some("steady".to_string()),
                ..ItemUpdate::default()
            },
            WriteMode::Live,
        )
        .unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.item.updated_at, added.item.updated_at);
    assert_eq!(raw_lines(&workspace, "ideas"), before);
}

#[test]
fn set_replaces_fields_and_advances_updated_at() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let service = workspace.item_service().unwrap();
    let added = service
        .add(Some("ideas"), NewItem::titled("draft"), WriteMode::Live)
        .unwrap();

    let update = ItemUpdate {
        title: Some("final".to_string()),
        tags: Some(vec!["writing".to_string()]),
        status: Some(ItemStatus::Done),
        ..ItemUpdate::default()
    };
    let outcome = service
        .set("ideas", added.item.id, &update, WriteMode::Live)
        .unwrap();
    assert!(outcome.changed);
    assert!(outcome.item.updated_at > added.item.updated_at);
    assert_eq!(outcome.item.created_at, added.item.created_at);

    let stored = service.get("ideas", added.item.id).unwrap();
    assert_eq!(stored.title, "final");
    assert_eq!(stored.tags, vec!["writing".to_string()]);
    assert_eq!(stored.status, ItemStatus::Done);
}

#[test]
fn set_unknown_item_is_not_found() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let err = workspace
        .item_service()
        .unwrap()
        .set(
            "ideas",
            Uuid::new_v4(),
            &ItemUpdate::status(ItemStatus::Done),
            WriteMode::Live,
        )
        .unwrap_err();
    assert_eq!(err.code(), "item_not_found");
}

#[test]
fn pin_and_unpin_toggle_status() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let service = workspace.item_service().unwrap();
    let id = service
        .add(Some("ideas"), NewItem::titled("keep"), WriteMode::Live)
        .unwrap()
        .item
        .id;

    assert!(service.pin("ideas", id, WriteMode::Live).unwrap().changed);
    assert_eq!(service.get("ideas", id).unwrap().status, ItemStatus::Pinned);
    assert!(!service.pin("ideas", id, WriteMode::Live).unwrap().changed);
    assert!(service.unpin("ideas", id, WriteMode::Live).unwrap().changed);
    assert_eq!(service.get("ideas", id).unwrap().status, ItemStatus::Open);
}

#[test]
fn move_keeps_identity_and_appends_provenance() {
    let (_dir, workspace) = workspace_with(&["inbox", "reading"]);
    let service = workspace.item_service().unwrap();
    service
        .add(Some("reading"), NewItem::titled("already here"), WriteMode::Live)
        .unwrap();
    let request = NewItem {
        notes: Some("from a friend".to_string()),
        ..NewItem::titled("long article")
    };
    let added = service
        .add(Some("inbox"), request, WriteMode::Live)
        .unwrap()
        .item;

    let moved = service
        .move_item("inbox", added.id, "reading", WriteMode::Live)
        .unwrap();
    assert!(!moved.replaced_existing);
    assert_eq!(moved.item.id, added.id);
    assert_eq!(moved.item.created_at, added.created_at);
    assert!(moved.item.updated_at > added.updated_at);
    let notes = moved.item.notes.as_deref().unwrap();
    assert!(notes.starts_with("from a friend Moved from inbox to reading at "));

    assert!(service.list_items("inbox").unwrap().is_empty());
    let reading = service.list_items("reading").unwrap();
    assert_eq!(reading.len(), 2);
    assert_eq!(reading[1].id, added.id);
}

#[test]
fn move_rejects_same_list_and_unknown_item() {
    let (_dir, workspace) = workspace_with(&["inbox", "reading"]);
    let service = workspace.item_service().unwrap();
    let id = service
        .add(Some("inbox"), NewItem::titled("stay"), WriteMode::Live)
        .unwrap()
        .item
        .id;

    let same = service
        .move_item("inbox", id, "inbox", WriteMode::Live)
        .unwrap_err();
    assert!(matches!(same, ListsError::SameList(_)));

    let unknown = service
        .move_item("inbox", Uuid::new_v4(), "reading", WriteMode::Live)
        .unwrap_err();
    assert_eq!(unknown.code(), "item_not_found");

    let missing_target = service
        .move_item("inbox", id, "archive", WriteMode::Live)
        .unwrap_err();
    assert_eq!(missing_target.code(), "list_not_found");
    assert_eq!(service.list_items("inbox").unwrap().len(), 1);
}

#[test]
fn unknown_item_fields_survive_a_set() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let path = workspace.paths().lists_dir.join("ideas.jsonl");
    let id = Uuid::new_v4();
    fs::write(
        &path,
        format!(
            "{{\"id\":\"{id}\",\"created_at\":\"2025-01-01T00:00:00Z\",\"updated_at\":\"2025-01-01T00:00:00Z\",\"title\":\"legacy\",\"status\":\"open\",\"source_app\":\"phone\"}}\n"
        ),
    )
    .unwrap();

    let service = workspace.item_service().unwrap();
    service
        .set("ideas", id, &ItemUpdate::status(ItemStatus::Done), WriteMode::Live)
        .unwrap();

    let lines = raw_lines(&workspace, "ideas");
    assert_eq!(lines[0]["source_app"], "phone");
    assert_eq!(lines[0]["status"], "done");
}

#[test]
fn add_keeps_existing_lines_byte_for_byte() {
    let (_dir, workspace) = workspace_with(&["ideas"]);
    let path = workspace.paths().lists_dir.join("ideas.jsonl");
    let legacy = format!(
        "{{\"title\":\"legacy\",\"id\":\"{}\",\"status\":\"open\",\"updated_at\":\"2025-01-01T00:00:00Z\",\"created_at\":\"2025-01-01T00:00:00Z\",\"body\":null,\"tags\":[]}}",
        Uuid::new_v4()
    );
    fs::write(&path, format!("{legacy}\n")).unwrap();

    let service = workspace.item_service().unwrap();
    service
        .add(Some("ideas"), NewItem::titled("fresh"), WriteMode::Live)
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"fresh\""));
    assert_eq!(lines[1], legacy);
}
