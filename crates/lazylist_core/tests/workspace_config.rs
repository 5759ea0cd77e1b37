use lazylist_core::export::{export_to, ExportFormat};
use lazylist_core::{ErrorKind, NewItem, NewList, Workspace, WriteMode};
use std::fs;

#[test]
fn open_without_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::open(dir.path(), None).unwrap();
    assert_eq!(workspace.config().classifier.max_tags, 3);
    assert_eq!(
        workspace.paths().registry_file,
        dir.path().join("lists/index.jsonl")
    );
}

#[test]
fn open_reads_root_config_and_relocates_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("lazylist.toml"),
        "[paths]\nlists_dir = \"data\"\nregistry_file = \"data/registry.jsonl\"\n",
    )
    .unwrap();

    let workspace = Workspace::open(dir.path(), None).unwrap();
    let entry = workspace
        .registry_service()
        .create(
            &NewList {
                slug: "ideas".to_string(),
                title: "Ideas".to_string(),
                tags: Vec::new(),
            },
            WriteMode::Live,
        )
        .unwrap();
    assert_eq!(entry.path_jsonl, "data/ideas.jsonl");
    assert!(dir.path().join("data/registry.jsonl").is_file());
    assert!(dir.path().join("data/ideas.jsonl").is_file());
}

#[test]
fn explicit_config_errors_surface_as_config_kind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[similarity]\nthreshold = 1.5\n").unwrap();
    let err = Workspace::open(dir.path(), Some(&path)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(err.code(), "config_invalid");

    let missing = Workspace::open(dir.path(), Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::Config);
}

#[test]
fn export_writes_rendered_list() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::open(dir.path(), None).unwrap();
    workspace
        .registry_service()
        .create(
            &NewList {
                slug: "ideas".to_string(),
                title: "Ideas".to_string(),
                tags: Vec::new(),
            },
            WriteMode::Live,
        )
        .unwrap();
    let items = workspace.item_service().unwrap();
    items
        .add(Some("ideas"), NewItem::titled("plant tomatoes"), WriteMode::Live)
        .unwrap();

    let listed = items.list_items("ideas").unwrap();
    let md_path = dir.path().join("out/ideas.md");
    export_to(ExportFormat::Markdown, "Ideas", &listed, &md_path).unwrap();
    let md = fs::read_to_string(&md_path).unwrap();
    assert!(md.starts_with("# Ideas\n"));
    assert!(md.contains("### plant tomatoes"));

    let csv_path = dir.path().join("out/ideas.csv");
    export_to(ExportFormat::Csv, "Ideas", &listed, &csv_path).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.matches("\r\n").count(), 2);
    assert!(csv.contains(",plant tomatoes,open,"));
}
