//! Collection file round trips through a real data directory

use std::fs;

use linkshelf_core::{
    Candidate, JsonFilePersistence, LinkInput, LinkStore, Persistence, StorageError,
};
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> LinkStore<JsonFilePersistence> {
    LinkStore::init(JsonFilePersistence::new(dir.path().join("links.json")))
}

#[test]
fn reopened_store_matches_saved_state() {
    let dir = TempDir::new().unwrap();

    let saved = {
        let mut store = file_store(&dir);
        store
            .add(LinkInput::new("Rust", "https://rust-lang.org").with_description("Language"))
            .unwrap();
        store
            .add(LinkInput::new("Crates", "https://crates.io").with_version("2.0.0"))
            .unwrap();
        store.batch_reconcile(vec![
            Candidate::new("Rust", "https://rust-lang.org"),
            Candidate::new("Docs", "https://docs.rs").with_description("API docs"),
        ]);
        let ids: Vec<_> = store.list().into_iter().map(|l| l.id).collect();
        assert!(store.reorder(&ids[2], &ids[0]));
        store.list()
    };

    let reopened = file_store(&dir);
    assert_eq!(reopened.list(), saved);

    let titles: Vec<_> = saved.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Docs", "Rust", "Crates"]);
    assert_eq!(saved[1].version, "1.0.1");
}

#[test]
fn file_uses_camel_case_fields() {
    let dir = TempDir::new().unwrap();
    let mut store = file_store(&dir);
    store.add(LinkInput::new("A", "https://a.com")).unwrap();

    let raw = fs::read_to_string(dir.path().join("links.json")).unwrap();
    assert!(raw.contains("\"createdAt\""));
    assert!(raw.contains("\"updatedAt\""));
    assert!(raw.contains("\"order\": 0"));
    assert!(raw.contains("\"version\": \"1.0.0\""));
}

#[test]
fn legacy_blob_is_backfilled_and_rewritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("links.json");
    fs::write(
        &path,
        r#"[
            {"id": "old-1", "title": "First", "url": "https://first.example"},
            {"id": "old-2", "title": "Second", "url": "https://second.example", "description": "kept"}
        ]"#,
    )
    .unwrap();

    let store = file_store(&dir);
    let links = store.list();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].order, 0);
    assert_eq!(links[1].order, 1);
    assert_eq!(links[0].version, "1.0.0");
    assert_eq!(links[0].description, "");
    assert_eq!(links[1].description, "kept");

    let rewritten = JsonFilePersistence::new(&path).load().unwrap();
    assert!(rewritten.iter().all(|l| !l.needs_backfill()));
}

#[test]
fn corrupt_file_is_backed_up_and_store_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("links.json");
    fs::write(&path, "{ not json").unwrap();

    let persistence = JsonFilePersistence::new(&path);
    let err = persistence.load().unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));
    assert_eq!(
        fs::read_to_string(persistence.backup_path()).unwrap(),
        "{ not json"
    );

    let store = file_store(&dir);
    assert!(store.is_empty());
}

#[test]
fn save_creates_missing_data_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("data").join("links.json");

    let mut store = LinkStore::init(JsonFilePersistence::new(&path));
    store.add(LinkInput::new("A", "https://a.com")).unwrap();

    assert!(path.exists());
    assert!(store.persistence().stats().size_bytes > 0);
}
