// tests/fs_abstraction.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use taskbridge::config::WatcherSettings;
use taskbridge::fs::FileSystem;
use taskbridge::fs::mock::MockFileSystem;
use taskbridge::store::{StatusUpdate, StatusWriter, TaskStoreFile, UpdateOutcome, ensure_layout, load_seed_ids};
use taskbridge::types::TaskStatus;
use taskbridge_test_utils::builders::{StoreDocBuilder, results_doc};

const DIR: &str = "/home/u/Orchestrate";

fn watcher_settings() -> WatcherSettings {
    WatcherSettings {
        dir: PathBuf::from(DIR),
        queue_file: PathBuf::from(DIR).join("claude_task_queue.json"),
        results_file: PathBuf::from(DIR).join("claude_task_results.json"),
        poll_interval: Some(Duration::from_secs(2)),
        fs_events: true,
    }
}

fn store_on(fs: &MockFileSystem, path: &Path) -> TaskStoreFile {
    let fs: Arc<dyn FileSystem> = Arc::new(fs.clone());
    TaskStoreFile::new(path, fs)
}

#[test]
fn test_fresh_layout_is_bootstrapped() {
    let fs = MockFileSystem::new();
    let settings = watcher_settings();
    let store = store_on(&fs, &settings.queue_file);

    let report = ensure_layout(&fs, &store, &settings).unwrap();
    assert!(report.created_dir && report.created_queue && report.created_results);

    let queue: Value = serde_json::from_str(&fs.contents(&settings.queue_file).unwrap()).unwrap();
    let results: Value =
        serde_json::from_str(&fs.contents(&settings.results_file).unwrap()).unwrap();
    assert_eq!(queue, json!({ "tasks": {} }));
    assert_eq!(results, json!({ "results": {} }));
    assert!(load_seed_ids(&fs, &settings.results_file).is_empty());
}

#[test]
fn test_existing_files_are_not_touched() {
    let fs = MockFileSystem::new();
    let settings = watcher_settings();
    let queue = StoreDocBuilder::new().queued("t1", "X").build();
    fs.add_file(&settings.queue_file, queue.clone());
    fs.add_file(&settings.results_file, results_doc(&["old"]));
    let store = store_on(&fs, &settings.queue_file);

    let report = ensure_layout(&fs, &store, &settings).unwrap();
    assert!(!report.created_queue && !report.created_results);
    assert_eq!(fs.contents(&settings.queue_file).unwrap(), queue);

    let seed = load_seed_ids(&fs, &settings.results_file);
    assert_eq!(seed.len(), 1);
    assert!(seed.contains("old"));
}

#[test]
fn test_terminal_status_is_never_overwritten() {
    let fs = MockFileSystem::new();
    let settings = watcher_settings();
    fs.add_file(
        &settings.queue_file,
        StoreDocBuilder::new()
            .with_status("t1", "X", TaskStatus::Completed)
            .build(),
    );
    let writer = StatusWriter::new(store_on(&fs, &settings.queue_file));

    let outcome = writer.update("t1", &StatusUpdate::error("late failure"));
    assert!(matches!(outcome, UpdateOutcome::Rejected { .. }));

    let doc: Value = serde_json::from_str(&fs.contents(&settings.queue_file).unwrap()).unwrap();
    assert_eq!(doc["tasks"]["t1"]["status"], json!("completed"));
    assert!(doc["tasks"]["t1"].get("error").is_none());
}

#[test]
fn test_failed_write_is_reported_not_raised() {
    let fs = MockFileSystem::new();
    let settings = watcher_settings();
    let original = StoreDocBuilder::new().queued("t1", "X").build();
    fs.add_file(&settings.queue_file, original.clone());
    fs.set_fail_writes(true);
    let writer = StatusWriter::new(store_on(&fs, &settings.queue_file));

    let outcome = writer.update("t1", &StatusUpdate::in_progress());
    assert!(matches!(outcome, UpdateOutcome::Failed(_)));
    assert_eq!(fs.contents(&settings.queue_file).unwrap(), original);
}
