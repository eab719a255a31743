// src/watch/watcher.rs

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, trace, warn};

use crate::types::ChangeSource;
use crate::watch::listener::StoreChangeListener;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch the directory containing `store_path` and signal `listener`
/// whenever the queue file itself is created or modified.
///
/// The directory rather than the file is watched so that producers that
/// replace the file (write temp + rename) are still seen.
pub fn spawn_watcher(
    store_path: &Path,
    listener: Arc<dyn StoreChangeListener>,
) -> Result<WatcherHandle> {
    let file_name = store_path
        .file_name()
        .with_context(|| format!("queue path {:?} has no file name", store_path))?
        .to_os_string();
    let dir: PathBuf = match store_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if is_store_event(&event, &file_name) {
                    trace!(?event, "queue file event");
                    listener.on_store_changed(ChangeSource::FileWatch);
                }
            }
            Err(err) => {
                warn!(error = %err, "file watch error");
            }
        },
        Config::default(),
    )
    .context("creating file watcher")?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("watching {:?}", dir))?;

    info!(path = ?store_path, "file watcher started");

    Ok(WatcherHandle { _inner: watcher })
}

/// Whether a notify event says the queue file (by name) was created or
/// changed. Access and removal events are ignored.
pub fn is_store_event(event: &Event, file_name: &OsStr) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    );
    relevant_kind
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name))
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind, RenameMode};

    use super::*;

    const QUEUE: &str = "claude_task_queue.json";

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn writes_and_replacements_of_the_queue_file_count() {
        let name = OsStr::new(QUEUE);
        let dir = "/home/u/Orchestrate/";
        assert!(is_store_event(
            &event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), &format!("{dir}{QUEUE}")),
            name
        ));
        assert!(is_store_event(
            &event(EventKind::Create(CreateKind::File), &format!("{dir}{QUEUE}")),
            name
        ));
        assert!(is_store_event(
            &event(EventKind::Modify(ModifyKind::Name(RenameMode::To)), &format!("{dir}{QUEUE}")),
            name
        ));
    }

    #[test]
    fn other_files_and_kinds_are_ignored() {
        let name = OsStr::new(QUEUE);
        assert!(!is_store_event(
            &event(
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                "/home/u/Orchestrate/claude_task_results.json"
            ),
            name
        ));
        assert!(!is_store_event(
            &event(EventKind::Create(CreateKind::File), "/home/u/Orchestrate/.claude_task_queue.json.tmp"),
            name
        ));
        assert!(!is_store_event(
            &event(EventKind::Access(AccessKind::Any), "/home/u/Orchestrate/claude_task_queue.json"),
            name
        ));
        assert!(!is_store_event(
            &event(EventKind::Remove(RemoveKind::File), "/home/u/Orchestrate/claude_task_queue.json"),
            name
        ));
    }
}
