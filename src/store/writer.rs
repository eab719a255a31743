// src/store/writer.rs

//! Serialized read-modify-write of task status.
//!
//! Every status change goes through [`StatusWriter`]: reload the whole
//! document, edit the affected entries, write the whole document back.
//! Writes from this process are serialized by a mutex. Writes from other
//! processes are not coordinated at all; the last whole-document write wins.

use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::store::file::TaskStoreFile;
use crate::store::model::{ApplyResult, StatusUpdate};
use crate::types::{TaskId, TaskStatus};

/// What happened to one requested update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Persisted.
    Applied,
    /// The task was no longer in the store; update dropped.
    TaskMissing,
    /// Not a forward transition from the persisted status; update dropped.
    Rejected { from: TaskStatus, to: TaskStatus },
    /// Entry exists but could not be edited; update dropped.
    Malformed(String),
    /// Loading or saving the document failed; update dropped.
    Failed(String),
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied)
    }
}

#[derive(Debug)]
pub struct StatusWriter {
    file: TaskStoreFile,
    lock: Mutex<()>,
}

impl StatusWriter {
    pub fn new(file: TaskStoreFile) -> Self {
        Self {
            file,
            lock: Mutex::new(()),
        }
    }

    pub fn file(&self) -> &TaskStoreFile {
        &self.file
    }

    /// Update a single task. Never fails: problems are logged and reported
    /// through the returned [`UpdateOutcome`].
    pub fn update(&self, id: &str, update: &StatusUpdate) -> UpdateOutcome {
        self.update_many(&[(id.to_string(), update.clone())])
            .pop()
            .map(|(_, outcome)| outcome)
            .unwrap_or_else(|| UpdateOutcome::Failed("no outcome recorded".into()))
    }

    /// Apply several updates in one read-modify-write.
    ///
    /// Outcomes are returned in the same order as `updates`.
    pub fn update_many(&self, updates: &[(TaskId, StatusUpdate)]) -> Vec<(TaskId, UpdateOutcome)> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut store = match self.file.load() {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "couldn't load store for status update; dropping update");
                return fail_all(updates, err.to_string());
            }
        };

        let mut outcomes = Vec::with_capacity(updates.len());
        let mut dirty = false;
        for (id, update) in updates {
            let outcome = match store.apply(id, update) {
                ApplyResult::Applied => {
                    dirty = true;
                    UpdateOutcome::Applied
                }
                ApplyResult::Missing => {
                    info!(task = %id, status = %update.status, "task no longer in store; dropping update");
                    UpdateOutcome::TaskMissing
                }
                ApplyResult::Rejected { from, to } => {
                    warn!(task = %id, %from, %to, "refusing non-forward status transition");
                    UpdateOutcome::Rejected { from, to }
                }
                ApplyResult::Malformed(reason) => {
                    warn!(task = %id, %reason, "task entry malformed; dropping update");
                    UpdateOutcome::Malformed(reason)
                }
            };
            outcomes.push((id.clone(), outcome));
        }

        if !dirty {
            return outcomes;
        }

        if let Err(err) = self.file.save(&store) {
            warn!(error = %err, "couldn't update status");
            let reason = err.to_string();
            for (_, outcome) in outcomes.iter_mut() {
                if outcome.is_applied() {
                    *outcome = UpdateOutcome::Failed(reason.clone());
                }
            }
            return outcomes;
        }

        for ((id, update), (_, outcome)) in updates.iter().zip(&outcomes) {
            if outcome.is_applied() {
                debug!(task = %id, status = %update.status, "task status updated");
            }
        }

        outcomes
    }
}

fn fail_all(updates: &[(TaskId, StatusUpdate)], reason: String) -> Vec<(TaskId, UpdateOutcome)> {
    updates
        .iter()
        .map(|(id, _)| (id.clone(), UpdateOutcome::Failed(reason.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fs::mock::MockFileSystem;

    const PATH: &str = "/q/queue.json";

    fn writer_with(doc: &str) -> (MockFileSystem, StatusWriter) {
        let fs = MockFileSystem::new();
        fs.add_file(PATH, doc);
        let writer = StatusWriter::new(TaskStoreFile::new(PATH, Arc::new(fs.clone())));
        (fs, writer)
    }

    fn status_of(writer: &StatusWriter, id: &str) -> TaskStatus {
        writer.file().load().unwrap().get(id).unwrap().status
    }

    #[test]
    fn update_persists_new_status() {
        let (_fs, writer) = writer_with(r#"{"tasks": {"t1": {"description": "x", "status": "queued"}}}"#);
        assert_eq!(writer.update("t1", &StatusUpdate::in_progress()), UpdateOutcome::Applied);
        assert_eq!(status_of(&writer, "t1"), TaskStatus::InProgress);
    }

    #[test]
    fn missing_task_is_dropped_without_writing() {
        let (fs, writer) = writer_with(r#"{"tasks": {}}"#);
        assert_eq!(
            writer.update("ghost", &StatusUpdate::completed()),
            UpdateOutcome::TaskMissing
        );
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn picks_up_external_changes_between_updates() {
        let (fs, writer) = writer_with(r#"{"tasks": {"t1": {"status": "queued"}}}"#);
        writer.update("t1", &StatusUpdate::in_progress());

        // A producer appends a task behind our back.
        let mut store = writer.file().load().unwrap();
        store.enqueue("t2", "later");
        fs.add_file(PATH, store.to_json_pretty().unwrap());

        writer.update("t1", &StatusUpdate::completed());

        let store = writer.file().load().unwrap();
        assert_eq!(store.get("t1").unwrap().status, TaskStatus::Completed);
        assert_eq!(store.get("t2").unwrap().status, TaskStatus::Queued);
    }

    #[test]
    fn corrupt_store_fails_update_without_touching_file() {
        let (fs, writer) = writer_with("{\"tasks\": {\"t1\"");
        assert!(matches!(
            writer.update("t1", &StatusUpdate::completed()),
            UpdateOutcome::Failed(_)
        ));
        assert_eq!(fs.contents(PATH).as_deref(), Some("{\"tasks\": {\"t1\""));
    }

    #[test]
    fn write_failure_reports_failed_for_applied_entries_only() {
        let (fs, writer) = writer_with(
            r#"{"tasks": {"a": {"status": "queued"}, "b": {"status": "completed"}}}"#,
        );
        fs.set_fail_writes(true);

        let outcomes = writer.update_many(&[
            ("a".to_string(), StatusUpdate::in_progress()),
            ("b".to_string(), StatusUpdate::in_progress()),
        ]);

        assert!(matches!(outcomes[0].1, UpdateOutcome::Failed(_)));
        assert_eq!(
            outcomes[1].1,
            UpdateOutcome::Rejected {
                from: TaskStatus::Completed,
                to: TaskStatus::InProgress
            }
        );
        assert_eq!(status_of(&writer, "a"), TaskStatus::Queued);
    }

    #[test]
    fn batch_is_one_write() {
        let (fs, writer) = writer_with(
            r#"{"tasks": {"a": {"status": "queued"}, "b": {"status": "queued"}}}"#,
        );
        let outcomes = writer.update_many(&[
            ("a".to_string(), StatusUpdate::in_progress()),
            ("b".to_string(), StatusUpdate::in_progress()),
        ]);
        assert!(outcomes.iter().all(|(_, o)| o.is_applied()));
        assert_eq!(fs.write_count(), 1);
    }
}
