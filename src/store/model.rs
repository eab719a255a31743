// src/store/model.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{Result, TaskbridgeError};
use crate::types::{TaskId, TaskStatus};

/// Description used when a producer omits one.
pub const MISSING_DESCRIPTION: &str = "No description";

/// The queue document.
///
/// Task entries are kept as raw JSON objects so that fields this process
/// does not know about (timestamps, producer metadata, ...) survive a
/// rewrite untouched and in their original order. Typed access goes through
/// [`Task`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStore {
    #[serde(default)]
    tasks: Map<String, Value>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Typed, read-only view of one task entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub status: TaskStatus,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskEntry {
    #[serde(default = "default_description")]
    description: String,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default)]
    error: Option<String>,
}

fn default_description() -> String {
    MISSING_DESCRIPTION.to_string()
}

impl Task {
    fn from_entry(id: &str, entry: &Value) -> std::result::Result<Self, serde_json::Error> {
        let entry = TaskEntry::deserialize(entry)?;
        Ok(Self {
            id: id.to_string(),
            description: entry.description,
            status: entry.status,
            error: entry.error,
        })
    }
}

/// A change to a single task's `status` (and `error`) fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: TaskStatus,
    pub error: Option<String>,
}

impl StatusUpdate {
    pub fn in_progress() -> Self {
        Self {
            status: TaskStatus::InProgress,
            error: None,
        }
    }

    pub fn completed() -> Self {
        Self {
            status: TaskStatus::Completed,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Error,
            error: Some(message.into()),
        }
    }
}

/// Result of applying a [`StatusUpdate`] to an in-memory document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    Applied,
    /// No entry with that id (removed by someone else, or never existed).
    Missing,
    /// The update would move the task backwards or out of a terminal state.
    Rejected { from: TaskStatus, to: TaskStatus },
    /// The entry exists but is not something we can safely edit.
    Malformed(String),
}

impl TaskStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a document. Any syntax or shape error is reported as
    /// [`TaskbridgeError::CorruptStore`], which callers treat as transient.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| TaskbridgeError::CorruptStore(e.to_string()))
    }

    /// Pretty-printed JSON (2-space indent) with a trailing newline.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.tasks
            .get(id)
            .and_then(|entry| Task::from_entry(id, entry).ok())
    }

    /// All well-formed tasks in document order.
    ///
    /// Entries that do not look like a task (wrong types, unknown status)
    /// are skipped; they are never eligible for dispatch. See
    /// [`TaskStore::malformed_entries`] for reporting them.
    pub fn tasks(&self) -> impl Iterator<Item = Task> + '_ {
        self.tasks
            .iter()
            .filter_map(|(id, entry)| match Task::from_entry(id, entry) {
                Ok(task) => Some(task),
                Err(err) => {
                    debug!(task = %id, error = %err, "skipping malformed task entry");
                    None
                }
            })
    }

    /// Ids of entries that [`TaskStore::tasks`] skips, with the parse error.
    pub fn malformed_entries(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.tasks.iter().filter_map(|(id, entry)| {
            Task::from_entry(id, entry)
                .err()
                .map(|err| (id.as_str(), err.to_string()))
        })
    }

    /// Add a new `queued` task. Returns `false` (and changes nothing) if the
    /// id is already present.
    pub fn enqueue(&mut self, id: impl Into<TaskId>, description: impl Into<String>) -> bool {
        let id = id.into();
        if self.tasks.contains_key(&id) {
            return false;
        }
        let mut entry = Map::new();
        entry.insert("description".into(), Value::String(description.into()));
        entry.insert(
            "status".into(),
            Value::String(TaskStatus::Queued.as_str().into()),
        );
        self.tasks.insert(id, Value::Object(entry));
        true
    }

    /// Apply a status update to one entry, touching only `status` and
    /// `error`. Forward-only: see [`TaskStatus::can_transition_to`].
    pub fn apply(&mut self, id: &str, update: &StatusUpdate) -> ApplyResult {
        let Some(entry) = self.tasks.get_mut(id) else {
            return ApplyResult::Missing;
        };
        let Some(fields) = entry.as_object_mut() else {
            return ApplyResult::Malformed("task entry is not an object".into());
        };

        let current = match fields.get("status") {
            None => TaskStatus::Queued,
            Some(Value::String(s)) => match s.parse::<TaskStatus>() {
                Ok(status) => status,
                Err(err) => return ApplyResult::Malformed(err),
            },
            Some(other) => {
                return ApplyResult::Malformed(format!("status is not a string: {other}"));
            }
        };

        if !current.can_transition_to(update.status) {
            return ApplyResult::Rejected {
                from: current,
                to: update.status,
            };
        }

        fields.insert(
            "status".into(),
            Value::String(update.status.as_str().into()),
        );
        match &update.error {
            Some(message) => {
                fields.insert("error".into(), Value::String(message.clone()));
            }
            None => {
                fields.shift_remove("error");
            }
        }

        ApplyResult::Applied
    }
}
