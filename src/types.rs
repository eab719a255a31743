// src/types.rs

//! Small shared types used across the store, engine and executor layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical task identifier type. Assigned by the producer, never by us.
pub type TaskId = String;

/// Lifecycle status of a task as persisted in the queue file.
///
/// Transitions only ever move forward:
/// `Queued -> InProgress -> {Completed, Error}`. A status may skip ahead
/// (e.g. `Queued -> Error` when the claim write was lost) but never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Queued,
    InProgress,
    Completed,
    Error,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }

    fn rank(self) -> u8 {
        match self {
            TaskStatus::Queued => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Completed | TaskStatus::Error => 2,
        }
    }

    /// Whether moving from `self` to `next` respects the forward-only lifecycle.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        next.rank() > self.rank()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(TaskStatus::Queued),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "error" => Ok(TaskStatus::Error),
            other => Err(format!(
                "invalid task status: {other} (expected queued, in_progress, completed or error)"
            )),
        }
    }
}

/// Where a "the store may have changed" signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// The eager pass at startup.
    Startup,
    /// An OS file-watch event on the queue file.
    FileWatch,
    /// The periodic poll timer.
    Poll,
}
