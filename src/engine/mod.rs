// src/engine/mod.rs

//! Orchestration engine for taskbridge.
//!
//! This module ties together:
//! - the processed-id set and single-flight guard ([`claims`])
//! - the dispatcher that turns queued entries into running sessions
//!   ([`dispatcher`])
//! - the main runtime event loop that reacts to:
//!   - store change signals (file watch, poll timer)
//!   - executor completion reports
//!   - shutdown signals
//!
//! Dispatch decisions are made synchronously inside one pass; the async
//! shell in [`runtime`] only decides *when* a pass runs.

use crate::store::StatusUpdate;
use crate::types::{ChangeSource, TaskId};

/// Final result of one executor run, as reported to the store and the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The process exited with status 0.
    Completed,
    /// The process exited with a non-zero status.
    Failed {
        exit_code: i32,
        /// Leading part of the trimmed stderr, already length-limited.
        stderr_excerpt: String,
    },
    /// The process could not be started or could not be waited on.
    Aborted { reason: String },
}

impl TaskOutcome {
    /// Text stored in the task's `error` field, if any.
    pub fn error_message(&self) -> Option<String> {
        match self {
            TaskOutcome::Completed => None,
            TaskOutcome::Failed {
                exit_code,
                stderr_excerpt,
            } if stderr_excerpt.is_empty() => Some(format!("Exit code {exit_code}")),
            TaskOutcome::Failed {
                exit_code,
                stderr_excerpt,
            } => Some(format!("Exit code {exit_code}: {stderr_excerpt}")),
            TaskOutcome::Aborted { reason } => Some(reason.clone()),
        }
    }

    pub fn status_update(&self) -> StatusUpdate {
        match self.error_message() {
            None => StatusUpdate::completed(),
            Some(message) => StatusUpdate::error(message),
        }
    }
}

/// Runtime options for the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit once the startup pass has run and every session it
    /// launched has finished (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from notifiers, executors, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// The queue file may have changed.
    StoreChanged { source: ChangeSource },
    /// An executor wrote its terminal status and is done.
    TaskFinished { id: TaskId, outcome: TaskOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod claims;
pub mod dispatcher;
pub mod runtime;

pub use claims::{ProcessedSet, SingleFlight, select_eligible};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use runtime::Runtime;
