// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The dispatcher talks to an `ExecutorBackend` instead of spawning processes
//! itself. `launch` returns as soon as the process is started (or known not
//! to start); completion is observed on a separate Tokio task.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::ExecutorSettings;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::exec::locate::locate_executable;
use crate::exec::task_runner::{spawn_process, spawn_error_reason, watch_completion, write_terminal_status};
use crate::store::StatusWriter;
use crate::types::TaskId;

/// A task the dispatcher has claimed and wants executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedTask {
    pub id: TaskId,
    pub description: String,
}

/// Immediate result of [`ExecutorBackend::launch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// Running; a terminal status will be written when it exits.
    Started { pid: Option<u32> },
    /// Could not start. The task has already been marked `error`.
    Failed { reason: String },
}

/// Trait abstracting how claimed tasks are executed.
///
/// Implementations own the terminal status write for every task they
/// accept: either when the process ends, or immediately when it cannot be
/// started.
pub trait ExecutorBackend: Send + Sync {
    fn launch(&self, task: ClaimedTask) -> Pin<Box<dyn Future<Output = Launch> + Send + '_>>;
}

/// Real executor backend used in production.
pub struct RealExecutorBackend {
    settings: ExecutorSettings,
    writer: Arc<StatusWriter>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl std::fmt::Debug for RealExecutorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealExecutorBackend")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl RealExecutorBackend {
    pub fn new(
        settings: ExecutorSettings,
        writer: Arc<StatusWriter>,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            settings,
            writer,
            runtime_tx,
        }
    }

    async fn refuse(&self, task: &ClaimedTask, reason: String) -> Launch {
        let outcome = TaskOutcome::Aborted {
            reason: reason.clone(),
        };
        write_terminal_status(Arc::clone(&self.writer), &task.id, &outcome).await;
        Launch::Failed { reason }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn launch(&self, task: ClaimedTask) -> Pin<Box<dyn Future<Output = Launch> + Send + '_>> {
        Box::pin(async move {
            // Resolved per launch so installing the assistant while the
            // watcher runs takes effect without a restart.
            let program = match locate_executable(&self.settings) {
                Ok(program) => program,
                Err(not_found) => {
                    warn!(
                        task = %task.id,
                        "{not_found}; install it or set executor.program"
                    );
                    return self.refuse(&task, not_found.to_string()).await;
                }
            };

            let child = match spawn_process(&program, &self.settings.args, &task.description) {
                Ok(child) => child,
                Err(err) => {
                    let reason = spawn_error_reason(&program, &err);
                    warn!(task = %task.id, %reason, "failed to spawn assistant");
                    return self.refuse(&task, reason).await;
                }
            };

            let pid = child.id();
            info!(task = %task.id, ?pid, program = ?program, "assistant process spawned");

            tokio::spawn(watch_completion(
                child,
                task.id.clone(),
                self.settings.stderr_excerpt_chars,
                Arc::clone(&self.writer),
                self.runtime_tx.clone(),
            ));

            Launch::Started { pid }
        })
    }
}
