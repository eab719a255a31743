// src/exec/task_runner.rs

//! Individual assistant process runner.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::store::{StatusWriter, UpdateOutcome};
use crate::types::TaskId;

/// Start `program args... description` with stdout and stderr captured.
///
/// The child is not killed when its handle is dropped: a session keeps
/// running even if the watcher shuts down first.
pub fn spawn_process(program: &Path, args: &[String], description: &str) -> io::Result<Child> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .arg(description)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(false);
    cmd.spawn()
}

/// Text stored on the task when `spawn` fails.
pub fn spawn_error_reason(program: &Path, err: &io::Error) -> String {
    if err.kind() == io::ErrorKind::NotFound {
        format!("executable not found: {}", program.display())
    } else {
        format!("failed to spawn {}: {err}", program.display())
    }
}

/// Wait for `child` to exit, write the terminal status, then tell the
/// runtime. Meant to run on its own Tokio task.
pub async fn watch_completion(
    child: Child,
    id: TaskId,
    stderr_excerpt_chars: usize,
    writer: Arc<StatusWriter>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let outcome = match child.wait_with_output().await {
        Ok(output) => {
            let exit_code = exit_code_of(output.status);
            debug!(
                task = %id,
                stdout_bytes = output.stdout.len(),
                stderr_bytes = output.stderr.len(),
                "assistant output captured"
            );
            if output.status.success() {
                info!(task = %id, "task completed successfully");
                TaskOutcome::Completed
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr_excerpt = excerpt(&stderr, stderr_excerpt_chars);
                warn!(task = %id, exit_code, stderr = %stderr_excerpt, "task failed");
                TaskOutcome::Failed {
                    exit_code,
                    stderr_excerpt,
                }
            }
        }
        Err(err) => {
            error!(task = %id, error = %err, "failed to wait for assistant process");
            TaskOutcome::Aborted {
                reason: format!("failed to wait for process: {err}"),
            }
        }
    };

    write_terminal_status(writer, &id, &outcome).await;

    if runtime_tx
        .send(RuntimeEvent::TaskFinished { id, outcome })
        .await
        .is_err()
    {
        debug!("runtime gone before task finished; nothing to notify");
    }
}

/// Persist `outcome` for `id` without blocking the async workers.
pub async fn write_terminal_status(
    writer: Arc<StatusWriter>,
    id: &str,
    outcome: &TaskOutcome,
) -> UpdateOutcome {
    let update = outcome.status_update();
    let task_id = id.to_string();
    match tokio::task::spawn_blocking(move || writer.update(&task_id, &update)).await {
        Ok(result) => result,
        Err(err) => {
            error!(task = %id, error = %err, "status writer task panicked");
            UpdateOutcome::Failed(err.to_string())
        }
    }
}

/// Exit code as a plain integer. Death by signal `N` is reported as `-N`.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

/// First `max_chars` characters of `text` after trimming surrounding whitespace.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}
