use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use taskbridge::engine::{RuntimeEvent, TaskOutcome};
use taskbridge::exec::task_runner::write_terminal_status;
use taskbridge::exec::{ClaimedTask, ExecutorBackend, Launch};
use taskbridge::store::StatusWriter;
use tokio::sync::mpsc;

/// What the fake does with each task it is handed.
#[derive(Debug, Clone)]
pub enum FakeBehaviour {
    /// Report `Started` and never finish.
    Hold,
    /// Finish immediately with the given outcome: write the terminal status
    /// and send `TaskFinished`, like a real process that exits at once.
    Finish(TaskOutcome),
    /// Refuse to start: write an `error` status and report `Failed`.
    Refuse(String),
}

/// A fake executor that:
/// - records which tasks were launched, in order
/// - behaves according to [`FakeBehaviour`].
pub struct FakeExecutor {
    behaviour: FakeBehaviour,
    writer: Option<Arc<StatusWriter>>,
    runtime_tx: Option<mpsc::Sender<RuntimeEvent>>,
    launched: Arc<Mutex<Vec<ClaimedTask>>>,
}

impl FakeExecutor {
    /// Records launches and never finishes anything.
    pub fn holding() -> Self {
        Self {
            behaviour: FakeBehaviour::Hold,
            writer: None,
            runtime_tx: None,
            launched: Arc::default(),
        }
    }

    pub fn new(
        behaviour: FakeBehaviour,
        writer: Arc<StatusWriter>,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            behaviour,
            writer: Some(writer),
            runtime_tx: Some(runtime_tx),
            launched: Arc::default(),
        }
    }

    /// Shared view of the launch log, usable after the fake is moved.
    pub fn launch_log(&self) -> Arc<Mutex<Vec<ClaimedTask>>> {
        Arc::clone(&self.launched)
    }

    pub fn launched_ids(&self) -> Vec<String> {
        self.launched
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }
}

impl ExecutorBackend for FakeExecutor {
    fn launch(&self, task: ClaimedTask) -> Pin<Box<dyn Future<Output = Launch> + Send + '_>> {
        Box::pin(async move {
            self.launched.lock().unwrap().push(task.clone());

            match &self.behaviour {
                FakeBehaviour::Hold => Launch::Started { pid: None },
                FakeBehaviour::Finish(outcome) => {
                    if let Some(writer) = &self.writer {
                        write_terminal_status(Arc::clone(writer), &task.id, outcome).await;
                    }
                    if let Some(tx) = &self.runtime_tx {
                        let _ = tx
                            .send(RuntimeEvent::TaskFinished {
                                id: task.id.clone(),
                                outcome: outcome.clone(),
                            })
                            .await;
                    }
                    Launch::Started { pid: None }
                }
                FakeBehaviour::Refuse(reason) => {
                    if let Some(writer) = &self.writer {
                        let outcome = TaskOutcome::Aborted {
                            reason: reason.clone(),
                        };
                        write_terminal_status(Arc::clone(writer), &task.id, &outcome).await;
                    }
                    Launch::Failed {
                        reason: reason.clone(),
                    }
                }
            }
        })
    }
}
