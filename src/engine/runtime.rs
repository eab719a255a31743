// src/engine/runtime.rs

use std::collections::HashSet;
use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::types::{ChangeSource, TaskId};

use super::dispatcher::{DispatchReport, Dispatcher};
use super::{RuntimeEvent, RuntimeOptions, TaskOutcome};

/// Drives the [`Dispatcher`] in response to [`RuntimeEvent`]s.
///
/// The runtime is the single control loop: every dispatch pass runs here,
/// one at a time. Executors run on their own tasks and only report back
/// through `TaskFinished`.
pub struct Runtime<E: ExecutorBackend> {
    dispatcher: Dispatcher<E>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    options: RuntimeOptions,
    in_flight: HashSet<TaskId>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("dispatcher", &self.dispatcher)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        dispatcher: Dispatcher<E>,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            dispatcher,
            event_rx,
            options,
            in_flight: HashSet::new(),
        }
    }

    /// Main event loop.
    ///
    /// - Runs one eager pass so tasks queued before startup are picked up.
    /// - Runs a pass for every `StoreChanged`.
    /// - Tracks in-flight sessions via `TaskFinished`.
    /// - Stops on `ShutdownRequested`, on channel close, or (with
    ///   `exit_when_idle`) once nothing is in flight.
    ///
    /// Sessions still running when the loop stops are left alone.
    pub async fn run(mut self) -> Result<()> {
        info!("taskbridge runtime started");

        let report = self.dispatcher.on_change_signal(ChangeSource::Startup).await;
        self.track(&report);

        if self.idle_exit_due() {
            info!("nothing in flight after startup pass; exiting");
            return Ok(());
        }

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            match event {
                RuntimeEvent::StoreChanged { source } => {
                    let report = self.dispatcher.on_change_signal(source).await;
                    self.track(&report);
                }
                RuntimeEvent::TaskFinished { id, outcome } => {
                    self.finish(&id, &outcome);
                    if self.idle_exit_due() {
                        info!("all sessions finished; exiting");
                        break;
                    }
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("stopping watcher");
                    break;
                }
            }
        }

        if !self.in_flight.is_empty() {
            info!(
                count = self.in_flight.len(),
                "leaving running sessions to finish on their own"
            );
        }
        info!("watcher stopped");
        Ok(())
    }

    fn track(&mut self, report: &DispatchReport) {
        self.in_flight.extend(report.launched().iter().cloned());
    }

    fn finish(&mut self, id: &str, outcome: &TaskOutcome) {
        self.in_flight.remove(id);
        match outcome {
            TaskOutcome::Completed => info!(task = %id, "task completed successfully"),
            TaskOutcome::Failed { exit_code, .. } => {
                info!(task = %id, exit_code, "task failed")
            }
            TaskOutcome::Aborted { reason } => info!(task = %id, %reason, "task aborted"),
        }
        debug!(remaining = self.in_flight.len(), "sessions still in flight");
    }

    fn idle_exit_due(&self) -> bool {
        self.options.exit_when_idle && self.in_flight.is_empty()
    }
}
