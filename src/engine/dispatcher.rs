// src/engine/dispatcher.rs

//! One dispatch pass: load the queue, claim every new `queued` task, mark
//! the claims `in_progress`, and hand each one to the executor.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::engine::claims::{ProcessedSet, SingleFlight, select_eligible};
use crate::exec::{ClaimedTask, ExecutorBackend, Launch};
use crate::store::{StatusUpdate, StatusWriter, Task, TaskStoreFile, UpdateOutcome};
use crate::types::{ChangeSource, TaskId};

/// What a single call to [`Dispatcher::on_change_signal`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReport {
    /// Another pass was already running; nothing happened.
    Busy,
    /// The queue file could not be loaded; nothing was claimed.
    LoadFailed { transient: bool },
    /// The pass ran to the end.
    Ran {
        /// Executors started, in claim order.
        launched: Vec<TaskId>,
        /// Claimed, but the executor could not start them (already marked `error`).
        launch_failed: Vec<TaskId>,
        /// Claimed, but the claim write showed the task gone or already
        /// advanced by someone else, so no executor was started.
        abandoned: Vec<TaskId>,
    },
}

impl DispatchReport {
    fn ran_empty() -> Self {
        DispatchReport::Ran {
            launched: Vec::new(),
            launch_failed: Vec::new(),
            abandoned: Vec::new(),
        }
    }

    pub fn launched(&self) -> &[TaskId] {
        match self {
            DispatchReport::Ran { launched, .. } => launched,
            _ => &[],
        }
    }
}

/// Owns the processed-id set and the single-flight guard for one watcher.
pub struct Dispatcher<E: ExecutorBackend> {
    store: TaskStoreFile,
    writer: Arc<StatusWriter>,
    executor: E,
    processed: Mutex<ProcessedSet>,
    flight: SingleFlight,
    /// Malformed entries already warned about, so polling does not repeat it.
    reported_malformed: Mutex<HashSet<TaskId>>,
}

impl<E: ExecutorBackend> std::fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("store", &self.store.path())
            .field("processed", &self.processed_count())
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Dispatcher<E> {
    /// `seed` holds ids that must never be dispatched by this instance,
    /// normally the keys of the results file.
    pub fn new(
        store: TaskStoreFile,
        writer: Arc<StatusWriter>,
        executor: E,
        seed: HashSet<TaskId>,
    ) -> Self {
        Self {
            store,
            writer,
            executor,
            processed: Mutex::new(ProcessedSet::from_seed(seed)),
            flight: SingleFlight::new(),
            reported_malformed: Mutex::new(HashSet::new()),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn is_processed(&self, id: &str) -> bool {
        self.lock_processed().contains(id)
    }

    pub fn processed_count(&self) -> usize {
        self.lock_processed().len()
    }

    fn lock_processed(&self) -> std::sync::MutexGuard<'_, ProcessedSet> {
        self.processed.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// React to "the store may have changed".
    ///
    /// Never fails: load errors abort the pass (the next signal retries),
    /// write and launch errors are contained per task.
    pub async fn on_change_signal(&self, source: ChangeSource) -> DispatchReport {
        let Some(_flight) = self.flight.try_enter() else {
            debug!(?source, "dispatch pass already in flight; ignoring signal");
            return DispatchReport::Busy;
        };

        let store = match self.store.load() {
            Ok(store) => store,
            Err(err) if err.is_transient() => {
                debug!(?source, error = %err, "queue file mid-write; retrying on next signal");
                return DispatchReport::LoadFailed { transient: true };
            }
            Err(err) => {
                warn!(?source, error = %err, "error checking queue");
                return DispatchReport::LoadFailed { transient: false };
            }
        };

        self.report_malformed(&store);

        let claimed = self.claim_eligible(&store);
        if claimed.is_empty() {
            debug!(?source, tasks = store.len(), "no new tasks");
            return DispatchReport::ran_empty();
        }

        info!(count = claimed.len(), ?source, "found new task(s)");

        // Every claim is persisted as in_progress before any executor starts.
        let updates: Vec<(TaskId, StatusUpdate)> = claimed
            .iter()
            .map(|task| (task.id.clone(), StatusUpdate::in_progress()))
            .collect();
        let claim_writes = self.writer.update_many(&updates);

        let mut launched = Vec::new();
        let mut launch_failed = Vec::new();
        let mut abandoned = Vec::new();

        for (task, (_, write)) in claimed.into_iter().zip(claim_writes) {
            match write {
                UpdateOutcome::Applied => {}
                UpdateOutcome::Failed(reason) => {
                    // The terminal write may still land; launching keeps the
                    // task from being silently lost.
                    warn!(task = %task.id, %reason, "could not persist in_progress; launching anyway");
                }
                UpdateOutcome::TaskMissing
                | UpdateOutcome::Rejected { .. }
                | UpdateOutcome::Malformed(_) => {
                    info!(task = %task.id, "task changed under us while claiming; not launching");
                    abandoned.push(task.id);
                    continue;
                }
            }

            info!(task = %task.id, description = %task.description, "spawning assistant session");
            let id = task.id.clone();
            match self
                .executor
                .launch(ClaimedTask {
                    id: task.id,
                    description: task.description,
                })
                .await
            {
                Launch::Started { pid } => {
                    info!(task = %id, ?pid, "assistant session started");
                    launched.push(id);
                }
                Launch::Failed { reason } => {
                    warn!(task = %id, %reason, "assistant session could not be started");
                    launch_failed.push(id);
                }
            }
        }

        DispatchReport::Ran {
            launched,
            launch_failed,
            abandoned,
        }
    }

    /// Warn once per id about entries that will never be dispatched.
    /// Returns the ids warned about in this call.
    fn report_malformed(&self, store: &crate::store::TaskStore) -> Vec<TaskId> {
        let mut reported = self
            .reported_malformed
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let mut fresh = Vec::new();
        for (id, reason) in store.malformed_entries() {
            if reported.insert(id.to_string()) {
                warn!(task = %id, %reason, "ignoring malformed task entry");
                fresh.push(id.to_string());
            }
        }
        fresh
    }

    fn claim_eligible(&self, store: &crate::store::TaskStore) -> Vec<Task> {
        let mut processed = self.lock_processed();
        let eligible = select_eligible(store, &processed);
        eligible
            .into_iter()
            .filter(|task| processed.claim(&task.id))
            .collect()
    }
}
