// src/engine/claims.rs

//! Pure claim bookkeeping: which queued tasks may be dispatched, and the
//! guard that keeps dispatch passes from overlapping.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::store::{Task, TaskStore};
use crate::types::{TaskId, TaskStatus};

/// Ids this process has already claimed (or inherited from the results
/// file). Ids are only ever added.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    ids: HashSet<TaskId>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            ids: seed.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record `id` as claimed. Returns `false` if it already was.
    pub fn claim(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Tasks that are `queued` in `store` and not yet in `processed`, in
/// document order.
pub fn select_eligible(store: &TaskStore, processed: &ProcessedSet) -> Vec<Task> {
    store
        .tasks()
        .filter(|task| task.status == TaskStatus::Queued && !processed.contains(&task.id))
        .collect()
}

/// At most one holder at a time; entering while held fails immediately.
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

/// Releases the [`SingleFlight`] when dropped.
#[derive(Debug)]
pub struct SingleFlightGuard<'a> {
    busy: &'a AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_enter(&self) -> Option<SingleFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SingleFlightGuard { busy: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for SingleFlightGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(doc: &str) -> TaskStore {
        TaskStore::parse(doc).unwrap()
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn only_queued_and_unclaimed_in_document_order() {
        let store = store(
            r#"{"tasks": {
                "z": {"description": "1", "status": "queued"},
                "done": {"description": "2", "status": "completed"},
                "seen": {"description": "3", "status": "queued"},
                "a": {"description": "4"},
                "busy": {"description": "5", "status": "in_progress"},
                "err": {"description": "6", "status": "error"}
            }}"#,
        );
        let processed = ProcessedSet::from_seed(["seen".to_string()]);

        let eligible = select_eligible(&store, &processed);
        assert_eq!(ids(&eligible), vec!["z", "a"]);
    }

    #[test]
    fn claim_is_idempotent() {
        let mut processed = ProcessedSet::new();
        assert!(processed.claim("t1"));
        assert!(!processed.claim("t1"));
        assert_eq!(processed.len(), 1);
    }

    #[test]
    fn single_flight_excludes_until_guard_dropped() {
        let flight = SingleFlight::new();
        let guard = flight.try_enter().expect("first entry");
        assert!(flight.is_busy());
        assert!(flight.try_enter().is_none());
        drop(guard);
        assert!(!flight.is_busy());
        assert!(flight.try_enter().is_some());
    }
}
