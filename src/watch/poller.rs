// src/watch/poller.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::types::ChangeSource;
use crate::watch::listener::StoreChangeListener;

/// Handle for the poll timer task. Dropping it stops polling.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Signal `listener` every `interval`, starting one interval from now.
pub fn spawn_poller(interval: Duration, listener: Arc<dyn StoreChangeListener>) -> PollerHandle {
    info!(?interval, "queue poll timer started");

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; the startup pass covers it.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            listener.on_store_changed(ChangeSource::Poll);
        }
    });

    PollerHandle { task }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl StoreChangeListener for Counter {
        fn on_store_changed(&self, source: ChangeSource) {
            assert_eq!(source, ChangeSource::Poll);
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn ticks_until_dropped() {
        let counter = Arc::new(Counter::default());
        let handle = spawn_poller(Duration::from_millis(20), counter.clone());

        tokio::time::sleep(Duration::from_millis(150)).await;
        let seen = counter.0.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected at least two polls, saw {seen}");

        drop(handle);
        tokio::time::sleep(Duration::from_millis(30)).await;
        let after_drop = counter.0.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(counter.0.load(Ordering::SeqCst), after_drop);
    }
}
