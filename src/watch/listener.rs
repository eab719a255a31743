// src/watch/listener.rs

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

use crate::engine::RuntimeEvent;
use crate::types::ChangeSource;

/// Anything that wants to hear "the queue file may have changed".
///
/// Called from notifier threads, so implementations must not block.
pub trait StoreChangeListener: Send + Sync + 'static {
    fn on_store_changed(&self, source: ChangeSource);
}

/// Forward signals into the runtime channel.
///
/// A full channel means passes are already pending, each of which rereads
/// the whole file, so the signal is dropped rather than waited on.
impl StoreChangeListener for mpsc::Sender<RuntimeEvent> {
    fn on_store_changed(&self, source: ChangeSource) {
        match self.try_send(RuntimeEvent::StoreChanged { source }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                trace!(?source, "runtime busy; coalescing change signal");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(?source, "runtime gone; dropping change signal");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn full_channel_coalesces_instead_of_blocking() {
        let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(1);

        tx.on_store_changed(ChangeSource::FileWatch);
        tx.on_store_changed(ChangeSource::Poll);

        assert!(matches!(
            rx.recv().await,
            Some(RuntimeEvent::StoreChanged {
                source: ChangeSource::FileWatch
            })
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_channel_is_ignored() {
        let (tx, rx) = mpsc::channel::<RuntimeEvent>(1);
        drop(rx);
        tx.on_store_changed(ChangeSource::Poll);
    }
}
