// src/watch/mod.rs

//! Change notification for the queue file.
//!
//! Two notifiers feed the same [`StoreChangeListener`]:
//! - an OS file watcher (`notify`) on the queue file's directory
//! - a periodic poll timer, which also covers missed or coalesced events
//!
//! Neither knows anything about tasks; they only say "look again".

pub mod listener;
pub mod poller;
pub mod watcher;

pub use listener::StoreChangeListener;
pub use poller::{PollerHandle, spawn_poller};
pub use watcher::{WatcherHandle, is_store_event, spawn_watcher};
