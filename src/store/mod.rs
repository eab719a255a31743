// src/store/mod.rs

//! The shared task queue document and everything that touches it on disk.
//!
//! - [`model`] is the in-memory view of the queue document (`{"tasks": {..}}`).
//! - [`file`] loads and saves that document through a [`FileSystem`].
//! - [`writer`] is the only component that rewrites task status.
//! - [`outcomes`] reads the results file used to seed the processed-id set.
//! - [`bootstrap`] creates the working directory and empty documents.
//!
//! [`FileSystem`]: crate::fs::FileSystem

pub mod bootstrap;
pub mod file;
pub mod model;
pub mod outcomes;
pub mod writer;

pub use bootstrap::{BootstrapReport, ensure_layout};
pub use file::TaskStoreFile;
pub use model::{ApplyResult, StatusUpdate, Task, TaskStore};
pub use outcomes::load_seed_ids;
pub use writer::{StatusWriter, UpdateOutcome};
