// src/store/file.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{Result, TaskbridgeError};
use crate::fs::FileSystem;
use crate::store::model::TaskStore;

/// Handle on the queue document at a fixed path.
///
/// Cheap to clone; every `load` re-reads the file, so callers always see
/// the latest version written by any process.
#[derive(Debug, Clone)]
pub struct TaskStoreFile {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl TaskStoreFile {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document.
    ///
    /// A document that is present but unparsable yields
    /// [`TaskbridgeError::CorruptStore`] (transient); failing to read the
    /// file at all is reported as [`TaskbridgeError::Other`].
    pub fn load(&self) -> Result<TaskStore> {
        let text = self.fs.read_to_string(&self.path)?;
        let store = TaskStore::parse(&text)?;
        debug!(path = ?self.path, tasks = store.len(), "loaded task store");
        Ok(store)
    }

    pub fn save(&self, store: &TaskStore) -> Result<()> {
        let text = store.to_json_pretty()?;
        self.fs
            .write(&self.path, text.as_bytes())
            .map_err(TaskbridgeError::Other)?;
        debug!(path = ?self.path, tasks = store.len(), "saved task store");
        Ok(())
    }

    /// Create the file with an empty task collection if it does not exist.
    /// Returns whether a file was created.
    pub fn create_if_absent(&self) -> Result<bool> {
        if self.fs.exists(&self.path) {
            return Ok(false);
        }
        self.save(&TaskStore::empty())?;
        Ok(true)
    }
}
