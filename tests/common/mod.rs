#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use taskbridge::fs::{FileSystem, RealFileSystem};
use taskbridge::store::{StatusWriter, TaskStoreFile};
use tempfile::TempDir;

pub use taskbridge_test_utils::{init_tracing, with_timeout};

/// A temporary working directory holding a queue file.
pub struct Workspace {
    pub dir: TempDir,
    pub queue: PathBuf,
    pub results: PathBuf,
}

impl Workspace {
    pub fn new(queue_doc: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let queue = dir.path().join("claude_task_queue.json");
        let results = dir.path().join("claude_task_results.json");
        std::fs::write(&queue, queue_doc).unwrap();
        Self {
            dir,
            queue,
            results,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> TaskStoreFile {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        TaskStoreFile::new(self.queue.clone(), fs)
    }

    pub fn writer(&self) -> Arc<StatusWriter> {
        Arc::new(StatusWriter::new(self.store()))
    }

    pub fn queue_json(&self) -> Value {
        let text = std::fs::read_to_string(&self.queue).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    pub fn status_of(&self, id: &str) -> Option<String> {
        self.queue_json()["tasks"][id]["status"]
            .as_str()
            .map(str::to_string)
    }

    pub fn error_of(&self, id: &str) -> Option<String> {
        self.queue_json()["tasks"][id]["error"]
            .as_str()
            .map(str::to_string)
    }
}
