// src/store/bootstrap.rs

use serde_json::{Map, Value};
use tracing::info;

use crate::config::WatcherSettings;
use crate::errors::{Result, TaskbridgeError};
use crate::fs::FileSystem;
use crate::store::file::TaskStoreFile;
use crate::store::outcomes::RESULTS_KEY;

/// What [`ensure_layout`] had to create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub created_dir: bool,
    pub created_queue: bool,
    pub created_results: bool,
}

/// Make sure the working directory, the queue document and the results
/// document exist. Existing files are never touched.
pub fn ensure_layout(
    fs: &dyn FileSystem,
    store: &TaskStoreFile,
    settings: &WatcherSettings,
) -> Result<BootstrapReport> {
    let mut report = BootstrapReport::default();

    if !fs.is_dir(&settings.dir) {
        fs.create_dir_all(&settings.dir)?;
        report.created_dir = true;
        info!(dir = ?settings.dir, "created working directory");
    }

    if store.create_if_absent()? {
        report.created_queue = true;
        info!(path = ?store.path(), "created empty queue file");
    }

    if !fs.exists(&settings.results_file) {
        let mut doc = Map::new();
        doc.insert(RESULTS_KEY.to_string(), Value::Object(Map::new()));
        let text = serde_json::to_string_pretty(&doc)?;
        fs.write(&settings.results_file, text.as_bytes())
            .map_err(TaskbridgeError::Other)?;
        report.created_results = true;
        info!(path = ?settings.results_file, "created empty results file");
    }

    Ok(report)
}
