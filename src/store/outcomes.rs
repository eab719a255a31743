// src/store/outcomes.rs

//! Read-only access to the results file.
//!
//! Its only job today is to tell a fresh watcher which task ids were already
//! handled by an earlier run, so they are never dispatched again.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::fs::FileSystem;
use crate::types::TaskId;

/// Key holding the per-task records in the results document.
pub const RESULTS_KEY: &str = "results";

/// Task ids recorded in the results document at `path`.
///
/// The expected shape is `{"results": {"<id>": ...}}`. A document without a
/// `results` object is read as a flat map keyed by task id. Anything that
/// cannot be read or parsed yields an empty set: a watcher without history
/// simply starts fresh.
pub fn load_seed_ids(fs: &dyn FileSystem, path: &Path) -> HashSet<TaskId> {
    let text = match fs.read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            info!(path = ?path, error = %err, "no previous results found; starting fresh");
            return HashSet::new();
        }
    };

    let ids = match serde_json::from_str::<Value>(&text) {
        Ok(doc) => seed_ids_from_document(&doc),
        Err(err) => {
            warn!(path = ?path, error = %err, "results file is not valid JSON; starting fresh");
            return HashSet::new();
        }
    };

    info!(count = ids.len(), "loaded previously processed task ids");
    ids
}

fn seed_ids_from_document(doc: &Value) -> HashSet<TaskId> {
    let Some(top) = doc.as_object() else {
        return HashSet::new();
    };

    match top.get(RESULTS_KEY) {
        Some(Value::Object(results)) => results.keys().cloned().collect(),
        _ => top.keys().cloned().collect(),
    }
}
