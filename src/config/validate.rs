// src/config/validate.rs

use crate::config::model::{DEFAULT_STDERR_EXCERPT_CHARS, Settings};
use crate::errors::{Result, TaskbridgeError};

/// Check invariants the watcher relies on.
///
/// - the executable name is non-empty
/// - the stderr excerpt keeps between 1 and 200 characters
/// - queue and results files have file names and are distinct
/// - at least one change notifier (file events or polling) is enabled
pub fn validate_settings(settings: &Settings) -> Result<()> {
    let w = &settings.watcher;
    let e = &settings.executor;

    if e.name.trim().is_empty() {
        return Err(TaskbridgeError::ConfigError(
            "executor.name must not be empty".into(),
        ));
    }

    if e.stderr_excerpt_chars == 0 || e.stderr_excerpt_chars > DEFAULT_STDERR_EXCERPT_CHARS {
        return Err(TaskbridgeError::ConfigError(format!(
            "executor.stderr_excerpt_chars must be between 1 and {DEFAULT_STDERR_EXCERPT_CHARS}, got {}",
            e.stderr_excerpt_chars
        )));
    }

    for (key, path) in [("queue_file", &w.queue_file), ("results_file", &w.results_file)] {
        if path.file_name().is_none() {
            return Err(TaskbridgeError::ConfigError(format!(
                "watcher.{key} must name a file, got {path:?}"
            )));
        }
    }

    if w.queue_file == w.results_file {
        return Err(TaskbridgeError::ConfigError(format!(
            "watcher.queue_file and watcher.results_file are the same file: {:?}",
            w.queue_file
        )));
    }

    if !w.fs_events && w.poll_interval.is_none() {
        return Err(TaskbridgeError::ConfigError(
            "no change notifier enabled: set watcher.fs_events = true or a non-zero poll_interval_ms"
                .into(),
        ));
    }

    Ok(())
}
