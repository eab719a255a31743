// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskbridgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The store document could not be parsed. Usually another process is
    /// halfway through rewriting it; the next trigger will try again.
    #[error("Store document is malformed: {0}")]
    CorruptStore(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskbridgeError {
    /// True for failures that are expected to clear up on their own, so the
    /// caller should simply wait for the next change signal.
    pub fn is_transient(&self) -> bool {
        matches!(self, TaskbridgeError::CorruptStore(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskbridgeError>;
