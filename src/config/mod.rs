// src/config/mod.rs

//! Configuration loading and validation for taskbridge.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and the resolved settings (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate invariants the rest of the program relies on (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ExecutorSettings, RawConfigFile, RawExecutorSection, RawWatcherSection, Settings,
    WatcherSettings,
};
pub use validate::validate_settings;
