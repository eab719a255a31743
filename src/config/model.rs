// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::config::validate::validate_settings;
use crate::errors::{Result, TaskbridgeError};

pub const DEFAULT_DIR: &str = "~/Documents/Orchestrate";
pub const DEFAULT_QUEUE_FILE: &str = "claude_task_queue.json";
pub const DEFAULT_RESULTS_FILE: &str = "claude_task_results.json";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_EXECUTABLE: &str = "claude";
pub const DEFAULT_CANDIDATES: &[&str] = &["/opt/homebrew/bin/claude", "~/.local/bin/claude"];
pub const DEFAULT_ARGS: &[&str] = &["-p", "--dangerously-skip-permissions"];
pub const DEFAULT_STDERR_EXCERPT_CHARS: usize = 200;

/// Configuration as read from a TOML file.
///
/// ```toml
/// [watcher]
/// dir = "~/Documents/Orchestrate"
/// poll_interval_ms = 2000
///
/// [executor]
/// program = "/opt/homebrew/bin/claude"
/// ```
///
/// Every field is optional. CLI flags are layered on top of this before it
/// is turned into [`Settings`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watcher: RawWatcherSection,

    #[serde(default)]
    pub executor: RawExecutorSection,
}

/// `[watcher]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWatcherSection {
    pub dir: Option<String>,
    /// Relative paths are resolved against `dir`.
    pub queue_file: Option<String>,
    pub results_file: Option<String>,
    /// `0` disables the periodic poll.
    pub poll_interval_ms: Option<u64>,
    pub fs_events: Option<bool>,
}

/// `[executor]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExecutorSection {
    pub name: Option<String>,
    pub program: Option<String>,
    pub candidates: Option<Vec<String>>,
    pub args: Option<Vec<String>>,
    pub stderr_excerpt_chars: Option<usize>,
}

/// Fully resolved, validated settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub watcher: WatcherSettings,
    pub executor: ExecutorSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherSettings {
    pub dir: PathBuf,
    pub queue_file: PathBuf,
    pub results_file: PathBuf,
    pub poll_interval: Option<Duration>,
    pub fs_events: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Bare executable name, looked up on `PATH` as the last resort.
    pub name: String,
    /// Explicit executable; when set, no discovery happens.
    pub program: Option<PathBuf>,
    /// Locations checked, in order, before falling back to `PATH`.
    pub candidates: Vec<PathBuf>,
    /// Arguments placed before the task description.
    pub args: Vec<String>,
    /// Maximum number of stderr characters kept in a task's `error` field.
    pub stderr_excerpt_chars: usize,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_EXECUTABLE.to_string(),
            program: None,
            candidates: Vec::new(),
            args: DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
            stderr_excerpt_chars: DEFAULT_STDERR_EXCERPT_CHARS,
        }
    }
}

impl TryFrom<RawConfigFile> for Settings {
    type Error = TaskbridgeError;

    fn try_from(raw: RawConfigFile) -> Result<Self> {
        Settings::resolve(raw, dirs::home_dir().as_deref())
    }
}

impl Settings {
    /// Resolve a raw config against an explicit home directory (used for `~`).
    pub fn resolve(raw: RawConfigFile, home: Option<&Path>) -> Result<Self> {
        let w = raw.watcher;
        let dir = expand_home(w.dir.as_deref().unwrap_or(DEFAULT_DIR), home)?;
        let queue_file = resolve_in(
            &dir,
            w.queue_file.as_deref().unwrap_or(DEFAULT_QUEUE_FILE),
            home,
        )?;
        let results_file = resolve_in(
            &dir,
            w.results_file.as_deref().unwrap_or(DEFAULT_RESULTS_FILE),
            home,
        )?;
        let poll_interval = match w.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        let e = raw.executor;
        let program = e
            .program
            .as_deref()
            .map(|p| expand_home(p, home))
            .transpose()?;
        let candidates = match e.candidates {
            Some(list) => list,
            None => DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        }
        .iter()
        .map(|c| expand_home(c, home))
        .collect::<Result<Vec<_>>>()?;

        let defaults = ExecutorSettings::default();
        let settings = Settings {
            watcher: WatcherSettings {
                dir,
                queue_file,
                results_file,
                poll_interval,
                fs_events: w.fs_events.unwrap_or(true),
            },
            executor: ExecutorSettings {
                name: e.name.unwrap_or(defaults.name),
                program,
                candidates,
                args: e.args.unwrap_or(defaults.args),
                stderr_excerpt_chars: e
                    .stderr_excerpt_chars
                    .unwrap_or(defaults.stderr_excerpt_chars),
            },
        };

        validate_settings(&settings)?;
        Ok(settings)
    }
}

/// Expand a leading `~` or `~/` using `home`.
fn expand_home(raw: &str, home: Option<&Path>) -> Result<PathBuf> {
    let rest = match raw.strip_prefix('~') {
        None => return Ok(PathBuf::from(raw)),
        Some(rest) if rest.is_empty() => "",
        Some(rest) => match rest.strip_prefix('/') {
            Some(rest) => rest,
            // `~user/...` is left alone.
            None => return Ok(PathBuf::from(raw)),
        },
    };

    let home = home.ok_or_else(|| {
        TaskbridgeError::ConfigError(format!("cannot expand {raw:?}: no home directory"))
    })?;
    Ok(if rest.is_empty() {
        home.to_path_buf()
    } else {
        home.join(rest)
    })
}

fn resolve_in(dir: &Path, raw: &str, home: Option<&Path>) -> Result<PathBuf> {
    let path = expand_home(raw, home)?;
    Ok(if path.is_absolute() {
        path
    } else {
        dir.join(path)
    })
}
