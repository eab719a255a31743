// src/exec/locate.rs

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::ExecutorSettings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("executable not found: {name} (searched {searched})")]
pub struct ExecutableNotFound {
    pub name: String,
    pub searched: String,
}

/// Find the assistant executable.
///
/// 1. An explicit `program`, if configured (a bare name is looked up on `PATH`).
/// 2. The first existing file in `candidates`.
/// 3. `name` looked up on `PATH`.
pub fn locate_executable(settings: &ExecutorSettings) -> Result<PathBuf, ExecutableNotFound> {
    if let Some(program) = &settings.program {
        return locate_program(program);
    }

    for candidate in &settings.candidates {
        if candidate.is_file() {
            debug!(path = ?candidate, "using assistant candidate");
            return Ok(candidate.clone());
        }
    }

    which::which(&settings.name).map_err(|_| {
        let mut searched: Vec<String> = settings
            .candidates
            .iter()
            .map(|c| c.display().to_string())
            .collect();
        searched.push("PATH".to_string());
        ExecutableNotFound {
            name: settings.name.clone(),
            searched: searched.join(", "),
        }
    })
}

fn locate_program(program: &Path) -> Result<PathBuf, ExecutableNotFound> {
    let is_bare_name = program.components().count() == 1 && !program.is_absolute();
    let found = if is_bare_name {
        which::which(program).ok()
    } else if program.is_file() {
        Some(program.to_path_buf())
    } else {
        None
    };

    found.ok_or_else(|| ExecutableNotFound {
        name: program.display().to_string(),
        searched: if is_bare_name {
            "PATH".to_string()
        } else {
            program.display().to_string()
        },
    })
}
