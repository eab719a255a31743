// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod store;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_optional;
use crate::config::{RawConfigFile, Settings};
use crate::engine::{Dispatcher, ProcessedSet, Runtime, RuntimeEvent, RuntimeOptions, select_eligible};
use crate::exec::{RealExecutorBackend, locate_executable};
use crate::fs::{FileSystem, RealFileSystem};
use crate::store::{StatusWriter, TaskStore, TaskStoreFile, ensure_layout, load_seed_ids};
use crate::watch::{StoreChangeListener, spawn_poller, spawn_watcher};

/// Capacity of the runtime event channel. Change signals beyond this are
/// coalesced.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - working directory bootstrap and the processed-id seed
/// - status writer, executor and dispatcher
/// - file watcher and poll timer (disabled in --once mode)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut raw = load_optional(args.config.as_deref().map(Path::new))?;
    apply_cli_overrides(&mut raw, &args);
    let settings = Settings::try_from(raw)?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let store = TaskStoreFile::new(settings.watcher.queue_file.clone(), Arc::clone(&fs));

    if args.dry_run {
        print_dry_run(&settings, fs.as_ref(), &store);
        return Ok(());
    }

    ensure_layout(fs.as_ref(), &store, &settings.watcher)?;
    let seed = load_seed_ids(fs.as_ref(), &settings.watcher.results_file);
    info!(count = seed.len(), "seeded processed task ids from results file");

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(EVENT_CHANNEL_CAPACITY);

    let writer = Arc::new(StatusWriter::new(store.clone()));
    let executor = RealExecutorBackend::new(
        settings.executor.clone(),
        Arc::clone(&writer),
        rt_tx.clone(),
    );
    let dispatcher = Dispatcher::new(store, writer, executor, seed);

    let listener: Arc<dyn StoreChangeListener> = Arc::new(rt_tx.clone());

    let _watcher_handle = if !args.once && settings.watcher.fs_events {
        match spawn_watcher(&settings.watcher.queue_file, Arc::clone(&listener)) {
            Ok(handle) => Some(handle),
            Err(err) if settings.watcher.poll_interval.is_some() => {
                warn!(error = %err, "file watcher unavailable; relying on polling");
                None
            }
            Err(err) => return Err(err),
        }
    } else {
        None
    };

    let _poller_handle = match settings.watcher.poll_interval {
        Some(interval) if !args.once => Some(spawn_poller(interval, Arc::clone(&listener))),
        _ => None,
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }
    drop(rt_tx);

    info!(
        queue = ?settings.watcher.queue_file,
        results = ?settings.watcher.results_file,
        "watching task queue"
    );
    if !args.once {
        info!("press Ctrl+C to stop");
    }

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };
    let runtime = Runtime::new(dispatcher, rt_rx, options);
    runtime.run().await?;
    Ok(())
}

/// Layer CLI flags over whatever the config file said.
fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(dir) = &args.dir {
        raw.watcher.dir = Some(dir.clone());
    }
    if let Some(queue) = &args.queue_file {
        raw.watcher.queue_file = Some(queue.clone());
    }
    if let Some(results) = &args.results_file {
        raw.watcher.results_file = Some(results.clone());
    }
    if let Some(ms) = args.poll_interval_ms {
        raw.watcher.poll_interval_ms = Some(ms);
    }
    if args.no_fs_events {
        raw.watcher.fs_events = Some(false);
    }
    if let Some(program) = &args.program {
        raw.executor.program = Some(program.clone());
    }
}

/// Print resolved settings and the tasks a pass would dispatch right now.
/// Nothing is created or launched.
fn print_dry_run(settings: &Settings, fs: &dyn FileSystem, store: &TaskStoreFile) {
    let w = &settings.watcher;
    let e = &settings.executor;

    println!("taskbridge dry-run");
    println!("  watcher.dir = {}", w.dir.display());
    println!("  watcher.queue_file = {}", w.queue_file.display());
    println!("  watcher.results_file = {}", w.results_file.display());
    match w.poll_interval {
        Some(interval) => println!("  watcher.poll_interval = {interval:?}"),
        None => println!("  watcher.poll_interval = off"),
    }
    println!("  watcher.fs_events = {}", w.fs_events);
    match locate_executable(e) {
        Ok(path) => println!("  executor = {} {}", path.display(), e.args.join(" ")),
        Err(err) => println!("  executor = <{err}>"),
    }
    println!();

    let doc = if fs.exists(store.path()) {
        match store.load() {
            Ok(doc) => doc,
            Err(err) => {
                println!("queue file unreadable: {err}");
                return;
            }
        }
    } else {
        TaskStore::empty()
    };

    let processed = ProcessedSet::from_seed(load_seed_ids(fs, &w.results_file));
    let eligible = select_eligible(&doc, &processed);

    println!("would dispatch ({}):", eligible.len());
    for task in &eligible {
        println!("  - {}: {}", task.id, task.description);
    }

    debug!("dry-run complete (no execution)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_config_values() {
        let mut raw: RawConfigFile = toml::from_str(
            r#"
            [watcher]
            dir = "/from/config"
            poll_interval_ms = 500

            [executor]
            program = "/config/claude"
            "#,
        )
        .unwrap();

        let args = CliArgs {
            dir: Some("/from/cli".to_string()),
            no_fs_events: true,
            program: Some("/cli/claude".to_string()),
            ..CliArgs::default()
        };
        apply_cli_overrides(&mut raw, &args);

        assert_eq!(raw.watcher.dir.as_deref(), Some("/from/cli"));
        assert_eq!(raw.watcher.poll_interval_ms, Some(500));
        assert_eq!(raw.watcher.fs_events, Some(false));
        assert_eq!(raw.executor.program.as_deref(), Some("/cli/claude"));
    }

    #[test]
    fn absent_flags_leave_config_alone() {
        let mut raw = RawConfigFile::default();
        apply_cli_overrides(&mut raw, &CliArgs::default());

        assert!(raw.watcher.dir.is_none());
        assert!(raw.watcher.fs_events.is_none());
        assert!(raw.executor.program.is_none());
    }
}
