// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for running the assistant for one claimed
//! task using `tokio::process::Command`, and writing the terminal status
//! back to the queue file when the process ends.
//!
//! - [`locate`] finds the assistant executable.
//! - [`task_runner`] spawns the process and waits for it on its own task.
//! - [`backend`] provides the `ExecutorBackend` trait the dispatcher talks to,
//!   and the `RealExecutorBackend` used in production. Tests can replace it
//!   with a fake implementation.

pub mod backend;
pub mod locate;
pub mod task_runner;

pub use backend::{ClaimedTask, ExecutorBackend, Launch, RealExecutorBackend};
pub use locate::{ExecutableNotFound, locate_executable};
