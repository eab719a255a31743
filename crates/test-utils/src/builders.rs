use std::path::PathBuf;

use serde_json::{Map, Value, json};
use taskbridge::config::ExecutorSettings;
use taskbridge::types::TaskStatus;

/// Builder for queue documents as producers would write them.
#[derive(Debug, Default)]
pub struct StoreDocBuilder {
    tasks: Map<String, Value>,
}

impl StoreDocBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A freshly queued task.
    pub fn queued(self, id: &str, description: &str) -> Self {
        self.with_status(id, description, TaskStatus::Queued)
    }

    pub fn with_status(mut self, id: &str, description: &str, status: TaskStatus) -> Self {
        self.tasks.insert(
            id.to_string(),
            json!({ "description": description, "status": status.as_str() }),
        );
        self
    }

    /// Insert an arbitrary entry, e.g. one with extra producer fields.
    pub fn raw(mut self, id: &str, entry: Value) -> Self {
        self.tasks.insert(id.to_string(), entry);
        self
    }

    pub fn build_value(self) -> Value {
        json!({ "tasks": Value::Object(self.tasks) })
    }

    pub fn build(self) -> String {
        serde_json::to_string_pretty(&self.build_value()).expect("serialize queue document")
    }
}

/// Results document whose `results` keys are `ids`.
pub fn results_doc(ids: &[&str]) -> String {
    let results: Map<String, Value> = ids
        .iter()
        .map(|id| (id.to_string(), json!({ "status": "completed" })))
        .collect();
    serde_json::to_string_pretty(&json!({ "results": results })).expect("serialize results")
}

/// Executor settings that run `script` through `/bin/sh -c`.
///
/// The task description arrives as `$0`.
pub fn shell_executor(script: &str) -> ExecutorSettings {
    ExecutorSettings {
        name: "sh".to_string(),
        program: Some(PathBuf::from("/bin/sh")),
        candidates: Vec::new(),
        args: vec!["-c".to_string(), script.to_string()],
        ..ExecutorSettings::default()
    }
}

/// Executor settings pointing at a program that does not exist.
pub fn missing_executor() -> ExecutorSettings {
    ExecutorSettings {
        name: "taskbridge-test-no-such-assistant".to_string(),
        program: Some(PathBuf::from("/nonexistent/taskbridge-test/claude")),
        candidates: Vec::new(),
        ..ExecutorSettings::default()
    }
}
