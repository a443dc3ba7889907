//! Task definitions consumed by task and chapter gates.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single authored diner task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskData {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub chapter_id: String,
    /// How many completions satisfy the task.
    #[serde(default = "default_required_count")]
    pub required_count: u32,
    /// Raw requirement objects; parsed on demand via the factory so one
    /// malformed entry flags only that task.
    #[serde(default)]
    pub unlock_requirements: Vec<Value>,
}

fn default_required_count() -> u32 {
    1
}

/// Lookup table over all authored tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TaskConfig {
    pub tasks: Vec<TaskData>,
}

impl TaskConfig {
    /// Create an empty task config (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Load task config from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid task data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Find a task by id.
    #[must_use]
    pub fn task(&self, task_id: &str) -> Option<&TaskData> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// All tasks belonging to a chapter, in authored order.
    pub fn tasks_in_chapter<'a>(
        &'a self,
        chapter_id: &'a str,
    ) -> impl Iterator<Item = &'a TaskData> {
        self.tasks
            .iter()
            .filter(move |task| task.chapter_id == chapter_id)
    }
}
