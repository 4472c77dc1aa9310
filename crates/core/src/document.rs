//! The merged task document
//!
//! A [`TaskDocument`] is what the provider hands to the renderers: every task
//! from the root Taskfile and its includes under its final, namespaced name.

use std::collections::HashMap;

use crate::configs::Task;
use crate::types::{TaskfileError, TaskfileResult};

/// Tasks keyed by name, iterated in insertion order
#[derive(Debug, Clone, Default)]
pub struct Tasks {
    tasks: Vec<Task>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task, refusing a name that is already taken
    pub fn insert(&mut self, task: Task) -> TaskfileResult<()> {
        if self.by_name.contains_key(&task.name) {
            return Err(TaskfileError::MergeFailed(format!(
                "Found multiple tasks ({}) in the merged Taskfile",
                task.name
            )));
        }

        let position = self.tasks.len();
        self.by_name.insert(task.name.clone(), position);
        for alias in &task.aliases {
            self.by_alias.entry(alias.clone()).or_insert(position);
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Look a task up by name, falling back to its aliases
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.by_name
            .get(name)
            .or_else(|| self.by_alias.get(name))
            .map(|&position| &self.tasks[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|task| task.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// A Taskfile with all of its includes merged in
#[derive(Debug, Clone, Default)]
pub struct TaskDocument {
    /// Location of the root Taskfile
    pub location: String,
    pub version: Option<String>,
    pub tasks: Tasks,
}

impl TaskDocument {
    pub fn task(&self, name: &str) -> TaskfileResult<&Task> {
        self.tasks
            .get(name)
            .ok_or_else(|| TaskfileError::TaskNotFound(name.to_string()))
    }
}
