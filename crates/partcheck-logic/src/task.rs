//! Named tasks independent of the item catalogue.
//!
//! The registry is a fixed, ordered list rebuilt (reset to incomplete) at
//! the start of every session. Lookup is linear; registries are small.

use serde::{Deserialize, Serialize};

/// A named unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub description: String,
    /// Task should only be done with elevated (blockchain) verification on.
    pub requires_elevated_verification: bool,
    /// Flips false → true once per session.
    #[serde(default)]
    pub is_completed: bool,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        requires_elevated_verification: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            requires_elevated_verification,
            is_completed: false,
        }
    }
}

/// Ordered task catalogue for one session.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    /// Build a registry. Duplicate names are dropped (first wins) and all
    /// tasks start incomplete.
    pub fn new(tasks: Vec<Task>) -> Self {
        let mut registry = Self::default();
        for mut task in tasks {
            if registry.find_by_name(&task.name).is_some() {
                log::warn!("Duplicate task '{}' dropped from registry", task.name);
                continue;
            }
            task.is_completed = false;
            registry.tasks.push(task);
        }
        registry
    }

    /// The built-in inspection task list.
    pub fn standard() -> Self {
        Self::new(vec![
            Task::new(
                "visual_inspection",
                "Check the part surface for cracks, corrosion and impact damage.",
                false,
            ),
            Task::new(
                "documentation_review",
                "Compare the release certificate against the build sheet.",
                false,
            ),
            Task::new(
                "serial_traceability",
                "Trace the serial number through the supplier ledger.",
                true,
            ),
            Task::new(
                "certificate_authentication",
                "Confirm the certificate signature against the issuing authority.",
                true,
            ),
        ])
    }

    pub fn get_all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub(crate) fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.name == name)
    }

    /// Mark every task incomplete.
    pub fn reset_all(&mut self) {
        for task in &mut self.tasks {
            task.is_completed = false;
        }
    }

    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    pub fn elevated_task_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.requires_elevated_verification)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let reg = TaskRegistry::standard();
        assert_eq!(reg.total(), 4);
        assert_eq!(reg.elevated_task_count(), 2);
        assert_eq!(reg.completed_count(), 0);
        assert_eq!(reg.get_all()[0].name, "visual_inspection");
    }

    #[test]
    fn test_find_by_name() {
        let reg = TaskRegistry::standard();
        assert!(reg.find_by_name("serial_traceability").is_some());
        assert!(reg.find_by_name("does-not-exist").is_none());
    }

    #[test]
    fn test_new_clears_completion_and_duplicates() {
        let mut done = Task::new("a", "", false);
        done.is_completed = true;
        let reg = TaskRegistry::new(vec![done, Task::new("a", "again", true)]);
        assert_eq!(reg.total(), 1);
        assert!(!reg.get_all()[0].is_completed);
        assert!(!reg.get_all()[0].requires_elevated_verification);
    }

    #[test]
    fn test_reset_all() {
        let mut reg = TaskRegistry::standard();
        reg.find_by_name_mut("visual_inspection").unwrap().is_completed = true;
        reg.find_by_name_mut("serial_traceability").unwrap().is_completed = true;
        assert_eq!(reg.completed_count(), 2);
        reg.reset_all();
        assert_eq!(reg.completed_count(), 0);
    }
}
