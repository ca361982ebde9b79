// src/inputs/registry.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{Result, TaskprintError};
use crate::inputs::builder::{PropertyBuilder, TaskInputsBuilder};
use crate::inputs::property::TaskInputs;
use crate::normalize::NormalizerRegistry;
use crate::types::{InputKind, PathSensitivity};

/// Opaque reference to a declared property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyHandle {
    task: String,
    property: String,
}

impl PropertyHandle {
    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn property(&self) -> &str {
        &self.property
    }
}

#[derive(Debug)]
enum TaskSlot {
    Configuring(TaskInputsBuilder),
    Frozen(Arc<TaskInputs>),
}

/// Input declarations for a whole build, task by task.
///
/// Each task starts out configurable and becomes immutable once
/// [`freeze`](Self::freeze) succeeds for it. Any mutator called on a frozen
/// task fails with [`TaskprintError::FrozenConfiguration`].
#[derive(Debug, Default)]
pub struct InputRegistry {
    normalizers: NormalizerRegistry,
    tasks: BTreeMap<String, TaskSlot>,
}

impl InputRegistry {
    pub fn new(normalizers: NormalizerRegistry) -> Self {
        Self {
            normalizers,
            tasks: BTreeMap::new(),
        }
    }

    pub fn normalizers(&self) -> &NormalizerRegistry {
        &self.normalizers
    }

    /// Declare a property on `task`, creating the task on first use.
    pub fn declare_property(&mut self, task: &str, property: &str) -> Result<PropertyHandle> {
        let slot = self
            .tasks
            .entry(task.to_string())
            .or_insert_with(|| TaskSlot::Configuring(TaskInputsBuilder::new(task)));

        match slot {
            TaskSlot::Configuring(builder) => {
                builder.declare_property(property);
                debug!(task = %task, property = %property, "input property declared");
                Ok(PropertyHandle {
                    task: task.to_string(),
                    property: property.to_string(),
                })
            }
            TaskSlot::Frozen(_) => Err(TaskprintError::FrozenConfiguration {
                task: task.to_string(),
                property: property.to_string(),
            }),
        }
    }

    pub fn from(&mut self, handle: &PropertyHandle, root: impl Into<PathBuf>) -> Result<()> {
        let root = root.into();
        self.configure(handle, |p| {
            p.from(root);
        })
    }

    pub fn kind(&mut self, handle: &PropertyHandle, kind: InputKind) -> Result<()> {
        self.configure(handle, |p| {
            p.kind(kind);
        })
    }

    pub fn with_path_sensitivity(
        &mut self,
        handle: &PropertyHandle,
        sensitivity: PathSensitivity,
    ) -> Result<()> {
        self.configure(handle, |p| {
            p.with_path_sensitivity(sensitivity);
        })
    }

    pub fn with_normalizer(&mut self, handle: &PropertyHandle, id: &str) -> Result<()> {
        self.configure(handle, |p| {
            p.with_normalizer(id);
        })
    }

    pub fn include(&mut self, handle: &PropertyHandle, pattern: &str) -> Result<()> {
        self.configure(handle, |p| {
            p.include(pattern);
        })
    }

    pub fn exclude(&mut self, handle: &PropertyHandle, pattern: &str) -> Result<()> {
        self.configure(handle, |p| {
            p.exclude(pattern);
        })
    }

    pub fn optional(&mut self, handle: &PropertyHandle, optional: bool) -> Result<()> {
        self.configure(handle, |p| {
            p.optional(optional);
        })
    }

    pub fn skip_when_empty(&mut self, handle: &PropertyHandle, skip: bool) -> Result<()> {
        self.configure(handle, |p| {
            p.skip_when_empty(skip);
        })
    }

    fn configure(
        &mut self,
        handle: &PropertyHandle,
        apply: impl FnOnce(&mut PropertyBuilder),
    ) -> Result<()> {
        let frozen = || TaskprintError::FrozenConfiguration {
            task: handle.task.clone(),
            property: handle.property.clone(),
        };

        match self.tasks.get_mut(&handle.task) {
            Some(TaskSlot::Configuring(builder)) => match builder.property_mut(&handle.property) {
                Some(property) => {
                    apply(property);
                    Ok(())
                }
                None => Err(TaskprintError::Configuration {
                    task: handle.task.clone(),
                    property: handle.property.clone(),
                    reason: "property was never declared".to_string(),
                }),
            },
            Some(TaskSlot::Frozen(_)) => Err(frozen()),
            None => Err(TaskprintError::Configuration {
                task: handle.task.clone(),
                property: handle.property.clone(),
                reason: "task was never declared".to_string(),
            }),
        }
    }

    /// End the configuration phase of `task`.
    ///
    /// Freezing is idempotent. On a validation error the task stays
    /// configurable so the caller can report every problem it finds.
    pub fn freeze(&mut self, task: &str) -> Result<Arc<TaskInputs>> {
        let inputs = match self.tasks.get(task) {
            Some(TaskSlot::Frozen(inputs)) => return Ok(Arc::clone(inputs)),
            Some(TaskSlot::Configuring(builder)) => Arc::new(builder.validate(&self.normalizers)?),
            // A task that never declared anything has no inputs.
            None => Arc::new(TaskInputsBuilder::new(task).validate(&self.normalizers)?),
        };

        info!(task = %task, properties = inputs.properties().len(), "task inputs frozen");
        self.tasks
            .insert(task.to_string(), TaskSlot::Frozen(Arc::clone(&inputs)));
        Ok(inputs)
    }

    /// Frozen inputs of `task`, if it has been frozen.
    pub fn task_inputs(&self, task: &str) -> Option<Arc<TaskInputs>> {
        match self.tasks.get(task) {
            Some(TaskSlot::Frozen(inputs)) => Some(Arc::clone(inputs)),
            _ => None,
        }
    }

    pub fn is_frozen(&self, task: &str) -> bool {
        matches!(self.tasks.get(task), Some(TaskSlot::Frozen(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_protocol_configures_property() -> Result<()> {
        let mut registry = InputRegistry::default();
        let handle = registry.declare_property("test", "classes")?;
        registry.from(&handle, "build/classes")?;
        registry.with_path_sensitivity(&handle, PathSensitivity::NameOnly)?;
        registry.skip_when_empty(&handle, true)?;
        registry.optional(&handle, true)?;

        let inputs = registry.freeze("test")?;
        let classes = inputs.property("classes").expect("declared");
        assert_eq!(classes.path_sensitivity(), PathSensitivity::NameOnly);
        assert!(classes.skip_when_empty());
        assert!(classes.is_optional());
        Ok(())
    }

    #[test]
    fn mutation_after_freeze_fails_fast() -> Result<()> {
        let mut registry = InputRegistry::default();
        let handle = registry.declare_property("test", "classes")?;
        registry.from(&handle, "build/classes")?;
        registry.freeze("test")?;

        assert!(matches!(
            registry.optional(&handle, true),
            Err(TaskprintError::FrozenConfiguration { .. })
        ));
        assert!(matches!(
            registry.declare_property("test", "more"),
            Err(TaskprintError::FrozenConfiguration { .. })
        ));
        // Other tasks are unaffected.
        assert!(registry.declare_property("other", "more").is_ok());
        Ok(())
    }

    #[test]
    fn failed_freeze_leaves_task_configurable() -> Result<()> {
        let mut registry = InputRegistry::default();
        let handle = registry.declare_property("test", "classes")?;

        assert!(registry.freeze("test").is_err());
        assert!(!registry.is_frozen("test"));

        registry.from(&handle, "build/classes")?;
        assert!(registry.freeze("test").is_ok());
        assert!(registry.task_inputs("test").is_some());
        Ok(())
    }
}
