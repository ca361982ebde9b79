// src/inputs/builder.rs

use std::path::PathBuf;

use tracing::debug;

use crate::errors::{Result, TaskprintError};
use crate::inputs::property::{PropertyConfiguration, TaskInputs};
use crate::normalize::NormalizerRegistry;
use crate::snapshot::PatternFilter;
use crate::types::{InputKind, PathSensitivity};

/// Mutable configuration of one input property.
///
/// Defaults: no root, `InputKind::Files`, `PathSensitivity::Absolute`, the
/// `"default"` normalizer, required, not skipped when empty.
#[derive(Debug, Clone)]
pub struct PropertyBuilder {
    name: String,
    root: Option<PathBuf>,
    kind: InputKind,
    path_sensitivity: PathSensitivity,
    normalizer: String,
    include: Vec<String>,
    exclude: Vec<String>,
    optional: bool,
    skip_when_empty: bool,
}

impl PropertyBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            root: None,
            kind: InputKind::default(),
            path_sensitivity: PathSensitivity::default(),
            normalizer: "default".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            optional: false,
            skip_when_empty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the root file or directory this property reads.
    pub fn from(&mut self, root: impl Into<PathBuf>) -> &mut Self {
        self.root = Some(root.into());
        self
    }

    pub fn kind(&mut self, kind: InputKind) -> &mut Self {
        self.kind = kind;
        self
    }

    pub fn with_path_sensitivity(&mut self, sensitivity: PathSensitivity) -> &mut Self {
        self.path_sensitivity = sensitivity;
        self
    }

    /// Select a normalizer by id. Unknown ids are reported at freeze time.
    pub fn with_normalizer(&mut self, id: impl Into<String>) -> &mut Self {
        self.normalizer = id.into();
        self
    }

    pub fn include(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.include.push(pattern.into());
        self
    }

    pub fn exclude(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn optional(&mut self, optional: bool) -> &mut Self {
        self.optional = optional;
        self
    }

    pub fn skip_when_empty(&mut self, skip_when_empty: bool) -> &mut Self {
        self.skip_when_empty = skip_when_empty;
        self
    }

    fn freeze(
        &self,
        task: &str,
        normalizers: &NormalizerRegistry,
    ) -> Result<PropertyConfiguration> {
        let config_error = |reason: String| TaskprintError::Configuration {
            task: task.to_string(),
            property: self.name.clone(),
            reason,
        };

        if self.root.is_none() && !self.optional {
            return Err(config_error(
                "required input property has no declared root".to_string(),
            ));
        }

        let normalizer = normalizers.resolve(&self.normalizer).ok_or_else(|| {
            config_error(format!(
                "unknown normalizer '{}' (known: {})",
                self.normalizer,
                normalizers.ids().join(", ")
            ))
        })?;

        let filter = PatternFilter::new(&self.include, &self.exclude)
            .map_err(|e| config_error(format!("{e:#}")))?;

        Ok(PropertyConfiguration {
            name: self.name.clone(),
            root: self.root.clone(),
            kind: self.kind,
            path_sensitivity: self.path_sensitivity,
            normalizer,
            filter,
            optional: self.optional,
            skip_when_empty: self.skip_when_empty,
        })
    }
}

/// Mutable input declarations of one task.
///
/// Consumed by [`freeze`](Self::freeze); after that the configuration can no
/// longer change.
#[derive(Debug, Clone)]
pub struct TaskInputsBuilder {
    task: String,
    properties: Vec<PropertyBuilder>,
}

impl TaskInputsBuilder {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            properties: Vec::new(),
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    /// Declare (or re-declare) a property.
    ///
    /// Re-declaring an existing name starts over from the defaults while
    /// keeping the original declaration position.
    pub fn declare_property(&mut self, name: &str) -> &mut PropertyBuilder {
        let fresh = PropertyBuilder::new(name);
        let idx = match self.properties.iter().position(|p| p.name == name) {
            Some(idx) => {
                debug!(
                    task = %self.task,
                    property = %name,
                    "property re-declared; previous configuration replaced"
                );
                self.properties[idx] = fresh;
                idx
            }
            None => {
                self.properties.push(fresh);
                self.properties.len() - 1
            }
        };
        &mut self.properties[idx]
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut PropertyBuilder> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    /// Validate every property and produce the immutable [`TaskInputs`].
    pub fn freeze(self, normalizers: &NormalizerRegistry) -> Result<TaskInputs> {
        self.validate(normalizers)
    }

    pub(crate) fn validate(&self, normalizers: &NormalizerRegistry) -> Result<TaskInputs> {
        let properties = self
            .properties
            .iter()
            .map(|p| p.freeze(&self.task, normalizers))
            .collect::<Result<Vec<_>>>()?;

        debug!(task = %self.task, properties = properties.len(), "froze task inputs");
        Ok(TaskInputs {
            task: self.task.clone(),
            properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_until_overridden() {
        let mut builder = TaskInputsBuilder::new("compile");
        builder.declare_property("sources").from("src");

        let inputs = builder.freeze(&NormalizerRegistry::new()).unwrap();
        let sources = inputs.property("sources").unwrap();
        assert_eq!(sources.path_sensitivity(), PathSensitivity::Absolute);
        assert_eq!(sources.normalizer().id(), "default");
        assert_eq!(sources.kind(), InputKind::Files);
        assert!(!sources.is_optional());
        assert!(!sources.skip_when_empty());
    }

    #[test]
    fn redeclaring_replaces_previous_configuration() {
        let mut builder = TaskInputsBuilder::new("compile");
        builder.declare_property("a").from("x").skip_when_empty(true);
        builder.declare_property("b").from("y");
        builder
            .declare_property("a")
            .from("z")
            .with_path_sensitivity(PathSensitivity::Relative);

        let inputs = builder.freeze(&NormalizerRegistry::new()).unwrap();
        let names: Vec<&str> = inputs.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let a = inputs.property("a").unwrap();
        assert_eq!(a.root(), Some(std::path::Path::new("z")));
        assert_eq!(a.path_sensitivity(), PathSensitivity::Relative);
        assert!(!a.skip_when_empty());
    }

    #[test]
    fn required_property_without_root_fails_to_freeze() {
        let mut builder = TaskInputsBuilder::new("compile");
        builder.declare_property("sources");

        match builder.freeze(&NormalizerRegistry::new()) {
            Err(TaskprintError::Configuration { task, property, .. }) => {
                assert_eq!(task, "compile");
                assert_eq!(property, "sources");
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn optional_property_without_root_is_fine() {
        let mut builder = TaskInputsBuilder::new("compile");
        builder.declare_property("extra").optional(true);
        assert!(builder.freeze(&NormalizerRegistry::new()).is_ok());
    }

    #[test]
    fn unknown_normalizer_is_a_configuration_error() {
        let mut builder = TaskInputsBuilder::new("compile");
        builder
            .declare_property("classpath")
            .from("lib")
            .with_normalizer("bogus");

        let err = builder.freeze(&NormalizerRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("unknown normalizer 'bogus'"));
    }

    #[test]
    fn bad_glob_is_a_configuration_error() {
        let mut builder = TaskInputsBuilder::new("compile");
        builder.declare_property("sources").from("src").include("[");

        assert!(matches!(
            builder.freeze(&NormalizerRegistry::new()),
            Err(TaskprintError::Configuration { .. })
        ));
    }
}
