// src/config/validate.rs

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskprintError};
use crate::snapshot::build_globset;

const NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_.-]*$";

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskprintError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_names(cfg)?;
    validate_patterns(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TaskprintError::ConfigFile(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.workers == Some(0) {
        return Err(TaskprintError::ConfigFile(
            "[config].workers must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_names(cfg: &RawConfigFile) -> Result<()> {
    let re = Regex::new(NAME_PATTERN).map_err(|e| TaskprintError::Other(e.into()))?;

    for (name, task) in cfg.task.iter() {
        if !re.is_match(name) {
            return Err(TaskprintError::ConfigFile(format!(
                "invalid task name '{name}' (must match {NAME_PATTERN})"
            )));
        }
        for property in task.inputs.keys() {
            if !re.is_match(property) {
                return Err(TaskprintError::ConfigFile(format!(
                    "task '{name}' has invalid input name '{property}' (must match {NAME_PATTERN})"
                )));
            }
        }
    }
    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for (property, input) in task.inputs.iter() {
            for patterns in [&input.include, &input.exclude] {
                build_globset(patterns).map_err(|e| {
                    TaskprintError::ConfigFile(format!(
                        "task '{name}', input '{property}': {e:#}"
                    ))
                })?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InputKind, PathSensitivity};

    fn validate(toml_str: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_str)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn rejects_config_without_tasks() {
        let err = validate("[config]\nworkers = 2\n").unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn rejects_zero_workers() {
        let err = validate("[config]\nworkers = 0\n[task.a]\n").unwrap_err();
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn rejects_bad_names() {
        assert!(validate("[task.\"9lives\"]\n").is_err());
        assert!(validate("[task.a.inputs.\"has space\"]\nroot = \"x\"\n").is_err());
        assert!(validate("[task.\"compile.main\"]\n").is_ok());
    }

    #[test]
    fn accepts_alternate_enum_spellings() {
        let cfg = validate(
            r#"
[task.a.inputs.src]
root = "src"
kind = "dir"
path_sensitivity = "name-only"
"#,
        )
        .unwrap();
        let input = &cfg.task["a"].inputs["src"];
        assert_eq!(input.kind, InputKind::Directory);
        assert_eq!(input.path_sensitivity, PathSensitivity::NameOnly);
    }

    #[test]
    fn rejects_broken_globs() {
        let err = validate(
            r#"
[task.a.inputs.src]
root = "src"
include = ["src/[unterminated"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, TaskprintError::ConfigFile(_)));
        assert!(err.to_string().contains("task 'a', input 'src'"));
    }

    #[test]
    fn rejects_unknown_enum_values() {
        let err = validate(
            r#"
[task.a.inputs.src]
root = "src"
path_sensitivity = "sideways"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, TaskprintError::Toml(_)));
    }
}
