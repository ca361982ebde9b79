// src/fingerprint/builder.rs

use tracing::debug;

use crate::errors::{Result, TaskprintError};
use crate::fingerprint::Fingerprint;
use crate::inputs::PropertyConfiguration;
use crate::snapshot::Snapshot;
use crate::types::{EntryKind, InputKind};

/// Produce the fingerprint of one property.
///
/// `snapshot` is `None` when the property declares no root (only legal for
/// optional properties, which then fingerprint as empty).
///
/// Fails with [`TaskprintError::Configuration`] when a required property's
/// root does not exist, or when the root's kind contradicts the declared
/// [`InputKind`]. Otherwise this is a pure function of its arguments.
pub fn build_fingerprint(
    task: &str,
    config: &PropertyConfiguration,
    snapshot: Option<&Snapshot>,
) -> Result<Fingerprint> {
    let config_error = |reason: String| TaskprintError::Configuration {
        task: task.to_string(),
        property: config.name().to_string(),
        reason,
    };

    let Some(snapshot) = snapshot else {
        if !config.is_optional() {
            return Err(config_error(
                "required input property has no declared root".to_string(),
            ));
        }
        return Ok(Fingerprint::empty(config.name(), true, config.skip_when_empty()));
    };

    match (snapshot.root_kind(), config.kind()) {
        (EntryKind::Missing, _) if !config.is_optional() => {
            return Err(config_error(format!(
                "input root {:?} does not exist",
                snapshot.root()
            )));
        }
        (EntryKind::Directory, InputKind::File) => {
            return Err(config_error(format!(
                "input root {:?} is a directory, but a file is required",
                snapshot.root()
            )));
        }
        (EntryKind::File, InputKind::Directory) => {
            return Err(config_error(format!(
                "input root {:?} is a file, but a directory is required",
                snapshot.root()
            )));
        }
        _ => {}
    }

    let filtered = snapshot.filtered(config.filter());
    let entries = config
        .normalizer()
        .normalize(&filtered, config.path_sensitivity());

    let fingerprint = Fingerprint::new(
        config.name(),
        entries,
        config.is_optional(),
        config.skip_when_empty(),
    );

    debug!(
        task = %task,
        property = %config.name(),
        normalizer = %config.normalizer().id(),
        sensitivity = ?config.path_sensitivity(),
        entries = fingerprint.entries().len(),
        empty = fingerprint.is_empty(),
        digest = %fingerprint.digest().short(),
        "built fingerprint"
    );

    Ok(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::TaskInputsBuilder;
    use crate::normalize::NormalizerRegistry;
    use crate::snapshot::{ContentHash, SnapshotEntry};
    use crate::types::PathSensitivity;

    fn config(
        configure: impl FnOnce(&mut crate::inputs::PropertyBuilder),
    ) -> PropertyConfiguration {
        let mut builder = TaskInputsBuilder::new("t");
        configure(builder.declare_property("p"));
        let inputs = builder.freeze(&NormalizerRegistry::new()).unwrap();
        inputs.properties()[0].clone()
    }

    fn dir_snapshot(entries: Vec<SnapshotEntry>) -> Snapshot {
        Snapshot::new("/work/src", EntryKind::Directory, entries)
    }

    #[test]
    fn missing_required_root_is_a_configuration_error() {
        let cfg = config(|p| {
            p.from("/work/src");
        });
        let err = build_fingerprint("t", &cfg, Some(&Snapshot::missing("/work/src"))).unwrap_err();
        assert!(matches!(err, TaskprintError::Configuration { .. }));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn missing_optional_root_is_empty() {
        let cfg = config(|p| {
            p.from("/work/src").optional(true);
        });
        let fp = build_fingerprint("t", &cfg, Some(&Snapshot::missing("/work/src"))).unwrap();
        assert!(fp.is_empty());
        assert!(fp.entries().is_empty());
    }

    #[test]
    fn undeclared_optional_root_is_empty() {
        let cfg = config(|p| {
            p.optional(true).skip_when_empty(true);
        });
        let fp = build_fingerprint("t", &cfg, None).unwrap();
        assert!(fp.is_empty());
        assert!(fp.skip_when_empty());
    }

    #[test]
    fn kind_mismatch_is_a_configuration_error() {
        let cfg = config(|p| {
            p.from("/work/src").kind(InputKind::File);
        });
        let err = build_fingerprint("t", &cfg, Some(&dir_snapshot(vec![]))).unwrap_err();
        assert!(err.to_string().contains("a file is required"));
    }

    #[test]
    fn name_only_collapses_same_named_files() {
        let cfg = config(|p| {
            p.from("/work/src")
                .with_path_sensitivity(PathSensitivity::NameOnly);
        });
        let hash = ContentHash::of(b"same");
        let snap = dir_snapshot(vec![
            SnapshotEntry::directory("a"),
            SnapshotEntry::file("a/x.txt", hash),
            SnapshotEntry::directory("b"),
            SnapshotEntry::file("b/x.txt", hash),
        ]);

        let fp = build_fingerprint("t", &cfg, Some(&snap)).unwrap();
        assert_eq!(fp.entries().len(), 1);
        assert_eq!(fp.entries()[0].key, "x.txt");
    }

    #[test]
    fn filters_apply_before_normalization() {
        let cfg = config(|p| {
            p.from("/work/src")
                .with_path_sensitivity(PathSensitivity::Relative)
                .include("**/*.rs");
        });
        let snap = dir_snapshot(vec![
            SnapshotEntry::file("lib.rs", ContentHash::of(b"lib")),
            SnapshotEntry::file("README.md", ContentHash::of(b"readme")),
        ]);

        let fp = build_fingerprint("t", &cfg, Some(&snap)).unwrap();
        let keys: Vec<&str> = fp.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["lib.rs"]);
    }
}
