use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which part of a file's location contributes to its normalized key.
///
/// Variants are ordered by how much positional information they retain:
/// `None` keeps nothing, `Absolute` keeps everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PathSensitivity {
    None,
    NameOnly,
    Relative,
    Absolute,
}

impl Default for PathSensitivity {
    fn default() -> Self {
        PathSensitivity::Absolute
    }
}

impl FromStr for PathSensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "absolute" => Ok(PathSensitivity::Absolute),
            "relative" => Ok(PathSensitivity::Relative),
            "name_only" => Ok(PathSensitivity::NameOnly),
            "none" => Ok(PathSensitivity::None),
            other => Err(format!(
                "invalid path_sensitivity: {other} (expected absolute, relative, name_only or none)"
            )),
        }
    }
}

impl TryFrom<String> for PathSensitivity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// What a property's declared root is expected to be.
///
/// - `Files`: anything goes (a file, a directory, or nothing at all for
///   optional properties).
/// - `File`: the root must be a regular file.
/// - `Directory`: the root must be a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum InputKind {
    Files,
    File,
    Directory,
}

impl Default for InputKind {
    fn default() -> Self {
        InputKind::Files
    }
}

impl FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "files" => Ok(InputKind::Files),
            "file" => Ok(InputKind::File),
            "directory" | "dir" => Ok(InputKind::Directory),
            other => Err(format!(
                "invalid input kind: {other} (expected \"files\", \"file\" or \"directory\")"
            )),
        }
    }
}

impl TryFrom<String> for InputKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Kind of a filesystem entry as seen by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Missing,
}

/// Mode for storing previous fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// Store fingerprints in a JSON file (`.taskprint/fingerprints.json`).
    File,
    /// Store fingerprints in memory only (lost on exit).
    Memory,
}

impl Default for StoreMode {
    fn default() -> Self {
        StoreMode::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_orders_by_retained_information() {
        assert!(PathSensitivity::None < PathSensitivity::NameOnly);
        assert!(PathSensitivity::NameOnly < PathSensitivity::Relative);
        assert!(PathSensitivity::Relative < PathSensitivity::Absolute);
    }

    #[test]
    fn sensitivity_parses_both_spellings() {
        assert_eq!("name-only".parse(), Ok(PathSensitivity::NameOnly));
        assert_eq!(" NAME_ONLY ".parse(), Ok(PathSensitivity::NameOnly));
        assert!("sideways".parse::<PathSensitivity>().is_err());
    }

    #[test]
    fn input_kind_accepts_dir_shorthand() {
        assert_eq!("dir".parse(), Ok(InputKind::Directory));
    }

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        sensitivity: PathSensitivity,
        kind: InputKind,
    }

    #[test]
    fn deserializes_through_from_str() {
        let w: Wrapper = toml::from_str("sensitivity = \"name-only\"\nkind = \"dir\"\n").unwrap();
        assert_eq!(w.sensitivity, PathSensitivity::NameOnly);
        assert_eq!(w.kind, InputKind::Directory);

        let err = toml::from_str::<Wrapper>("sensitivity = \"sideways\"\nkind = \"file\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("invalid path_sensitivity"));
    }
}
