// src/fingerprint/compare.rs

use std::cmp::Ordering;
use std::fmt;

use crate::errors::{Result, TaskprintError};
use crate::fingerprint::Fingerprint;
use crate::normalize::NormalizedEntry;

/// One observation from comparing two fingerprints of the same property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonResult {
    /// Nothing changed. Only ever appears alone.
    Unchanged,
    Added(NormalizedEntry),
    Removed(NormalizedEntry),
    Modified {
        previous: NormalizedEntry,
        current: NormalizedEntry,
    },
    EmptinessChanged {
        was_empty: bool,
        now_empty: bool,
    },
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonResult::Unchanged => f.write_str("unchanged"),
            ComparisonResult::Added(entry) => write!(f, "added {entry}"),
            ComparisonResult::Removed(entry) => write!(f, "removed {entry}"),
            ComparisonResult::Modified { previous, current } => write!(
                f,
                "modified {} ({} -> {})",
                previous.key,
                previous.content_hash.short(),
                current.content_hash.short()
            ),
            ComparisonResult::EmptinessChanged { was_empty, now_empty } => {
                let describe = |empty: bool| if empty { "empty" } else { "non-empty" };
                write!(f, "became {} (was {})", describe(*now_empty), describe(*was_empty))
            }
        }
    }
}

/// Full comparison of one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyComparison {
    property_name: String,
    results: Vec<ComparisonResult>,
}

impl PropertyComparison {
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Changes ordered by key, with `EmptinessChanged` last; exactly
    /// `[Unchanged]` when nothing changed.
    pub fn results(&self) -> &[ComparisonResult] {
        &self.results
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self.results.as_slice(), [ComparisonResult::Unchanged])
    }
}

/// Merge order of two entries: by key, and for path-free entries (which may
/// share the empty key) by content as well.
fn merge_order(previous: &NormalizedEntry, current: &NormalizedEntry) -> Ordering {
    previous.key.cmp(&current.key).then_with(|| {
        if previous.is_path_free() {
            previous.content_hash.cmp(&current.content_hash)
        } else {
            Ordering::Equal
        }
    })
}

/// Diff `previous` against `current`.
///
/// Both fingerprints must describe the same property; anything else is a
/// [`TaskprintError::Comparison`].
pub fn compare(
    task: &str,
    previous: &Fingerprint,
    current: &Fingerprint,
) -> Result<PropertyComparison> {
    if previous.property_name() != current.property_name() {
        return Err(TaskprintError::Comparison {
            task: task.to_string(),
            expected: current.property_name().to_string(),
            actual: previous.property_name().to_string(),
        });
    }

    let old = previous.entries();
    let new = current.entries();
    let mut results = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < old.len() && j < new.len() {
        match merge_order(&old[i], &new[j]) {
            Ordering::Less => {
                results.push(ComparisonResult::Removed(old[i].clone()));
                i += 1;
            }
            Ordering::Greater => {
                results.push(ComparisonResult::Added(new[j].clone()));
                j += 1;
            }
            Ordering::Equal => {
                if old[i].content_hash != new[j].content_hash {
                    results.push(ComparisonResult::Modified {
                        previous: old[i].clone(),
                        current: new[j].clone(),
                    });
                }
                i += 1;
                j += 1;
            }
        }
    }
    results.extend(old[i..].iter().cloned().map(ComparisonResult::Removed));
    results.extend(new[j..].iter().cloned().map(ComparisonResult::Added));

    if previous.is_empty() != current.is_empty() {
        results.push(ComparisonResult::EmptinessChanged {
            was_empty: previous.is_empty(),
            now_empty: current.is_empty(),
        });
    }

    if results.is_empty() {
        results.push(ComparisonResult::Unchanged);
    }

    Ok(PropertyComparison {
        property_name: current.property_name().to_string(),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ContentHash;

    fn entry(key: &str, content: &str) -> NormalizedEntry {
        NormalizedEntry::new(key, ContentHash::of(content.as_bytes()))
    }

    fn fp(entries: Vec<NormalizedEntry>) -> Fingerprint {
        Fingerprint::new("sources", entries, false, false)
    }

    #[test]
    fn identical_fingerprints_are_unchanged() {
        let a = fp(vec![entry("a.txt", "x"), entry("b.txt", "y")]);
        let cmp = compare("t", &a, &a.clone()).unwrap();
        assert!(cmp.is_unchanged());
        assert_eq!(cmp.results(), &[ComparisonResult::Unchanged]);
    }

    #[test]
    fn rename_is_removed_plus_added_in_key_order() {
        let old = fp(vec![entry("a.txt", "x")]);
        let new = fp(vec![entry("b.txt", "x")]);
        let cmp = compare("t", &old, &new).unwrap();
        assert_eq!(
            cmp.results(),
            &[
                ComparisonResult::Removed(entry("a.txt", "x")),
                ComparisonResult::Added(entry("b.txt", "x")),
            ]
        );
    }

    #[test]
    fn content_change_is_modified() {
        let old = fp(vec![entry("a.txt", "x"), entry("c.txt", "z")]);
        let new = fp(vec![entry("a.txt", "x2"), entry("b.txt", "y"), entry("c.txt", "z")]);
        let cmp = compare("t", &old, &new).unwrap();
        assert_eq!(
            cmp.results(),
            &[
                ComparisonResult::Modified {
                    previous: entry("a.txt", "x"),
                    current: entry("a.txt", "x2"),
                },
                ComparisonResult::Added(entry("b.txt", "y")),
            ]
        );
    }

    #[test]
    fn emptiness_change_is_reported_after_entries() {
        let old = fp(vec![entry("pkg/a.txt", "a")]);
        let new = fp(vec![NormalizedEntry::new("pkg", ContentHash::EMPTY_DIRECTORY)]);
        let cmp = compare("t", &old, &new).unwrap();

        assert_eq!(
            cmp.results().last(),
            Some(&ComparisonResult::EmptinessChanged {
                was_empty: false,
                now_empty: true
            })
        );
        assert_eq!(cmp.results().len(), 3);
    }

    #[test]
    fn path_free_entries_compare_as_multisets() {
        let old = fp(vec![entry("", "x"), entry("", "y")]);
        let reordered = fp(vec![entry("", "y"), entry("", "x")]);
        assert!(compare("t", &old, &reordered).unwrap().is_unchanged());

        let duplicated = fp(vec![entry("", "x"), entry("", "x"), entry("", "y")]);
        let cmp = compare("t", &old, &duplicated).unwrap();
        assert_eq!(cmp.results(), &[ComparisonResult::Added(entry("", "x"))]);
    }

    #[test]
    fn mismatched_property_names_fail() {
        let a = Fingerprint::empty("a", false, false);
        let b = Fingerprint::empty("b", false, false);
        match compare("compile", &a, &b) {
            Err(TaskprintError::Comparison { task, expected, actual }) => {
                assert_eq!(task, "compile");
                assert_eq!(expected, "b");
                assert_eq!(actual, "a");
            }
            other => panic!("expected comparison error, got {other:?}"),
        }
    }
}
