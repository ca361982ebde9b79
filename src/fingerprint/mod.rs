// src/fingerprint/mod.rs

//! Property fingerprints and everything that works on them.
//!
//! - [`builder`] turns a frozen property configuration plus a snapshot into a
//!   [`Fingerprint`].
//! - [`compare`] diffs two fingerprints of the same property.
//! - [`store`] keeps the previous build's fingerprints around.

pub mod builder;
pub mod compare;
pub mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedEntry;
use crate::snapshot::ContentHash;

pub use builder::build_fingerprint;
pub use compare::{compare, ComparisonResult, PropertyComparison};
pub use store::{FileFingerprintStore, FingerprintStore, MemoryFingerprintStore, STORE_FILE_PATH};

/// Immutable, order-normalized summary of one input property.
///
/// Invariants, established by [`Fingerprint::new`] and kept through
/// deserialization:
///
/// - entries are sorted by `(key, content_hash)`;
/// - keys are unique, except the empty key used when paths are ignored,
///   which may repeat (one entry per piece of content);
/// - `is_empty` is true iff no entry carries file content (empty-directory
///   markers do not count).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredFingerprint")]
pub struct Fingerprint {
    property_name: String,
    entries: Vec<NormalizedEntry>,
    is_empty: bool,
    optional: bool,
    skip_when_empty: bool,
}

#[derive(Deserialize)]
struct StoredFingerprint {
    property_name: String,
    entries: Vec<NormalizedEntry>,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    skip_when_empty: bool,
}

impl From<StoredFingerprint> for Fingerprint {
    fn from(stored: StoredFingerprint) -> Self {
        Fingerprint::new(
            stored.property_name,
            stored.entries,
            stored.optional,
            stored.skip_when_empty,
        )
    }
}

impl Fingerprint {
    /// Build a fingerprint from normalized entries in any order.
    ///
    /// When two entries share a (non-empty) key, the one that comes later in
    /// `entries` wins, except that an empty-directory marker never replaces
    /// an entry with file content.
    pub fn new(
        property_name: impl Into<String>,
        entries: Vec<NormalizedEntry>,
        optional: bool,
        skip_when_empty: bool,
    ) -> Self {
        let entries = canonicalize(entries);
        let is_empty = entries.iter().all(|e| e.is_empty_directory());
        Self {
            property_name: property_name.into(),
            entries,
            is_empty,
            optional,
            skip_when_empty,
        }
    }

    /// Fingerprint with no entries at all.
    pub fn empty(property_name: impl Into<String>, optional: bool, skip_when_empty: bool) -> Self {
        Self::new(property_name, Vec::new(), optional, skip_when_empty)
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn entries(&self) -> &[NormalizedEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn skip_when_empty(&self) -> bool {
        self.skip_when_empty
    }

    /// Single digest over every entry, handy for logs.
    pub fn digest(&self) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        for entry in &self.entries {
            hasher.update(entry.key.as_bytes());
            hasher.update(&[0]);
            hasher.update(entry.content_hash.as_bytes());
        }
        ContentHash::from_bytes(*hasher.finalize().as_bytes())
    }
}

fn canonicalize(mut entries: Vec<NormalizedEntry>) -> Vec<NormalizedEntry> {
    // Stable: equal keys keep their relative order, so "last wins" holds.
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    let mut out: Vec<NormalizedEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match out.last_mut() {
            Some(last) if !entry.is_path_free() && last.key == entry.key => {
                // An empty-directory marker never shadows file content.
                if !entry.is_empty_directory() || last.is_empty_directory() {
                    *last = entry;
                }
            }
            _ => out.push(entry),
        }
    }

    // Only path-free entries can still tie on key; order them by content.
    out.sort();
    out
}

/// Fingerprints of every input property of one task, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskFingerprints(BTreeMap<String, Fingerprint>);

impl TaskFingerprints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fingerprint: Fingerprint) {
        self.0
            .insert(fingerprint.property_name().to_string(), fingerprint);
    }

    pub fn get(&self, property: &str) -> Option<&Fingerprint> {
        self.0.get(property)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(map key, fingerprint)` pairs; the key is the name the fingerprint
    /// was stored under.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fingerprint)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.0.values()
    }
}

impl FromIterator<Fingerprint> for TaskFingerprints {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        let mut out = TaskFingerprints::new();
        for fingerprint in iter {
            out.insert(fingerprint);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, content: &str) -> NormalizedEntry {
        NormalizedEntry::new(key, ContentHash::of(content.as_bytes()))
    }

    #[test]
    fn entries_are_sorted_and_last_duplicate_wins() {
        let fp = Fingerprint::new(
            "p",
            vec![entry("b", "1"), entry("a", "2"), entry("b", "3")],
            false,
            false,
        );
        assert_eq!(fp.entries(), &[entry("a", "2"), entry("b", "3")]);
    }

    #[test]
    fn path_free_entries_keep_their_count() {
        let fp = Fingerprint::new(
            "p",
            vec![entry("", "x"), entry("", "y"), entry("", "x")],
            false,
            false,
        );
        assert_eq!(fp.entries().len(), 3);
        let mut expected = vec![entry("", "x"), entry("", "x"), entry("", "y")];
        expected.sort();
        assert_eq!(fp.entries(), expected.as_slice());
    }

    #[test]
    fn empty_directory_markers_do_not_count_as_content() {
        let fp = Fingerprint::new(
            "p",
            vec![NormalizedEntry::new("dir", ContentHash::EMPTY_DIRECTORY)],
            false,
            true,
        );
        assert!(fp.is_empty());
        assert_eq!(fp.entries().len(), 1);

        assert!(Fingerprint::empty("p", false, false).is_empty());
        assert!(!Fingerprint::new("p", vec![entry("a", "1")], false, false).is_empty());
    }

    #[test]
    fn empty_directory_marker_does_not_replace_a_file_with_the_same_key() {
        let file = entry("Main.java", "class Main {}");
        let marker = NormalizedEntry::new("Main.java", ContentHash::EMPTY_DIRECTORY);

        let fp = Fingerprint::new("p", vec![file.clone(), marker.clone()], false, true);
        assert_eq!(fp.entries(), &[file.clone()]);
        assert!(!fp.is_empty());

        let fp = Fingerprint::new("p", vec![marker, file.clone()], false, true);
        assert_eq!(fp.entries(), &[file]);
        assert!(!fp.is_empty());
    }

    #[test]
    fn json_round_trip_is_byte_identical() {
        let fp = Fingerprint::new(
            "sources",
            vec![entry("b.rs", "b"), entry("a.rs", "a")],
            true,
            true,
        );
        let json = serde_json::to_string(&fp).unwrap();
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
        assert_eq!(serde_json::to_string(&back).unwrap(), json);
    }

    #[test]
    fn digest_ignores_construction_order() {
        let a = Fingerprint::new("p", vec![entry("a", "1"), entry("b", "2")], false, false);
        let b = Fingerprint::new("p", vec![entry("b", "2"), entry("a", "1")], false, false);
        assert_eq!(a.digest(), b.digest());
    }
}
