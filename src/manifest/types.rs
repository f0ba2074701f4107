use super::{validate_entry, ManifestError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Ordered list of root-relative file paths a build is expected to produce.
///
/// Entries are distinct and compared case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Manifest {
    entries: Vec<String>,
}

impl Manifest {
    /// Build a manifest, rejecting malformed or duplicate entries
    pub fn new<I, S>(entries: I) -> Result<Self, ManifestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for entry in entries {
            let entry = entry.into();
            validate_entry(&entry)?;
            if !seen.insert(entry.clone()) {
                return Err(ManifestError::DuplicateEntry(entry));
            }
            out.push(entry);
        }

        Ok(Self { entries: out })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Whether the entries are kept in ascending byte order
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0] <= w[1])
    }

    /// Entries as a set, for diffing against what was found on disk
    pub fn to_set(&self) -> HashSet<&str> {
        self.iter().collect()
    }
}

impl TryFrom<Vec<String>> for Manifest {
    type Error = ManifestError;

    fn try_from(entries: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<Manifest> for Vec<String> {
    fn from(manifest: Manifest) -> Self {
        manifest.entries
    }
}

/// Root-relative directories that are skipped without descending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct IgnoreSet {
    dirs: BTreeSet<String>,
}

impl IgnoreSet {
    pub fn new<I, S>(dirs: I) -> Result<Self, ManifestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for dir in dirs {
            set.insert(dir)?;
        }
        Ok(set)
    }

    /// Add a directory. A trailing `/` is dropped.
    pub fn insert(&mut self, dir: impl Into<String>) -> Result<(), ManifestError> {
        let dir = dir.into();
        let dir = dir.trim_end_matches('/');
        validate_entry(dir)?;
        self.dirs.insert(dir.to_string());
        Ok(())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for IgnoreSet {
    type Error = ManifestError;

    fn try_from(dirs: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(dirs)
    }
}

impl From<IgnoreSet> for Vec<String> {
    fn from(set: IgnoreSet) -> Self {
        set.dirs.into_iter().collect()
    }
}
