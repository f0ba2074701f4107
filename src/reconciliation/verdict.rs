use super::walk::Walked;
use super::ReconcileError;
use crate::manifest::Manifest;
use crate::utils::now_iso;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Outcome of one reconciliation run
pub type Verdict = Result<ReconcileReport, ReconcileError>;

/// What a walk found, diffed against the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub root: String,
    /// Regular files found, sorted
    pub visited: Vec<String>,
    /// Ignored paths that were reached, sorted
    pub ignored: Vec<String>,
    /// Manifest entries that were not found, in manifest order
    pub missing: Vec<String>,
    /// Files found that are not in the manifest, sorted
    pub unexpected: Vec<String>,
    pub checked_at: String,
}

impl ReconcileReport {
    pub(crate) fn build(root: &Path, manifest: &Manifest, walked: Walked) -> Self {
        let visited: BTreeSet<String> = walked.files.into_iter().collect();
        let ignored: BTreeSet<String> = walked.ignored.into_iter().collect();
        let expected = manifest.to_set();

        let unexpected = visited
            .iter()
            .filter(|path| !expected.contains(path.as_str()))
            .cloned()
            .collect();

        let missing = manifest
            .iter()
            .filter(|entry| !visited.contains(*entry))
            .map(str::to_string)
            .collect();

        Self {
            root: root.to_string_lossy().into_owned(),
            visited: visited.into_iter().collect(),
            ignored: ignored.into_iter().collect(),
            missing,
            unexpected,
            checked_at: now_iso(),
        }
    }

    /// True when nothing is missing and nothing is unexpected
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }

    /// Turn discrepancies into a failure. Unexpected files are reported
    /// before missing ones.
    pub fn into_verdict(self) -> Verdict {
        if let Some(first) = self.unexpected.first() {
            return Err(ReconcileError::UnexpectedFile {
                path: first.clone(),
                all: self.unexpected,
            });
        }

        if !self.missing.is_empty() {
            return Err(ReconcileError::MissingFiles(self.missing));
        }

        Ok(self)
    }
}
