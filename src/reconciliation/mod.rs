//! Reconciliation of a build output tree against its manifest.
//!
//! The tree is walked once, collecting every regular file. The verdict is
//! then a set difference: files found but not expected fail the run, and
//! expected files that were never found fail it too.

mod verdict;
mod walk;

pub use verdict::{ReconcileReport, Verdict};
pub use walk::{WalkOptions, DEFAULT_MAX_CONCURRENCY};

use crate::manifest::{IgnoreSet, Manifest};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("{path}: {source}")]
    Access {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected file: {path}")]
    UnexpectedFile { path: String, all: Vec<String> },

    /// Entries are listed in manifest order, separated by a bare `,`.
    #[error("File(s) not found: {}", .0.join(","))]
    MissingFiles(Vec<String>),

    #[error("`{0}` is not a file or a directory")]
    InvalidPathType(String),

    #[error("`{0}` is not a directory")]
    RootNotDirectory(String),

    #[error("Walk task failed: {0}")]
    Task(String),
}

impl ReconcileError {
    pub(crate) fn access(path: &str, source: std::io::Error) -> Self {
        Self::Access {
            path: path.to_string(),
            source,
        }
    }
}

/// Walk `root` and diff it against `manifest` without failing on
/// discrepancies. Only filesystem problems are errors here.
pub async fn scan(
    root: &Path,
    manifest: &Manifest,
    ignore: &IgnoreSet,
    options: &WalkOptions,
) -> Result<ReconcileReport, ReconcileError> {
    debug!(
        root = %root.display(),
        expected = manifest.len(),
        ignored = ignore.len(),
        "Scanning build output"
    );

    let walked = walk::walk(root, ignore, options).await?;
    let report = ReconcileReport::build(root, manifest, walked);

    debug!(
        visited = report.visited.len(),
        missing = report.missing.len(),
        unexpected = report.unexpected.len(),
        "Scan complete"
    );
    Ok(report)
}

/// Check that `root` holds exactly the files in `manifest`, skipping the
/// directories in `ignore`.
pub async fn reconcile(
    root: &Path,
    manifest: &Manifest,
    ignore: &IgnoreSet,
    options: &WalkOptions,
) -> Verdict {
    let verdict = scan(root, manifest, ignore, options).await?.into_verdict();

    match &verdict {
        Ok(report) => info!(
            root = %root.display(),
            files = report.visited.len(),
            "Build output matches manifest"
        ),
        Err(e) => warn!(
            root = %root.display(),
            error = %e,
            "Build output does not match manifest"
        ),
    }

    verdict
}
