//! Manifest generation from an existing build output tree.

use crate::manifest::{IgnoreSet, Manifest, ManifestError};
use crate::utils::relative_string;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("`{0}` is not a file or a directory")]
    InvalidPathType(String),

    #[error("`{0}` is not a directory")]
    RootNotDirectory(String),

    #[error("Invalid manifest entry: {0}")]
    Manifest(#[from] ManifestError),
}

/// List every regular file under `root` (skipping ignored directories) as a
/// sorted manifest.
pub fn snapshot_manifest(
    root: &Path,
    ignore: &IgnoreSet,
    follow_symlinks: bool,
) -> Result<Manifest, SnapshotError> {
    if !root.is_dir() {
        return Err(SnapshotError::RootNotDirectory(root.display().to_string()));
    }

    let walker = WalkDir::new(root)
        .follow_links(follow_symlinks)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            let relative = relative_to(root, entry.path());
            let skip = ignore.contains(&relative);
            if skip {
                debug!(path = %relative, "Skipping ignored path");
            }
            !skip
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        let file_type = entry.file_type();

        if file_type.is_dir() {
            continue;
        }
        if file_type.is_file() {
            files.push(relative_to(root, entry.path()));
            continue;
        }
        return Err(SnapshotError::InvalidPathType(
            entry.path().display().to_string(),
        ));
    }

    files.sort();
    Ok(Manifest::new(files)?)
}

fn relative_to(root: &Path, path: &Path) -> String {
    relative_string(path.strip_prefix(root).unwrap_or(path))
}
