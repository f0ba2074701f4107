#![allow(dead_code)]

use dist_verify::{IgnoreSet, Manifest};
use std::path::Path;
use tempfile::TempDir;
use tokio::fs;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Create each `/`-joined file (and its parent directories) under `root`
pub async fn write_tree(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .expect("Should create parent directory");
        }
        fs::write(&path, format!("contents of {file}"))
            .await
            .expect("Should write file");
    }
}

pub fn manifest(entries: &[&str]) -> Manifest {
    Manifest::new(entries.iter().copied()).expect("Manifest should be valid")
}

pub fn ignore(dirs: &[&str]) -> IgnoreSet {
    IgnoreSet::new(dirs.iter().copied()).expect("Ignore set should be valid")
}
