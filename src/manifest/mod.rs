mod types;

pub use types::{IgnoreSet, Manifest};

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Manifest entry is empty")]
    EmptyEntry,

    #[error("Manifest entry must be relative to the root: {0}")]
    AbsoluteEntry(String),

    #[error("Manifest entry has an empty, '.' or '..' component: {0}")]
    InvalidComponent(String),

    #[error("Duplicate manifest entry: {0}")]
    DuplicateEntry(String),
}

/// Check that an entry is a plain `/`-joined path below the root
pub fn validate_entry(entry: &str) -> Result<(), ManifestError> {
    if entry.is_empty() {
        return Err(ManifestError::EmptyEntry);
    }

    if entry.starts_with('/') || Path::new(entry).is_absolute() {
        return Err(ManifestError::AbsoluteEntry(entry.to_string()));
    }

    if entry
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(ManifestError::InvalidComponent(entry.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_keeps_order() {
        let manifest = Manifest::new(["index.html", "bundle.js"]).unwrap();
        let entries: Vec<&str> = manifest.iter().collect();
        assert_eq!(entries, vec!["index.html", "bundle.js"]);
        assert!(!manifest.is_sorted());
    }

    #[test]
    fn test_manifest_sorted() {
        let manifest = Manifest::new([
            "bundle.css",
            "bundle.js",
            "images/bugzilla.png",
            "images/bugzilla@2x.png",
            "index.html",
        ])
        .unwrap();
        assert!(manifest.is_sorted());
        assert_eq!(manifest.len(), 5);
    }

    #[test]
    fn test_manifest_is_case_sensitive() {
        let manifest = Manifest::new(["Index.html", "index.html"]).unwrap();
        assert!(manifest.contains("index.html"));
        assert!(!manifest.contains("INDEX.html"));
    }

    #[test]
    fn test_manifest_rejects_duplicates() {
        let err = Manifest::new(["a.txt", "b.txt", "a.txt"]).unwrap_err();
        assert_eq!(err, ManifestError::DuplicateEntry("a.txt".to_string()));
    }

    #[test]
    fn test_validate_entry() {
        assert!(validate_entry("images/github.png").is_ok());
        assert_eq!(validate_entry(""), Err(ManifestError::EmptyEntry));
        assert!(matches!(
            validate_entry("/etc/passwd"),
            Err(ManifestError::AbsoluteEntry(_))
        ));
        for bad in ["./a.txt", "a/../b.txt", "a//b.txt", "images/"] {
            assert!(
                matches!(validate_entry(bad), Err(ManifestError::InvalidComponent(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_ignore_set_strips_trailing_slash() {
        let ignore = IgnoreSet::new(["cache/", "tmp"]).unwrap();
        assert!(ignore.contains("cache"));
        assert!(ignore.contains("tmp"));
        assert!(!ignore.contains("cache/"));
        assert_eq!(ignore.len(), 2);
    }

    #[test]
    fn test_ignore_set_rejects_root() {
        assert_eq!(IgnoreSet::new(["/"]).unwrap_err(), ManifestError::EmptyEntry);
    }

    #[test]
    fn test_manifest_deserializes_from_list() {
        let manifest: Manifest = serde_json::from_str(r#"["a.txt", "dir/b.txt"]"#).unwrap();
        assert_eq!(manifest.len(), 2);

        let err = serde_json::from_str::<Manifest>(r#"["a.txt", "a.txt"]"#).unwrap_err();
        assert!(err.to_string().contains("Duplicate manifest entry: a.txt"));
    }
}
