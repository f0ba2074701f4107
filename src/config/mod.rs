use crate::manifest::{IgnoreSet, Manifest, ManifestError};
use crate::reconciliation::{WalkOptions, DEFAULT_MAX_CONCURRENCY};
use crate::utils::DEFAULT_ROOT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config not found at {0}")]
    NotFound(String),

    #[error("Invalid manifest entry: {0}")]
    Manifest(#[from] ManifestError),

    #[error("maxConcurrency must be at least 1")]
    InvalidConcurrency,
}

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_ROOT)
}

fn default_follow_symlinks() -> bool {
    true
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

/// Contents of a `dist-manifest.json` file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyConfig {
    /// Build output directory. Relative paths resolve against the config
    /// file's directory.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Every file the build is expected to produce, relative to `root`.
    /// Keep this list sorted; it is case sensitive.
    #[serde(default)]
    pub expected_files: Manifest,
    #[serde(default, skip_serializing_if = "IgnoreSet::is_empty")]
    pub ignore_dirs: IgnoreSet,
    #[serde(default = "default_follow_symlinks")]
    pub follow_symlinks: bool,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            expected_files: Manifest::default(),
            ignore_dirs: IgnoreSet::default(),
            follow_symlinks: default_follow_symlinks(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl VerifyConfig {
    pub fn walk_options(&self) -> Result<WalkOptions, ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        Ok(WalkOptions {
            follow_symlinks: self.follow_symlinks,
            max_concurrency: self.max_concurrency,
        })
    }

    /// Resolve `root` against the directory holding the config file
    pub fn resolve_root(&self, config_path: &Path) -> PathBuf {
        if self.root.is_absolute() {
            return self.root.clone();
        }
        match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(&self.root),
            _ => self.root.clone(),
        }
    }

    /// Store a cwd-relative `root` so that `resolve_root` finds it again.
    ///
    /// Roots below the config file's directory are stored relative to it;
    /// anything else is stored canonicalized.
    pub async fn set_root(&mut self, root: &Path, config_path: &Path) -> Result<(), ConfigError> {
        let config_dir = match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => {
                self.root = root.to_path_buf();
                return Ok(());
            }
        };

        self.root = match root.strip_prefix(config_dir) {
            Ok(rest) if rest.as_os_str().is_empty() => PathBuf::from("."),
            Ok(rest) => rest.to_path_buf(),
            Err(_) => fs::canonicalize(root).await?,
        };
        Ok(())
    }
}

/// Read the configuration file
pub async fn read_config(config_path: &Path) -> Result<VerifyConfig, ConfigError> {
    if !config_path.exists() {
        return Err(ConfigError::NotFound(config_path.display().to_string()));
    }

    let content = fs::read_to_string(config_path).await?;
    let config: VerifyConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Write the configuration file atomically (temp file + rename)
pub async fn write_config(config_path: &Path, config: &VerifyConfig) -> Result<(), ConfigError> {
    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let temp_path = config_path.with_extension("json.tmp");
    let mut content = serde_json::to_string_pretty(config)?;
    content.push('\n');
    fs::write(&temp_path, &content).await?;
    fs::rename(&temp_path, config_path).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_absent() {
        let config: VerifyConfig =
            serde_json::from_str(r#"{ "expectedFiles": ["index.html"] }"#).unwrap();
        assert_eq!(config.root, PathBuf::from("dist"));
        assert!(config.ignore_dirs.is_empty());
        assert_eq!(config.walk_options().unwrap(), WalkOptions::default());
        assert!(config.expected_files.contains("index.html"));
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "root": "build/out",
            "expectedFiles": ["bundle.js", "images/mdn.png"],
            "ignoreDirs": ["cache/"],
            "followSymlinks": false,
            "maxConcurrency": 4
        }"#;
        let config: VerifyConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.root, PathBuf::from("build/out"));
        assert!(config.ignore_dirs.contains("cache"));
        let options = config.walk_options().unwrap();
        assert!(!options.follow_symlinks);
        assert_eq!(options.max_concurrency, 4);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = VerifyConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.walk_options(),
            Err(ConfigError::InvalidConcurrency)
        ));
    }

    #[test]
    fn test_invalid_entry_rejected() {
        let result = serde_json::from_str::<VerifyConfig>(r#"{ "expectedFiles": ["../secret"] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_root() {
        let config = VerifyConfig::default();
        assert_eq!(
            config.resolve_root(Path::new("web/dist-manifest.json")),
            PathBuf::from("web/dist")
        );
        assert_eq!(
            config.resolve_root(Path::new("dist-manifest.json")),
            PathBuf::from("dist")
        );
    }
}
