use std::path::Path;

/// Default name of the manifest config file
pub const CONFIG_FILE: &str = "dist-manifest.json";

/// Default build output directory
pub const DEFAULT_ROOT: &str = "dist";

/// Join a root-relative path and a child name with `/`
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Render a root-relative path the way it is queried on disk (`dist/a.txt`)
pub fn display_path(root: &Path, relative: &str) -> String {
    let root = root.to_string_lossy();
    let root = root.trim_end_matches('/');
    if relative.is_empty() {
        root.to_string()
    } else if root.is_empty() {
        format!("/{relative}")
    } else {
        format!("{root}/{relative}")
    }
}

/// Convert a relative filesystem path into a `/`-joined string
pub fn relative_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Get current timestamp in ISO 8601 format
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
