pub mod config;
pub mod manifest;
pub mod reconciliation;
pub mod snapshot;
pub mod utils;

// Re-export commonly used types
pub use config::{read_config, write_config, ConfigError, VerifyConfig};
pub use manifest::{IgnoreSet, Manifest, ManifestError};
pub use reconciliation::{
    reconcile, scan, ReconcileError, ReconcileReport, Verdict, WalkOptions,
};
pub use snapshot::{snapshot_manifest, SnapshotError};
