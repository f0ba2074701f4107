//! Concurrent walk of the build output tree.
//!
//! Every directory spawns one task per child into a [`JoinSet`] and joins
//! them. The first error wins; dropping the set aborts the siblings that are
//! still running. Filesystem calls are bounded by a shared semaphore, and a
//! permit is never held while waiting on children.

use super::ReconcileError;
use crate::manifest::IgnoreSet;
use crate::utils::{display_path, join_relative};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::task::JoinSet;
use tracing::{debug, trace};

/// Default number of filesystem operations allowed in flight
pub const DEFAULT_MAX_CONCURRENCY: usize = 64;

/// Options controlling how the tree is walked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Follow symbolic links when querying metadata (default: true)
    pub follow_symlinks: bool,
    /// Maximum number of filesystem operations in flight (minimum 1)
    pub max_concurrency: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Root-relative paths collected from one subtree
#[derive(Debug, Default)]
pub(crate) struct Walked {
    pub files: Vec<String>,
    pub ignored: Vec<String>,
}

impl Walked {
    fn merge(&mut self, other: Walked) {
        self.files.extend(other.files);
        self.ignored.extend(other.ignored);
    }
}

struct WalkContext {
    root: PathBuf,
    ignore: IgnoreSet,
    follow_symlinks: bool,
    permits: Semaphore,
}

impl WalkContext {
    async fn permit(&self) -> Result<SemaphorePermit<'_>, ReconcileError> {
        self.permits
            .acquire()
            .await
            .map_err(|e| ReconcileError::Task(e.to_string()))
    }
}

type WalkFuture = Pin<Box<dyn Future<Output = Result<Walked, ReconcileError>> + Send>>;

/// Walk the tree under `root`, returning every regular file and every
/// ignored path that was reached.
pub(crate) async fn walk(
    root: &Path,
    ignore: &IgnoreSet,
    options: &WalkOptions,
) -> Result<Walked, ReconcileError> {
    let ctx = Arc::new(WalkContext {
        root: root.to_path_buf(),
        ignore: ignore.clone(),
        follow_symlinks: options.follow_symlinks,
        permits: Semaphore::new(options.max_concurrency.max(1)),
    });

    let metadata = query_metadata(&ctx, &ctx.root, &display_path(root, "")).await?;
    if !metadata.is_dir() {
        return Err(ReconcileError::RootNotDirectory(display_path(root, "")));
    }

    let root = ctx.root.clone();
    visit(ctx, String::new(), root).await
}

/// `relative` is the `/`-joined key used for matching and messages; `path` is
/// the real on-disk path, which may not be valid UTF-8.
fn visit(ctx: Arc<WalkContext>, relative: String, path: PathBuf) -> WalkFuture {
    Box::pin(async move {
        if ctx.ignore.contains(&relative) {
            debug!(path = %relative, "Skipping ignored path");
            return Ok(Walked {
                files: Vec::new(),
                ignored: vec![relative],
            });
        }

        let shown = display_path(&ctx.root, &relative);
        let metadata = query_metadata(&ctx, &path, &shown).await?;
        let file_type = metadata.file_type();

        if file_type.is_file() {
            check_readable(&ctx, &path, &shown).await?;
            trace!(path = %shown, "Visited file");
            return Ok(Walked {
                files: vec![relative],
                ignored: Vec::new(),
            });
        }

        if file_type.is_dir() {
            let children = list_children(&ctx, &path, &shown).await?;
            trace!(path = %shown, children = children.len(), "Descending");

            let mut tasks = JoinSet::new();
            for (name, child_path) in children {
                let child = join_relative(&relative, &name);
                tasks.spawn(visit(ctx.clone(), child, child_path));
            }

            let mut walked = Walked::default();
            while let Some(joined) = tasks.join_next().await {
                let child = joined.map_err(|e| ReconcileError::Task(e.to_string()))??;
                walked.merge(child);
            }
            return Ok(walked);
        }

        Err(ReconcileError::InvalidPathType(shown))
    })
}

async fn query_metadata(
    ctx: &WalkContext,
    path: &Path,
    shown: &str,
) -> Result<std::fs::Metadata, ReconcileError> {
    let _permit = ctx.permit().await?;
    let result = if ctx.follow_symlinks {
        fs::metadata(path).await
    } else {
        fs::symlink_metadata(path).await
    };
    result.map_err(|source| ReconcileError::access(shown, source))
}

async fn check_readable(
    ctx: &WalkContext,
    path: &Path,
    shown: &str,
) -> Result<(), ReconcileError> {
    let _permit = ctx.permit().await?;
    fs::File::open(path)
        .await
        .map(drop)
        .map_err(|source| ReconcileError::access(shown, source))
}

async fn list_children(
    ctx: &WalkContext,
    path: &Path,
    shown: &str,
) -> Result<Vec<(String, PathBuf)>, ReconcileError> {
    let _permit = ctx.permit().await?;
    let mut entries = fs::read_dir(path)
        .await
        .map_err(|source| ReconcileError::access(shown, source))?;

    let mut children = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| ReconcileError::access(shown, source))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        children.push((name, entry.path()));
    }
    Ok(children)
}
