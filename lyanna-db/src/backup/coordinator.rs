//! Full-database export into a backup artifact.

use crate::backup::executor::DumpExecutor;
use crate::backup::lock::DirLock;
use crate::backup::paths::BackupTarget;
use crate::utils::{Result, ToolError};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct BackupCoordinator<D> {
    executor: D,
    backup_dir: PathBuf,
    cancel: CancellationToken,
}

impl<D: DumpExecutor> BackupCoordinator<D> {
    pub fn new(executor: D, backup_dir: impl Into<PathBuf>, cancel: CancellationToken) -> Self {
        Self {
            executor,
            backup_dir: backup_dir.into(),
            cancel,
        }
    }

    /// Write a backup and return the artifact path.
    ///
    /// A failed dump leaves whatever was written in place; there is no
    /// rollback.
    pub async fn run(&self, target: &BackupTarget) -> Result<PathBuf> {
        let path = target.resolve(&self.backup_dir, &Local::now());
        let dir = parent_dir(&path);
        fs::create_dir_all(&dir).map_err(|e| ToolError::filesystem(&dir, e))?;

        // Retention sweeps only the backup directory.
        let _lock = if self.is_backup_dir(&dir) {
            Some(DirLock::acquire(&dir)?)
        } else {
            None
        };

        let mut options = OpenOptions::new();
        options.write(true);
        if target.is_exclusive() {
            options.create_new(true);
        } else {
            options.create(true).truncate(true);
        }
        let output = options
            .open(&path)
            .map_err(|e| ToolError::filesystem(&path, e))?;

        info!(path = %path.display(), "Starting database backup");
        self.executor.dump(output, &self.cancel).await?;

        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or_default();
        info!(path = %path.display(), bytes = size, "Database backup completed");
        Ok(path)
    }

    fn is_backup_dir(&self, dir: &Path) -> bool {
        match (fs::canonicalize(dir), fs::canonicalize(&self.backup_dir)) {
            (Ok(dir), Ok(backup_dir)) => dir == backup_dir,
            _ => dir == self.backup_dir,
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
