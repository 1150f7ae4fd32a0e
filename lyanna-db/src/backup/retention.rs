//! Age-based pruning of rotating backup artifacts.

use crate::backup::lock::DirLock;
use crate::backup::paths::is_rotating_artifact;
use crate::utils::{Result, ToolError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

pub struct RetentionManager {
    dir: PathBuf,
    window: Duration,
}

impl RetentionManager {
    pub fn new(dir: impl Into<PathBuf>, keep_days: u32) -> Self {
        Self {
            dir: dir.into(),
            window: Duration::from_secs(u64::from(keep_days) * SECONDS_PER_DAY),
        }
    }

    pub fn sweep(&self) -> Result<Vec<PathBuf>> {
        self.sweep_at(SystemTime::now())
    }

    /// Delete every `lyanna_backup_*.sql` whose mtime is strictly older than
    /// `now - window`, returning the removed paths.
    ///
    /// A missing directory is a no-op. The first failed deletion stops the
    /// sweep; later candidates are left untouched.
    pub fn sweep_at(&self, now: SystemTime) -> Result<Vec<PathBuf>> {
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(ToolError::filesystem(
                    &self.dir,
                    io::Error::new(io::ErrorKind::InvalidInput, "backup path is not a directory"),
                ))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(dir = %self.dir.display(), "Backup directory does not exist, nothing to clean");
                return Ok(Vec::new());
            }
            Err(e) => return Err(ToolError::filesystem(&self.dir, e)),
        }

        let _lock = DirLock::acquire(&self.dir)?;
        let cutoff = now
            .checked_sub(self.window)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut removed = Vec::new();
        for path in candidates(&self.dir)? {
            let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    debug!(path = %path.display(), "Skipping unreadable artifact: {}", e);
                    continue;
                }
            };

            if modified < cutoff {
                fs::remove_file(&path).map_err(|e| ToolError::filesystem(&path, e))?;
                info!(path = %path.display(), "Removed old backup");
                removed.push(path);
            }
        }

        info!(removed = removed.len(), "Backup cleanup finished");
        Ok(removed)
    }
}

/// Rotating artifacts in `dir`, sorted by name.
fn candidates(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| ToolError::filesystem(dir, e))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| is_rotating_artifact(&e.file_name().to_string_lossy()))
        .map(|e| e.path())
        .collect();
    paths.sort();
    Ok(paths)
}
