//! Advisory lock serializing backup writes and retention sweeps that share
//! one directory.

use crate::utils::{Result, ToolError};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LOCK_FILE_NAME: &str = ".lyanna_backup.lock";

/// Exclusive `flock` on `<dir>/.lyanna_backup.lock`, released on drop.
pub struct DirLock {
    _lock: Flock<File>,
    path: PathBuf,
}

impl DirLock {
    /// Take the lock without waiting. A held lock is a `WouldBlock`
    /// filesystem error.
    pub fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| ToolError::filesystem(&path, e))?;

        let lock = Flock::lock(file, FlockArg::LockExclusiveNonblock).map_err(|(_, errno)| {
            let source = if errno == Errno::EWOULDBLOCK {
                io::Error::new(
                    io::ErrorKind::WouldBlock,
                    "backup directory is locked by another backup or cleanup",
                )
            } else {
                io::Error::from(errno)
            };
            ToolError::filesystem(&path, source)
        })?;

        debug!(path = %path.display(), "Acquired backup directory lock");
        Ok(Self { _lock: lock, path })
    }
}

impl std::fmt::Debug for DirLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirLock").field("path", &self.path).finish()
    }
}
