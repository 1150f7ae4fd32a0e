//! Full-database import from a backup artifact.

use crate::backup::executor::RestoreExecutor;
use crate::utils::{Result, ToolError};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct RestoreCoordinator<R> {
    executor: R,
    cancel: CancellationToken,
}

impl<R: RestoreExecutor> RestoreCoordinator<R> {
    pub fn new(executor: R, cancel: CancellationToken) -> Self {
        Self { executor, cancel }
    }

    /// Stream `artifact` into the restore utility.
    ///
    /// The file must exist before anything is launched. Its contents are not
    /// validated; a malformed artifact surfaces as a restore failure, and a
    /// partially applied restore is not rolled back.
    pub async fn run(&self, artifact: &Path) -> Result<()> {
        let metadata = fs::metadata(artifact).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ToolError::filesystem(
                    artifact,
                    io::Error::new(io::ErrorKind::NotFound, "backup file does not exist"),
                )
            } else {
                ToolError::filesystem(artifact, e)
            }
        })?;
        if metadata.is_dir() {
            return Err(ToolError::filesystem(
                artifact,
                io::Error::new(io::ErrorKind::InvalidInput, "backup path is a directory"),
            ));
        }

        let input = File::open(artifact).map_err(|e| ToolError::filesystem(artifact, e))?;

        info!(path = %artifact.display(), bytes = metadata.len(), "Starting database restore");
        self.executor.restore(input, &self.cancel).await?;
        info!("Database restore completed");
        Ok(())
    }
}
