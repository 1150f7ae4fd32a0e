//! Error types shared by every maintenance operation.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    /// Opening a connection or pinging the server failed.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// A query failed, or an expected collection is missing.
    #[error("query error: {0}")]
    Query(String),

    /// An external utility could not be launched, exited non-zero,
    /// timed out or was cancelled.
    #[error("process error: {0}")]
    Process(String),

    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ToolError {
    pub fn filesystem(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ToolError::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_filesystem_error_names_path() {
        let err = ToolError::filesystem(
            "./backups/missing.sql",
            io::Error::new(io::ErrorKind::NotFound, "backup file does not exist"),
        );
        let msg = err.to_string();
        assert!(msg.contains("./backups/missing.sql"));
        assert!(msg.contains("backup file does not exist"));
        assert!(matches!(err, ToolError::Filesystem { .. }));
    }

    #[test]
    fn test_source_chain_is_kept() {
        use std::error::Error as _;

        let err = ToolError::filesystem("x", io::Error::other("boom"));
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
        assert!(ToolError::Query("q".into()).source().is_none());
    }
}
