//! Backup artifact naming.

use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

pub const ARTIFACT_PREFIX: &str = "lyanna_backup";
pub const ARTIFACT_EXTENSION: &str = ".sql";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Where a backup should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupTarget {
    /// `<dir>/lyanna_backup.sql`
    Default,
    /// An explicit path chosen by the caller.
    Path(PathBuf),
    /// `<dir>/lyanna_backup_<YYYY-MM-DD_HH-MM-SS>.sql`
    Timestamped,
}

impl BackupTarget {
    pub fn resolve<Tz: TimeZone>(&self, dir: &Path, now: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        match self {
            BackupTarget::Default => dir.join(format!("{}{}", ARTIFACT_PREFIX, ARTIFACT_EXTENSION)),
            BackupTarget::Path(path) => path.clone(),
            BackupTarget::Timestamped => timestamped_path(dir, now),
        }
    }

    /// Timestamped artifacts must never overwrite an existing file.
    pub fn is_exclusive(&self) -> bool {
        matches!(self, BackupTarget::Timestamped)
    }
}

pub fn timestamped_path<Tz: TimeZone>(dir: &Path, at: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    dir.join(format!(
        "{}_{}{}",
        ARTIFACT_PREFIX,
        at.format(TIMESTAMP_FORMAT),
        ARTIFACT_EXTENSION
    ))
}

/// Matches the `lyanna_backup_*.sql` pattern used for retention.
pub fn is_rotating_artifact(file_name: &str) -> bool {
    file_name
        .strip_prefix(ARTIFACT_PREFIX)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|rest| rest.ends_with(ARTIFACT_EXTENSION))
}

/// The embedded timestamp of a timestamped artifact name, if it has one.
#[cfg(test)]
pub(crate) fn artifact_timestamp(file_name: &str) -> Option<DateTime<chrono::Local>> {
    use chrono::{Local, NaiveDateTime};

    let stamp = file_name
        .strip_prefix(ARTIFACT_PREFIX)?
        .strip_prefix('_')?
        .strip_suffix(ARTIFACT_EXTENSION)?;
    let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}
