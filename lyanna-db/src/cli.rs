//! Command-line surface.
//!
//! Flags are accepted in single-dash form (`-host`, `-clean 7`) as well as
//! the usual `--host`. Operations are mutually exclusive; when several are
//! given the first in this order wins: test, init, backup, restore, health,
//! optimize, clean. No operation, or `-clean 0`, prints usage.

use crate::backup::BackupTarget;
use crate::config::Config;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  lyanna-db -test
  lyanna-db -init
  lyanna-db -backup -timestamp
  lyanna-db -restore ./backups/lyanna_backup_2023-01-01_12-00-00.sql
  lyanna-db -health
  lyanna-db -clean 7";

/// Flags that consume the following argument as their value.
const VALUE_FLAGS: &[&str] = &[
    "config",
    "host",
    "port",
    "user",
    "password",
    "database",
    "restore",
    "clean",
    "backup-path",
    "log-level",
    "connect-timeout",
    "query-timeout",
    "process-timeout",
];

#[derive(Parser, Debug, Default)]
#[command(
    name = "lyanna-db",
    version,
    about = "Lyanna Database Management Tool",
    after_help = EXAMPLES
)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, allow_hyphen_values = true, value_name = "FILE", env = "LYANNA_CONFIG")]
    pub config: Option<PathBuf>,

    /// MySQL host [default: 127.0.0.1]
    #[arg(long, allow_hyphen_values = true, env = "LYANNA_DB_HOST")]
    pub host: Option<String>,

    /// MySQL port [default: 3306]
    #[arg(long, allow_hyphen_values = true, env = "LYANNA_DB_PORT")]
    pub port: Option<u16>,

    /// MySQL user [default: root]
    #[arg(long, allow_hyphen_values = true, env = "LYANNA_DB_USER")]
    pub user: Option<String>,

    /// MySQL password
    #[arg(long, allow_hyphen_values = true, env = "LYANNA_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name [default: lyanna]
    #[arg(long, allow_hyphen_values = true, env = "LYANNA_DB_NAME")]
    pub database: Option<String>,

    /// Test database connection
    #[arg(long)]
    pub test: bool,

    /// Check connectivity and print per-collection record counts
    #[arg(long)]
    pub init: bool,

    /// Backup database
    #[arg(long)]
    pub backup: bool,

    /// Backup file path [default: ./backups/lyanna_backup.sql]
    #[arg(long, allow_hyphen_values = true, value_name = "PATH")]
    pub backup_path: Option<PathBuf>,

    /// Create backup with timestamp
    #[arg(long)]
    pub timestamp: bool,

    /// Restore database from backup file
    #[arg(long, allow_hyphen_values = true, value_name = "FILE")]
    pub restore: Option<PathBuf>,

    /// Check database health; exits 1 when any check reports an error
    #[arg(long)]
    pub health: bool,

    /// Print the health report as JSON
    #[arg(long)]
    pub json: bool,

    /// Optimize database tables
    #[arg(long)]
    pub optimize: bool,

    /// Clean backup files older than DAYS days (DAYS must be at least 1)
    #[arg(long, allow_hyphen_values = true, value_name = "DAYS")]
    pub clean: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, allow_hyphen_values = true)]
    pub log_level: Option<String>,

    /// Connection timeout in seconds
    #[arg(long, allow_hyphen_values = true, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// Query timeout in seconds
    #[arg(long, allow_hyphen_values = true, value_name = "SECS")]
    pub query_timeout: Option<u64>,

    /// Dump/restore process timeout in seconds
    #[arg(long, allow_hyphen_values = true, value_name = "SECS")]
    pub process_timeout: Option<u64>,
}

/// The single operation selected for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Test,
    Init,
    Backup(BackupTarget),
    Restore(PathBuf),
    Health { json: bool },
    Optimize,
    Clean { days: u32 },
    Help,
}

impl Args {
    pub fn operation(&self) -> Operation {
        if self.test {
            Operation::Test
        } else if self.init {
            Operation::Init
        } else if self.backup {
            let target = if self.timestamp {
                BackupTarget::Timestamped
            } else if let Some(path) = &self.backup_path {
                BackupTarget::Path(path.clone())
            } else {
                BackupTarget::Default
            };
            Operation::Backup(target)
        } else if let Some(file) = &self.restore {
            Operation::Restore(file.clone())
        } else if self.health {
            Operation::Health { json: self.json }
        } else if self.optimize {
            Operation::Optimize
        } else if let Some(days) = self.clean.filter(|days| *days > 0) {
            Operation::Clean { days }
        } else {
            Operation::Help
        }
    }

    /// Layer flags (and their environment fallbacks) over the file config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.database.host = host.clone();
        }
        if let Some(port) = self.port {
            config.database.port = port;
        }
        if let Some(user) = &self.user {
            config.database.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.database.password = password.clone();
        }
        if let Some(database) = &self.database {
            config.database.name = database.clone();
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        if let Some(secs) = self.connect_timeout {
            config.timeouts.connect_secs = secs;
        }
        if let Some(secs) = self.query_timeout {
            config.timeouts.query_secs = secs;
        }
        if let Some(secs) = self.process_timeout {
            config.timeouts.process_secs = secs;
        }
    }
}

/// Rewrite single-dash long flags (`-host`) to `--host`, leaving flag values,
/// short flags, negative numbers and everything after `--` untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut iter = args.into_iter().map(Into::into);
    let mut out: Vec<OsString> = iter.next().into_iter().collect();
    let mut expect_value = false;
    let mut passthrough = false;

    for arg in iter {
        if passthrough || expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }

        let rewritten = arg.to_str().and_then(|s| {
            if s == "--" {
                return None;
            }
            let name = match s.strip_prefix("--") {
                Some(name) => name,
                None => s
                    .strip_prefix('-')
                    .filter(|n| n.len() > 1 && !n.starts_with(|c: char| c.is_ascii_digit()))?,
            };
            let inline_value = name.contains('=');
            let flag = name.split('=').next().unwrap_or(name);
            Some((format!("--{}", name), !inline_value && VALUE_FLAGS.contains(&flag)))
        });

        match rewritten {
            Some((long, takes_value)) => {
                expect_value = takes_value;
                out.push(OsString::from(long));
            }
            None => {
                passthrough = arg == "--";
                out.push(arg);
            }
        }
    }
    out
}
