//! Dump/restore capability seam and its external-process implementation.
//!
//! The stable contract is the stream binding: a dump writes straight into the
//! artifact file handle, a restore reads straight from it. Nothing is
//! buffered in memory.

use crate::config::ConnectionConfig;
use crate::utils::{Result, ToolError};
use std::fs::File;
use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub trait DumpExecutor: Send + Sync {
    /// Export the whole database into `output`.
    fn dump(&self, output: File, cancel: &CancellationToken)
        -> impl Future<Output = Result<()>> + Send;
}

pub trait RestoreExecutor: Send + Sync {
    /// Import a whole database from `input`.
    fn restore(&self, input: File, cancel: &CancellationToken)
        -> impl Future<Output = Result<()>> + Send;
}

/// `mysqldump` / `mysql` client utilities run as child processes.
#[derive(Debug, Clone)]
pub struct MysqlClientTools {
    config: ConnectionConfig,
    dump_program: String,
    restore_program: String,
    timeout: Duration,
}

impl MysqlClientTools {
    pub fn new(
        config: ConnectionConfig,
        dump_program: impl Into<String>,
        restore_program: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            config,
            dump_program: dump_program.into(),
            restore_program: restore_program.into(),
            timeout,
        }
    }

    fn base_command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.arg("-h")
            .arg(&self.config.host)
            .arg("-P")
            .arg(self.config.port.to_string())
            .arg("-u")
            .arg(&self.config.user);

        // Keeps the password out of the process list.
        if !self.config.password.is_empty() {
            cmd.env("MYSQL_PWD", &self.config.password);
        }
        cmd
    }

    pub fn dump_command(&self, output: File) -> Command {
        let mut cmd = self.base_command(&self.dump_program);
        cmd.arg("--single-transaction")
            .arg("--routines")
            .arg("--triggers")
            .arg("--default-character-set=utf8mb4")
            .arg(&self.config.database)
            .stdin(Stdio::null())
            .stdout(Stdio::from(output));
        cmd
    }

    pub fn restore_command(&self, input: File) -> Command {
        let mut cmd = self.base_command(&self.restore_program);
        cmd.arg("--default-character-set=utf8mb4")
            .arg(&self.config.database)
            .stdin(Stdio::from(input))
            .stdout(Stdio::null());
        cmd
    }
}

impl DumpExecutor for MysqlClientTools {
    async fn dump(&self, output: File, cancel: &CancellationToken) -> Result<()> {
        debug!(program = %self.dump_program, database = %self.config.database, "Launching dump utility");
        run_to_completion(self.dump_command(output), &self.dump_program, self.timeout, cancel).await
    }
}

impl RestoreExecutor for MysqlClientTools {
    async fn restore(&self, input: File, cancel: &CancellationToken) -> Result<()> {
        debug!(program = %self.restore_program, database = %self.config.database, "Launching restore utility");
        run_to_completion(self.restore_command(input), &self.restore_program, self.timeout, cancel)
            .await
    }
}

enum Outcome {
    Exited(io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

/// Spawn `cmd` and wait for it under a deadline and a cancellation signal.
/// The child is killed on timeout, cancellation or drop.
pub(crate) async fn run_to_completion(
    mut cmd: Command,
    program: &str,
    limit: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    cmd.stderr(Stdio::piped()).kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| ToolError::Process(format!("failed to launch {}: {}", program, e)))?;

    let stderr = child.stderr.take();
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf).trim().to_string()
    });

    let outcome = tokio::select! {
        status = child.wait() => Outcome::Exited(status),
        _ = tokio::time::sleep(limit) => Outcome::TimedOut,
        _ = cancel.cancelled() => Outcome::Cancelled,
    };

    let status = match outcome {
        Outcome::Exited(status) => status
            .map_err(|e| ToolError::Process(format!("failed waiting for {}: {}", program, e)))?,
        Outcome::TimedOut => {
            kill(&mut child, program).await;
            return Err(ToolError::Process(format!(
                "{} timed out after {:?}",
                program, limit
            )));
        }
        Outcome::Cancelled => {
            kill(&mut child, program).await;
            return Err(ToolError::Process(format!("{} was cancelled", program)));
        }
    };

    let stderr = stderr_task.await.unwrap_or_default();
    if status.success() {
        if !stderr.is_empty() {
            debug!(program, "{}", stderr);
        }
        Ok(())
    } else if stderr.is_empty() {
        Err(ToolError::Process(format!("{} exited with {}", program, status)))
    } else {
        Err(ToolError::Process(format!(
            "{} exited with {}: {}",
            program, status, stderr
        )))
    }
}

async fn kill(child: &mut Child, program: &str) {
    if let Err(e) = child.kill().await {
        warn!("Failed to kill {}: {}", program, e);
    }
}
