//! Runs the selected operation and renders its output.
//!
//! Each operation attaches its failure prefix with `anyhow::Context`; the
//! binary prints the chain and exits with status 1.

use crate::backup::{
    BackupCoordinator, BackupTarget, MysqlClientTools, RestoreCoordinator, RetentionManager,
};
use crate::cli::Operation;
use crate::config::Config;
use crate::db::connection::Connector;
use crate::db::{inspector, maintenance, probe, CollectionCount, MySqlConnector};
use crate::health::{self, CheckResult, HealthReport};
use anyhow::{bail, Context};
use std::fmt::Write;
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub async fn execute(
    operation: Operation,
    config: &Config,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let connector = MySqlConnector::new(config.connection(), config.timeouts());

    match operation {
        Operation::Test => test_connection(&connector).await,
        Operation::Init => initialize(&connector).await,
        Operation::Backup(target) => backup(config, &target, cancel).await,
        Operation::Restore(file) => restore(config, &file, cancel).await,
        Operation::Health { json } => check_health(&connector, json).await,
        Operation::Optimize => optimize(&connector).await,
        Operation::Clean { days } => clean(config, days),
        Operation::Help => Ok(()),
    }
}

fn client_tools(config: &Config) -> MysqlClientTools {
    MysqlClientTools::new(
        config.connection(),
        config.backup.dump_program.clone(),
        config.backup.restore_program.clone(),
        config.timeouts().process,
    )
}

async fn test_connection<C: Connector>(connector: &C) -> anyhow::Result<()> {
    println!("Testing database connection...");
    let server = probe::test_connection(connector)
        .await
        .context("Connection failed")?;
    println!("Database connection successful! (server {})", server.version);
    Ok(())
}

async fn initialize<C: Connector>(connector: &C) -> anyhow::Result<()> {
    println!("Initializing database...");
    probe::test_connection(connector)
        .await
        .context("Cannot connect to database")?;
    let counts = inspector::collection_counts(connector)
        .await
        .context("Failed to get collection info")?;

    println!("Database initialization completed!");
    println!();
    println!("Table information:");
    print!("{}", render_counts(&counts, "  ", " records"));
    Ok(())
}

async fn backup(
    config: &Config,
    target: &BackupTarget,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let coordinator =
        BackupCoordinator::new(client_tools(config), config.backup.dir.clone(), cancel.clone());
    let path = coordinator
        .run(target)
        .await
        .context("Failed to backup database")?;
    println!("Database backup completed: {}", path.display());
    Ok(())
}

async fn restore(config: &Config, file: &Path, cancel: &CancellationToken) -> anyhow::Result<()> {
    println!("Restoring database from: {}", file.display());
    RestoreCoordinator::new(client_tools(config), cancel.clone())
        .run(file)
        .await
        .context("Failed to restore database")?;
    println!("Database restore completed!");
    Ok(())
}

async fn check_health<C: Connector>(connector: &C, json: bool) -> anyhow::Result<()> {
    let report = health::check_health(connector).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Checking database health...");
        print!("{}", render_health(&report));
    }

    if !report.is_healthy() {
        bail!("Failed to check health: one or more checks reported an error");
    }
    Ok(())
}

async fn optimize<C: Connector>(connector: &C) -> anyhow::Result<()> {
    println!("Optimizing database tables...");
    let done = maintenance::optimize_collections(connector)
        .await
        .context("Failed to optimize collections")?;
    println!("Database tables optimized! ({} collections)", done.len());
    Ok(())
}

fn clean(config: &Config, days: u32) -> anyhow::Result<()> {
    println!("Cleaning backup files older than {} days...", days);
    let removed = RetentionManager::new(config.backup.dir.clone(), days)
        .sweep()
        .context("Failed to clean backups")?;
    println!("Old backup files cleaned! ({} removed)", removed.len());
    Ok(())
}

pub fn render_counts(counts: &CollectionCount, indent: &str, suffix: &str) -> String {
    let mut out = String::new();
    for (collection, count) in counts.iter() {
        let _ = writeln!(out, "{}{}: {}{}", indent, collection, count, suffix);
    }
    out
}

fn status_line<T>(out: &mut String, name: &str, check: &CheckResult<T>) {
    let marker = if check.is_ok() { "[ok]" } else { "[error]" };
    let _ = writeln!(out, "{} {}: {}", marker, name, check.message());
}

pub fn render_health(report: &HealthReport) -> String {
    let mut out = String::new();
    out.push_str("Database Health Report:\n");
    out.push_str("=======================\n");

    let connection = report.connection();
    status_line(&mut out, health::report::CONNECTION, connection);
    if let Some(server) = connection.payload() {
        let _ = writeln!(out, "   Server version: {}", server.version);
    }

    if let Some(tables) = report.tables() {
        status_line(&mut out, health::report::TABLES, tables);
        if let Some(counts) = tables.payload() {
            out.push_str("   Table counts:\n");
            out.push_str(&render_counts(counts, "     ", ""));
        }
    }

    if let Some(size) = report.size() {
        status_line(&mut out, health::report::SIZE, size);
        if let Some(mb) = size.payload() {
            let _ = writeln!(out, "   Size: {} MB", mb);
        }
    }
    out
}
