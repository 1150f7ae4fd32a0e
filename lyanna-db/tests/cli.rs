//! End-to-end checks of the `lyanna-db` binary that need no live database.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn lyanna_db(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lyanna-db"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .env_remove("LYANNA_CONFIG")
        .env_remove("LYANNA_DB_HOST")
        .env_remove("LYANNA_DB_PORT")
        .output()
        .expect("failed to run lyanna-db")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_no_flags_prints_usage() {
    let tmp = TempDir::new().unwrap();
    let output = lyanna_db(tmp.path(), &[]);

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("Usage"));
    assert!(out.contains("--clean"));
}

#[test]
fn test_connection_to_closed_port_fails() {
    let tmp = TempDir::new().unwrap();
    let output = lyanna_db(
        tmp.path(),
        &["-test", "-host", "127.0.0.1", "-port", "1", "-user", "root", "-database", "lyanna", "-connect-timeout", "5"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Connection failed"));
}

#[test]
fn test_health_on_unreachable_database_reports_only_connection() {
    let tmp = TempDir::new().unwrap();
    let output = lyanna_db(tmp.path(), &["-health", "-json", "-port", "1", "-connect-timeout", "5"]);

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let checks = report.as_object().unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(report["connection"]["status"], "error");
}

#[test]
fn test_clean_without_backup_directory_is_noop() {
    let tmp = TempDir::new().unwrap();
    let output = lyanna_db(tmp.path(), &["-clean", "7"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("0 removed"));
    assert!(!tmp.path().join("backups").exists());
}

#[test]
fn test_zero_day_clean_prints_usage_and_keeps_artifacts() {
    let tmp = TempDir::new().unwrap();
    let backups = tmp.path().join("backups");
    fs::create_dir(&backups).unwrap();
    let artifact = backups.join("lyanna_backup_2024-01-01_00-00-00.sql");
    fs::write(&artifact, "-- dump\n").unwrap();
    fs::File::options()
        .write(true)
        .open(&artifact)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(60))
        .unwrap();

    let output = lyanna_db(tmp.path(), &["-clean", "0"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Usage"));
    assert!(artifact.exists());
}

#[test]
fn test_explicit_backup_path_leaves_no_lock_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("lyanna.toml"),
        "[backup]\ndump_program = \"true\"\n",
    )
    .unwrap();
    fs::create_dir(tmp.path().join("out")).unwrap();

    let output = lyanna_db(
        tmp.path(),
        &["-config", "lyanna.toml", "-backup", "-backup-path", "out/db.sql"],
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(tmp.path().join("out/db.sql").exists());
    assert!(!tmp.path().join("out/.lyanna_backup.lock").exists());
}

#[test]
fn test_restore_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    let output = lyanna_db(tmp.path(), &["-restore", "./backups/missing.sql"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Failed to restore database"));
    assert!(err.contains("backup file does not exist"));
}

#[test]
fn test_timestamped_backup_with_stub_dump_program() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("lyanna.toml"),
        "[backup]\ndump_program = \"true\"\n",
    )
    .unwrap();

    let output = lyanna_db(tmp.path(), &["-config", "lyanna.toml", "-backup", "-timestamp"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let artifacts: Vec<String> = fs::read_dir(tmp.path().join("backups"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".sql"))
        .collect();
    assert_eq!(artifacts.len(), 1);

    let name = &artifacts[0];
    // lyanna_backup_YYYY-MM-DD_HH-MM-SS.sql
    assert!(name.starts_with("lyanna_backup_"));
    assert_eq!(name.len(), "lyanna_backup_2023-01-01_12-00-00.sql".len());
    assert!(stdout(&output).contains(name.as_str()));
}

#[test]
fn test_failing_dump_program_exits_with_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("lyanna.toml"),
        "[backup]\ndump_program = \"false\"\n",
    )
    .unwrap();

    let output = lyanna_db(tmp.path(), &["-config", "lyanna.toml", "-backup"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to backup database"));
}
