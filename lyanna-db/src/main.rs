//! Lyanna database tool - main entry point.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use lyanna_db::cli::{self, Args, Operation};
use lyanna_db::{commands, shutdown, utils, Config};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse_from(cli::normalize_args(std::env::args_os()));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let operation = args.operation();
    if operation == Operation::Help {
        Args::command().print_help()?;
        return Ok(());
    }

    let mut config =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);

    utils::logger::init(&config.log.level)?;
    tracing::debug!(operation = ?operation, database = ?config.connection(), "Starting");

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown::cancel_on_signal(cancel.clone()));

    let result = commands::execute(operation, &config, &cancel).await;
    cancel.cancel();
    result
}
