mod cli;
mod commands;
mod model;
mod util;

use std::fs::File;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Subscriber, error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::Cli;
use crate::util::ensure_directory;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(&cli) {
        init_stderr_tracing();
        exit_with(err);
    }

    info!(argv = ?std::env::args().collect::<Vec<_>>(), "invoked");
    info!(args = ?cli, "parsed arguments");

    if let Err(err) = commands::convert::run(cli) {
        exit_with(err);
    }
}

fn exit_with(err: anyhow::Error) -> ! {
    error!(error = %err, "command failed");
    for cause in err.chain().skip(1) {
        error!(cause = %cause, "caused by");
    }
    std::process::exit(1);
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let log_file = open_log_file(cli)?;
    build_subscriber(env_filter(), log_file).init();
    Ok(())
}

fn open_log_file(cli: &Cli) -> Result<File> {
    ensure_directory(&cli.output_dir)?;

    let log_path = cli.log_path();
    File::create(&log_path)
        .with_context(|| format!("failed to create log file: {}", log_path.display()))
}

fn build_subscriber(env_filter: EnvFilter, log_file: File) -> impl Subscriber + Send + Sync {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(log_file)),
        )
}

fn init_stderr_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
