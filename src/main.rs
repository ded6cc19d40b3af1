//! `outreach` binary entrypoint.
mod awards;
mod batch;
mod cli;
mod config;
mod error;
mod generate;
mod lm;
mod mailer;
mod paths;
mod prompt;
mod record;
mod review;
mod scan;
mod send;
mod staging;
mod status;
mod store;
mod tui;
mod variants;
mod workflow;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = cli::RootArgs::parse();
    init_tracing(args.verbose);
    let paths = paths::DataPaths::new(args.data_dir);
    tracing::debug!(data_dir = %paths.root().display(), "resolved data root");

    match &args.command {
        cli::Command::Scan(cmd) => workflow::run_scan(&paths, cmd),
        cli::Command::Generate(cmd) => workflow::run_generate(&paths, cmd),
        cli::Command::Status(cmd) => workflow::run_status(&paths, cmd),
        cli::Command::Send(cmd) => workflow::run_send(&paths, cmd),
        cli::Command::Preview(cmd) => workflow::run_preview(&paths, cmd),
        cli::Command::Review(cmd) => workflow::run_review(&paths, cmd),
        cli::Command::Explore(cmd) => workflow::run_explore(&paths, cmd),
    }
}
