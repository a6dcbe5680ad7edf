// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pindelflow: resumable staged scheduler for the indel-calling pipeline

mod commands;
mod config;
mod exit_error;
mod logging;
mod output;

use clap::{Parser, Subcommand};

use commands::{clean, run, status};
use exit_error::exit_code;

#[derive(Parser)]
#[command(
    name = "pindelflow",
    version,
    about = "Run the indel-calling pipeline stage by stage, resuming where the last run stopped"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all stages, or one stage / one job of a stage
    Run(run::RunArgs),
    /// Show completed jobs per stage
    Status(status::StatusArgs),
    /// Remove completion markers so jobs run again
    Clean(clean::CleanArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Only a run opens the log file; status and clean are read-mostly
    let log_file = logging::init();

    let result = match cli.command {
        Commands::Run(args) => run::handle(args, &log_file).await,
        Commands::Status(args) => status::handle(args),
        Commands::Clean(args) => clean::handle(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}
