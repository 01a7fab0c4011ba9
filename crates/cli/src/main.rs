// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tq - task-queue runner CLI

mod commands;
mod daemon_process;
mod env;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{enqueue, runner, status, supervisor};

#[derive(Parser)]
#[command(name = "tq", version, about = "Task-queue runner operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a new prompt for execution
    Enqueue(enqueue::EnqueueArgs),
    /// Show task status
    Status(status::StatusArgs),
    /// Manage the tqd runner process
    Runner(runner::RunnerArgs),
    /// Manage the companion server process
    Supervisor(supervisor::SupervisorArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Enqueue(args) => enqueue::run(args).await,
        Commands::Status(args) => status::run(args).await,
        Commands::Runner(args) => runner::run(args),
        Commands::Supervisor(args) => supervisor::run(args).await,
    }
}
