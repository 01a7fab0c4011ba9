// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tq runner start|stop`

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::daemon_process;

#[derive(Args)]
pub struct RunnerArgs {
    #[command(subcommand)]
    pub command: RunnerCommand,
}

#[derive(Subcommand)]
pub enum RunnerCommand {
    /// Start the tqd runner in the background (idempotent)
    Start,
    /// Stop the tqd runner
    Stop,
}

pub fn run(args: RunnerArgs) -> Result<()> {
    match args.command {
        RunnerCommand::Start => {
            let pid = daemon_process::start_runner_background()?;
            println!("runner started (pid {})", pid);
        }
        RunnerCommand::Stop => {
            daemon_process::stop_runner()?;
            println!("runner stopped");
        }
    }
    Ok(())
}
