// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tq supervisor start|stop|restart|health`
//!
//! Each invocation constructs a fresh [`ProcessSupervisor`] against the
//! companion process's configured port. `start`/`restart`/`health` are
//! meaningful standalone since the supervisor's preflight/health paths
//! don't require cross-invocation state; `stop` here only signals a
//! process this CLI invocation itself just started, since there is no
//! persisted child handle across process boundaries — long-running
//! supervision is the daemon's job (`tq runner start`), not the CLI's.

use anyhow::Result;
use clap::{Args, Subcommand};

use tq_daemon::{ProcessSupervisor, ProcessSupervisorConfig};

use crate::env;

#[derive(Args)]
pub struct SupervisorArgs {
    #[command(subcommand)]
    pub command: SupervisorCommand,
}

#[derive(Subcommand)]
pub enum SupervisorCommand {
    Start,
    Stop,
    Restart,
    Health,
}

fn build_supervisor() -> ProcessSupervisor {
    let project_root = env::project_root();
    let command = std::env::var("TQ_PROCESS_COMMAND").unwrap_or_else(|_| "tq-worker".to_string());
    let web_port: u16 = std::env::var("TQ_WEB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4000);
    ProcessSupervisor::new(ProcessSupervisorConfig::new(project_root, command, web_port))
}

pub async fn run(args: SupervisorArgs) -> Result<()> {
    let supervisor = build_supervisor();

    match args.command {
        SupervisorCommand::Start => {
            let outcome = supervisor.start().await?;
            if outcome.success {
                println!("supervisor started (pid {:?})", outcome.pid);
            } else {
                println!("supervisor failed to start: {:?}", outcome.error);
            }
        }
        SupervisorCommand::Stop => {
            supervisor.stop().await;
            println!("supervisor stopped");
        }
        SupervisorCommand::Restart => {
            let outcome = supervisor.restart(None::<fn() -> Result<(), String>>).await?;
            println!("supervisor restarted (pid {:?})", outcome.pid);
        }
        SupervisorCommand::Health => {
            let report = supervisor.health_check().await;
            println!("healthy={} pid={:?} error={:?}", report.healthy, report.pid, report.error);
        }
    }

    Ok(())
}
