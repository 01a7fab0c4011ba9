// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-queue runner daemon (tqd)
//!
//! Runs the poller and the companion-process supervisor side by side in one
//! process. The poller claims and executes queued tasks; the process
//! supervisor keeps the companion server the executor talks to alive.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod build_meta;
mod env;
mod error;
mod http_executor;
mod preflight;
mod process_supervisor;

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

use tq_core::{resolve_namespace, GlobalConfig, MergedConfig, Namespace, ProjectConfig};
use tq_engine::{Poller, PollerConfig, SupervisedTaskExecutor, TaskSupervisor};
use tq_storage::{FileQueueStore, QueueStore};

use crate::http_executor::HttpExecutor;
use crate::process_supervisor::{ProcessSupervisor, ProcessSupervisorConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("tqd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("tqd {}", env!("CARGO_PKG_VERSION"));
                println!("Task-queue runner daemon: poller + process supervisor.");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: tqd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let state_dir = env::state_dir();
    std::fs::create_dir_all(&state_dir)?;
    let _log_guard = setup_logging(&state_dir)?;

    let project_root = env::project_root();
    let namespace = Namespace::new(resolve_namespace(&project_root));
    info!(namespace = %namespace, project_root = %project_root.display(), "tqd starting");

    let global_config = load_json(&project_root.join(".claude/global-config.json")).unwrap_or_default();
    let project_config = load_json(
        &project_root
            .join(".claude/projects")
            .join(format!("{}.json", namespace.as_ref())),
    )
    .unwrap_or_default();
    let merged = MergedConfig::merge(&global_config, &project_config);

    let store: Arc<dyn QueueStore> = Arc::new(FileQueueStore::new(state_dir.clone()));
    store.ensure_table().await?;

    let mut supervisor_config =
        ProcessSupervisorConfig::new(project_root.clone(), env::process_command(), env::web_port());
    supervisor_config.state_dir = Some(state_dir.clone());
    let process_supervisor = Arc::new(ProcessSupervisor::new(supervisor_config));
    let start_outcome = process_supervisor.start().await?;
    if !start_outcome.success {
        error!(error = ?start_outcome.error, "companion process failed to start, continuing without it");
    }

    let executor = Arc::new(HttpExecutor::new(format!(
        "http://127.0.0.1:{}/execute",
        env::web_port()
    )));
    let task_supervisor = TaskSupervisor::new(executor, merged);
    let task_executor: Arc<dyn tq_engine::TaskExecutor> =
        Arc::new(SupervisedTaskExecutor::new(task_supervisor));

    let poller_config = PollerConfig::new(namespace, project_root.to_string_lossy().to_string());
    let poller = Arc::new(Poller::new(poller_config, store, task_executor));
    poller.start().await?;

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, stopping");

    poller.stop().await;
    process_supervisor.stop().await;

    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Option<T> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse config file, using defaults");
            None
        }
    }
}

async fn wait_for_shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler");
            return;
        }
    };
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
}

fn setup_logging(
    state_dir: &std::path::Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_path = env::log_path(state_dir);
    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or(state_dir),
        log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("daemon.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
