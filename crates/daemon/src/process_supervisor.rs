// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ProcessSupervisor`: spawns and manages the companion server as a child
//! process, with build-origin tracking and a preflight gate before every
//! spawn. A restart that produces the same PID as before is treated as a
//! supervisor defect, not a transient condition.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::build_meta::BuildMeta;
use crate::error::{SupervisorError, SupervisorResult};
use crate::preflight::{run_preflight, PreflightInputs, PreflightReport};

const STOP_GRACE_PERIOD: Duration = Duration::from_millis(10_000);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct ProcessSupervisorConfig {
    pub project_root: PathBuf,
    pub command: String,
    pub args: Vec<String>,
    pub web_port: u16,
    pub state_dir: Option<PathBuf>,
    pub startup_wait_ms: u64,
    pub health_url: String,
}

impl ProcessSupervisorConfig {
    pub fn new(project_root: impl Into<PathBuf>, command: impl Into<String>, web_port: u16) -> Self {
        Self {
            project_root: project_root.into(),
            command: command.into(),
            args: Vec::new(),
            web_port,
            state_dir: None,
            startup_wait_ms: 3000,
            health_url: format!("http://127.0.0.1:{}/health", web_port),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProcessEvent {
    WebStarted { pid: u32 },
    WebStopped,
    WebError { message: String },
    BuildStarted,
    BuildCompleted,
    BuildFailed { message: String },
}

/// Outcome of a `start()`/`restart()` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartOutcome {
    pub success: bool,
    pub pid: Option<u32>,
    pub error: Option<String>,
    pub preflight_report: Option<PreflightReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub pid: Option<u32>,
    pub build_meta: Option<BuildMeta>,
    pub uptime_ms: Option<u64>,
    pub preflight_report: Option<PreflightReport>,
    pub error: Option<String>,
}

struct RunningChild {
    child: Child,
    pid: u32,
    start_time: Instant,
}

pub struct ProcessSupervisor {
    config: ProcessSupervisorConfig,
    running: Mutex<Option<RunningChild>>,
    events_tx: mpsc::UnboundedSender<ProcessEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<ProcessEvent>>>,
    http_client: reqwest::Client,
}

impl ProcessSupervisor {
    pub fn new(config: ProcessSupervisorConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            running: Mutex::new(None),
            events_tx: tx,
            events_rx: Mutex::new(Some(rx)),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ProcessEvent> {
        self.events_rx
            .lock()
            .take()
            .expect("process events can only be subscribed to once")
    }

    fn emit(&self, event: ProcessEvent) {
        let _ = self.events_tx.send(event);
    }

    pub fn current_pid(&self) -> Option<u32> {
        self.running.lock().as_ref().map(|r| r.pid)
    }

    fn preflight_inputs(&self) -> PreflightInputs {
        let state_dir_writable = self
            .config
            .state_dir
            .as_ref()
            .map(|d| std::fs::create_dir_all(d).is_ok())
            .unwrap_or(true);
        PreflightInputs {
            command: self.config.command.clone(),
            web_port: self.config.web_port,
            state_dir_writable,
        }
    }

    /// Idempotent: returns the current PID if already running.
    pub async fn start(&self) -> SupervisorResult<StartOutcome> {
        if let Some(pid) = self.current_pid() {
            if is_child_alive(&self.running) {
                return Ok(StartOutcome {
                    success: true,
                    pid: Some(pid),
                    error: None,
                    preflight_report: None,
                });
            }
        }

        let report = run_preflight(&self.preflight_inputs());
        if !report.passable() {
            let finding = report.first_fatal().expect("passable() is false implies a fatal finding");
            return Ok(StartOutcome {
                success: false,
                pid: None,
                error: Some(format!("{}: {}", finding.code, finding.fix_hint)),
                preflight_report: Some(report),
            });
        }

        let build_meta = BuildMeta::load(&self.config.project_root);

        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.args)
            .arg("--port")
            .arg(self.config.web_port.to_string());
        if let Some(state_dir) = &self.config.state_dir {
            command.arg("--stateDir").arg(state_dir);
        }
        if let Some(meta) = &build_meta {
            command.env("PM_BUILD_SHA", &meta.build_sha);
        }
        command.env("PM_WEB_PORT", self.config.web_port.to_string());
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut child = command
            .spawn()
            .map_err(|e| SupervisorError::SpawnFailed(e.to_string()))?;
        let pid = child.id().ok_or_else(|| {
            SupervisorError::SpawnFailed("child exited before a PID could be read".to_string())
        })?;

        tokio::time::sleep(Duration::from_millis(self.config.startup_wait_ms)).await;

        if let Ok(Some(status)) = child.try_wait() {
            self.emit(ProcessEvent::WebError {
                message: format!("exited during startup wait: {}", status),
            });
            return Err(SupervisorError::ExitedDuringStartup(status.to_string()));
        }

        *self.running.lock() = Some(RunningChild {
            child,
            pid,
            start_time: Instant::now(),
        });
        self.emit(ProcessEvent::WebStarted { pid });
        info!(pid, "supervised process started");

        Ok(StartOutcome {
            success: true,
            pid: Some(pid),
            error: None,
            preflight_report: None,
        })
    }

    /// Idempotent: no-op if already stopped.
    pub async fn stop(&self) {
        let mut running = self.running.lock().take();
        let Some(entry) = running.as_mut() else {
            return;
        };
        let pid = entry.pid;

        send_signal(pid, "-15");
        let deadline = Instant::now() + STOP_GRACE_PERIOD;
        loop {
            if let Ok(Some(_)) = entry.child.try_wait() {
                break;
            }
            if Instant::now() >= deadline {
                warn!(pid, "graceful stop timed out, sending hard kill");
                send_signal(pid, "-9");
                let _ = entry.child.wait().await;
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        self.emit(ProcessEvent::WebStopped);
        info!(pid, "supervised process stopped");
    }

    /// Stop then start. On a rebuild failure the running child is left
    /// untouched and the old PID is preserved in the error.
    pub async fn restart(
        &self,
        rebuild: Option<impl FnOnce() -> Result<(), String>>,
    ) -> SupervisorResult<StartOutcome> {
        let previous_pid = self.current_pid();

        if let Some(rebuild_fn) = rebuild {
            self.emit(ProcessEvent::BuildStarted);
            if let Err(message) = rebuild_fn() {
                self.emit(ProcessEvent::BuildFailed {
                    message: message.clone(),
                });
                return Err(SupervisorError::BuildFailed(format!(
                    "{} (pid {:?} left running)",
                    message, previous_pid
                )));
            }
            self.emit(ProcessEvent::BuildCompleted);
            BuildMeta::capture().persist(&self.config.project_root)?;
        }

        self.stop().await;
        let outcome = self.start().await?;

        if let (Some(prev), Some(new)) = (previous_pid, outcome.pid) {
            if prev == new {
                return Err(SupervisorError::PidUnchanged(new));
            }
        }

        Ok(outcome)
    }

    pub async fn health_check(&self) -> HealthReport {
        let pid = self.current_pid();
        let build_meta = BuildMeta::load(&self.config.project_root);
        let uptime_ms = self
            .running
            .lock()
            .as_ref()
            .map(|r| r.start_time.elapsed().as_millis() as u64);

        match self.http_client.get(&self.config.health_url).send().await {
            Ok(response) if response.status().is_success() => HealthReport {
                healthy: true,
                pid,
                build_meta,
                uptime_ms,
                preflight_report: None,
                error: None,
            },
            Ok(response) => HealthReport {
                healthy: false,
                pid,
                build_meta,
                uptime_ms,
                preflight_report: None,
                error: Some(format!("non-200 response: {}", response.status())),
            },
            Err(e) => {
                error!(error = %e, "health check request failed");
                HealthReport {
                    healthy: false,
                    pid,
                    build_meta,
                    uptime_ms,
                    preflight_report: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn is_child_alive(running: &Mutex<Option<RunningChild>>) -> bool {
    let mut guard = running.lock();
    match guard.as_mut() {
        Some(entry) => !matches!(entry.child.try_wait(), Ok(Some(_))),
        None => false,
    }
}

fn send_signal(pid: u32, signal: &str) -> bool {
    std::process::Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "process_supervisor_tests.rs"]
mod tests;
