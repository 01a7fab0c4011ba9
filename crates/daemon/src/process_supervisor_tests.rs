// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn config_for(command: &str, port: u16) -> ProcessSupervisorConfig {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = ProcessSupervisorConfig::new(dir.path(), command, port);
    cfg.startup_wait_ms = 50;
    std::mem::forget(dir);
    cfg
}

#[tokio::test]
async fn start_fails_preflight_on_empty_command() {
    let supervisor = ProcessSupervisor::new(config_for("", 4001));
    let outcome = supervisor.start().await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.preflight_report.unwrap().first_fatal().is_some());
}

#[tokio::test]
async fn start_spawns_and_stop_is_idempotent() {
    let mut cfg = config_for("sleep", 4002);
    cfg.args = vec!["5".to_string()];
    let supervisor = ProcessSupervisor::new(cfg);
    let outcome = supervisor.start().await.unwrap();
    assert!(outcome.success);
    assert!(outcome.pid.is_some());

    supervisor.stop().await;
    assert!(supervisor.current_pid().is_none());
    // second stop is a no-op, not an error
    supervisor.stop().await;
}

#[tokio::test]
async fn restart_preserves_pid_on_build_failure() {
    let mut cfg = config_for("sleep", 4003);
    cfg.args = vec!["5".to_string()];
    let supervisor = ProcessSupervisor::new(cfg);
    let first = supervisor.start().await.unwrap();
    let first_pid = first.pid.unwrap();

    let rebuild = Some(|| Err::<(), String>("compile error".to_string()));
    let result = supervisor.restart(rebuild).await;
    assert!(result.is_err());
    assert_eq!(supervisor.current_pid(), Some(first_pid));

    supervisor.stop().await;
}
