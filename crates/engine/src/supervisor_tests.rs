// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::executor::FakeExecutor;
use tq_core::GlobalConfig;

fn config(overrides: impl FnOnce(&mut MergedConfig)) -> MergedConfig {
    let mut merged = MergedConfig::merge(&GlobalConfig::default(), &tq_core::ProjectConfig::default());
    merged.supervisor_enabled = true;
    merged.allow_raw_output = true;
    overrides(&mut merged);
    merged
}

#[test]
fn compose_preserves_global_project_user_order() {
    let config = config(|c| {
        c.global_input_template = Some("GLOBAL".into());
        c.project_input_template = Some("PROJECT".into());
    });
    let supervisor = TaskSupervisor::new(Arc::new(FakeExecutor::success("x")), config);
    assert_eq!(supervisor.compose("USER"), "GLOBAL\n\nPROJECT\n\nUSER");
}

#[test]
fn validate_flags_empty_output_as_major() {
    let supervisor = TaskSupervisor::new(Arc::new(FakeExecutor::success("x")), config(|_| {}));
    let outcome = supervisor.validate("   ");
    assert!(outcome.has_major());
}

#[test]
fn validate_flags_bypass_marker() {
    let supervisor = TaskSupervisor::new(Arc::new(FakeExecutor::success("x")), config(|_| {}));
    let outcome = supervisor.validate("please DIRECT_EXECUTE this");
    assert!(outcome.has_major());
    assert_eq!(outcome.violations[0].violation_type, "direct_execution_attempt");
}

#[tokio::test]
async fn execute_rejects_when_disabled() {
    let config = config(|c| c.supervisor_enabled = false);
    let supervisor = TaskSupervisor::new(Arc::new(FakeExecutor::success("x")), config);
    let err = supervisor
        .execute("do it", TimeoutTier::Standard)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SupervisorDisabled));
}

#[tokio::test]
async fn execute_succeeds_with_raw_output() {
    let supervisor = TaskSupervisor::new(Arc::new(FakeExecutor::success("result")), config(|_| {}));
    let result = supervisor
        .execute("do it", TimeoutTier::Standard)
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.output.as_deref(), Some("result"));
}

#[test]
fn timeout_tier_maps_from_task_type() {
    assert_eq!(
        timeout_tier_for_task_type(Some(TaskType::ReadInfo)),
        TimeoutTier::Standard
    );
    assert_eq!(
        timeout_tier_for_task_type(Some(TaskType::Implementation)),
        TimeoutTier::Long
    );
    assert_eq!(
        timeout_tier_for_task_type(Some(TaskType::Report)),
        TimeoutTier::Extended
    );
    assert_eq!(timeout_tier_for_task_type(None), TimeoutTier::Standard);
}

#[tokio::test]
async fn execute_uses_long_tier_timeout_for_implementation_tasks() {
    let config = config(|c| c.timeout_ms = 5_000);
    let executor = Arc::new(FakeExecutor::success("result"));
    let supervisor = TaskSupervisor::new(executor.clone(), config);
    supervisor
        .execute("do it", TimeoutTier::Long)
        .await
        .unwrap();
    assert_eq!(executor.last_timeout_ms(), Some(TimeoutTier::Long.default_ms()));
}

#[test]
fn restart_state_awaiting_response_continues() {
    let action = detect_restart_state(tq_core::Status::AwaitingResponse, 0, 0, false, 30_000);
    assert_eq!(action, RestartActionKind::Continue);
}

#[test]
fn restart_state_stale_running_without_artifacts_rolls_back() {
    let action = detect_restart_state(tq_core::Status::Running, 100_000, 0, false, 30_000);
    assert_eq!(action, RestartActionKind::RollbackReplay);
}

#[test]
fn restart_state_stale_running_with_artifacts_resumes() {
    let action = detect_restart_state(tq_core::Status::Running, 100_000, 0, true, 30_000);
    assert_eq!(action, RestartActionKind::Resume);
}

#[test]
fn restart_state_fresh_running_does_nothing() {
    let action = detect_restart_state(tq_core::Status::Running, 1_000, 990, false, 30_000);
    assert_eq!(action, RestartActionKind::None);
}
