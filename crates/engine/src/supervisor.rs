// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `TaskSupervisor`: mediates every execution through an immutable
//! composition order and validates the output. Direct executor invocation
//! bypassing the supervisor is a contract violation ([`EngineError::SupervisorDisabled`]).

use std::sync::Arc;

use tq_core::{template, MergedConfig, QueueItem, TaskType, TimeoutTier};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::executor::{Executor, ExecutorRequest, TaskExecutor, TaskExecutorOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationSeverity {
    Minor,
    Major,
}

#[derive(Debug, Clone)]
pub struct ValidationViolation {
    pub violation_type: String,
    pub message: String,
    pub can_auto_correct: bool,
    pub severity: ViolationSeverity,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationOutcome {
    pub fn has_major(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Major)
    }
}

const SKIP_MARKERS: &[&str] = &["SKIP_VALIDATION", "NO_TEMPLATE", "skipped_validation"];
const BYPASS_MARKERS: &[&str] = &["DIRECT_EXECUTE", "BYPASS_SUPERVISOR"];

/// Result of a successful or exhausted `execute()` call.
#[derive(Debug, Clone)]
pub struct SupervisedExecution {
    pub success: bool,
    pub output: Option<String>,
    pub violations: Vec<ValidationViolation>,
    pub attempts: u32,
}

/// Pure decision about what a crash-recovery scan should do with a task
/// stuck in a non-terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartActionKind {
    None,
    Continue,
    Resume,
    RollbackReplay,
}

pub struct TaskSupervisor {
    executor: Arc<dyn Executor>,
    config: MergedConfig,
}

impl TaskSupervisor {
    pub fn new(executor: Arc<dyn Executor>, config: MergedConfig) -> Self {
        Self { executor, config }
    }

    /// Join `global -> project -> user` in strict order, trimming each part
    /// and omitting empty ones.
    pub fn compose(&self, user_prompt: &str) -> String {
        let global = self.config.global_input_template.as_deref().unwrap_or("");
        let project = self.config.project_input_template.as_deref().unwrap_or("");
        template::compose(global, project, user_prompt)
    }

    /// Apply the project output template if set, else the global one, else
    /// pass output through raw (only if `allow_raw_output`).
    pub fn format(&self, output: &str) -> Result<String, EngineError> {
        let template = self
            .config
            .project_output_template
            .as_deref()
            .or(self.config.global_output_template.as_deref());
        match template {
            Some(t) => Ok(template::format_output(t, output)),
            None if self.config.allow_raw_output => Ok(output.to_string()),
            None => Err(EngineError::ValidationMajor(
                "no output template configured and raw output is not allowed".to_string(),
            )),
        }
    }

    pub fn validate(&self, output: &str) -> ValidationOutcome {
        let mut violations = Vec::new();
        let trimmed = output.trim();

        if trimmed.is_empty() {
            violations.push(ValidationViolation {
                violation_type: "missing_required_section".to_string(),
                message: "output is empty".to_string(),
                can_auto_correct: false,
                severity: ViolationSeverity::Major,
            });
        }

        let upper = output.to_uppercase();
        if SKIP_MARKERS.iter().any(|m| upper.contains(&m.to_uppercase())) {
            violations.push(ValidationViolation {
                violation_type: "skipped_validation".to_string(),
                message: "output contains a validation-skip marker".to_string(),
                can_auto_correct: false,
                severity: ViolationSeverity::Major,
            });
        }

        if BYPASS_MARKERS.iter().any(|m| upper.contains(&m.to_uppercase())) {
            violations.push(ValidationViolation {
                violation_type: "direct_execution_attempt".to_string(),
                message: "output contains a direct-execution marker".to_string(),
                can_auto_correct: false,
                severity: ViolationSeverity::Major,
            });
        }

        ValidationOutcome {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// Compose, execute (with retry), format, and validate. Fails closed:
    /// any major violation with `fail_on_violation` set stops retries.
    pub async fn execute(
        &self,
        user_prompt: &str,
        tier: TimeoutTier,
    ) -> Result<SupervisedExecution, EngineError> {
        if !self.config.supervisor_enabled {
            return Err(EngineError::SupervisorDisabled);
        }

        let composed = self.compose(user_prompt);
        let timeout_ms = self.config.timeout_ms_for(tier);
        let max_attempts = self.config.max_retries + 1;

        let mut last_error: Option<String> = None;
        for attempt in 1..=max_attempts {
            debug!(attempt, max_attempts, "supervisor execution attempt");
            let outcome = self
                .executor
                .execute(ExecutorRequest {
                    prompt: composed.clone(),
                    timeout_ms,
                    max_retries: 0,
                })
                .await;

            if !outcome.success {
                warn!(attempt, error = ?outcome.error, "executor attempt failed");
                last_error = outcome.error;
                continue;
            }

            let formatted = self.format(&outcome.output)?;
            let validation = self.validate(&formatted);
            if validation.has_major() && self.config.fail_on_violation {
                info!(attempt, "execution rejected by validation");
                return Ok(SupervisedExecution {
                    success: false,
                    output: None,
                    violations: validation.violations,
                    attempts: attempt,
                });
            }

            info!(attempt, "execution completed");
            return Ok(SupervisedExecution {
                success: true,
                output: Some(formatted),
                violations: validation.violations,
                attempts: attempt,
            });
        }

        Ok(SupervisedExecution {
            success: false,
            output: None,
            violations: vec![ValidationViolation {
                violation_type: "executor_exhausted".to_string(),
                message: last_error.unwrap_or_else(|| "executor failed with no error detail".to_string()),
                can_auto_correct: false,
                severity: ViolationSeverity::Major,
            }],
            attempts: max_attempts,
        })
    }
}

/// Pure decision function used by [`crate::RestartHandler`] during recovery.
pub fn detect_restart_state(
    status: tq_core::Status,
    now_ms: i64,
    last_progress_ms: i64,
    has_complete_artifacts: bool,
    stale_threshold_ms: i64,
) -> RestartActionKind {
    use tq_core::Status::*;
    match status {
        AwaitingResponse => RestartActionKind::Continue,
        Running if now_ms - last_progress_ms > stale_threshold_ms => {
            if has_complete_artifacts {
                RestartActionKind::Resume
            } else {
                RestartActionKind::RollbackReplay
            }
        }
        _ => RestartActionKind::None,
    }
}

pub const DEFAULT_STALE_THRESHOLD_MS: i64 = 30_000;

/// Timeout tier assigned to a claimed task based on its declared type.
/// `Implementation` tasks run shell commands and are given the `Long`
/// tier; `Report` tasks synthesize larger outputs and get `Extended`.
/// `ReadInfo` and untyped tasks use `Standard`.
pub fn timeout_tier_for_task_type(task_type: Option<TaskType>) -> TimeoutTier {
    match task_type {
        Some(TaskType::Implementation) => TimeoutTier::Long,
        Some(TaskType::Report) => TimeoutTier::Extended,
        Some(TaskType::ReadInfo) | None => TimeoutTier::Standard,
    }
}

/// Bridges a [`TaskSupervisor`] into the poller-facing [`TaskExecutor`]
/// contract: every claimed item's prompt is run through the supervisor's
/// full compose/execute/validate/retry pipeline rather than calling the
/// executor directly.
pub struct SupervisedTaskExecutor {
    supervisor: TaskSupervisor,
}

impl SupervisedTaskExecutor {
    pub fn new(supervisor: TaskSupervisor) -> Self {
        Self { supervisor }
    }
}

#[async_trait::async_trait]
impl TaskExecutor for SupervisedTaskExecutor {
    async fn execute(&self, item: &QueueItem) -> TaskExecutorOutcome {
        let tier = timeout_tier_for_task_type(item.task_type);
        match self.supervisor.execute(&item.prompt, tier).await {
            Ok(result) if result.success => TaskExecutorOutcome {
                status: tq_core::Status::Complete,
                error_message: None,
                output: result.output,
            },
            Ok(result) => TaskExecutorOutcome {
                status: tq_core::Status::Error,
                error_message: Some(
                    result
                        .violations
                        .first()
                        .map(|v| v.message.clone())
                        .unwrap_or_else(|| "execution rejected by validation".to_string()),
                ),
                output: None,
            },
            Err(e) => TaskExecutorOutcome {
                status: tq_core::Status::Error,
                error_message: Some(e.to_string()),
                output: None,
            },
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
