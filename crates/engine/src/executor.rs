// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor trait boundaries. The concrete language-model executor is an
//! external collaborator; this module defines the two contracts it must
//! satisfy and provides fakes for deterministic tests.

use async_trait::async_trait;
use tq_core::QueueItem;

/// Request passed from the supervisor to the prompt-level executor.
#[derive(Debug, Clone)]
pub struct ExecutorRequest {
    pub prompt: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

/// Outcome of one prompt-level execution attempt.
#[derive(Debug, Clone)]
pub struct ExecutorOutcome {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
    pub execution_time_ms: u64,
}

/// The composed-prompt executor driven by [`crate::TaskSupervisor`].
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, request: ExecutorRequest) -> ExecutorOutcome;
}

/// Outcome reported back to the [`crate::Poller`] for one claimed task.
#[derive(Debug, Clone)]
pub struct TaskExecutorOutcome {
    pub status: tq_core::Status,
    pub error_message: Option<String>,
    pub output: Option<String>,
}

/// The task-level executor driven directly by the poller. Most deployments
/// wrap an [`Executor`] with [`crate::TaskSupervisor`] to produce this.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, item: &QueueItem) -> TaskExecutorOutcome;
}

/// Deterministic [`Executor`] fake for tests: returns a canned outcome (or a
/// sequence of them) regardless of prompt content.
pub struct FakeExecutor {
    outcomes: parking_lot::Mutex<std::collections::VecDeque<ExecutorOutcome>>,
    default_outcome: ExecutorOutcome,
    last_timeout_ms: parking_lot::Mutex<Option<u64>>,
}

impl FakeExecutor {
    pub fn always(outcome: ExecutorOutcome) -> Self {
        Self {
            outcomes: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            default_outcome: outcome,
            last_timeout_ms: parking_lot::Mutex::new(None),
        }
    }

    pub fn success(output: impl Into<String>) -> Self {
        Self::always(ExecutorOutcome {
            success: true,
            output: output.into(),
            error: None,
            execution_time_ms: 1,
        })
    }

    /// Queue a sequence of outcomes to return in order before falling back
    /// to the default outcome.
    pub fn with_sequence(default_outcome: ExecutorOutcome, sequence: Vec<ExecutorOutcome>) -> Self {
        Self {
            outcomes: parking_lot::Mutex::new(sequence.into()),
            default_outcome,
            last_timeout_ms: parking_lot::Mutex::new(None),
        }
    }

    /// `timeout_ms` from the most recent [`Executor::execute`] call, if any.
    pub fn last_timeout_ms(&self) -> Option<u64> {
        *self.last_timeout_ms.lock()
    }
}

#[async_trait]
impl Executor for FakeExecutor {
    async fn execute(&self, request: ExecutorRequest) -> ExecutorOutcome {
        *self.last_timeout_ms.lock() = Some(request.timeout_ms);
        let mut queue = self.outcomes.lock();
        queue.pop_front().unwrap_or_else(|| self.default_outcome.clone())
    }
}

/// Deterministic [`TaskExecutor`] fake: echoes a fixed status back for any
/// claimed task, or raises `AWAITING_CLARIFICATION:` when configured to.
pub struct FakeTaskExecutor {
    outcome: TaskExecutorOutcome,
}

impl FakeTaskExecutor {
    pub fn always(outcome: TaskExecutorOutcome) -> Self {
        Self { outcome }
    }

    pub fn completes_with(output: impl Into<String>) -> Self {
        Self::always(TaskExecutorOutcome {
            status: tq_core::Status::Complete,
            error_message: None,
            output: Some(output.into()),
        })
    }

    pub fn asks_clarification(question: impl Into<String>) -> Self {
        Self::always(TaskExecutorOutcome {
            status: tq_core::Status::Error,
            error_message: Some(format!("AWAITING_CLARIFICATION:{}", question.into())),
            output: None,
        })
    }
}

#[async_trait]
impl TaskExecutor for FakeTaskExecutor {
    async fn execute(&self, _item: &QueueItem) -> TaskExecutorOutcome {
        self.outcome.clone()
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
