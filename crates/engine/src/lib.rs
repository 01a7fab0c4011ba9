// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Execution engine: the poller claim loop, the task supervisor (prompt
//! composition, output validation, retry), and crash-recovery decisions.

pub mod error;
pub mod executor;
pub mod poller;
pub mod restart;
pub mod supervisor;

pub use error::EngineError;
pub use executor::{
    ExecutorOutcome, ExecutorRequest, FakeExecutor, FakeTaskExecutor, TaskExecutor,
    TaskExecutorOutcome,
};
pub use poller::{Poller, PollerConfig, PollerEvent, PollerState};
pub use restart::{RestartAction, RestartDecision, RestartHandler};
pub use supervisor::{
    detect_restart_state, RestartActionKind, SupervisedExecution, SupervisedTaskExecutor,
    TaskSupervisor, ValidationOutcome, ValidationViolation, ViolationSeverity,
    DEFAULT_STALE_THRESHOLD_MS,
};
