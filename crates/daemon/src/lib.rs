// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-queue runner daemon library: the process supervisor for the
//! companion server, its build-provenance tracking, and preflight gate.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod build_meta;
pub mod error;
pub mod preflight;
pub mod process_supervisor;

pub use build_meta::BuildMeta;
pub use error::SupervisorError;
pub use preflight::{run_preflight, PreflightFinding, PreflightInputs, PreflightReport, PreflightSeverity};
pub use process_supervisor::{
    HealthReport, ProcessEvent, ProcessSupervisor, ProcessSupervisorConfig, StartOutcome,
};
