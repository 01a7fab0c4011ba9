// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preflight: fail-fast validation of the executor configuration before a
//! spawn is attempted. A fatal finding refuses the start outright.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreflightSeverity {
    Fatal,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightFinding {
    pub code: String,
    pub message: String,
    pub fix_hint: String,
    pub severity: PreflightSeverity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreflightReport {
    pub findings: Vec<PreflightFinding>,
}

impl PreflightReport {
    pub fn passable(&self) -> bool {
        !self
            .findings
            .iter()
            .any(|f| f.severity == PreflightSeverity::Fatal)
    }

    pub fn first_fatal(&self) -> Option<&PreflightFinding> {
        self.findings
            .iter()
            .find(|f| f.severity == PreflightSeverity::Fatal)
    }
}

/// Configuration inputs checked by the preflight pass.
#[derive(Debug, Clone)]
pub struct PreflightInputs {
    pub command: String,
    pub web_port: u16,
    pub state_dir_writable: bool,
}

/// Run the preflight checks. Pure function so it can be unit tested without
/// touching the filesystem beyond what the caller already resolved into
/// `PreflightInputs`.
pub fn run_preflight(inputs: &PreflightInputs) -> PreflightReport {
    let mut findings = Vec::new();

    if inputs.command.trim().is_empty() {
        findings.push(PreflightFinding {
            code: "empty_command".to_string(),
            message: "no executor command configured".to_string(),
            fix_hint: "set process.command in the project config".to_string(),
            severity: PreflightSeverity::Fatal,
        });
    }

    if inputs.web_port == 0 {
        findings.push(PreflightFinding {
            code: "invalid_port".to_string(),
            message: "web_port must be nonzero".to_string(),
            fix_hint: "set process.web_port to a free TCP port".to_string(),
            severity: PreflightSeverity::Fatal,
        });
    }

    if !inputs.state_dir_writable {
        findings.push(PreflightFinding {
            code: "state_dir_not_writable".to_string(),
            message: "state directory is not writable".to_string(),
            fix_hint: "check permissions on the configured state directory".to_string(),
            severity: PreflightSeverity::Fatal,
        });
    }

    PreflightReport { findings }
}

#[cfg(test)]
#[path = "preflight_tests.rs"]
mod tests;
