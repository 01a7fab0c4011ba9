// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global/project configuration and the merged view consumed by the
//! supervisor and poller.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutTier {
    Standard,
    Long,
    Extended,
}

impl TimeoutTier {
    pub fn default_ms(self) -> u64 {
        match self {
            TimeoutTier::Standard => 60_000,
            TimeoutTier::Long => 120_000,
            TimeoutTier::Extended => 300_000,
        }
    }
}

/// Configuration shared across all projects, read from
/// `.claude/global-config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub global_input_template: Option<String>,
    #[serde(default)]
    pub global_output_template: Option<String>,
    #[serde(default)]
    pub allow_raw_output: bool,
    #[serde(default = "default_true")]
    pub supervisor_enabled: bool,
    #[serde(default)]
    pub fail_on_violation: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub heartbeat_timeout_ms: Option<i64>,
    /// Overrides [`TimeoutTier::Standard`]'s default of 60 000 ms. `Long`
    /// and `Extended` are not independently configurable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Configuration specific to one project, read from
/// `.claude/projects/<project_id>.json`. Any field set here overrides the
/// corresponding [`GlobalConfig`] field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project_input_template: Option<String>,
    #[serde(default)]
    pub project_output_template: Option<String>,
    #[serde(default)]
    pub allow_raw_output: Option<bool>,
    #[serde(default)]
    pub supervisor_enabled: Option<bool>,
    #[serde(default)]
    pub fail_on_violation: Option<bool>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub heartbeat_timeout_ms: Option<i64>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    2
}

/// Project config layered over global config, field by field.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub global_input_template: Option<String>,
    pub project_input_template: Option<String>,
    pub global_output_template: Option<String>,
    pub project_output_template: Option<String>,
    pub allow_raw_output: bool,
    pub supervisor_enabled: bool,
    pub fail_on_violation: bool,
    pub max_retries: u32,
    pub heartbeat_timeout_ms: i64,
    /// Resolved `TimeoutTier::Standard` duration; `Long`/`Extended` use
    /// their fixed defaults (see [`MergedConfig::timeout_ms_for`]).
    pub timeout_ms: u64,
}

impl MergedConfig {
    pub fn merge(global: &GlobalConfig, project: &ProjectConfig) -> Self {
        Self {
            global_input_template: global.global_input_template.clone(),
            project_input_template: project.project_input_template.clone(),
            global_output_template: global.global_output_template.clone(),
            project_output_template: project.project_output_template.clone(),
            allow_raw_output: project.allow_raw_output.unwrap_or(global.allow_raw_output),
            supervisor_enabled: project
                .supervisor_enabled
                .unwrap_or(global.supervisor_enabled),
            fail_on_violation: project
                .fail_on_violation
                .unwrap_or(global.fail_on_violation),
            max_retries: project.max_retries.unwrap_or(global.max_retries),
            heartbeat_timeout_ms: project
                .heartbeat_timeout_ms
                .or(global.heartbeat_timeout_ms)
                .unwrap_or(crate::runner::DEFAULT_HEARTBEAT_TIMEOUT_MS),
            timeout_ms: project
                .timeout_ms
                .or(global.timeout_ms)
                .unwrap_or_else(|| TimeoutTier::Standard.default_ms()),
        }
    }

    /// `timeout_ms` for a given tier: `Standard` uses the merged/configured
    /// override, `Long`/`Extended` use their fixed defaults.
    pub fn timeout_ms_for(&self, tier: TimeoutTier) -> u64 {
        match tier {
            TimeoutTier::Standard => self.timeout_ms,
            other => other.default_ms(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
