// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn project_overrides_global_field_by_field() {
    let global = GlobalConfig {
        allow_raw_output: false,
        max_retries: 2,
        ..Default::default()
    };
    let project = ProjectConfig {
        max_retries: Some(5),
        ..Default::default()
    };
    let merged = MergedConfig::merge(&global, &project);
    assert_eq!(merged.max_retries, 5);
    assert!(!merged.allow_raw_output);
}

#[test]
fn heartbeat_timeout_falls_back_to_default() {
    let merged = MergedConfig::merge(&GlobalConfig::default(), &ProjectConfig::default());
    assert_eq!(
        merged.heartbeat_timeout_ms,
        crate::runner::DEFAULT_HEARTBEAT_TIMEOUT_MS
    );
}

#[test]
fn timeout_tier_defaults() {
    assert_eq!(TimeoutTier::Standard.default_ms(), 60_000);
    assert_eq!(TimeoutTier::Long.default_ms(), 120_000);
    assert_eq!(TimeoutTier::Extended.default_ms(), 300_000);
}

#[test]
fn timeout_ms_falls_back_to_standard_default() {
    let merged = MergedConfig::merge(&GlobalConfig::default(), &ProjectConfig::default());
    assert_eq!(merged.timeout_ms, 60_000);
    assert_eq!(merged.timeout_ms_for(TimeoutTier::Standard), 60_000);
}

#[test]
fn timeout_ms_project_override_wins_over_global() {
    let global = GlobalConfig {
        timeout_ms: Some(45_000),
        ..Default::default()
    };
    let project = ProjectConfig {
        timeout_ms: Some(90_000),
        ..Default::default()
    };
    let merged = MergedConfig::merge(&global, &project);
    assert_eq!(merged.timeout_ms_for(TimeoutTier::Standard), 90_000);
}

#[test]
fn timeout_ms_for_long_and_extended_ignores_configured_override() {
    let global = GlobalConfig {
        timeout_ms: Some(1_000),
        ..Default::default()
    };
    let merged = MergedConfig::merge(&global, &ProjectConfig::default());
    assert_eq!(merged.timeout_ms_for(TimeoutTier::Long), 120_000);
    assert_eq!(merged.timeout_ms_for(TimeoutTier::Extended), 300_000);
}
