// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn record(last_heartbeat_ms: i64) -> RunnerRecord {
    RunnerRecord {
        namespace: Namespace::new("acme"),
        runner_id: RunnerId::new("runner-1"),
        project_root: "/srv/acme".into(),
        status: RunnerStatus::Running,
        started_at: "2026-01-01T00:00:00Z".into(),
        last_heartbeat: "2026-01-01T00:00:00Z".into(),
        last_heartbeat_ms,
    }
}

#[test]
fn alive_within_timeout() {
    let r = record(1_000_000);
    assert!(r.is_alive(1_000_000 + 60_000, DEFAULT_HEARTBEAT_TIMEOUT_MS));
}

#[test]
fn dead_past_timeout() {
    let r = record(1_000_000);
    assert!(!r.is_alive(1_000_000 + 130_000, DEFAULT_HEARTBEAT_TIMEOUT_MS));
}

#[test]
fn stopped_runner_never_alive() {
    let mut r = record(1_000_000);
    r.status = RunnerStatus::Stopped;
    assert!(!r.is_alive(1_000_000, DEFAULT_HEARTBEAT_TIMEOUT_MS));
}
