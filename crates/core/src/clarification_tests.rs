// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn from_poller_prefix_is_unresolved() {
    let c = ClarificationRequest::from_poller_prefix("which branch?", "deploy task");
    assert_eq!(c.kind, ClarificationType::Unknown);
    assert!(!c.is_resolved());
}

#[test]
fn resolution_marks_resolved() {
    let mut c = ClarificationRequest::from_poller_prefix("q", "ctx");
    c.resolution = Some("main".into());
    assert!(c.is_resolved());
}
