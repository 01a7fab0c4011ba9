// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn scoped_name_joins_with_colon() {
    assert_eq!(scoped_name("acme", "task-1"), "acme:task-1");
    assert_eq!(scoped_name("", "task-1"), "task-1");
}

#[test]
fn split_scoped_name_roundtrips() {
    assert_eq!(split_scoped_name("acme:task-1"), ("acme", "task-1"));
    assert_eq!(split_scoped_name("task-1"), ("", "task-1"));
}

#[test]
fn resolve_namespace_falls_back_to_basename() {
    let tmp = std::env::temp_dir().join("tq-namespace-test-project");
    let resolved = resolve_namespace(&tmp);
    assert_eq!(resolved, "tq-namespace-test-project");
}

#[test]
fn resolve_namespace_defaults_for_root() {
    assert_eq!(resolve_namespace(Path::new("/")), "default");
}
