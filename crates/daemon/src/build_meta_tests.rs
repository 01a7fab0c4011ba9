// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn persists_and_loads_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let meta = BuildMeta {
        build_sha: "abc123".into(),
        build_timestamp: "2026-01-01T00:00:00Z".into(),
        git_sha: Some("abc123".into()),
        git_branch: Some("main".into()),
    };
    meta.persist(dir.path()).unwrap();
    let loaded = BuildMeta::load(dir.path()).unwrap();
    assert_eq!(loaded, meta);
}

#[test]
fn load_returns_none_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    assert!(BuildMeta::load(dir.path()).is_none());
}

#[test]
fn synthetic_sha_has_expected_prefix_when_git_unavailable() {
    let meta = BuildMeta {
        build_sha: format!("build-{}", epoch_ms()),
        build_timestamp: chrono::Utc::now().to_rfc3339(),
        git_sha: None,
        git_branch: None,
    };
    assert!(meta.build_sha.starts_with("build-"));
}
