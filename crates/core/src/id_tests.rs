// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn short_truncates() {
    assert_eq!("abcdef".short(3), "abc");
    assert_eq!("ab".short(3), "ab");
}

#[test]
fn sequential_id_gen_increments() {
    let gen = SequentialIdGen::new("t");
    assert_eq!(gen.next(), "t-1");
    assert_eq!(gen.next(), "t-2");
}

#[test]
fn base36_roundtrip_known_values() {
    assert_eq!(to_base36(0), "0");
    assert_eq!(to_base36(35), "z");
    assert_eq!(to_base36(36), "10");
}

#[test]
fn runner_suffix_has_expected_shape() {
    let id = RandomRunnerSuffix.generate(1_700_000_000_000);
    assert!(id.starts_with("runner-"));
    let parts: Vec<&str> = id.splitn(3, '-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[2].len(), 6);
}
