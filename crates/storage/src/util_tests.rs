// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ms_iso_roundtrip_preserves_millis() {
    let ms = 1_700_000_000_123;
    let iso = ms_to_iso(ms);
    assert_eq!(iso_to_ms(&iso), ms);
}

#[test]
fn now_iso_is_parseable() {
    let iso = now_iso();
    assert!(iso_to_ms(&iso) > 0);
}
