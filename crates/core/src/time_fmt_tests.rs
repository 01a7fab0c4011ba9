// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn seconds_range() {
    assert_eq!(format_elapsed(0), "0s");
    assert_eq!(format_elapsed(59), "59s");
}

#[test]
fn minutes_range() {
    assert_eq!(format_elapsed(60), "1m");
    assert_eq!(format_elapsed(3599), "59m");
}

#[test]
fn hours_range_with_and_without_minutes() {
    assert_eq!(format_elapsed(3600), "1h");
    assert_eq!(format_elapsed(3600 + 90 * 60), "1h30m");
}

#[test]
fn days_range() {
    assert_eq!(format_elapsed(86400), "1d");
    assert_eq!(format_elapsed(3 * 86400), "3d");
}

#[test]
fn ms_wrapper_truncates_to_seconds() {
    assert_eq!(format_elapsed_ms(59_999), "59s");
}
