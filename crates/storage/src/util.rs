// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp helpers shared by every backend. Timestamps are stored as
//! ISO-8601 UTC strings; lexicographic order equals temporal order.

use chrono::{DateTime, Utc};

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

pub fn ms_to_iso(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}

pub fn iso_to_ms(iso: &str) -> i64 {
    DateTime::parse_from_rfc3339(iso)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "util_tests.rs"]
mod tests;
