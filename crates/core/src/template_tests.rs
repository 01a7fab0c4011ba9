// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn interpolate_substitutes_known_keys_only() {
    let mut vars = HashMap::new();
    vars.insert("NAME".to_string(), "acme".to_string());
    let rendered = interpolate("hello {{NAME}}, {{UNKNOWN}}", &vars);
    assert_eq!(rendered, "hello acme, {{UNKNOWN}}");
}

#[test]
fn interpolate_does_not_rescan_substituted_values() {
    let mut vars = HashMap::new();
    vars.insert("A".to_string(), "{{B}}".to_string());
    vars.insert("B".to_string(), "leaked".to_string());
    let rendered = interpolate("{{A}}", &vars);
    assert_eq!(rendered, "{{B}}");
}

#[test]
fn referenced_keys_dedupes_in_order() {
    let keys = referenced_keys("{{A}} and {{B}} and {{A}} again");
    assert_eq!(keys, vec!["A".to_string(), "B".to_string()]);
}

#[test]
fn format_output_replaces_placeholder_once() {
    let rendered = format_output("result: {{OUTPUT}} ({{OUTPUT}})", "42");
    assert_eq!(rendered, "result: 42 ({{OUTPUT}})");
}

#[test]
fn format_output_appends_when_no_placeholder() {
    let rendered = format_output("header", "body");
    assert_eq!(rendered, "header\n\nbody");
}

#[test]
fn compose_joins_nonempty_parts_in_order() {
    let composed = compose("global rules", "", "do the thing");
    assert_eq!(composed, "global rules\n\ndo the thing");
}

#[test]
fn compose_all_empty_yields_empty_string() {
    assert_eq!(compose("", "  ", ""), "");
}
