// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `{{KEY}}` template substitution used for prompt composition and output
//! formatting.
//!
//! Unlike shell-style interpolation, this engine performs a single pass:
//! unknown keys are left as literal text and substituted values are never
//! re-scanned, so a value that happens to contain `{{...}}` cannot trigger
//! further substitution.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("valid regex"));

/// Substitute every `{{KEY}}` occurrence found in `vars`, leaving unknown
/// keys untouched.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let key = &caps[1];
            vars.get(key).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Keys referenced by `{{KEY}}` placeholders in `template`, in first-seen order,
/// without duplicates.
pub fn referenced_keys(template: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut keys = Vec::new();
    for caps in PLACEHOLDER_PATTERN.captures_iter(template) {
        let key = caps[1].to_string();
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }
    keys
}

/// Substitute only the first `{{OUTPUT}}` occurrence with `output`, or append
/// `output` after a blank-line separator if the template has no such
/// placeholder.
pub fn format_output(template: &str, output: &str) -> String {
    if let Some(pos) = template.find("{{OUTPUT}}") {
        let mut result = String::with_capacity(template.len() + output.len());
        result.push_str(&template[..pos]);
        result.push_str(output);
        result.push_str(&template[pos + "{{OUTPUT}}".len()..]);
        result
    } else {
        format!("{}\n\n{}", template.trim_end(), output)
    }
}

/// Join the three composition parts in their immutable order:
/// `global -> project -> user`, separated by blank lines, with empty parts
/// omitted.
pub fn compose(global: &str, project: &str, user_prompt: &str) -> String {
    [global, project, user_prompt]
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
