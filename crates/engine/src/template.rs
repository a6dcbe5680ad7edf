// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template variable interpolation for stage commands

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex pattern for `${variable_name}`
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("constant regex pattern is valid")
});

/// Escape a string for use inside a single-quoted shell word.
pub fn escape_for_shell(s: &str) -> String {
    s.replace('\'', "'\\''")
}

/// Replace `${name}` placeholders with shell-escaped values from `vars`.
///
/// Unknown variables are left as-is so the shell can expand them.
pub fn interpolate_shell(template: &str, vars: &HashMap<&str, String>) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(val) => escape_for_shell(val),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

/// Names of the `${...}` placeholders in a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    VAR_PATTERN
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
