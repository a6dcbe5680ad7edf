// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference-sequence exclusion list.

use serde::{Deserialize, Serialize};

/// Reference sequence names that must not be processed.
///
/// Each entry is either an exact sequence name or a prefix ending in `%`
/// (`chrUn%` excludes every sequence starting with `chrUn`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Exclusions(Vec<String>);

impl Exclusions {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(
            patterns
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        )
    }

    /// Parse a comma-separated list, ignoring blank entries.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(',').map(str::trim))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        &self.0
    }

    /// True if `name` matches any exclusion pattern.
    pub fn excludes(&self, name: &str) -> bool {
        self.0.iter().any(|pattern| match pattern.strip_suffix('%') {
            Some(prefix) => name.starts_with(prefix),
            None => name == pattern,
        })
    }
}

#[cfg(test)]
#[path = "exclude_tests.rs"]
mod tests;
