// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Collapse sorted job indices into ranges, e.g. `1-3,5`.
pub fn format_indices(indices: &[u32]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut iter = indices.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while let Some(next) = iter.next_if(|n| Some(*n) == end.checked_add(1)) {
            end = next;
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{}-{}", start, end));
        }
    }
    parts.join(",")
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
