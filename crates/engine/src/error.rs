// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline error taxonomy.

use pf_core::{JobError, Stage};
use pf_storage::ProgressError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while planning or running the pipeline.
///
/// Every variant is fatal to the current invocation. Recovery is a rerun,
/// which only repeats jobs without a completion marker.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid options: {0}")]
    InvalidOptionCombination(String),

    #[error("job count for '{stage}' is unavailable until '{dependency}' has completed")]
    JobCountUnavailable { stage: Stage, dependency: Stage },

    #[error("stage '{stage}' runs a single job and does not accept a job index")]
    IndexNotApplicable { stage: Stage },

    #[error("job index {index} is out of range for '{stage}' (1..={max})")]
    InvalidIndex { stage: Stage, index: u32, max: u32 },

    #[error("{stage} job {} failed: {cause}", display_index(.index))]
    JobExecutionFailed {
        stage: Stage,
        index: u32,
        #[source]
        cause: JobError,
    },

    #[error(
        "stage '{stage}' failed ({} job(s): {})",
        .failed_indices.len(),
        join_indices(.failed_indices)
    )]
    StageFailed {
        stage: Stage,
        failed_indices: Vec<u32>,
        causes: Vec<PipelineError>,
    },

    #[error("no handler registered for stage '{stage}'")]
    MissingHandler { stage: Stage },

    #[error("stage '{stage}' cannot take its job count from later stage '{dependency}'")]
    InvalidDependency { stage: Stage, dependency: Stage },

    #[error("cannot determine job count for '{stage}' from {}: {source}", .path.display())]
    CountSource {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Progress(#[from] ProgressError),
}

impl PipelineError {
    /// True for errors caused by operator input rather than a failed run.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidOptionCombination(_)
                | Self::IndexNotApplicable { .. }
                | Self::InvalidIndex { .. }
        )
    }
}

fn display_index(index: &u32) -> String {
    if *index == 0 {
        "(unindexed)".to_string()
    } else {
        index.to_string()
    }
}

fn join_indices(indices: &[u32]) -> String {
    indices
        .iter()
        .map(display_index)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
