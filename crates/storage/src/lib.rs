// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pf-storage: Durable job-completion markers

mod marker;
mod memory;

pub use marker::{MarkerRecord, MarkerStore};
pub use memory::MemoryStore;

use pf_core::{JobKey, Stage};
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the progress store
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode marker for {key}: {source}")]
    Encode {
        key: JobKey,
        #[source]
        source: serde_json::Error,
    },
}

/// Persistent set of completed jobs.
///
/// Each key is an independent entry: writers never share a counter, so
/// workers of one stage may mark their own jobs concurrently. Marking a key
/// twice is harmless.
pub trait ProgressStore: Send + Sync {
    /// True if the job has a completion marker.
    fn is_complete(&self, key: JobKey) -> Result<bool, ProgressError>;

    /// Record that the job completed successfully.
    fn mark_complete(&self, key: JobKey) -> Result<(), ProgressError>;

    /// Indices of the stage's completed jobs.
    fn completed(&self, stage: Stage) -> Result<BTreeSet<u32>, ProgressError>;

    /// Remove markers for one stage, or for every stage when `None`.
    ///
    /// Returns the number of markers removed.
    fn clear(&self, stage: Option<Stage>) -> Result<usize, ProgressError>;
}

impl<T: ProgressStore + ?Sized> ProgressStore for std::sync::Arc<T> {
    fn is_complete(&self, key: JobKey) -> Result<bool, ProgressError> {
        (**self).is_complete(key)
    }

    fn mark_complete(&self, key: JobKey) -> Result<(), ProgressError> {
        (**self).mark_complete(key)
    }

    fn completed(&self, stage: Stage) -> Result<BTreeSet<u32>, ProgressError> {
        (**self).completed(stage)
    }

    fn clear(&self, stage: Option<Stage>) -> Result<usize, ProgressError> {
        (**self).clear(stage)
    }
}
