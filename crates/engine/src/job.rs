// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unit-of-work interface implemented by stage collaborators.

use async_trait::async_trait;
use pf_core::{JobError, RunOptions};

/// One job of a stage.
///
/// `index` is `None` for the single job of a non-parallel stage, otherwise
/// the 1-based job index. Implementations own all domain I/O; returning
/// `Ok` means the job is complete and will never be run again.
#[async_trait]
pub trait StageJob: Send + Sync {
    async fn execute(&self, index: Option<u32>, options: &RunOptions) -> Result<(), JobError>;

    /// Short description for logs.
    fn describe(&self) -> String {
        "job".to_string()
    }
}

/// Job that does nothing but log; used for stages with no configured work.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopJob;

#[async_trait]
impl StageJob for NoopJob {
    async fn execute(&self, index: Option<u32>, _options: &RunOptions) -> Result<(), JobError> {
        tracing::debug!(?index, "no work configured, nothing to do");
        Ok(())
    }

    fn describe(&self) -> String {
        "noop".to_string()
    }
}
