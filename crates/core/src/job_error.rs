// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure of a single unit of work.

use thiserror::Error;

/// Error returned by a stage's unit of work.
///
/// A job is atomic: any error means the job did not complete and no
/// completion marker is written for it.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("`{command}` exited with {status}")]
    ExitStatus { command: String, status: String },
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Failed(String),
}

impl JobError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
