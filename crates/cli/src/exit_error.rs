// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to flush logs and handle process termination.

use std::fmt;

use pf_engine::PipelineError;

use crate::config::ConfigError;

/// A stage failed or the run hit a runtime error.
pub const EXIT_FAILURE: i32 = 1;
/// Invalid options or configuration; nothing was executed.
pub const EXIT_USAGE: i32 = 2;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<PipelineError> for ExitError {
    fn from(err: PipelineError) -> Self {
        let code = if err.is_usage_error() {
            EXIT_USAGE
        } else {
            EXIT_FAILURE
        };
        let mut message = err.to_string();
        // List each failed job under its stage
        if let PipelineError::StageFailed { causes, .. } = &err {
            for cause in causes {
                message.push_str("\n  ");
                message.push_str(&cause.to_string());
            }
        }
        Self::new(code, message)
    }
}

impl From<ConfigError> for ExitError {
    fn from(err: ConfigError) -> Self {
        Self::usage(err.to_string())
    }
}

/// Exit code for an error returned by a command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ExitError>()
        .map(|e| e.code)
        .unwrap_or(EXIT_FAILURE)
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
