// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only logger for per-job attempt records.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use pf_core::JobKey;

/// Path of a job's attempt log: `<log_dir>/<stage>.<index>.log`.
pub fn job_log_path(log_dir: &Path, key: JobKey) -> PathBuf {
    log_dir.join(format!("{}.log", key.marker_name()))
}

/// Path of a job's captured output stream: `<log_dir>/<stage>.<index>.<stream>`.
pub fn job_output_path(log_dir: &Path, key: JobKey, stream: &str) -> PathBuf {
    log_dir.join(format!("{}.{}", key.marker_name(), stream))
}

/// Writes one timestamped line per attempt event to the job's log.
///
/// Each `append()` call opens, writes, and closes the file, so workers of
/// the same stage never share a handle.
#[derive(Debug, Clone)]
pub struct JobLogger {
    log_dir: PathBuf,
}

impl JobLogger {
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Append a log line for the given job.
    ///
    /// Format: `2026-01-30T08:14:09Z [split[3]] message`
    ///
    /// Failures are logged via tracing but do not propagate.
    pub fn append(&self, key: JobKey, message: &str) {
        let path = job_log_path(&self.log_dir, key);
        if let Err(e) = self.write_line(&path, key, message) {
            tracing::warn!(job = %key, error = %e, "failed to write job log");
        }
    }

    fn write_line(&self, path: &Path, key: JobKey, message: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        writeln!(file, "{} [{}] {}", ts, key, message)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_logger_tests.rs"]
mod tests;
