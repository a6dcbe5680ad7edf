// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup for the binary.
//!
//! Events go to stderr, and also to `<outdir>/tmp/logs/pindelflow.log` once
//! a run has validated its request and opened the [`LogFile`]. `RUST_LOG`
//! overrides the default `info` filter.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILE: &str = "pindelflow.log";

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE)
}

/// Log file writer that discards events until [`LogFile::open`] is called.
#[derive(Clone, Default)]
pub struct LogFile {
    file: Arc<Mutex<Option<File>>>,
}

impl LogFile {
    /// Create `log_dir` and append to its log file from now on.
    pub fn open(&self, log_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(log_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path(log_dir))?;
        *self.file.lock() = Some(file);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.file.lock().is_some()
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.lock().as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the subscriber. The returned file layer stays closed until opened.
pub fn init() -> LogFile {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_file = LogFile::default();

    // A second init (tests) is not an error worth reporting
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            fmt::layer()
                .with_writer(log_file.clone())
                .with_ansi(false)
                .with_target(false),
        )
        .try_init();

    log_file
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
