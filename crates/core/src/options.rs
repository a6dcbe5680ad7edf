// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolved configuration for one pipeline invocation.

use crate::exclude::Exclusions;
use crate::stage::Stage;
use std::path::{Path, PathBuf};

/// Name of the run-scoped working directory under the output directory.
pub const TMP_DIR: &str = "tmp";
/// Marker subdirectory of the working directory.
pub const PROGRESS_DIR: &str = "progress";
/// Per-job log subdirectory of the working directory.
pub const LOGS_DIR: &str = "logs";

/// Read-only options shared by every component for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub outdir: PathBuf,
    pub reference: PathBuf,
    pub tumour: PathBuf,
    pub normal: PathBuf,
    pub exclude: Exclusions,
    /// Maximum jobs of one stage running at once (always >= 1)
    pub concurrency: usize,
    /// Only run this stage
    pub process: Option<Stage>,
    /// Only run this job index of `process`
    pub index: Option<u32>,
    /// Stop dispatching new jobs of a stage after its first failure
    pub fail_fast: bool,
}

impl RunOptions {
    pub fn builder(
        outdir: impl Into<PathBuf>,
        reference: impl Into<PathBuf>,
        tumour: impl Into<PathBuf>,
        normal: impl Into<PathBuf>,
    ) -> RunOptionsBuilder {
        RunOptionsBuilder {
            outdir: outdir.into(),
            reference: reference.into(),
            tumour: tumour.into(),
            normal: normal.into(),
            exclude: Exclusions::default(),
            concurrency: 1,
            process: None,
            index: None,
            fail_fast: false,
        }
    }

    /// Run-scoped working directory (`<outdir>/tmp`).
    pub fn tmp_dir(&self) -> PathBuf {
        self.outdir.join(TMP_DIR)
    }

    /// Directory holding completion markers.
    pub fn progress_dir(&self) -> PathBuf {
        progress_dir(&self.outdir)
    }

    /// Directory holding per-job attempt logs.
    pub fn logs_dir(&self) -> PathBuf {
        logs_dir(&self.outdir)
    }

    /// Reference index listing the reference sequences (`<reference>.fai`).
    pub fn reference_index(&self) -> PathBuf {
        let mut name = self.reference.clone().into_os_string();
        name.push(".fai");
        PathBuf::from(name)
    }
}

/// Marker directory for an output directory.
pub fn progress_dir(outdir: &Path) -> PathBuf {
    outdir.join(TMP_DIR).join(PROGRESS_DIR)
}

/// Per-job log directory for an output directory.
pub fn logs_dir(outdir: &Path) -> PathBuf {
    outdir.join(TMP_DIR).join(LOGS_DIR)
}

pub struct RunOptionsBuilder {
    outdir: PathBuf,
    reference: PathBuf,
    tumour: PathBuf,
    normal: PathBuf,
    exclude: Exclusions,
    concurrency: usize,
    process: Option<Stage>,
    index: Option<u32>,
    fail_fast: bool,
}

impl RunOptionsBuilder {
    crate::setters! {
        set {
            exclude: Exclusions,
            concurrency: usize,
            fail_fast: bool,
        }
        option {
            process: Stage,
            index: u32,
        }
    }

    pub fn build(self) -> RunOptions {
        RunOptions {
            outdir: self.outdir,
            reference: self.reference,
            tumour: self.tumour,
            normal: self.normal,
            exclude: self.exclude,
            concurrency: self.concurrency.max(1),
            process: self.process,
            index: self.index,
            fail_fast: self.fail_fast,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl RunOptions {
    /// Options rooted at `outdir` with placeholder sample paths.
    pub fn for_test(outdir: impl Into<PathBuf>) -> RunOptionsBuilder {
        let outdir = outdir.into();
        let reference = outdir.join("genome.fa");
        Self::builder(outdir, reference, "tumour.bam", "normal.bam")
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
