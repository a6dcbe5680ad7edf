// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage job that runs an external shell command.

use crate::count::{artifact_paths, eligible_sequences, JobCountPolicy, WorkUnits};
use crate::job::StageJob;
use crate::job_logger::job_output_path;
use crate::template::{interpolate_shell, placeholders};
use async_trait::async_trait;
use pf_core::{JobError, JobKey, RunOptions, Stage};
use std::collections::HashMap;
use std::fs::File;
use std::process::Stdio;
use tokio::process::Command;

/// Variables available to command templates.
pub const COMMAND_VARS: &[&str] = &[
    "outdir",
    "tmp",
    "logs",
    "reference",
    "tumour",
    "normal",
    "exclude",
    "cpus",
    "stage",
    "index",
    "sequence",
    "artifact",
];

/// Runs `sh -c <command>` in the output directory for each job.
///
/// The command template is interpolated per job (see [`COMMAND_VARS`]);
/// stdout and stderr are captured to `<stage>.<index>.out` and
/// `<stage>.<index>.err` in the run's log directory. A non-zero exit
/// status fails the job.
///
/// `${sequence}` and `${artifact}` name what job `k` works on: the `k`-th
/// eligible reference sequence for sequence stages, or the `k`-th upstream
/// artifact (by file name) and its file stem for artifact stages.
#[derive(Debug, Clone)]
pub struct CommandJob {
    stage: Stage,
    template: String,
    units: WorkUnits,
}

impl CommandJob {
    pub fn new(stage: Stage, template: impl Into<String>) -> Self {
        let template = template.into();
        for name in placeholders(&template) {
            if !COMMAND_VARS.contains(&name) {
                tracing::warn!(%stage, var = name, "unknown variable in command, left for the shell");
            }
        }
        let units = WorkUnits::for_stage(stage, JobCountPolicy::default_for);
        Self {
            stage,
            template,
            units,
        }
    }

    /// Use `units` instead of those of the stage's default count policy.
    pub fn with_units(mut self, units: WorkUnits) -> Self {
        self.units = units;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn units(&self) -> &WorkUnits {
        &self.units
    }

    /// The command line for one job.
    pub fn render(&self, index: Option<u32>, options: &RunOptions) -> String {
        let mut vars: HashMap<&str, String> = HashMap::new();
        vars.insert("outdir", options.outdir.display().to_string());
        vars.insert("tmp", options.tmp_dir().display().to_string());
        vars.insert("logs", options.logs_dir().display().to_string());
        vars.insert("reference", options.reference.display().to_string());
        vars.insert("tumour", options.tumour.display().to_string());
        vars.insert("normal", options.normal.display().to_string());
        vars.insert("exclude", options.exclude.patterns().join(","));
        vars.insert("cpus", options.concurrency.to_string());
        vars.insert("stage", self.stage.to_string());
        vars.insert("index", index.map(|i| i.to_string()).unwrap_or_default());
        let (sequence, artifact) = self.work_unit(index, options).unwrap_or_default();
        vars.insert("sequence", sequence);
        vars.insert("artifact", artifact);
        interpolate_shell(&self.template, &vars)
    }

    /// Sequence name and artifact path for job `index`, if it has them.
    fn work_unit(&self, index: Option<u32>, options: &RunOptions) -> Option<(String, String)> {
        let position = (index? as usize).checked_sub(1)?;
        match &self.units {
            WorkUnits::None => None,
            WorkUnits::Sequences => {
                let fai = std::fs::read_to_string(options.reference_index()).ok()?;
                let name = eligible_sequences(&fai, options).get(position)?.to_string();
                Some((name, String::new()))
            }
            WorkUnits::Artifacts { dir, extension } => {
                let paths = artifact_paths(&options.outdir.join(dir), extension).ok()?;
                let path = paths.get(position)?;
                let stem = path.file_stem()?.to_string_lossy().into_owned();
                Some((stem, path.display().to_string()))
            }
        }
    }
}

#[async_trait]
impl StageJob for CommandJob {
    async fn execute(&self, index: Option<u32>, options: &RunOptions) -> Result<(), JobError> {
        let command = self.render(index, options);
        let key = JobKey::new(self.stage, index.unwrap_or(0));

        let log_dir = options.logs_dir();
        std::fs::create_dir_all(&log_dir)?;
        let stdout = File::create(job_output_path(&log_dir, key, "out"))?;
        let stderr = File::create(job_output_path(&log_dir, key, "err"))?;

        tracing::debug!(job = %key, %command, "spawning command");
        let status = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(&options.outdir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .await
            .map_err(|source| JobError::Spawn {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(JobError::ExitStatus {
                command,
                status: status.to_string(),
            })
        }
    }

    fn describe(&self) -> String {
        format!("`{}`", self.template)
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
