// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status command handler

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use pf_core::{progress_dir, Stage};
use pf_storage::{MarkerStore, ProgressStore};
use serde::Serialize;

use crate::output::{format_indices, OutputFormat};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output directory of the run
    #[arg(long, short = 'o')]
    pub outdir: PathBuf,
    #[arg(long, value_enum, default_value_t)]
    pub output: OutputFormat,
}

/// Completed jobs of one stage.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StageStatus {
    pub stage: Stage,
    /// Completed job indices; `0` is the single job of an unindexed stage
    pub completed: Vec<u32>,
}

/// Read completion markers under `outdir` without creating anything.
pub fn collect(outdir: &Path) -> Result<Option<Vec<StageStatus>>> {
    let dir = progress_dir(outdir);
    if !dir.is_dir() {
        return Ok(None);
    }
    let store = MarkerStore::open(dir)?;
    let mut stages = Vec::with_capacity(Stage::ALL.len());
    for stage in Stage::ALL {
        stages.push(StageStatus {
            stage: *stage,
            completed: store.completed(*stage)?.into_iter().collect(),
        });
    }
    Ok(Some(stages))
}

pub fn format_status(status: &StageStatus) -> String {
    let summary = match status.completed.as_slice() {
        [] => "-".to_string(),
        [0] => "done".to_string(),
        indices => format!("{} complete ({})", indices.len(), format_indices(indices)),
    };
    format!("{:<8} {}", status.stage.to_string(), summary)
}

pub fn handle(args: StatusArgs) -> Result<()> {
    let stages = collect(&args.outdir)?;

    match args.output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "outdir": args.outdir,
                    "stages": stages.unwrap_or_default(),
                }))?
            );
        }
        OutputFormat::Text => match stages {
            None => println!("No progress recorded in {}", args.outdir.display()),
            Some(stages) => {
                for status in &stages {
                    println!("{}", format_status(status));
                }
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
