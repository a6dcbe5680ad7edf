// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clean command handler

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use pf_core::{progress_dir, Stage};
use pf_storage::{MarkerStore, ProgressStore};

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Output directory of the run
    #[arg(long, short = 'o')]
    pub outdir: PathBuf,
    /// Remove markers of this stage only
    #[arg(long, short = 'p')]
    pub process: Option<Stage>,
}

/// Delete completion markers so the affected jobs run again.
pub fn clean(args: &CleanArgs) -> Result<usize> {
    let dir = progress_dir(&args.outdir);
    if !dir.is_dir() {
        return Ok(0);
    }
    let store = MarkerStore::open(dir)?;
    Ok(store.clear(args.process)?)
}

pub fn handle(args: CleanArgs) -> Result<()> {
    let removed = clean(&args)?;
    let scope = match args.process {
        Some(stage) => format!(" for '{}'", stage),
        None => String::new(),
    };
    tracing::info!(removed, stage = ?args.process, "cleared markers");
    println!("Removed {} marker(s){}", removed, scope);
    Ok(())
}

#[cfg(test)]
#[path = "clean_tests.rs"]
mod tests;
