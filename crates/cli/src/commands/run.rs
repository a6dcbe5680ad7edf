// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run command handler

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use pf_core::{Exclusions, RunOptions};
use pf_engine::{PlanRequest, RunPlanner, Scheduler, StageReport};
use pf_storage::MarkerStore;

use crate::config::PipelineConfig;
use crate::exit_error::ExitError;
use crate::logging::{log_file_path, LogFile};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Output directory; progress and logs live under <outdir>/tmp
    #[arg(long, short = 'o')]
    pub outdir: PathBuf,
    /// Reference genome FASTA (its .fai index lists the sequences)
    #[arg(long, short = 'r')]
    pub reference: PathBuf,
    /// Tumour sample alignment
    #[arg(long, short = 't')]
    pub tumour: PathBuf,
    /// Normal sample alignment
    #[arg(long, short = 'n')]
    pub normal: PathBuf,
    /// Reference sequences to skip, comma separated (trailing % is a wildcard)
    #[arg(long, short = 'e')]
    pub exclude: Option<String>,
    /// Maximum number of jobs run at once [default: 1]
    #[arg(long, short = 'c', value_parser = clap::value_parser!(u32).range(1..))]
    pub cpus: Option<u32>,
    /// Run only this stage
    #[arg(long, short = 'p')]
    pub process: Option<String>,
    /// Run only this job of the stage given by --process
    #[arg(long, short = 'i')]
    pub index: Option<u32>,
    /// Pipeline configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Stop dispatching jobs after the first failure
    #[arg(long)]
    pub fail_fast: bool,
}

/// Resolve flags and config into run options; flags win over the file.
pub fn build_options(
    args: &RunArgs,
    request: PlanRequest,
    config: &PipelineConfig,
) -> RunOptions {
    let exclude = match &args.exclude {
        Some(csv) => Exclusions::from_csv(csv),
        None => config.exclusions().unwrap_or_default(),
    };
    let concurrency = args
        .cpus
        .map(|c| c as usize)
        .or(config.cpus)
        .unwrap_or(1);

    let mut builder = RunOptions::builder(
        args.outdir.clone(),
        args.reference.clone(),
        args.tumour.clone(),
        args.normal.clone(),
    )
    .exclude(exclude)
    .concurrency(concurrency)
    .fail_fast(args.fail_fast);
    if let Some(stage) = request.process {
        builder = builder.process(stage);
    }
    if let Some(index) = request.index {
        builder = builder.index(index);
    }
    builder.build()
}

pub async fn handle(args: RunArgs, log_file: &LogFile) -> Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path).map_err(ExitError::from)?,
        None => PipelineConfig::default(),
    };
    let request =
        PlanRequest::parse(args.process.as_deref(), args.index).map_err(ExitError::from)?;

    // Validate the whole request before any marker is read
    let registry = Arc::new(config.registry().map_err(ExitError::from)?);
    let plan = RunPlanner::new(&registry)
        .plan(&request)
        .map_err(ExitError::from)?;

    let options = Arc::new(build_options(&args, request, &config));
    let log_dir = options.logs_dir();
    if let Err(e) = log_file.open(&log_dir) {
        tracing::warn!(
            path = %log_file_path(&log_dir).display(),
            error = %e,
            "cannot open log file"
        );
    }
    tracing::info!(
        outdir = %options.outdir.display(),
        cpus = options.concurrency,
        stages = plan.len(),
        "starting run"
    );

    let progress = Arc::new(MarkerStore::open(options.progress_dir())?);
    let scheduler = Scheduler::new(registry, progress, options);
    let reports = scheduler.run_plan(&plan).await.map_err(ExitError::from)?;

    for report in &reports {
        println!("{}", format_report(report));
    }
    Ok(())
}

pub fn format_report(report: &StageReport) -> String {
    let mut line = format!("{:<8} ", report.stage.to_string());
    if report.required == 0 {
        line.push_str("no jobs");
    } else if report.executed == 0 {
        line.push_str(&format!("already complete ({} job(s))", report.skipped));
    } else {
        line.push_str(&format!("ran {} job(s)", report.executed));
        if report.skipped > 0 {
            line.push_str(&format!(", {} already complete", report.skipped));
        }
    }
    line
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
