// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staged-pipeline scheduler.
//!
//! For each stage the scheduler resolves the job count, drops jobs that
//! already have a completion marker, and runs the rest on a pool of at most
//! `concurrency` workers. A job's marker is written only after it succeeds,
//! so a rerun after any failure or crash repeats exactly the jobs that never
//! finished. The scheduler joins every worker before returning; nothing of
//! the next stage starts until the current one is complete.

use crate::count::{required_keys, JobCountResolver};
use crate::error::PipelineError;
use crate::job::StageJob;
use crate::job_logger::JobLogger;
use crate::planner::{RunPlan, StagePlan};
use crate::registry::StageRegistry;
use parking_lot::Mutex;
use pf_core::{JobError, JobKey, RunOptions, Stage};
use pf_storage::ProgressStore;
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Outcome of one successful stage run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    /// Resolved job count (`0` for a single unindexed job)
    pub job_count: u32,
    /// Jobs this run was asked to complete
    pub required: usize,
    /// Required jobs that were already marked complete
    pub skipped: usize,
    /// Jobs executed successfully by this run
    pub executed: usize,
}

/// Drives stages of one run.
pub struct Scheduler<P> {
    registry: Arc<StageRegistry>,
    progress: Arc<P>,
    options: Arc<RunOptions>,
    resolver: JobCountResolver<P>,
    logger: JobLogger,
}

impl<P: ProgressStore + 'static> Scheduler<P> {
    pub fn new(registry: Arc<StageRegistry>, progress: Arc<P>, options: Arc<RunOptions>) -> Self {
        let resolver =
            JobCountResolver::new(Arc::clone(&registry), Arc::clone(&progress), Arc::clone(&options));
        let logger = JobLogger::new(options.logs_dir());
        Self {
            registry,
            progress,
            options,
            resolver,
            logger,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn resolver(&self) -> &JobCountResolver<P> {
        &self.resolver
    }

    /// Run every stage of the plan in order, stopping at the first failure.
    pub async fn run_plan(&self, plan: &RunPlan) -> Result<Vec<StageReport>, PipelineError> {
        let mut reports = Vec::with_capacity(plan.len());
        for step in &plan.stages {
            reports.push(self.run(step).await?);
        }
        Ok(reports)
    }

    pub async fn run(&self, plan: &StagePlan) -> Result<StageReport, PipelineError> {
        self.run_stage(plan.stage, plan.index).await
    }

    /// Run all incomplete jobs of `stage`, or just job `index` when given.
    pub async fn run_stage(
        &self,
        stage: Stage,
        index: Option<u32>,
    ) -> Result<StageReport, PipelineError> {
        let def = self.registry.get(stage)?;
        let job_count = self.resolver.resolve(stage)?;

        let required = match index {
            None => required_keys(stage, &def.policy, job_count),
            Some(_) if !def.policy.is_parallel() => {
                return Err(PipelineError::IndexNotApplicable { stage });
            }
            Some(i) if i == 0 || i > job_count => {
                return Err(PipelineError::InvalidIndex {
                    stage,
                    index: i,
                    max: job_count,
                });
            }
            Some(i) => vec![JobKey::new(stage, i)],
        };

        let mut pending = VecDeque::new();
        for key in &required {
            if !self.progress.is_complete(*key)? {
                pending.push_back(*key);
            }
        }
        let skipped = required.len() - pending.len();

        let mut report = StageReport {
            stage,
            job_count,
            required: required.len(),
            skipped,
            executed: 0,
        };

        if pending.is_empty() {
            if required.is_empty() {
                tracing::warn!(%stage, "no jobs to run");
            } else {
                tracing::info!(%stage, skipped, "already complete");
            }
            return Ok(report);
        }

        let workers = self.options.concurrency.min(pending.len());
        tracing::info!(
            %stage,
            job_count,
            pending = pending.len(),
            skipped,
            workers,
            job = %def.job.describe(),
            "starting stage"
        );
        let start = Instant::now();

        let pool = WorkerPool {
            queue: Arc::new(Mutex::new(pending.clone())),
            halted: Arc::new(AtomicBool::new(false)),
            fail_fast: self.options.fail_fast,
            job: Arc::clone(&def.job),
            progress: Arc::clone(&self.progress),
            options: Arc::clone(&self.options),
            logger: self.logger.clone(),
        };
        let outcomes = pool.run(workers).await;

        let mut failures: Vec<(u32, PipelineError)> = Vec::new();
        let mut reported = BTreeSet::new();
        for outcome in outcomes {
            reported.insert(outcome.key.index);
            match outcome.result {
                Ok(()) => report.executed += 1,
                Err(e) => failures.push((outcome.key.index, e)),
            }
        }

        // Jobs never reached: fail-fast stopped dispatch, or a worker died
        for key in pending {
            if !reported.contains(&key.index) && !self.progress.is_complete(key)? {
                let reason = if self.options.fail_fast {
                    "not started after an earlier failure"
                } else {
                    "worker exited before running the job"
                };
                failures.push((
                    key.index,
                    PipelineError::JobExecutionFailed {
                        stage,
                        index: key.index,
                        cause: JobError::failed(reason),
                    },
                ));
            }
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        if failures.is_empty() {
            tracing::info!(%stage, executed = report.executed, elapsed_ms, "stage complete");
            return Ok(report);
        }

        failures.sort_by_key(|(index, _)| *index);
        let (failed_indices, causes): (Vec<u32>, Vec<PipelineError>) =
            failures.into_iter().unzip();
        tracing::error!(
            %stage,
            executed = report.executed,
            failed = failed_indices.len(),
            elapsed_ms,
            "stage failed"
        );
        Err(PipelineError::StageFailed {
            stage,
            failed_indices,
            causes,
        })
    }
}

struct JobOutcome {
    key: JobKey,
    result: Result<(), PipelineError>,
}

/// Shared state of one stage's workers.
struct WorkerPool<P> {
    queue: Arc<Mutex<VecDeque<JobKey>>>,
    halted: Arc<AtomicBool>,
    fail_fast: bool,
    job: Arc<dyn StageJob>,
    progress: Arc<P>,
    options: Arc<RunOptions>,
    logger: JobLogger,
}

impl<P> Clone for WorkerPool<P> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            halted: Arc::clone(&self.halted),
            fail_fast: self.fail_fast,
            job: Arc::clone(&self.job),
            progress: Arc::clone(&self.progress),
            options: Arc::clone(&self.options),
            logger: self.logger.clone(),
        }
    }
}

impl<P: ProgressStore + 'static> WorkerPool<P> {
    /// Spawn `workers` tasks and wait for all of them.
    async fn run(self, workers: usize) -> Vec<JobOutcome> {
        let mut set = JoinSet::new();
        for _ in 0..workers {
            set.spawn(self.clone().work());
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(mut done) => outcomes.append(&mut done),
                Err(e) => tracing::error!(error = %e, "stage worker terminated"),
            }
        }
        outcomes
    }

    /// Pull and run jobs until the queue is empty.
    async fn work(self) -> Vec<JobOutcome> {
        let mut outcomes = Vec::new();
        loop {
            if self.fail_fast && self.halted.load(Ordering::SeqCst) {
                break;
            }
            let next = self.queue.lock().pop_front();
            let Some(key) = next else {
                break;
            };

            let result = self.run_job(key).await;
            if result.is_err() {
                self.halted.store(true, Ordering::SeqCst);
            }
            outcomes.push(JobOutcome { key, result });
        }
        outcomes
    }

    async fn run_job(&self, key: JobKey) -> Result<(), PipelineError> {
        self.logger.append(key, "attempt started");
        tracing::debug!(job = %key, "running job");
        let start = Instant::now();

        // Run on its own task so a panicking job fails only itself
        let job = Arc::clone(&self.job);
        let options = Arc::clone(&self.options);
        let index = key.job_index();
        let handle = tokio::spawn(async move { job.execute(index, &options).await });
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(JobError::failed(format!("job task aborted: {}", e))),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(()) => {
                self.progress.mark_complete(key)?;
                self.logger
                    .append(key, &format!("completed in {}ms", elapsed_ms));
                tracing::info!(job = %key, elapsed_ms, "job complete");
                Ok(())
            }
            Err(cause) => {
                self.logger.append(key, &format!("failed: {}", cause));
                tracing::error!(job = %key, elapsed_ms, error = %cause, "job failed");
                Err(PipelineError::JobExecutionFailed {
                    stage: key.stage,
                    index: key.index,
                    cause,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
