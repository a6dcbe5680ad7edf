// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests.

use crate::count::JobCountPolicy;
use crate::job::StageJob;
use crate::registry::{StageRegistry, StageRegistryBuilder};
use async_trait::async_trait;
use parking_lot::Mutex;
use pf_core::{JobError, RunOptions, Stage};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Job that records every invocation, optionally failing chosen indices.
#[derive(Default)]
pub struct RecordingJob {
    calls: Mutex<Vec<Option<u32>>>,
    fail: Mutex<HashSet<Option<u32>>>,
    delay: Option<Duration>,
    running: AtomicUsize,
    peak: AtomicUsize,
    panic_on: Option<u32>,
}

impl RecordingJob {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Each invocation sleeps so concurrent jobs overlap.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn panicking(index: u32) -> Arc<Self> {
        Arc::new(Self {
            panic_on: Some(index),
            ..Self::default()
        })
    }

    pub fn fail_on(&self, index: Option<u32>) {
        self.fail.lock().insert(index);
    }

    pub fn succeed_on(&self, index: Option<u32>) {
        self.fail.lock().remove(&index);
    }

    /// Invocations so far, sorted.
    pub fn calls(&self) -> Vec<Option<u32>> {
        let mut calls = self.calls.lock().clone();
        calls.sort();
        calls
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Highest number of simultaneous invocations observed.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StageJob for RecordingJob {
    async fn execute(&self, index: Option<u32>, _options: &RunOptions) -> Result<(), JobError> {
        self.calls.lock().push(index);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.running.fetch_sub(1, Ordering::SeqCst);

        if self.panic_on.is_some() && self.panic_on == index {
            panic!("job {:?} exploded", index);
        }
        if self.fail.lock().contains(&index) {
            return Err(JobError::failed(format!("index {:?} failed", index)));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}

/// One recording job per stage, so tests can see which stages ran.
pub struct Stages {
    jobs: Vec<(Stage, Arc<RecordingJob>)>,
}

impl Stages {
    pub fn new() -> Self {
        Self {
            jobs: Stage::ALL.iter().map(|s| (*s, RecordingJob::new())).collect(),
        }
    }

    pub fn with(mut self, stage: Stage, job: Arc<RecordingJob>) -> Self {
        for entry in &mut self.jobs {
            if entry.0 == stage {
                entry.1 = Arc::clone(&job);
            }
        }
        self
    }

    pub fn job(&self, stage: Stage) -> Arc<RecordingJob> {
        self.jobs
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, j)| Arc::clone(j))
            .unwrap()
    }

    /// Registry with the default policies, overridden by `policies`.
    pub fn registry(&self, policies: &[(Stage, JobCountPolicy)]) -> Arc<StageRegistry> {
        let mut builder = StageRegistryBuilder::default();
        for (stage, job) in &self.jobs {
            let policy = policies
                .iter()
                .find(|(s, _)| s == stage)
                .map(|(_, p)| p.clone())
                .unwrap_or_else(|| JobCountPolicy::default_for(*stage));
            builder = builder.register(*stage, policy, Arc::clone(job) as Arc<dyn StageJob>);
        }
        Arc::new(builder.build().unwrap())
    }
}

/// Write `<outdir>/genome.fa.fai` listing the given sequence names.
pub fn write_fai(outdir: &std::path::Path, names: &[&str]) {
    let content: String = names
        .iter()
        .enumerate()
        .map(|(i, n)| format!("{}\t{}\t{}\t60\t61\n", n, 1000 * (i + 1), 10 + i))
        .collect();
    std::fs::write(outdir.join("genome.fa.fai"), content).unwrap();
}
