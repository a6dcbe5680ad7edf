// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job counts per stage.
//!
//! Some stages have a count fixed by the pipeline topology; others derive it
//! from state left behind by an earlier stage. Derived counts are only
//! available once that earlier stage is fully complete, and every count is
//! memoized for the rest of the run.

use crate::error::PipelineError;
use crate::registry::StageRegistry;
use parking_lot::Mutex;
use pf_core::{JobKey, RunOptions, Stage};
use pf_storage::ProgressStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How a stage's job count is determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobCountPolicy {
    /// Not parallelised: one unindexed job
    Single,
    /// Constant count (`Fixed(0)` behaves like [`JobCountPolicy::Single`])
    Fixed(u32),
    /// One job per reference sequence in `<reference>.fai` that is not excluded
    EligibleSequences { after: Stage },
    /// One job per `*.<extension>` file under `<outdir>/<dir>`
    Artifacts {
        after: Stage,
        dir: PathBuf,
        extension: String,
    },
    /// Same count as another stage
    SameAs(Stage),
}

impl JobCountPolicy {
    /// Default policy for each stage of the pipeline.
    pub fn default_for(stage: Stage) -> Self {
        match stage {
            // tumour and normal
            Stage::Input => Self::Fixed(2),
            Stage::Split => Self::EligibleSequences {
                after: Stage::Input,
            },
            Stage::Filter => Self::EligibleSequences {
                after: Stage::Split,
            },
            Stage::Pindel => Self::Artifacts {
                after: Stage::Filter,
                dir: PathBuf::from("tmp").join("filter"),
                extension: "txt".to_string(),
            },
            Stage::Pin2Vcf => Self::SameAs(Stage::Pindel),
            Stage::Flag | Stage::Annot => Self::Single,
        }
    }

    /// False if the stage runs a single unindexed job (declared maximum 0).
    pub fn is_parallel(&self) -> bool {
        match self {
            Self::Single => false,
            Self::Fixed(n) => *n > 0,
            _ => true,
        }
    }

    /// Stage whose completion this count depends on.
    pub fn dependency(&self) -> Option<Stage> {
        match self {
            Self::Single | Self::Fixed(_) => None,
            Self::EligibleSequences { after } | Self::Artifacts { after, .. } => Some(*after),
            Self::SameAs(stage) => Some(*stage),
        }
    }
}

/// Keys of every job a stage requires, given its resolved count.
pub fn required_keys(stage: Stage, policy: &JobCountPolicy, count: u32) -> Vec<JobKey> {
    if policy.is_parallel() {
        (1..=count).map(|i| JobKey::new(stage, i)).collect()
    } else {
        vec![JobKey::unindexed(stage)]
    }
}

/// Resolves and memoizes job counts for one run.
pub struct JobCountResolver<P> {
    registry: Arc<StageRegistry>,
    progress: Arc<P>,
    options: Arc<RunOptions>,
    counts: Mutex<HashMap<Stage, u32>>,
}

impl<P: ProgressStore> JobCountResolver<P> {
    pub fn new(registry: Arc<StageRegistry>, progress: Arc<P>, options: Arc<RunOptions>) -> Self {
        Self {
            registry,
            progress,
            options,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Job count for `stage`; `0` for non-parallel stages.
    pub fn resolve(&self, stage: Stage) -> Result<u32, PipelineError> {
        if let Some(count) = self.counts.lock().get(&stage) {
            return Ok(*count);
        }

        let policy = self.registry.policy(stage)?;
        if let Some(dependency) = policy.dependency() {
            if !self.is_stage_complete(dependency)? {
                return Err(PipelineError::JobCountUnavailable { stage, dependency });
            }
        }

        let count = match policy {
            JobCountPolicy::Single => 0,
            JobCountPolicy::Fixed(n) => *n,
            JobCountPolicy::EligibleSequences { .. } => self.count_sequences(stage)?,
            JobCountPolicy::Artifacts { dir, extension, .. } => {
                count_artifacts(stage, &self.options.outdir.join(dir), extension)?
            }
            JobCountPolicy::SameAs(other) => self.resolve(*other)?,
        };

        tracing::debug!(%stage, count, "resolved job count");
        // First resolution wins so the value stays stable for the run
        Ok(*self.counts.lock().entry(stage).or_insert(count))
    }

    /// True if every job `stage` requires has a completion marker.
    pub fn is_stage_complete(&self, stage: Stage) -> Result<bool, PipelineError> {
        let count = self.resolve(stage)?;
        let policy = self.registry.policy(stage)?;
        for key in required_keys(stage, policy, count) {
            if !self.progress.is_complete(key)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn count_sequences(&self, stage: Stage) -> Result<u32, PipelineError> {
        let path = self.options.reference_index();
        let content =
            std::fs::read_to_string(&path).map_err(|source| PipelineError::CountSource {
                stage,
                path: path.clone(),
                source,
            })?;
        let eligible = eligible_sequences(&content, &self.options);
        Ok(eligible.len() as u32)
    }
}

/// Sequence names from a reference index, minus excluded ones.
///
/// The first tab-separated column of each non-blank line is the name.
pub fn eligible_sequences<'a>(fai: &'a str, options: &RunOptions) -> Vec<&'a str> {
    fai.lines()
        .filter_map(|line| line.split('\t').next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| !options.exclude.excludes(name))
        .collect()
}

/// What job `k` of a stage works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnits {
    /// Nothing beyond the index itself
    None,
    /// The `k`-th eligible reference sequence
    Sequences,
    /// The `k`-th `*.<extension>` file under `<outdir>/<dir>`, by file name
    Artifacts { dir: PathBuf, extension: String },
}

impl WorkUnits {
    /// Units behind `stage`'s indices, following `SameAs` links.
    pub fn for_stage(stage: Stage, policy_of: impl Fn(Stage) -> JobCountPolicy) -> Self {
        let mut policy = policy_of(stage);
        // Registries only accept links to earlier stages, so this terminates
        for _ in 0..Stage::ALL.len() {
            match policy {
                JobCountPolicy::SameAs(other) => policy = policy_of(other),
                JobCountPolicy::EligibleSequences { .. } => return Self::Sequences,
                JobCountPolicy::Artifacts { dir, extension, .. } => {
                    return Self::Artifacts { dir, extension }
                }
                JobCountPolicy::Single | JobCountPolicy::Fixed(_) => return Self::None,
            }
        }
        Self::None
    }
}

/// `*.<extension>` files in `dir`, sorted by file name.
///
/// A missing directory has no artifacts. Job `k` of an artifact stage
/// works on element `k - 1`.
pub fn artifact_paths(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        // Upstream completed without producing anything
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn count_artifacts(stage: Stage, dir: &Path, extension: &str) -> Result<u32, PipelineError> {
    let paths = artifact_paths(dir, extension).map_err(|source| PipelineError::CountSource {
        stage,
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(paths.len() as u32)
}

#[cfg(test)]
#[path = "count_tests.rs"]
mod tests;
