// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage registration table.
//!
//! Every stage of the pipeline is mapped to its unit of work and job-count
//! policy when the process starts. Building the table fails if any stage
//! is missing, so a run never discovers a gap halfway through.

use crate::count::JobCountPolicy;
use crate::error::PipelineError;
use crate::job::StageJob;
use pf_core::Stage;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registration for one stage.
#[derive(Clone)]
pub struct StageDef {
    pub stage: Stage,
    pub policy: JobCountPolicy,
    pub job: Arc<dyn StageJob>,
}

impl std::fmt::Debug for StageDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageDef")
            .field("stage", &self.stage)
            .field("policy", &self.policy)
            .field("job", &self.job.describe())
            .finish()
    }
}

/// Complete, validated mapping from stage to [`StageDef`].
#[derive(Debug)]
pub struct StageRegistry {
    defs: BTreeMap<Stage, StageDef>,
}

impl StageRegistry {
    pub fn builder() -> StageRegistryBuilder {
        StageRegistryBuilder::default()
    }

    pub fn get(&self, stage: Stage) -> Result<&StageDef, PipelineError> {
        self.defs
            .get(&stage)
            .ok_or(PipelineError::MissingHandler { stage })
    }

    pub fn policy(&self, stage: Stage) -> Result<&JobCountPolicy, PipelineError> {
        self.get(stage).map(|def| &def.policy)
    }

    /// Registered stages in pipeline order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.defs.keys().copied()
    }
}

#[derive(Default)]
pub struct StageRegistryBuilder {
    defs: BTreeMap<Stage, StageDef>,
}

impl StageRegistryBuilder {
    /// Register a stage with an explicit job-count policy.
    ///
    /// A later registration for the same stage replaces the earlier one.
    pub fn register(
        mut self,
        stage: Stage,
        policy: JobCountPolicy,
        job: Arc<dyn StageJob>,
    ) -> Self {
        self.defs.insert(stage, StageDef { stage, policy, job });
        self
    }

    /// Register a stage with its default job-count policy.
    pub fn stage(self, stage: Stage, job: Arc<dyn StageJob>) -> Self {
        self.register(stage, JobCountPolicy::default_for(stage), job)
    }

    /// Validate and build the table.
    ///
    /// Fails if any stage lacks a handler, or if a stage derives its job
    /// count from itself or a later stage.
    pub fn build(self) -> Result<StageRegistry, PipelineError> {
        for stage in Stage::ALL {
            let def = self
                .defs
                .get(stage)
                .ok_or(PipelineError::MissingHandler { stage: *stage })?;
            if let Some(dependency) = def.policy.dependency() {
                if dependency >= *stage {
                    return Err(PipelineError::InvalidDependency {
                        stage: *stage,
                        dependency,
                    });
                }
            }
        }
        Ok(StageRegistry { defs: self.defs })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
