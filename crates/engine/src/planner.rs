// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns operator directives into an ordered stage plan.

use crate::error::PipelineError;
use crate::registry::StageRegistry;
use pf_core::{RunOptions, Stage};

/// Operator directives: which stage, and which job of it, to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanRequest {
    pub process: Option<Stage>,
    pub index: Option<u32>,
}

impl PlanRequest {
    /// Parse raw directives; an unknown stage name is an invalid option.
    pub fn parse(process: Option<&str>, index: Option<u32>) -> Result<Self, PipelineError> {
        let process = process
            .map(|name| name.parse::<Stage>())
            .transpose()
            .map_err(|e| PipelineError::InvalidOptionCombination(e.to_string()))?;
        Ok(Self { process, index })
    }
}

impl From<&RunOptions> for PlanRequest {
    fn from(options: &RunOptions) -> Self {
        Self {
            process: options.process,
            index: options.index,
        }
    }
}

/// One stage to run, optionally narrowed to a single job index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    pub stage: Stage,
    pub index: Option<u32>,
}

/// Ordered stages for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub stages: Vec<StagePlan>,
}

impl RunPlan {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Validates directives against the registered stages.
pub struct RunPlanner<'a> {
    registry: &'a StageRegistry,
}

impl<'a> RunPlanner<'a> {
    pub fn new(registry: &'a StageRegistry) -> Self {
        Self { registry }
    }

    pub fn plan(&self, request: &PlanRequest) -> Result<RunPlan, PipelineError> {
        match (request.process, request.index) {
            (None, Some(_)) => Err(PipelineError::InvalidOptionCombination(
                "a job index requires a stage restriction".to_string(),
            )),
            (_, Some(0)) => Err(PipelineError::InvalidOptionCombination(
                "job indices start at 1".to_string(),
            )),
            (None, None) => Ok(RunPlan {
                stages: self
                    .registry
                    .stages()
                    .map(|stage| StagePlan { stage, index: None })
                    .collect(),
            }),
            (Some(stage), index) => {
                if index.is_some() && !self.registry.policy(stage)?.is_parallel() {
                    return Err(PipelineError::IndexNotApplicable { stage });
                }
                Ok(RunPlan {
                    stages: vec![StagePlan { stage, index }],
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
