// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pf-engine: Stage scheduling for the pindelflow pipeline

pub mod command;
pub mod count;
mod error;
pub mod job;
pub mod job_logger;
pub mod planner;
pub mod registry;
pub mod scheduler;
pub mod template;

#[cfg(test)]
mod test_helpers;

pub use command::CommandJob;
pub use count::{JobCountPolicy, JobCountResolver, WorkUnits};
pub use error::PipelineError;
pub use job::{NoopJob, StageJob};
pub use job_logger::JobLogger;
pub use planner::{PlanRequest, RunPlan, RunPlanner, StagePlan};
pub use registry::{StageDef, StageRegistry, StageRegistryBuilder};
pub use scheduler::{Scheduler, StageReport};
