// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline stages and job keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A name that did not match any variant of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{name}' (expected one of: {})", .expected.join(", "))]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
    pub expected: Vec<&'static str>,
}

crate::named_enum! {
    /// One named phase of the pipeline.
    ///
    /// Declaration order is the topological order: a stage may only depend
    /// on stages declared before it.
    pub enum Stage {
        /// Prepare tumour and normal inputs
        Input => "input",
        /// Split reads per reference sequence
        Split => "split",
        /// Filter split reads
        Filter => "filter",
        /// Variant detection
        Pindel => "pindel",
        /// Convert raw calls to VCF
        Pin2Vcf => "pin2vcf",
        /// Merge and flag calls
        Flag => "flag",
        /// Annotate flagged calls
        Annot => "annot",
    }
}

impl Stage {
    /// Position of this stage in the pipeline order.
    pub fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(Self::ALL.len())
    }

    /// Stages that run after this one, in order.
    pub fn downstream(&self) -> &'static [Stage] {
        let next = self.position() + 1;
        &Self::ALL[next.min(Self::ALL.len())..]
    }
}

/// Identity of one job: a stage plus a job index.
///
/// Index `0` is the single unindexed job of a stage that is not
/// parallelised; indexed jobs run from `1` to the stage's job count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    pub stage: Stage,
    pub index: u32,
}

impl JobKey {
    pub fn new(stage: Stage, index: u32) -> Self {
        Self { stage, index }
    }

    /// Key for the single job of a non-parallel stage.
    pub fn unindexed(stage: Stage) -> Self {
        Self { stage, index: 0 }
    }

    /// The index handed to the unit of work (`None` for unindexed jobs).
    pub fn job_index(&self) -> Option<u32> {
        (self.index > 0).then_some(self.index)
    }

    /// Stable file-system name, `<stage>.<index>`.
    pub fn marker_name(&self) -> String {
        format!("{}.{}", self.stage, self.index)
    }

    /// Parse a name produced by [`JobKey::marker_name`].
    pub fn parse_marker_name(name: &str) -> Option<Self> {
        let (stage, index) = name.rsplit_once('.')?;
        Some(Self {
            stage: stage.parse().ok()?,
            index: index.parse().ok()?,
        })
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.job_index() {
            Some(index) => write!(f, "{}[{}]", self.stage, index),
            None => write!(f, "{}", self.stage),
        }
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
