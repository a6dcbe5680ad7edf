// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline configuration file.
//!
//! ```toml
//! cpus = 4
//! exclude = ["chrM", "GL%"]
//!
//! [stage.split]
//! run = "split_reads --ref '${reference}' --seq '${sequence}' --out '${tmp}/split'"
//!
//! [stage.input]
//! run = "prep '${tumour}' '${normal}' ${index}"
//! jobs = 2
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pf_core::{Exclusions, Stage};
use pf_engine::{CommandJob, JobCountPolicy, NoopJob, PipelineError, StageRegistry, WorkUnits};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Default worker count when `--cpus` is not given
    #[serde(default)]
    pub cpus: Option<usize>,
    /// Default exclusion patterns when `--exclude` is not given
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub stage: BTreeMap<Stage, StageConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    /// Shell command template run once per job
    pub run: String,
    /// Fixed job count replacing the stage's derived count
    #[serde(default)]
    pub jobs: Option<u32>,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.cpus == Some(0) {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                message: "cpus must be at least 1".to_string(),
            });
        }
        for (stage, def) in &config.stage {
            if def.run.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    path: path.to_path_buf(),
                    message: format!("stage '{}' has an empty run command", stage),
                });
            }
        }
        Ok(config)
    }

    pub fn exclusions(&self) -> Option<Exclusions> {
        self.exclude.as_ref().map(|patterns| Exclusions::new(patterns.iter().cloned()))
    }

    /// Stage table: configured stages run their command, the rest are no-ops.
    pub fn registry(&self) -> Result<StageRegistry, PipelineError> {
        let mut builder = StageRegistry::builder();
        for stage in Stage::ALL {
            builder = match self.command(*stage) {
                Some(command) => builder.register(*stage, self.policy(*stage), Arc::new(command)),
                None => builder.stage(*stage, Arc::new(NoopJob)),
            };
        }
        builder.build()
    }

    /// Job count policy for `stage`, honouring a `jobs` override.
    fn policy(&self, stage: Stage) -> JobCountPolicy {
        match self.stage.get(&stage).and_then(|def| def.jobs) {
            Some(n) => JobCountPolicy::Fixed(n),
            None => JobCountPolicy::default_for(stage),
        }
    }

    /// Command for a configured stage, with work units from the effective policies.
    fn command(&self, stage: Stage) -> Option<CommandJob> {
        let def = self.stage.get(&stage)?;
        let units = WorkUnits::for_stage(stage, |s| self.policy(s));
        Some(CommandJob::new(stage, def.run.clone()).with_units(units))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
