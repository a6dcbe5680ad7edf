// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory progress store.

use crate::{ProgressError, ProgressStore};
use parking_lot::Mutex;
use pf_core::{JobKey, Stage};
use std::collections::BTreeSet;

/// Progress store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: Mutex<BTreeSet<JobKey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with completed jobs.
    pub fn with_completed(keys: impl IntoIterator<Item = JobKey>) -> Self {
        Self {
            keys: Mutex::new(keys.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }
}

impl ProgressStore for MemoryStore {
    fn is_complete(&self, key: JobKey) -> Result<bool, ProgressError> {
        Ok(self.keys.lock().contains(&key))
    }

    fn mark_complete(&self, key: JobKey) -> Result<(), ProgressError> {
        self.keys.lock().insert(key);
        Ok(())
    }

    fn completed(&self, stage: Stage) -> Result<BTreeSet<u32>, ProgressError> {
        Ok(self
            .keys
            .lock()
            .iter()
            .filter(|k| k.stage == stage)
            .map(|k| k.index)
            .collect())
    }

    fn clear(&self, stage: Option<Stage>) -> Result<usize, ProgressError> {
        let mut keys = self.keys.lock();
        let before = keys.len();
        match stage {
            Some(stage) => keys.retain(|k| k.stage != stage),
            None => keys.clear(),
        }
        Ok(before - keys.len())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
