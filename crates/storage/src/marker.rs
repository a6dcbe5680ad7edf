// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Marker-file progress store.
//!
//! Each completed job is a file named `<stage>.<index>` in the progress
//! directory. A marker is written to a uniquely named temp file and renamed
//! into place, so readers never see a partial marker and concurrent writers
//! of the same key simply replace each other.

use crate::{ProgressError, ProgressStore};
use pf_core::{JobKey, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const TMP_SUFFIX: &str = ".tmp";

/// Contents of a marker file. Informational only: presence is what counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub stage: Stage,
    pub index: u32,
    pub completed_at: String,
}

/// Progress store backed by one marker file per completed job.
#[derive(Debug)]
pub struct MarkerStore {
    dir: PathBuf,
    tmp_seq: AtomicU64,
}

impl MarkerStore {
    /// Open the store, creating the progress directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ProgressError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| ProgressError::Io {
            action: "create progress directory",
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            tmp_seq: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the marker file for a job.
    pub fn marker_path(&self, key: JobKey) -> PathBuf {
        self.dir.join(key.marker_name())
    }

    /// Read back a marker's record, if present and readable.
    pub fn read(&self, key: JobKey) -> Option<MarkerRecord> {
        let content = std::fs::read_to_string(self.marker_path(key)).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn markers(&self) -> Result<Vec<(JobKey, PathBuf)>, ProgressError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| ProgressError::Io {
            action: "read progress directory",
            path: self.dir.clone(),
            source,
        })?;

        let mut markers = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.ends_with(TMP_SUFFIX) {
                continue;
            }
            match JobKey::parse_marker_name(name) {
                Some(key) => markers.push((key, path)),
                None => {
                    tracing::warn!(path = %path.display(), "ignoring unrecognised progress file");
                }
            }
        }
        Ok(markers)
    }

    /// Temp files left by a writer that died between write and rename.
    ///
    /// Temp names are `.<stage>.<index>.<pid>.<seq>.tmp`.
    fn stray_temp_files(&self, stage: Option<Stage>) -> Result<Vec<PathBuf>, ProgressError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| ProgressError::Io {
            action: "read progress directory",
            path: self.dir.clone(),
            source,
        })?;

        let prefix = stage.map(|s| format!(".{}.", s));
        Ok(entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    return false;
                };
                name.starts_with('.')
                    && name.ends_with(TMP_SUFFIX)
                    && prefix.as_deref().is_none_or(|p| name.starts_with(p))
            })
            .collect())
    }
}

fn remove_if_present(path: PathBuf, action: &'static str) -> Result<bool, ProgressError> {
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(true),
        // Removed by someone else in the meantime
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ProgressError::Io {
            action,
            path,
            source,
        }),
    }
}

impl ProgressStore for MarkerStore {
    fn is_complete(&self, key: JobKey) -> Result<bool, ProgressError> {
        let path = self.marker_path(key);
        path.try_exists().map_err(|source| ProgressError::Io {
            action: "check marker",
            path,
            source,
        })
    }

    fn mark_complete(&self, key: JobKey) -> Result<(), ProgressError> {
        let record = MarkerRecord {
            stage: key.stage,
            index: key.index,
            completed_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        };
        let json = serde_json::to_string(&record)
            .map_err(|source| ProgressError::Encode { key, source })?;

        let path = self.marker_path(key);
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp_path = self.dir.join(format!(
            ".{}.{}.{}{}",
            key.marker_name(),
            std::process::id(),
            seq,
            TMP_SUFFIX
        ));

        std::fs::write(&tmp_path, json.as_bytes()).map_err(|source| ProgressError::Io {
            action: "write marker",
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|source| {
            let _ = std::fs::remove_file(&tmp_path);
            ProgressError::Io {
                action: "commit marker",
                path: path.clone(),
                source,
            }
        })?;

        tracing::debug!(job = %key, "marked complete");
        Ok(())
    }

    fn completed(&self, stage: Stage) -> Result<BTreeSet<u32>, ProgressError> {
        Ok(self
            .markers()?
            .into_iter()
            .filter(|(key, _)| key.stage == stage)
            .map(|(key, _)| key.index)
            .collect())
    }

    fn clear(&self, stage: Option<Stage>) -> Result<usize, ProgressError> {
        let mut removed = 0;
        for (key, path) in self.markers()? {
            if stage.is_some_and(|s| s != key.stage) {
                continue;
            }
            if remove_if_present(path, "remove marker")? {
                removed += 1;
            }
        }

        let mut strays = 0;
        for path in self.stray_temp_files(stage)? {
            if remove_if_present(path, "remove temp marker")? {
                strays += 1;
            }
        }
        if strays > 0 {
            tracing::info!(strays, "removed interrupted marker writes");
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "marker_tests.rs"]
mod tests;
