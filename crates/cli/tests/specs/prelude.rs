// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for running the binary against a scratch run directory.

use std::path::{Path, PathBuf};

use assert_cmd::Command;

pub const PROGRESS: &str = "tmp/progress";

/// Start building a `pindelflow` invocation.
pub fn cli() -> CliBuilder {
    CliBuilder { args: Vec::new() }
}

pub struct CliBuilder {
    args: Vec<String>,
}

impl CliBuilder {
    pub fn args<S: AsRef<str>>(mut self, args: &[S]) -> Self {
        self.args.extend(args.iter().map(|a| a.as_ref().to_string()));
        self
    }

    fn output(self) -> RunAssert {
        let output = Command::cargo_bin("pindelflow")
            .unwrap()
            .args(&self.args)
            .env("RUST_LOG", "warn")
            .output()
            .unwrap();
        RunAssert {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Run and assert exit code 0.
    pub fn passes(self) -> RunAssert {
        self.exits(0)
    }

    /// Run and assert the given exit code.
    pub fn exits(self, code: i32) -> RunAssert {
        let args = self.args.join(" ");
        let result = self.output();
        assert_eq!(
            result.code,
            Some(code),
            "pindelflow {}\nstdout:\n{}\nstderr:\n{}",
            args,
            result.stdout,
            result.stderr
        );
        result
    }
}

pub struct RunAssert {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl RunAssert {
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        assert!(
            self.stdout.contains(expected),
            "stdout missing {:?}:\n{}",
            expected,
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        assert!(
            !self.stdout.contains(unexpected),
            "stdout unexpectedly has {:?}:\n{}",
            unexpected,
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        assert!(
            self.stderr.contains(expected),
            "stderr missing {:?}:\n{}",
            expected,
            self.stderr
        );
        self
    }
}

/// Scratch run: an output directory plus a reference index and samples.
pub struct Run {
    dir: tempfile::TempDir,
}

impl Run {
    /// Run whose reference lists `sequences`.
    pub fn with_sequences(sequences: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let fai: String = sequences
            .iter()
            .map(|name| format!("{}\t1000\t10\t60\t61\n", name))
            .collect();
        std::fs::write(dir.path().join("genome.fa.fai"), fai).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn outdir(&self) -> &str {
        self.path().to_str().unwrap()
    }

    /// Write a config file and return its path.
    pub fn config(&self, content: &str) -> String {
        let path = self.path().join("pindelflow.toml");
        std::fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    /// `run` arguments for this directory, followed by `extra`.
    pub fn run_args(&self, extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--outdir".to_string(),
            self.outdir().to_string(),
            "--reference".to_string(),
            self.path().join("genome.fa").display().to_string(),
            "--tumour".to_string(),
            "tumour.bam".to_string(),
            "--normal".to_string(),
            "normal.bam".to_string(),
        ];
        args.extend(extra.iter().map(|a| a.to_string()));
        args
    }

    pub fn marker(&self, name: &str) -> PathBuf {
        self.path().join(PROGRESS).join(name)
    }

    /// Sorted marker file names.
    pub fn markers(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(self.path().join(PROGRESS)) {
            Ok(entries) => entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}
