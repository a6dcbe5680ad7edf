// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help and usage output.

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("run")
        .stdout_has("status")
        .stdout_has("clean");
}

#[test]
fn run_help_lists_options() {
    cli()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--outdir")
        .stdout_has("--process")
        .stdout_has("--index")
        .stdout_has("--fail-fast");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}

#[test]
fn missing_required_option_is_usage_error() {
    cli()
        .args(&["run", "--outdir", "/tmp/nowhere"])
        .exits(2)
        .stderr_has("--reference");
}

#[test]
fn zero_cpus_is_usage_error() {
    let run = Run::with_sequences(&["chr1"]);
    cli().args(&run.run_args(&["--cpus", "0"])).exits(2);
}
