// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clearing markers to force jobs to rerun.

use crate::prelude::*;

#[test]
fn clean_one_stage_then_rerun_repeats_it() {
    let run = Run::with_sequences(&["chr1", "chr2"]);
    cli().args(&run.run_args(&[])).passes();

    cli()
        .args(&["clean", "--outdir", run.outdir(), "--process", "split"])
        .passes()
        .stdout_has("Removed 2 marker(s) for 'split'");
    assert!(!run.marker("split.1").exists());
    assert!(run.marker("input.1").exists());

    cli()
        .args(&run.run_args(&[]))
        .passes()
        .stdout_has("split    ran 2 job(s)")
        .stdout_has("filter   already complete (2 job(s))");
}

#[test]
fn clean_everything() {
    let run = Run::with_sequences(&["chr1"]);
    cli().args(&run.run_args(&[])).passes();

    cli()
        .args(&["clean", "--outdir", run.outdir()])
        .passes()
        .stdout_has("Removed 6 marker(s)");
    assert!(run.markers().is_empty());
}

#[test]
fn clean_unknown_stage_is_usage_error() {
    let run = Run::with_sequences(&["chr1"]);

    cli()
        .args(&["clean", "--outdir", run.outdir(), "--process", "nope"])
        .exits(2);
}
