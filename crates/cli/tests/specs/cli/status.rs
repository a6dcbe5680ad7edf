// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress reporting.

use crate::prelude::*;

#[test]
fn status_before_any_run() {
    let run = Run::with_sequences(&["chr1"]);

    cli()
        .args(&["status", "--outdir", run.outdir()])
        .passes()
        .stdout_has("No progress recorded");
}

#[test]
fn status_after_partial_run() {
    let run = Run::with_sequences(&["chr1", "chr2", "chr3"]);
    cli().args(&run.run_args(&["--process", "input"])).passes();
    cli().args(&run.run_args(&["--process", "split", "--index", "3"])).passes();

    cli()
        .args(&["status", "--outdir", run.outdir()])
        .passes()
        .stdout_has("input    2 complete (1-2)")
        .stdout_has("split    1 complete (3)")
        .stdout_has("flag     -");
}

#[test]
fn status_as_json() {
    let run = Run::with_sequences(&["chr1"]);
    cli().args(&run.run_args(&[])).passes();

    let result = cli()
        .args(&["status", "--outdir", run.outdir(), "--output", "json"])
        .passes();

    let json: serde_json::Value = serde_json::from_str(result.stdout()).unwrap();
    let stages = json["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 7);
    assert_eq!(stages[0]["stage"], "input");
    assert_eq!(stages[0]["completed"], serde_json::json!([1, 2]));
    assert_eq!(stages[6]["stage"], "annot");
    assert_eq!(stages[6]["completed"], serde_json::json!([0]));
}
