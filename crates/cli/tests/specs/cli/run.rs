// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running the pipeline end to end and resuming it.

use crate::prelude::*;

const COMMANDS: &str = r#"
[stage.split]
run = "mkdir -p tmp/split && echo '${sequence}' > tmp/split/${index}.seq"

[stage.filter]
run = "mkdir -p tmp/filter && cp tmp/split/${index}.seq tmp/filter/${sequence}.txt"

[stage.pindel]
run = "cp '${artifact}' tmp/pindel.${sequence}"
"#;

#[test]
fn unconfigured_run_completes_every_stage() {
    let run = Run::with_sequences(&["chr1", "chr2", "chr3"]);

    cli()
        .args(&run.run_args(&["--cpus", "2"]))
        .passes()
        .stdout_has("input    ran 2 job(s)")
        .stdout_has("split    ran 3 job(s)")
        .stdout_has("filter   ran 3 job(s)")
        .stdout_has("pindel   no jobs")
        .stdout_has("annot    ran 1 job(s)");

    assert_eq!(
        run.markers(),
        vec![
            "annot.0", "filter.1", "filter.2", "filter.3", "flag.0", "input.1", "input.2",
            "split.1", "split.2", "split.3",
        ]
    );
    assert!(run.path().join("tmp/logs/pindelflow.log").exists());
    assert!(run.path().join("tmp/logs/split.2.log").exists());
}

#[test]
fn second_run_executes_nothing() {
    let run = Run::with_sequences(&["chr1", "chr2"]);
    cli().args(&run.run_args(&[])).passes();

    cli()
        .args(&run.run_args(&[]))
        .passes()
        .stdout_has("input    already complete (2 job(s))")
        .stdout_has("split    already complete (2 job(s))")
        .stdout_lacks("ran ");
}

#[test]
fn configured_commands_drive_derived_counts() {
    let run = Run::with_sequences(&["chr1", "chrM", "chr2", "GL000192.1"]);
    let config = run.config(COMMANDS);

    cli()
        .args(&run.run_args(&["--config", &config, "--exclude", "chrM,GL%", "--cpus", "3"]))
        .passes()
        .stdout_has("split    ran 2 job(s)")
        .stdout_has("pindel   ran 2 job(s)")
        .stdout_has("pin2vcf  ran 2 job(s)");

    let first = std::fs::read_to_string(run.path().join("tmp/filter/chr1.txt")).unwrap();
    assert_eq!(first, "chr1\n");
    let second = std::fs::read_to_string(run.path().join("tmp/pindel.chr2")).unwrap();
    assert_eq!(second, "chr2\n");
    assert!(run.path().join("tmp/logs/split.1.out").exists());
}

#[test]
fn artifact_stage_works_on_surviving_filter_output() {
    let run = Run::with_sequences(&["chr1", "chr2", "chr3"]);
    let config = run.config(
        r#"
[stage.filter]
run = "mkdir -p tmp/filter && test '${sequence}' != chr3 || echo kept > tmp/filter/${sequence}.txt"

[stage.pindel]
run = "cp '${artifact}' tmp/pindel.${sequence}"
"#,
    );

    cli()
        .args(&run.run_args(&["--config", &config]))
        .passes()
        .stdout_has("filter   ran 3 job(s)")
        .stdout_has("pindel   ran 1 job(s)");

    let called = std::fs::read_to_string(run.path().join("tmp/pindel.chr3")).unwrap();
    assert_eq!(called, "kept\n");
    assert!(!run.path().join("tmp/pindel.chr1").exists());
}

#[test]
fn failed_job_blocks_later_stages_and_resumes() {
    let run = Run::with_sequences(&["chr1"]);
    let config = run.config(
        r#"
[stage.input]
run = "test ${index} != 2 || test -f allow"
"#,
    );

    cli()
        .args(&run.run_args(&["--config", &config]))
        .exits(1)
        .stderr_has("stage 'input' failed (1 job(s): 2)")
        .stderr_has("input job 2 failed");
    assert_eq!(run.markers(), vec!["input.1"]);

    std::fs::write(run.path().join("allow"), "").unwrap();
    cli()
        .args(&run.run_args(&["--config", &config]))
        .passes()
        .stdout_has("input    ran 1 job(s), 1 already complete")
        .stdout_has("split    ran 1 job(s)");
}

#[test]
fn single_job_of_a_stage() {
    let run = Run::with_sequences(&["chr1"]);

    cli()
        .args(&run.run_args(&["--process", "input", "--index", "2"]))
        .passes()
        .stdout_has("input    ran 1 job(s)");

    assert_eq!(run.markers(), vec!["input.2"]);
}

#[test]
fn stage_before_its_dependency_fails() {
    let run = Run::with_sequences(&["chr1"]);

    cli()
        .args(&run.run_args(&["--process", "split"]))
        .exits(1)
        .stderr_has("unavailable until 'input' has completed");
    assert!(run.markers().is_empty());
}

#[test]
fn index_without_stage_is_rejected() {
    let run = Run::with_sequences(&["chr1"]);

    cli()
        .args(&run.run_args(&["--index", "2"]))
        .exits(2)
        .stderr_has("invalid options");
    assert!(!run.marker("input.1").exists());
    assert!(!run.path().join(PROGRESS).exists());
    assert!(!run.path().join("tmp/logs").exists());
}

#[test]
fn index_on_single_job_stage_is_rejected() {
    let run = Run::with_sequences(&["chr1"]);

    cli()
        .args(&run.run_args(&["--process", "flag", "--index", "1"]))
        .exits(2)
        .stderr_has("does not accept a job index");
    assert!(run.markers().is_empty());
}

#[test]
fn unknown_stage_is_rejected() {
    let run = Run::with_sequences(&["chr1"]);

    cli()
        .args(&run.run_args(&["--process", "assemble"]))
        .exits(2)
        .stderr_has("unknown Stage 'assemble'");
}

#[test]
fn index_past_job_count_is_rejected() {
    let run = Run::with_sequences(&["chr1"]);

    cli()
        .args(&run.run_args(&["--process", "input", "--index", "3"]))
        .exits(2)
        .stderr_has("out of range for 'input' (1..=2)");
    assert!(run.markers().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let run = Run::with_sequences(&["chr1"]);
    let config = run.config("[stage.assemble]\nrun = \"true\"\n");

    cli()
        .args(&run.run_args(&["--config", &config]))
        .exits(2)
        .stderr_has("invalid config");
    assert!(!run.path().join(PROGRESS).exists());
}
