use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn trace_file(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

#[test]
fn bimodal_reports_command_and_final_table() {
    let trace = trace_file("0x400 t\n0x400 t\n0x400 n\n");
    let mut cmd = Command::cargo_bin("bp").unwrap();
    cmd.arg("bimodal").arg("4").arg(trace.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("COMMAND\n"))
        .stdout(predicate::str::contains("FINAL BIMODAL CONTENTS"))
        .stdout(predicate::str::contains("number of predictions:\t\t3"));
}

#[test]
fn gshare_accepts_zero_width_history() {
    let trace = trace_file("0x0 t\n0x4 n\n");
    let mut cmd = Command::cargo_bin("bp").unwrap();
    cmd.arg("gshare").arg("4").arg("0").arg(trace.path());
    cmd.assert().success().stdout(predicate::str::contains("FINAL GSHARE CONTENTS"));
}

#[test]
fn hybrid_prints_chooser_then_gshare_then_bimodal() {
    let trace = trace_file("0x0 t\n0x4 n\n0x8 t\n");
    let mut cmd = Command::cargo_bin("bp").unwrap();
    cmd.arg("hybrid").arg("2").arg("4").arg("2").arg("4").arg(trace.path());
    let output = cmd.output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let chooser_pos = stdout.find("FINAL CHOOSER CONTENTS").unwrap();
    let gshare_pos = stdout.find("FINAL GSHARE CONTENTS").unwrap();
    let bimodal_pos = stdout.find("FINAL BIMODAL CONTENTS").unwrap();
    assert!(chooser_pos < gshare_pos);
    assert!(gshare_pos < bimodal_pos);
}

#[test]
fn unopenable_trace_fails() {
    let mut cmd = Command::cargo_bin("bp").unwrap();
    cmd.arg("bimodal").arg("4").arg("/nonexistent/path/to/trace");
    cmd.assert().failure();
}
