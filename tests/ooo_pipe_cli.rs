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
fn footer_reports_dynamic_instruction_count_and_cycles() {
    let trace = trace_file("0x0 0 -1 -1 -1\n0x4 0 -1 -1 -1\n0x8 0 -1 -1 -1\n");
    let mut cmd = Command::cargo_bin("ooo_pipe").unwrap();
    cmd.arg("4").arg("4").arg("2").arg(trace.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("# Dynamic Instruction Count    = 3"))
        .stdout(predicate::str::contains("# === Simulator Command ========="));
}

#[test]
fn empty_trace_retires_nothing() {
    let trace = trace_file("");
    let mut cmd = Command::cargo_bin("ooo_pipe").unwrap();
    cmd.arg("4").arg("4").arg("2").arg(trace.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("# Dynamic Instruction Count    = 0"))
        .stdout(predicate::str::contains("# Instructions Per Cycle (IPC) = 0.00"));
}

#[test]
fn json_flag_emits_a_trailing_summary_line() {
    let trace = trace_file("0x0 0 -1 -1 -1\n");
    let mut cmd = Command::cargo_bin("ooo_pipe").unwrap();
    cmd.arg("4").arg("4").arg("1").arg(trace.path()).arg("--json");
    cmd.assert().success().stdout(predicate::str::contains("\"dynamic_instruction_count\":1"));
}

#[test]
fn missing_trace_file_fails_with_usage_exit_code() {
    let mut cmd = Command::cargo_bin("ooo_pipe").unwrap();
    cmd.arg("4").arg("4").arg("1").arg("/nonexistent/path/to/trace");
    cmd.assert().failure();
}
