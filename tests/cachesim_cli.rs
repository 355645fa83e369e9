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
fn single_level_reports_configuration_and_measurements() {
    let trace = trace_file("r 0x0\nw 0x0\nr 0x100\n");
    let mut cmd = Command::cargo_bin("cachesim").unwrap();
    cmd.args(["16", "1024", "2", "0", "0", "0", "0"]).arg(trace.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("===== Simulator configuration ====="))
        .stdout(predicate::str::contains("BLOCKSIZE:  16"))
        .stdout(predicate::str::contains("===== L1 contents ====="))
        .stdout(predicate::str::contains("===== Measurements ====="));
}

#[test]
fn two_level_hierarchy_counts_l2_traffic() {
    let trace = trace_file("r 0x0\nr 0x800\n");
    let mut cmd = Command::cargo_bin("cachesim").unwrap();
    cmd.args(["16", "256", "1", "2048", "2", "0", "0"]).arg(trace.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("===== L2 contents ====="))
        .stdout(predicate::str::contains("h. L2 reads (demand):          2"));
}

#[test]
fn prefetching_suppresses_subsequent_misses() {
    // Three sequential accesses: only the first is a real L1 miss, the
    // other two are absorbed as stream-buffer hits (each of which still
    // advances the buffer and counts as an additional prefetch).
    let trace = trace_file("r 0x0\nr 0x10\nr 0x20\n");
    let mut cmd = Command::cargo_bin("cachesim").unwrap();
    cmd.args(["16", "1024", "1", "0", "0", "1", "4"]).arg(trace.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("===== Stream Buffer(s) contents ====="))
        .stdout(predicate::str::contains("b. L1 read misses:             1"))
        .stdout(predicate::str::contains("g. L1 prefetches:              6"));
}

#[test]
fn unopenable_trace_fails() {
    let mut cmd = Command::cargo_bin("cachesim").unwrap();
    cmd.args(["16", "1024", "2", "0", "0", "0", "0", "/nonexistent/path"]);
    cmd.assert().failure();
}
