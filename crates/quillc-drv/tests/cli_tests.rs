//! CLI-level integration tests for the `quillc` binary, driven through
//! `assert_cmd` the way the teacher's own driver crate tests its CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::TempDir;

fn quillc() -> Command {
    Command::cargo_bin("quillc").expect("quillc binary should build")
}

fn write_source(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::File::create(&path)
        .unwrap()
        .write_all(contents.as_bytes())
        .unwrap();
    path
}

#[test]
fn help_lists_the_binary_name() {
    quillc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("quillc"));
}

#[test]
fn compiles_a_file_and_writes_ir_to_the_requested_output() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "hello.quill", "fn main():void {\n    printnum(1+2)\n}\n");
    let output = dir.path().join("hello.ll");

    quillc()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let ir = std::fs::read_to_string(&output).unwrap();
    assert!(ir.contains("@printnum"));
}

#[test]
fn writes_ir_to_stdout_when_no_output_path_given() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "hello.quill", "fn main():void {\n    printnum(1)\n}\n");

    quillc()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("define"));
}

#[test]
fn parse_error_exits_nonzero_and_reports_the_offending_line() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "broken.quill", "let x : number = \n");

    quillc()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn target_flag_selects_the_requested_triple() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "hello.quill", "fn main():void {\n    printnum(1)\n}\n");
    let output = dir.path().join("hello.ll");

    quillc()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--target")
        .arg("win32")
        .assert()
        .success();

    let ir = std::fs::read_to_string(&output).unwrap();
    assert!(ir.contains("i686-pc-windows-msvc"));
}
