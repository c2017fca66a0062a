use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn main_command() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

#[test]
fn test_no_arguments_shows_usage() {
    main_command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_help_flag() {
    main_command()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("--input"));
}

#[test]
fn test_missing_input_flag_fails() {
    let dir = tempdir().unwrap();
    main_command()
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_unreadable_input_file_fails() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    main_command()
        .args(["-q", "-i"])
        .arg(dir.path().join("missing.txt"))
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read input file"));
    assert!(out.join("fetchallsrc.log").exists());
    assert!(fs::read_to_string(out.join("fetchallsrc.log"))
        .unwrap()
        .contains("cannot read input file"));
}

#[test]
fn test_empty_input_completes() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("urls.txt");
    fs::write(&input, "").unwrap();
    let out = dir.path().join("nested").join("out");
    main_command()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("[OUT] - All files saved in"));
    assert!(out.join("NotFound.txt").exists());
    assert!(out.join("fetchallsrc.log").exists());
}

#[test]
fn test_failures_do_not_change_exit_status() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("urls.txt");
    fs::write(&input, "http://127.0.0.1:1/x\nnot a url\n").unwrap();
    let out = dir.path().join("out");
    main_command()
        .arg("-q")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 2 URLs failed"));
    let recorded = fs::read_to_string(out.join("NotFound.txt")).unwrap();
    assert_eq!(recorded.lines().count(), 2);
}
