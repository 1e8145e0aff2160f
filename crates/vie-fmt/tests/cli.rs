use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

fn vie_fmt() -> Command {
    Command::cargo_bin("vie-fmt").unwrap()
}

#[test]
fn prints_formatted_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.vie");
    fs::write(&path, "{{name}}\n{%  if  a %}x{%   end  %}\n").unwrap();

    vie_fmt()
        .arg(&path)
        .assert()
        .success()
        .stdout("{{ name }}\n{% if a %}x{% end %}\n");
}

#[test]
fn check_reports_unformatted_files() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.vie");
    let bad = dir.path().join("bad.vie");
    fs::write(&good, "{{ a ~ b }}\r\n").unwrap();
    fs::write(&bad, "{{a~b}}").unwrap();

    vie_fmt()
        .arg("--check")
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("good.vie: ok"));

    vie_fmt()
        .arg("--check")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.vie: not formatted"));
}

#[test]
fn write_rewrites_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.vie");
    fs::write(&path, "{{ x|upper }}").unwrap();

    vie_fmt().arg("--write").arg(&path).assert().success().stdout("");
    assert_eq!(fs::read_to_string(&path).unwrap(), "{{ x | upper }}");
}

#[test]
fn parse_errors_fail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.vie");
    fs::write(&path, "{{ x").unwrap();

    vie_fmt()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("t.vie:1:"));
}
