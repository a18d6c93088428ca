use assert_cmd::Command;
use clap::Parser;
use modulith::cli::{Args, Command as Subcommand};
use predicates::prelude::*;
use std::ffi::OsString;
use std::path::PathBuf;
use tempfile::TempDir;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("modulith")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_app_args() {
    let parsed = Args::try_parse_from(make_args(&["app"])).unwrap();

    assert_eq!(parsed.command, Subcommand::App);
    assert_eq!(parsed.project_dir, PathBuf::from("."));
    assert!(!parsed.verbose);
    assert!(!parsed.stdin);
    assert!(!parsed.skip_install);
}

#[test]
fn test_all_flags() {
    let parsed = Args::try_parse_from(make_args(&[
        "entity",
        "Invoice",
        "--skip-server",
        "--verbose",
        "--project-dir",
        "./shop",
        "--templates",
        "./my-templates",
        "--answers",
        "answers.yml",
        "--skip-install",
    ]))
    .unwrap();

    assert_eq!(
        parsed.command,
        Subcommand::Entity { name: "Invoice".to_string(), regenerate: false, skip_server: true }
    );
    assert!(parsed.verbose);
    assert_eq!(parsed.project_dir, PathBuf::from("./shop"));
    assert_eq!(parsed.templates, Some(PathBuf::from("./my-templates")));
    assert_eq!(parsed.answers, Some(PathBuf::from("answers.yml")));
    assert!(parsed.skip_install);
}

#[test]
fn test_short_flags() {
    let parsed = Args::try_parse_from(make_args(&["-v", "-s", "-d", "./shop", "app"])).unwrap();

    assert!(parsed.verbose);
    assert!(parsed.stdin);
    assert_eq!(parsed.project_dir, PathBuf::from("./shop"));
}

#[test]
fn test_missing_args() {
    assert!(Args::try_parse_from(make_args(&[])).is_err());
    assert!(Args::try_parse_from(make_args(&["entity"])).is_err());
}

#[test]
fn test_unknown_subcommand() {
    assert!(Args::try_parse_from(make_args(&["microservice"])).is_err());
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("modulith")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("app").and(predicate::str::contains("entity")));
}

#[test]
fn entity_without_application_fails() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("modulith")
        .unwrap()
        .args(["entity", "Invoice", "--stdin", "--skip-install", "-d"])
        .arg(dir.path())
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no project configuration found"));
}

#[test]
fn app_then_entity_from_stdin() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("modulith")
        .unwrap()
        .args(["app", "--stdin", "--skip-install", "-d"])
        .arg(dir.path())
        .write_stdin("useModuleForUser: false\nbaseName: store\npackageName: com.mycompany.myapp\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Application store generated successfully"));

    Command::cargo_bin("modulith")
        .unwrap()
        .args(["entity", "Invoice", "--stdin", "--skip-install", "-d"])
        .arg(dir.path())
        .write_stdin(r#"{"fields": [{"fieldName": "amount", "fieldType": "Integer"}], "moduleName": "billing"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saving billing module"))
        .stdout(predicate::str::contains("Project entities: Invoice"));

    assert!(dir
        .path()
        .join("src/main/java/com/mycompany/myapp/modules/billing/domain/Invoice.java")
        .is_file());
}
