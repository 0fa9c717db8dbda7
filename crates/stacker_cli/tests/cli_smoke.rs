//! CLI smoke tests for stacker.
//!
//! None of these reach the compiler: they cover argument handling, error
//! reporting and the commands that complete without toolchain calls.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn stacker_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("stacker");
    cmd.env_remove("RUST_LOG");
    cmd
}

const BLUEPRINT: &str = r#"
[default]
binary = "bin"
build = "build"
include = "include"
sources = "src"
output = "app"
"#;

/// A project with the default layout directories and no sources.
fn empty_project(blueprint: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("blueprint.toml"), blueprint).unwrap();
    for dir in ["include", "src"] {
        std::fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    temp
}

#[test]
fn help_lists_commands() {
    stacker_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn no_arguments_prints_usage() {
    stacker_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_blueprint_aborts() {
    let temp = TempDir::new().unwrap();
    stacker_cmd()
        .current_dir(temp.path())
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TechnicalError"))
        .stderr(predicate::str::contains("Aborting"));
}

#[test]
fn unknown_configuration_is_reported() {
    let temp = empty_project(BLUEPRINT);
    stacker_cmd()
        .current_dir(temp.path())
        .args(["-c", "release", "build"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("configuration \"release\" not found"));
}

#[test]
fn cyclic_variables_are_reported() {
    let blueprint = format!("{BLUEPRINT}a = \"${{b}}\"\nb = \"${{a}}\"\n");
    let temp = empty_project(&blueprint);
    stacker_cmd()
        .current_dir(temp.path())
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GraphError"))
        .stderr(predicate::str::contains("cycle"));
}

#[test]
fn missing_sources_dir_is_reported() {
    let temp = empty_project(BLUEPRINT);
    std::fs::remove_dir(temp.path().join("src")).unwrap();
    stacker_cmd()
        .current_dir(temp.path())
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TechnicalError"));
}

#[test]
fn empty_project_builds_nothing() {
    let temp = empty_project(BLUEPRINT);
    stacker_cmd()
        .current_dir(temp.path())
        .args(["--color", "never", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to (re)compile"));
    assert!(temp.path().join("bin").is_dir());
    assert!(temp.path().join("build").is_dir());
}

#[test]
fn blueprint_path_is_taken_from_file_flag() {
    let temp = empty_project(BLUEPRINT);
    let elsewhere = TempDir::new().unwrap();
    stacker_cmd()
        .current_dir(elsewhere.path())
        .arg("-f")
        .arg(temp.path().join("blueprint.toml"))
        .arg("build")
        .assert()
        .success();
    assert!(temp.path().join("build").is_dir());
}

#[test]
fn clean_empties_output_directories() {
    let temp = empty_project(BLUEPRINT);
    std::fs::create_dir_all(temp.path().join("build")).unwrap();
    std::fs::create_dir_all(temp.path().join("bin")).unwrap();
    std::fs::write(temp.path().join("build/main.o"), "").unwrap();
    std::fs::write(temp.path().join("bin/app"), "").unwrap();

    stacker_cmd()
        .current_dir(temp.path())
        .args(["--color", "never", "clean"])
        .assert()
        .success();

    assert!(!temp.path().join("build/main.o").exists());
    assert!(!temp.path().join("bin/app").exists());
    assert!(temp.path().join("src").is_dir());
}

#[test]
fn quiet_build_prints_nothing() {
    let temp = empty_project(BLUEPRINT);
    stacker_cmd()
        .current_dir(temp.path())
        .args(["-q", "build"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
