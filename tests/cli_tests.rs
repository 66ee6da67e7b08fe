// Binary-level behaviour of epsagon-wrap

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const MANIFEST: &str = r#"service: demo
provider:
  name: aws
  runtime: python3.9
custom:
  epsagon:
    token: T1
functions:
  hello:
    handler: handlers.hello
"#;

fn epsagon_wrap() -> Command {
    let mut cmd = Command::cargo_bin("epsagon-wrap").unwrap();
    cmd.args(["--color", "never"]);
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("epsagon-wrap").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("epsagon-wrap"));
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("epsagon-wrap").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("hook"));
}

#[test]
fn test_run_prints_rewritten_manifest() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("serverless.yml"), MANIFEST).unwrap();

    epsagon_wrap()
        .arg("--service-path")
        .arg(dir.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "handler: epsagon_handlers/hello-epsagon.hello",
        ))
        .stderr(predicate::str::contains("Wrapping your functions with Epsagon..."));

    assert!(dir.path().join("epsagon_handlers/hello-epsagon.py").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("serverless.yml")).unwrap(),
        MANIFEST
    );
}

#[test]
fn test_run_writes_output_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("serverless.yml"), MANIFEST).unwrap();
    let output = dir.path().join("wrapped.yml");

    epsagon_wrap()
        .current_dir(dir.path())
        .args(["run", "--output", "wrapped.yml"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(fs::read_to_string(output)
        .unwrap()
        .contains("epsagon_handlers/hello-epsagon.hello"));
}

#[test]
fn test_run_refuses_to_overwrite_input() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("serverless.yml"), MANIFEST).unwrap();

    epsagon_wrap()
        .current_dir(dir.path())
        .args(["run", "--output", "serverless.yml"])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("--output"));

    assert!(!dir.path().join("epsagon_handlers").exists());
}

#[test]
fn test_missing_manifest_is_config_error() {
    let dir = tempdir().unwrap();

    epsagon_wrap()
        .current_dir(dir.path())
        .arg("run")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("serverless.yml"));
}

#[test]
fn test_missing_node_library_fails() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("serverless.yml"),
        MANIFEST.replace("python3.9", "nodejs18.x"),
    )
    .unwrap();
    fs::write(dir.path().join("package.json"), r#"{"dependencies": {}}"#).unwrap();

    epsagon_wrap()
        .current_dir(dir.path())
        .arg("run")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains(
            "library must be installed in order to use this plugin",
        ));

    assert!(!dir.path().join("epsagon_handlers/hello-epsagon.js").exists());
}

#[test]
fn test_hook_events() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("serverless.yml"), MANIFEST).unwrap();

    epsagon_wrap()
        .current_dir(dir.path())
        .args(["hook", "after:package:initialize", "--output", "wrapped.yml"])
        .assert()
        .success();
    assert!(dir.path().join("epsagon_handlers").exists());

    epsagon_wrap()
        .current_dir(dir.path())
        .args(["hook", "after:package:createDeploymentArtifacts"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Cleaning up Epsagon's handlers"));
    assert!(!dir.path().join("epsagon_handlers").exists());
}

#[test]
fn test_unknown_hook_event() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("serverless.yml"), MANIFEST).unwrap();

    epsagon_wrap()
        .current_dir(dir.path())
        .args(["hook", "before:package:finalize"])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("after:deploy:deploy"));
}

#[test]
fn test_clean_command() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("serverless.yml"), MANIFEST).unwrap();
    fs::create_dir_all(dir.path().join("epsagon_handlers")).unwrap();

    epsagon_wrap()
        .current_dir(dir.path())
        .arg("clean")
        .assert()
        .success();
    assert!(!dir.path().join("epsagon_handlers").exists());
}

#[test]
fn test_link_command() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("serverless.yml"), MANIFEST).unwrap();

    epsagon_wrap()
        .current_dir(dir.path())
        .arg("link")
        .assert()
        .success()
        .stderr(predicate::str::contains("https://app.epsagon.com/functions"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    epsagon_wrap()
        .args(["--verbose", "--quiet", "run"])
        .assert()
        .failure()
        .code(7);
}

#[test]
fn test_generate_completion() {
    epsagon_wrap()
        .args(["generate-completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("epsagon-wrap"));
}
