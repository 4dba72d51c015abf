//! Integration tests for task execution through the binary

mod common;

use assert_cmd::Command;
use common::create_test_config;
use predicates::prelude::*;
use tempfile::TempDir;

fn rrun(dir: &TempDir) -> Command {
    let mut command = Command::cargo_bin("rrun").unwrap();
    command.current_dir(dir.path());
    command
}

#[test]
fn test_runs_a_simple_task() {
    let (dir, _) = create_test_config("hello: echo hi\n");

    rrun(&dir)
        .arg("hello")
        .assert()
        .success()
        .stdout(predicate::str::contains("hi"))
        .stdout(predicate::str::contains("[run] Launched 'echo hi"))
        .stdout(predicate::str::contains("[run] Finished in"));
}

#[test]
fn test_runs_by_abbreviation() {
    let (dir, _) = create_test_config("check:\n  - echo checked\n");

    rrun(&dir)
        .arg("c")
        .assert()
        .success()
        .stdout(predicate::str::contains("checked"));
}

#[test]
fn test_optional_subtask_is_skipped_by_default() {
    let (dir, _) = create_test_config(
        "check:\n  - /lint: echo linted\n  - build: echo built\n",
    );

    rrun(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("built"))
        .stdout(predicate::str::contains("linted").not());
}

#[test]
fn test_enable_filter_includes_optional_subtask() {
    let (dir, _) = create_test_config(
        "check:\n  - /lint: echo linted\n  - build: echo built\n",
    );

    rrun(&dir)
        .args(["check", "+lint"])
        .assert()
        .success()
        .stdout(predicate::str::contains("linted"))
        .stdout(predicate::str::contains("built"));
}

#[test]
fn test_pick_filter_runs_only_named_subtask() {
    let (dir, _) = create_test_config(
        "check:\n  - /lint: echo linted\n  - build: echo built\n",
    );

    rrun(&dir)
        .args(["check", "=lint"])
        .assert()
        .success()
        .stdout(predicate::str::contains("linted"))
        .stdout(predicate::str::contains("built").not());
}

#[test]
fn test_disable_filter_excludes_subtask() {
    let (dir, _) = create_test_config(
        "check:\n  - lint: echo linted\n  - build: echo built\n",
    );

    rrun(&dir)
        .args(["check", "-build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("built").not());
}

#[test]
fn test_variable_is_captured_and_exported() {
    let (dir, _) = create_test_config(
        "VERSION: echo 1.2.3\nshow: echo version is $VERSION\n",
    );

    rrun(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("version is 1.2.3"));
}

#[test]
fn test_variable_task_prints_its_value() {
    let (dir, _) = create_test_config("VERSION: echo 1.2.3\n");

    rrun(&dir)
        .arg("VERSION")
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3"))
        .stdout(predicate::str::contains("[run]").not());
}

#[test]
fn test_leftover_arguments_are_forwarded() {
    let (dir, _) = create_test_config("greet: echo hello $RUNARGS\n");

    rrun(&dir)
        .args(["greet", "world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello world"));
}

#[test]
fn test_sequence_stops_at_first_failure() {
    let (dir, _) = create_test_config("broken:\n  - \"false\"\n  - touch never.txt\n");

    rrun(&dir)
        .arg("broken")
        .assert()
        .failure()
        .stderr(predicate::str::contains("has failed"));

    assert!(!dir.path().join("never.txt").exists());
}

#[test]
fn test_multiplex_tags_output_lines() {
    let (dir, _) = create_test_config(
        "((both)):\n  - alpha: echo from alpha\n  - beta: echo from beta\n",
    );

    rrun(&dir)
        .arg("both")
        .assert()
        .success()
        .stdout(predicate::str::contains("run both alpha | from alpha"))
        .stdout(predicate::str::contains("run both beta | from beta"));
}

#[test]
fn test_multiplex_keeps_fast_finishers_until_head_completes() {
    // The middle command exits long before the head; its slot stays tracked
    // and the run still reports every command's output.
    let (dir, _) = create_test_config(
        "((trio)):\n  - slow: sleep 1 && echo slow done\n  - mid: echo mid done\n  - last: sleep 0.3 && echo last done\n",
    );

    rrun(&dir)
        .arg("trio")
        .assert()
        .success()
        .stdout(predicate::str::contains("slow done"))
        .stdout(predicate::str::contains("mid done"))
        .stdout(predicate::str::contains("last done"))
        .stdout(predicate::str::contains("run trio mid | "));
}

#[test]
fn test_parallel_group_completes() {
    let (dir, _) = create_test_config("(both):\n  - echo alpha\n  - echo beta\n");

    rrun(&dir)
        .arg("both")
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"));
}

#[test]
fn test_task_help_shows_the_plan() {
    let (dir, _) = create_test_config(
        "# Verify the project\ncheck:\n  - lint: echo l\n  - build: echo b\n",
    );

    rrun(&dir)
        .args(["check", "?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("run check"))
        .stdout(predicate::str::contains("Verify the project"))
        .stdout(predicate::str::contains("Execution Plan"))
        .stdout(predicate::str::contains("[SEQUENCE]"))
        .stdout(predicate::str::contains("run check build"));
}

#[test]
fn test_bare_invocation_prints_root_help() {
    let (dir, _) = create_test_config("build: cargo build\n");

    rrun(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("General run description"))
        .stdout(predicate::str::contains("Tasks"))
        .stdout(predicate::str::contains("run build"));
}

#[test]
fn test_unknown_task_fails() {
    let (dir, _) = create_test_config("build: cargo build\n");

    rrun(&dir)
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task \"nope\" not found"));
}

#[test]
fn test_quiet_task_suppresses_run_logs() {
    let (dir, _) = create_test_config("build!: echo built\n");

    rrun(&dir)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("built"))
        .stdout(predicate::str::contains("[run]").not());
}

#[test]
fn test_run_path_flag_selects_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tasks.yml"), "hello: echo from tasks\n").unwrap();

    rrun(&dir)
        .args(["--run-path", "tasks.yml", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from tasks"));
}

#[test]
fn test_missing_config_fails() {
    let dir = TempDir::new().unwrap();

    rrun(&dir)
        .arg("anything")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No 'run.yml' found"));
}

#[test]
fn test_run_complete_lists_children() {
    let (dir, _) = create_test_config(
        "check:\n  - lint: echo l\n  - build: echo b\ndeploy: echo d\n",
    );

    rrun(&dir)
        .arg("--run-complete")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("deploy"));

    rrun(&dir)
        .args(["--run-complete", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lint"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("deploy").not());
}

#[test]
fn test_runvars_file_is_loaded() {
    let (dir, _) = create_test_config("show: echo greeting is $GREETING\n");
    std::fs::write(dir.path().join("vars.env"), "GREETING=salut\n").unwrap();

    rrun(&dir)
        .arg("show")
        .env("RUNVARS", dir.path().join("vars.env"))
        .assert()
        .success()
        .stdout(predicate::str::contains("greeting is salut"));
}
