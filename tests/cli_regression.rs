// Regression tests for the casebook binary: exit codes, report formats, and
// miette-rendered configuration errors.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn casebook() -> Command {
    Command::cargo_bin("casebook").unwrap()
}

#[test]
fn builtin_run_succeeds() {
    casebook()
        .args(["run", "--color", "never"])
        .assert()
        .success()
        .stdout(
            contains("PASS: calculate #0 [(0, 0)]")
                .and(contains("SKIP: perform_operation #1"))
                .and(contains("failed 0")),
        );
}

#[test]
fn passing_tables_succeed() {
    casebook()
        .args(["run", "--color", "never", "--tables", "tests/tables", "--filter", "::"])
        .assert()
        .success()
        .stdout(contains("PASS: divide::divide_edges #1 [max by zero]"));
}

#[test]
fn failing_table_exits_nonzero() {
    casebook()
        .args(["run", "--color", "never", "--tables", "tests/tables_failing"])
        .assert()
        .code(1)
        .stdout(
            contains("FAIL: perform_operation::wrong_code #0 [wrong error code] (error mismatch)")
                .and(contains("error_code = 500"))
                .and(contains("Failed tests:")),
        );
}

#[test]
fn json_format_emits_the_suite() {
    let output = casebook()
        .args(["run", "--format", "json", "--filter", "divide"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["tests"].as_array().is_some());
}

#[test]
fn unknown_table_function_is_a_diagnostic() {
    casebook()
        .args(["run", "--tables", "tests/tables_unknown"])
        .assert()
        .code(2)
        .stderr(contains("casebook::config::unknown_function").or(contains("multiply")));
}

#[test]
fn malformed_table_is_a_diagnostic_and_the_rest_still_runs() {
    casebook()
        .args(["run", "--color", "never", "--tables", "tests/tables_malformed"])
        .assert()
        .code(2)
        .stdout(contains("CONFIG: sum::both").and(contains("PASS: calculate #0 [(0, 0)]")))
        .stderr(contains("casebook::config::malformed_case"));
}

#[test]
fn zero_timeout_and_zero_case_limit_are_rejected() {
    casebook()
        .args(["run", "--timeout-ms", "0"])
        .assert()
        .code(2)
        .stderr(contains("--timeout-ms"));
    casebook()
        .args(["run", "--max-cases", "0"])
        .assert()
        .code(2)
        .stderr(contains("--max-cases"));
}

#[test]
fn list_prints_registered_names() {
    casebook()
        .args(["list", "--tables", "tests/tables"])
        .assert()
        .success()
        .stdout(contains("calculate_with_class_data").and(contains("sum::sum_basic")));
}
