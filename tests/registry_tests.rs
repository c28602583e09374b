//! Registry and case-table integration: registration, selection,
//! configuration failures, and the YAML fixtures under `tests/tables*`.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use casebook::calculate::{register_suites, register_table, CalcError};
use casebook::cli::build_registry;
use casebook::registry::{Registry, Selection, TestOutcome};
use casebook::table::{discover_tables, TableSource};
use casebook::{Case, CaseResult, CaseSource, ConfigError, FailureKind, Runner, EXIT_CONFIG_ERROR};

#[test]
fn builtin_suites_pass() {
    let mut registry = Registry::new();
    register_suites(&mut registry).unwrap();
    let names: Vec<_> = registry.names().collect();
    assert_eq!(
        names,
        vec![
            "calculate",
            "calculate_with_class_data",
            "calculate_with_member_data",
            "divide",
            "perform_operation",
        ]
    );

    let suite = registry.run(&Runner::default(), &Selection::default());
    let summary = suite.summary();
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.errored, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.passed, 1 + 3 + 3 + 4 + 1);
    assert_eq!(suite.exit_code(), 0);
}

#[test]
fn duplicate_names_are_rejected() {
    let mut registry = Registry::new();
    registry
        .register("twice", |x: i32| Ok::<_, CalcError>(x), vec![Case::value(1, 1)])
        .unwrap();
    let err = registry
        .register("twice", |x: i32| Ok::<_, CalcError>(x), vec![Case::value(2, 2)])
        .err()
        .unwrap();
    assert!(matches!(err, ConfigError::DuplicateTest { ref name } if name == "twice"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn filtered_tests_are_not_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut registry = Registry::new();
    registry
        .register(
            "counted",
            move |x: i32| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CalcError>(x)
            },
            vec![Case::value(1, 1), Case::value(2, 2)],
        )
        .unwrap();

    let suite = registry.run(&Runner::default(), &Selection::filtered("other"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(matches!(suite.tests[0].outcome, TestOutcome::NotSelected { .. }));

    let suite = registry.run(&Runner::default(), &Selection::filtered("COUNT"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(suite.report("counted").map(|r| r.len()), Some(2));
}

#[test]
fn fixture_tables_all_pass() {
    let registry = build_registry(Some(Path::new("tests/tables"))).unwrap();
    let names: Vec<_> = registry.names().collect();
    assert!(names.contains(&"divide::divide_edges"));
    assert!(names.contains(&"perform_operation::operation"));
    assert!(names.contains(&"sum::sum_basic"));

    let suite = registry.run(&Runner::default(), &Selection::filtered("::"));
    let summary = suite.summary();
    assert_eq!(summary.passed, 4 + 3 + 1);
    assert_eq!(summary.skipped, 1);
    assert!(suite.is_success());
}

#[test]
fn wrong_error_code_in_a_table_fails() {
    let mut registry = Registry::new();
    register_table(&mut registry, Path::new("tests/tables_failing/wrong_code.yaml")).unwrap();
    let suite = registry.run(&Runner::default(), &Selection::default());
    let report = suite.report("perform_operation::wrong_code").unwrap();
    assert!(matches!(
        report.entries()[0].result,
        CaseResult::Failed {
            failure: FailureKind::ErrorKindMismatch,
            ..
        }
    ));
    assert_eq!(suite.exit_code(), 1);
}

#[test]
fn malformed_table_fails_only_its_own_test() {
    let registry = build_registry(Some(Path::new("tests/tables_malformed"))).unwrap();
    let suite = registry.run(&Runner::default(), &Selection::default());
    assert_eq!(suite.misconfigured(), 1);
    let broken = suite.tests.iter().find(|t| t.name == "sum::both").unwrap();
    match &broken.outcome {
        TestOutcome::Misconfigured { error } => {
            assert!(matches!(error, ConfigError::MalformedCase { index: 1, .. }))
        }
        other => panic!("expected a configuration failure, got {:?}", other),
    }
    assert!(suite.report("calculate").is_some());
    assert_eq!(suite.exit_code(), EXIT_CONFIG_ERROR);
}

#[test]
fn malformed_table_is_reported_before_any_case_runs() {
    let source = TableSource::<(i32, i32), i32, CalcError>::new("tests/tables_malformed/both.yaml");
    let err = source.iter_cases().err().unwrap();
    assert!(matches!(err, ConfigError::MalformedCase { index: 1, .. }));
}

#[test]
fn unknown_function_is_a_registration_error() {
    let err = build_registry(Some(Path::new("tests/tables_unknown"))).err().unwrap();
    assert!(matches!(err, ConfigError::UnknownFunction { ref function, .. } if function == "multiply"));
}

#[test]
fn missing_table_directory_is_an_io_error() {
    let err = build_registry(Some(Path::new("tests/no_such_tables"))).err().unwrap();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn discovery_finds_yaml_and_yml_sorted() {
    let tables = discover_tables("tests/tables");
    let names: Vec<_> = tables
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["divide_edges.yml", "operation.yaml", "sum_basic.yaml"]);
}
