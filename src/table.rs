//! YAML case tables.
//!
//! A table names the function it targets and lists its cases:
//!
//! ```yaml
//! function: divide
//! cases:
//!   - name: "max by zero"
//!     input: [2147483647, 0]
//!     expect_error: DivideByZero
//!   - input: [10, 2]
//!     expected: 5
//!   - input: [1, 1]
//!     expected: 1
//!     skip: "temporarily disabled"
//! ```
//!
//! Every case carries exactly one of `expected` or `expect_error`.
//! `expect_message` and `expect_fields` refine an `expect_error`. Tables are
//! read from disk each time a run starts, so edits between runs are picked up.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::case::{Case, CaseError, ErrorExpectation, FieldCheck};
use crate::error::{ConfigError, ConfigResult};
use crate::source::{CaseIter, CaseSource};

/// One row of a case table as written in YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableCase<I, V> {
    pub name: Option<String>,
    pub input: I,
    pub expected: Option<V>,
    pub expect_error: Option<String>,
    pub expect_message: Option<String>,
    #[serde(default)]
    pub expect_fields: BTreeMap<String, serde_json::Value>,
    pub skip: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TableHeader {
    function: String,
}

#[derive(Debug, Deserialize)]
struct TableFile<I, V> {
    cases: Vec<TableCase<I, V>>,
}

/// Discovers all YAML tables under `root`, sorted by path.
pub fn discover_tables<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let mut tables: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    tables.sort();
    tables
}

fn read_table(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads just the `function:` key of a table.
pub fn peek_function(path: &Path) -> ConfigResult<String> {
    let content = read_table(path)?;
    let header: TableHeader = serde_yaml::from_str(&content).map_err(|source| ConfigError::Table {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(header.function)
}

/// Parses table text into typed cases, validating each row.
pub fn parse_cases<I, V, E>(source_name: &str, content: &str) -> Result<Vec<Case<I, V, E>>, TableError>
where
    I: DeserializeOwned,
    V: DeserializeOwned,
    E: CaseError + 'static,
    E::Kind: FromStr,
{
    let file: TableFile<I, V> = serde_yaml::from_str(content).map_err(TableError::Yaml)?;
    file.cases
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            into_case(row).map_err(|reason| TableError::Malformed(ConfigError::malformed(source_name, index, reason)))
        })
        .collect()
}

/// Why table text could not become cases.
#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Malformed(ConfigError),
}

impl TableError {
    fn at(self, path: &Path) -> ConfigError {
        match self {
            TableError::Yaml(source) => ConfigError::Table {
                path: path.to_path_buf(),
                source,
            },
            TableError::Malformed(err) => err,
        }
    }
}

fn into_case<I, V, E>(row: TableCase<I, V>) -> Result<Case<I, V, E>, String>
where
    E: CaseError + 'static,
    E::Kind: FromStr,
{
    let TableCase {
        name,
        input,
        expected,
        expect_error,
        expect_message,
        expect_fields,
        skip,
    } = row;

    let mut case = match (expected, expect_error) {
        (Some(_), Some(_)) => {
            return Err("`expected` and `expect_error` are mutually exclusive".to_string())
        }
        (None, None) => return Err("one of `expected` or `expect_error` is required".to_string()),
        (Some(value), None) => {
            if expect_message.is_some() || !expect_fields.is_empty() {
                return Err("`expect_message` and `expect_fields` require `expect_error`".to_string());
            }
            Case::value(input, value)
        }
        (None, Some(kind_name)) => {
            let kind = kind_name
                .parse::<E::Kind>()
                .map_err(|_| format!("unknown error kind '{}'", kind_name))?;
            let mut expectation = ErrorExpectation::kind(kind);
            if let Some(message) = expect_message {
                expectation = expectation.with_message(message);
            }
            for (field, value) in expect_fields {
                expectation = expectation.with_field(FieldCheck::equals(field, value));
            }
            Case::error(input, expectation)
        }
    };
    if let Some(name) = name {
        case = case.named(name);
    }
    if let Some(reason) = skip {
        case = case.skip(reason);
    }
    Ok(case)
}

/// A case table on disk, used as a [`CaseSource`].
pub struct TableSource<I, V, E> {
    path: PathBuf,
    _marker: PhantomData<fn() -> (I, V, E)>,
}

impl<I, V, E> TableSource<I, V, E> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<I, V, E> CaseSource<I, V, E> for TableSource<I, V, E>
where
    I: DeserializeOwned + Debug + 'static,
    V: DeserializeOwned + 'static,
    E: CaseError + 'static,
    E::Kind: FromStr,
{
    fn source_name(&self) -> String {
        self.path.display().to_string()
    }

    fn iter_cases(&self) -> ConfigResult<CaseIter<'_, I, V, E>> {
        let content = read_table(&self.path)?;
        let cases = parse_cases(&self.source_name(), &content).map_err(|e| e.at(&self.path))?;
        Ok(Box::new(cases.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::{CalcError, CalcErrorKind};
    use crate::case::Expectation;

    type PairCases = Vec<Case<(i32, i32), i32, CalcError>>;

    #[test]
    fn parses_value_error_and_skip_rows() {
        let yaml = r#"
function: divide
cases:
  - input: [10, 2]
    expected: 5
  - name: max by zero
    input: [2147483647, 0]
    expect_error: DivideByZero
  - input: [1, 1]
    expected: 1
    skip: temporarily disabled
"#;
        let cases: PairCases = parse_cases("inline", yaml).unwrap();
        assert_eq!(cases.len(), 3);
        assert!(matches!(cases[0].expected(), Expectation::Value(5)));
        match cases[1].expected() {
            Expectation::Error(e) => assert_eq!(e.expected_kind(), CalcErrorKind::DivideByZero),
            other => panic!("expected an error expectation, got {:?}", other),
        }
        assert_eq!(cases[1].name(), Some("max by zero"));
        assert_eq!(cases[2].skip_reason(), Some("temporarily disabled"));
    }

    #[test]
    fn field_expectations_become_checks() {
        let yaml = r#"
function: perform_operation
cases:
  - input: ~
    expect_error: Custom
    expect_message: Operation Failed
    expect_fields:
      error_code: 404
"#;
        let cases: Vec<Case<(), (), CalcError>> = parse_cases("inline", yaml).unwrap();
        let Expectation::Error(expectation) = cases[0].expected() else {
            panic!("expected an error expectation");
        };
        assert_eq!(expectation.expected_message(), Some("Operation Failed"));
        assert_eq!(expectation.field_checks().len(), 1);
        assert_eq!(expectation.field_checks()[0].label(), "error_code == 404");
    }

    #[test]
    fn rejects_rows_with_both_or_neither_expectation() {
        let both = r#"
function: sum
cases:
  - input: [1, 1]
    expected: 2
    expect_error: Overflow
"#;
        let err = parse_cases::<(i32, i32), i32, CalcError>("both.yaml", both).unwrap_err();
        assert!(matches!(
            err,
            TableError::Malformed(ConfigError::MalformedCase { index: 0, .. })
        ));

        let neither = r#"
function: sum
cases:
  - input: [1, 1]
  - input: [2, 2]
"#;
        let err = parse_cases::<(i32, i32), i32, CalcError>("neither.yaml", neither).unwrap_err();
        assert!(matches!(
            err,
            TableError::Malformed(ConfigError::MalformedCase { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_error_refinements_on_value_rows() {
        let with_message = r#"
function: sum
cases:
  - input: [1, 1]
    expected: 2
    expect_message: Arithmetic operation resulted in an overflow.
"#;
        let err = parse_cases::<(i32, i32), i32, CalcError>("message.yaml", with_message).unwrap_err();
        assert!(matches!(
            err,
            TableError::Malformed(ConfigError::MalformedCase { index: 0, .. })
        ));

        let with_fields = r#"
function: sum
cases:
  - input: [1, 1]
    expected: 2
    expect_fields:
      error_code: 404
"#;
        let err = parse_cases::<(i32, i32), i32, CalcError>("fields.yaml", with_fields).unwrap_err();
        match err {
            TableError::Malformed(ConfigError::MalformedCase { index, reason, .. }) => {
                assert_eq!(index, 0);
                assert!(reason.contains("require `expect_error`"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn table_errors_display_their_cause() {
        let err = TableError::Malformed(ConfigError::malformed("t.yaml", 2, "bad row"));
        assert_eq!(err.to_string(), "case 2 in 't.yaml' is malformed: bad row");

        let yaml = serde_yaml::from_str::<TableFile<i32, i32>>("cases: 7").unwrap_err();
        let expected = yaml.to_string();
        assert_eq!(TableError::from(yaml).to_string(), expected);
    }

    #[test]
    fn rejects_unknown_error_kind() {
        let yaml = r#"
function: divide
cases:
  - input: [1, 0]
    expect_error: Teapot
"#;
        let err = parse_cases::<(i32, i32), i32, CalcError>("kinds.yaml", yaml).unwrap_err();
        match err {
            TableError::Malformed(ConfigError::MalformedCase { reason, .. }) => {
                assert!(reason.contains("Teapot"))
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_keys() {
        let yaml = r#"
function: sum
cases:
  - input: [1, 1]
    expcted: 2
"#;
        let err = parse_cases::<(i32, i32), i32, CalcError>("typo.yaml", yaml).unwrap_err();
        assert!(matches!(err, TableError::Yaml(_)));
    }
}
