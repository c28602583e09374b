//! Cases and their expected outcomes.
//!
//! A [`Case`] pairs one input with an [`Expectation`]: either a value the
//! function must return, or an [`ErrorExpectation`] describing the error it
//! must fail with. Errors are matched structurally through the [`CaseError`]
//! trait (kind, message, named fields) rather than by inspecting types at
//! runtime.

use std::fmt;
use std::sync::Arc;

/// An error that can be matched against an [`ErrorExpectation`].
///
/// Implementors are usually tagged enums; `kind` names the variant and
/// `field` exposes the structured data a variant carries.
pub trait CaseError: fmt::Display {
    type Kind: Copy + PartialEq + fmt::Debug;

    fn kind(&self) -> Self::Kind;

    /// Human-facing message compared against a message constraint.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Looks up a named structured field, if the variant carries one.
    fn field(&self, _name: &str) -> Option<serde_json::Value> {
        None
    }
}

/// Renders an error as `Kind: message` for reports.
pub fn describe_error<E: CaseError>(error: &E) -> String {
    format!("{:?}: {}", error.kind(), error.message())
}

// ============================================================================
// ERROR EXPECTATIONS
// ============================================================================

type FieldPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// A named predicate over a structured error field, e.g. `error_code == 404`.
pub struct FieldCheck<E> {
    label: String,
    field: Option<String>,
    predicate: FieldPredicate<E>,
}

impl<E> FieldCheck<E> {
    pub fn new(label: impl Into<String>, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            field: None,
            predicate: Arc::new(predicate),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The structured field this check reads, when it was built by
    /// [`FieldCheck::equals`].
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn holds(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

impl<E: CaseError + 'static> FieldCheck<E> {
    /// Checks that `error.field(name)` equals `value`.
    pub fn equals(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let name = name.into();
        let value = value.into();
        let label = format!("{} == {}", name, value);
        let field = name.clone();
        let mut check = Self::new(label, move |error: &E| error.field(&name).as_ref() == Some(&value));
        check.field = Some(field);
        check
    }
}

impl<E> Clone for FieldCheck<E> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            field: self.field.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<E> fmt::Debug for FieldCheck<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldCheck").field(&self.label).finish()
    }
}

/// What an expected error must look like.
pub struct ErrorExpectation<E: CaseError> {
    kind: E::Kind,
    message: Option<String>,
    fields: Vec<FieldCheck<E>>,
}

impl<E: CaseError> ErrorExpectation<E> {
    pub fn kind(kind: E::Kind) -> Self {
        Self {
            kind,
            message: None,
            fields: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_field(mut self, check: FieldCheck<E>) -> Self {
        self.fields.push(check);
        self
    }

    pub fn expected_kind(&self) -> E::Kind {
        self.kind
    }

    pub fn expected_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn field_checks(&self) -> &[FieldCheck<E>] {
        &self.fields
    }

    /// Checks `error` against every constraint, returning the first one
    /// that does not hold.
    pub fn check(&self, error: &E) -> Result<(), String> {
        if error.kind() != self.kind {
            return Err(format!(
                "expected error kind {:?}, got {:?}",
                self.kind,
                error.kind()
            ));
        }
        if let Some(expected) = &self.message {
            let actual = error.message();
            if &actual != expected {
                return Err(format!("expected message {:?}, got {:?}", expected, actual));
            }
        }
        for check in &self.fields {
            if !check.holds(error) {
                let found = match check.field() {
                    Some(name) => match error.field(name) {
                        Some(value) => format!(" ({} = {})", name, value),
                        None => format!(" ({} absent)", name),
                    },
                    None => String::new(),
                };
                return Err(format!("field check `{}` does not hold{}", check.label, found));
            }
        }
        Ok(())
    }
}

impl<E: CaseError + 'static> ErrorExpectation<E> {
    /// Shorthand for [`FieldCheck::equals`].
    pub fn with_field_eq(self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.with_field(FieldCheck::equals(name, value))
    }
}

impl<E: CaseError> Clone for ErrorExpectation<E> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl<E: CaseError> fmt::Debug for ErrorExpectation<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorExpectation")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<E: CaseError> fmt::Display for ErrorExpectation<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        let mut constraints = Vec::new();
        if let Some(message) = &self.message {
            constraints.push(format!("message = {:?}", message));
        }
        constraints.extend(self.fields.iter().map(|c| c.label.clone()));
        if !constraints.is_empty() {
            write!(f, " ({})", constraints.join(", "))?;
        }
        Ok(())
    }
}

// ============================================================================
// CASES
// ============================================================================

/// The expected outcome of a case.
pub enum Expectation<V, E: CaseError> {
    Value(V),
    Error(ErrorExpectation<E>),
}

impl<V: Clone, E: CaseError> Clone for Expectation<V, E> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(v) => Self::Value(v.clone()),
            Self::Error(e) => Self::Error(e.clone()),
        }
    }
}

impl<V: fmt::Debug, E: CaseError> fmt::Debug for Expectation<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

/// One input together with its expected outcome.
pub struct Case<I, V, E: CaseError> {
    name: Option<String>,
    input: I,
    expected: Expectation<V, E>,
    skip: Option<String>,
}

impl<I, V, E: CaseError> Case<I, V, E> {
    pub fn new(input: I, expected: Expectation<V, E>) -> Self {
        Self {
            name: None,
            input,
            expected,
            skip: None,
        }
    }

    /// A case whose function must return `value`.
    pub fn value(input: I, value: V) -> Self {
        Self::new(input, Expectation::Value(value))
    }

    /// A case whose function must fail as described.
    pub fn error(input: I, expected: ErrorExpectation<E>) -> Self {
        Self::new(input, Expectation::Error(expected))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Marks the case as skipped; the function will not be invoked for it.
    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn expected(&self) -> &Expectation<V, E> {
        &self.expected
    }

    pub fn skip_reason(&self) -> Option<&str> {
        self.skip.as_deref()
    }

    pub(crate) fn into_parts(self) -> (I, Expectation<V, E>, Option<String>) {
        (self.input, self.expected, self.skip)
    }
}

impl<I: fmt::Debug, V, E: CaseError> Case<I, V, E> {
    /// The name if one was given, otherwise the debug rendering of the input.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{:?}", self.input),
        }
    }
}

impl<I: Clone, V: Clone, E: CaseError> Clone for Case<I, V, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            input: self.input.clone(),
            expected: self.expected.clone(),
            skip: self.skip.clone(),
        }
    }
}

impl<I: fmt::Debug, V: fmt::Debug, E: CaseError> fmt::Debug for Case<I, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("name", &self.name)
            .field("input", &self.input)
            .field("expected", &self.expected)
            .field("skip", &self.skip)
            .finish()
    }
}
