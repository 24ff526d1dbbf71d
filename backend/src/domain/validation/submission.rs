//! Validation outcomes: field paths, field errors and submission results.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::domain::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a submission.
///
/// Renders using form-field naming: keys joined with `.`, list indices as
/// `[n]`, e.g. `links[0].url`. The root renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Path of the submission itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Child path for an object key.
    #[must_use]
    pub fn key(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(name.to_owned()));
        Self(segments)
    }

    /// Child path for a list index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(name) if position == 0 => f.write_str(name)?,
                Segment::Key(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Origin of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A single field broke one of its own rules.
    Field,
    /// A rule relating several fields failed; reported on one of them.
    CrossField,
}

/// One validation failure attached to a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    path: String,
    message: String,
    kind: IssueKind,
}

impl FieldIssue {
    /// Failure of a field's own rule.
    pub fn field(path: &FieldPath, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
            kind: IssueKind::Field,
        }
    }

    /// Failure of a cross-field rule, reported on `path`.
    pub fn cross_field(path: &FieldPath, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
            kind: IssueKind::CrossField,
        }
    }

    /// Rendered field path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the issue came from a field or cross-field rule.
    pub fn kind(&self) -> IssueKind {
        self.kind
    }
}

/// Field-keyed validation messages.
///
/// Serialises as `{ "<path>": ["message", ...] }` in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldIssue>);

impl FieldErrors {
    /// Collect issues into an error set.
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self(issues)
    }

    /// Return `true` when no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All issues in evaluation order.
    pub fn issues(&self) -> &[FieldIssue] {
        &self.0
    }

    /// Messages reported for `path`, in evaluation order.
    pub fn messages(&self, path: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|issue| issue.path == path)
            .map(FieldIssue::message)
            .collect()
    }

    /// Paths with at least one message, sorted and deduplicated.
    pub fn paths(&self) -> Vec<&str> {
        self.to_map().into_keys().collect()
    }

    /// Group messages by path.
    pub fn to_map(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for issue in &self.0 {
            grouped
                .entry(issue.path.as_str())
                .or_default()
                .push(issue.message.as_str());
        }
        grouped
    }
}

impl Serialize for FieldErrors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_map().serialize(serializer)
    }
}

/// Outcome of validating a submission against a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResult<T> {
    /// Every rule passed.
    Valid(T),
    /// At least one rule failed.
    Invalid(FieldErrors),
}

impl<T> SubmissionResult<T> {
    /// Return `true` for [`SubmissionResult::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Borrow the validated value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }

    /// Borrow the field errors, if any.
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(errors) => Some(errors),
        }
    }

    /// Convert the validated value, leaving errors untouched.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<SubmissionResult<U>, E> {
        match self {
            Self::Valid(value) => f(value).map(SubmissionResult::Valid),
            Self::Invalid(errors) => Ok(SubmissionResult::Invalid(errors)),
        }
    }
}

/// Fields that passed a schema, with unknown keys removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedFields(Map<String, Value>);

impl ValidatedFields {
    pub(crate) fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Borrow a validated value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Borrow a validated text value.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Names of the fields present, in key order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Deserialise into a typed record.
    ///
    /// The schema has already checked shapes, so a mismatch means the record
    /// type and schema disagree; it surfaces as an internal error.
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T, Error> {
        serde_json::from_value(Value::Object(self.0)).map_err(|error| {
            Error::internal(format!("validated fields do not fit record: {error}"))
        })
    }

    /// Unwrap into the underlying JSON map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}
