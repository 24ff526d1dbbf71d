//! Named account schemas and the stateless validation entry point.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::rules::{self, FieldSpec};
use super::submission::{FieldErrors, FieldIssue, FieldPath, SubmissionResult, ValidatedFields};
use crate::domain::Error;

/// Operations that accept user account input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SignUp,
    SignIn,
    UpdateUsername,
    UpdateName,
    UpdateNick,
    UpdateEmail,
    UpdatePassword,
    UpdateTags,
    ProfileModeName,
    ProfileHeadline,
    ProfileBio,
    ProfileLinks,
    AdminUpdate,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::SignUp,
        Self::SignIn,
        Self::UpdateUsername,
        Self::UpdateName,
        Self::UpdateNick,
        Self::UpdateEmail,
        Self::UpdatePassword,
        Self::UpdateTags,
        Self::ProfileModeName,
        Self::ProfileHeadline,
        Self::ProfileBio,
        Self::ProfileLinks,
        Self::AdminUpdate,
    ];

    /// Kebab-case operation name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignUp => "sign-up",
            Self::SignIn => "sign-in",
            Self::UpdateUsername => "update-username",
            Self::UpdateName => "update-name",
            Self::UpdateNick => "update-nick",
            Self::UpdateEmail => "update-email",
            Self::UpdatePassword => "update-password",
            Self::UpdateTags => "update-tags",
            Self::ProfileModeName => "profile-mode-name",
            Self::ProfileHeadline => "profile-headline",
            Self::ProfileBio => "profile-bio",
            Self::ProfileLinks => "profile-links",
            Self::AdminUpdate => "admin-update",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognised operation name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation: {0}")]
pub struct UnknownOperation(String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.as_str() == value)
            .ok_or_else(|| UnknownOperation(value.to_owned()))
    }
}

/// Rule relating two fields, checked once every field rule has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossFieldRule {
    /// `confirm` must equal `field`; the failure is reported on `confirm`.
    Matches {
        field: &'static str,
        confirm: &'static str,
        message: &'static str,
    },
}

impl CrossFieldRule {
    fn check(&self, fields: &Map<String, Value>) -> Option<FieldIssue> {
        match self {
            Self::Matches {
                field,
                confirm,
                message,
            } => (fields.get(*field) != fields.get(*confirm))
                .then(|| FieldIssue::cross_field(&FieldPath::root().key(confirm), *message)),
        }
    }
}

/// Closed set of field rules for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    operation: Operation,
    fields: Vec<FieldSpec>,
    cross_field: Vec<CrossFieldRule>,
}

impl Schema {
    fn new(operation: Operation, fields: Vec<FieldSpec>) -> Self {
        Self {
            operation,
            fields,
            cross_field: Vec::new(),
        }
    }

    fn with_cross_field(mut self, rule: CrossFieldRule) -> Self {
        self.cross_field.push(rule);
        self
    }

    /// Operation this schema validates.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Field rules in evaluation order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field rule by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Names of every field in the schema.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(FieldSpec::name).collect()
    }

    /// Rules evaluated after the per-field checks pass.
    pub fn cross_field_rules(&self) -> &[CrossFieldRule] {
        &self.cross_field
    }
}

/// Build the schema for `operation`.
///
/// # Examples
/// ```
/// use account_settings::domain::validation::{Operation, compose};
///
/// let schema = compose(Operation::UpdatePassword);
/// assert_eq!(
///     schema.field_names(),
///     ["id", "currentPassword", "password", "confirmPassword"]
/// );
/// ```
pub fn compose(operation: Operation) -> Schema {
    use rules::{
        bio, confirm_password, current_password, email, headline, id, invite_by, invite_code,
        links, mode_name, name, nick, password, redirect_to, remember, role_symbol, tags,
        username,
    };

    let fields = match operation {
        Operation::SignUp => vec![
            name(),
            username(),
            email(),
            password(),
            remember(),
            invite_by(),
            invite_code(),
        ],
        Operation::SignIn => vec![email(), password(), remember(), redirect_to()],
        Operation::UpdateUsername => vec![id(), username()],
        Operation::UpdateName => vec![id(), name()],
        Operation::UpdateNick => vec![id(), nick()],
        Operation::UpdateEmail => vec![id(), email()],
        Operation::UpdatePassword => {
            vec![id(), current_password(), password(), confirm_password()]
        }
        Operation::UpdateTags => vec![id(), tags()],
        Operation::ProfileModeName => vec![id(), mode_name()],
        Operation::ProfileHeadline => vec![id(), headline()],
        Operation::ProfileBio => vec![id(), bio()],
        Operation::ProfileLinks => vec![id(), links()],
        Operation::AdminUpdate => vec![
            id(),
            username(),
            name(),
            nick(),
            email(),
            links(),
            role_symbol(),
        ],
    };

    let schema = Schema::new(operation, fields);
    match operation {
        Operation::UpdatePassword => schema.with_cross_field(CrossFieldRule::Matches {
            field: "password",
            confirm: "confirmPassword",
            message: "The passwords did not match",
        }),
        _ => schema,
    }
}

/// Validate `payload` against `schema`.
///
/// Field rules run first and every failure is collected. Cross-field rules
/// run only when all field rules passed. The valid result holds only the
/// schema's fields.
pub fn validate(schema: &Schema, payload: &Value) -> SubmissionResult<ValidatedFields> {
    let mut issues = Vec::new();
    let root = FieldPath::root();
    let cleaned = rules::evaluate_record(schema.fields(), payload, &root, &mut issues);

    let fields = match cleaned {
        Some(Value::Object(fields)) if issues.is_empty() => fields,
        _ => return SubmissionResult::Invalid(FieldErrors::new(issues)),
    };

    issues.extend(
        schema
            .cross_field_rules()
            .iter()
            .filter_map(|rule| rule.check(&fields)),
    );
    if issues.is_empty() {
        SubmissionResult::Valid(ValidatedFields::new(fields))
    } else {
        SubmissionResult::Invalid(FieldErrors::new(issues))
    }
}

/// Compose the schema for `operation`, validate, and decode into `T`.
///
/// # Errors
/// Returns an internal [`Error`] when validated fields do not fit `T`.
pub fn parse<T: DeserializeOwned>(
    operation: Operation,
    payload: &Value,
) -> Result<SubmissionResult<T>, Error> {
    validate(&compose(operation), payload).try_map(ValidatedFields::into_record)
}
