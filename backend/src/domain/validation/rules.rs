//! Field rules for user account data.
//!
//! A [`FieldSpec`] binds a field name to a presence rule and a shape. Text
//! shapes carry a list of [`TextRule`]s that are all evaluated, so a value
//! failing several checks reports every message. Evaluation is pure: it
//! reads the raw JSON value and appends [`FieldIssue`]s for each failure.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::submission::{FieldIssue, FieldPath};

/// Message used when a required field has no bespoke message.
pub const REQUIRED_MESSAGE: &str = "Required";

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 20;
/// Minimum username length in characters.
pub const USERNAME_MIN: usize = 4;
/// Minimum password length in characters.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length in characters.
pub const PASSWORD_MAX: usize = 100;
/// Maximum length shared by full name, nick name and headline.
pub const SHORT_TEXT_MAX: usize = 50;
/// Maximum bio length in characters.
pub const BIO_MAX: usize = 1000;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn compile(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern).unwrap_or_else(|error| panic!("field regex failed to compile: {error}"))
    })
}

/// Named regular expressions usable by [`TextRule::Matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Letters, digits, dots and underscores.
    Username,
}

impl Pattern {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Username => compile(&USERNAME_RE, "^[a-zA-Z0-9._]+$"),
        }
    }

    /// Return `true` when `value` matches the whole pattern.
    pub fn is_match(self, value: &str) -> bool {
        self.regex().is_match(value)
    }
}

/// Return `true` when `value` is a syntactically valid email address.
///
/// The local part may not start with a dot and the address may not contain
/// consecutive dots; the domain needs a top-level label of two or more
/// letters.
pub fn is_email(value: &str) -> bool {
    // Length is not checked here; the email field pairs this with `MinChars`.
    let re = compile(
        &EMAIL_RE,
        r"^(?i)[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$",
    );
    !value.starts_with('.') && !value.contains("..") && re.is_match(value)
}

/// Return `true` when `value` parses as an absolute URL.
pub fn is_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

/// Constraint on a text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRule {
    /// At least `min` characters.
    MinChars { min: usize, message: &'static str },
    /// At most `max` characters.
    MaxChars { max: usize, message: &'static str },
    /// Whole value matches `pattern`.
    Matches {
        pattern: Pattern,
        message: &'static str,
    },
    /// Valid email syntax.
    Email { message: &'static str },
    /// Valid absolute URL.
    Url { message: &'static str },
    /// No leading or trailing whitespace.
    Trimmed { message: &'static str },
}

impl TextRule {
    /// Check `value`, returning the failure message when the rule is broken.
    pub fn check(&self, value: &str) -> Option<&'static str> {
        let passes = match self {
            Self::MinChars { min, .. } => value.chars().count() >= *min,
            Self::MaxChars { max, .. } => value.chars().count() <= *max,
            Self::Matches { pattern, .. } => pattern.is_match(value),
            Self::Email { .. } => is_email(value),
            Self::Url { .. } => is_url(value),
            Self::Trimmed { .. } => value.trim() == value,
        };
        (!passes).then(|| self.message())
    }

    /// Message reported when the rule fails.
    pub fn message(&self) -> &'static str {
        match self {
            Self::MinChars { message, .. }
            | Self::MaxChars { message, .. }
            | Self::Matches { message, .. }
            | Self::Email { message }
            | Self::Url { message }
            | Self::Trimmed { message } => message,
        }
    }
}

/// Whether a field must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absent or `null` values fail with `message`.
    Required { message: &'static str },
    /// Absent or `null` values are skipped and omitted from the output.
    Optional,
}

/// Expected value shape for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A string checked against every rule.
    Text(Vec<TextRule>),
    /// A boolean; form strings `on`/`true`/`off`/`false` are accepted.
    Flag,
    /// A list of records, each validated against the nested fields.
    Records(Vec<FieldSpec>),
}

/// A named field with its presence rule and shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    presence: Presence,
    shape: Shape,
}

impl FieldSpec {
    /// Required text field with no checks beyond presence.
    pub fn text(name: &'static str) -> Self {
        Self {
            name,
            presence: Presence::Required {
                message: REQUIRED_MESSAGE,
            },
            shape: Shape::Text(Vec::new()),
        }
    }

    /// Required boolean field.
    pub fn flag(name: &'static str) -> Self {
        Self {
            name,
            presence: Presence::Required {
                message: REQUIRED_MESSAGE,
            },
            shape: Shape::Flag,
        }
    }

    /// Required list of records.
    pub fn records(name: &'static str, fields: Vec<Self>) -> Self {
        Self {
            name,
            presence: Presence::Required {
                message: REQUIRED_MESSAGE,
            },
            shape: Shape::Records(fields),
        }
    }

    /// Replace the message reported when the field is missing.
    #[must_use]
    pub fn required_message(mut self, message: &'static str) -> Self {
        self.presence = Presence::Required { message };
        self
    }

    /// Allow the field to be absent.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Append a text rule. Has no effect on non-text shapes.
    #[must_use]
    pub fn rule(mut self, rule: TextRule) -> Self {
        if let Shape::Text(rules) = &mut self.shape {
            rules.push(rule);
        }
        self
    }

    /// Shorthand for [`TextRule::MinChars`].
    #[must_use]
    pub fn min(self, min: usize, message: &'static str) -> Self {
        self.rule(TextRule::MinChars { min, message })
    }

    /// Shorthand for [`TextRule::MaxChars`].
    #[must_use]
    pub fn max(self, max: usize, message: &'static str) -> Self {
        self.rule(TextRule::MaxChars { max, message })
    }

    /// Field name as submitted.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Presence rule.
    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Value shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Evaluate the raw `value` found at `path`.
    ///
    /// Failures are appended to `issues`. The returned value is the cleaned
    /// output for this field (records stripped of unknown keys), or `None`
    /// when the field is absent.
    pub fn evaluate(
        &self,
        value: Option<&Value>,
        path: &FieldPath,
        issues: &mut Vec<FieldIssue>,
    ) -> Option<Value> {
        let Some(value) = value.filter(|value| !value.is_null()) else {
            if let Presence::Required { message } = self.presence {
                issues.push(FieldIssue::field(path, message));
            }
            return None;
        };

        match &self.shape {
            Shape::Text(rules) => {
                let Some(text) = value.as_str() else {
                    issues.push(type_mismatch(path, "string", value));
                    return None;
                };
                issues.extend(
                    rules
                        .iter()
                        .filter_map(|rule| rule.check(text))
                        .map(|message| FieldIssue::field(path, message)),
                );
                Some(Value::String(text.to_owned()))
            }
            Shape::Flag => match parse_flag(value) {
                Some(flag) => Some(Value::Bool(flag)),
                None => {
                    issues.push(type_mismatch(path, "boolean", value));
                    None
                }
            },
            Shape::Records(fields) => {
                let Some(items) = value.as_array() else {
                    issues.push(type_mismatch(path, "array", value));
                    return None;
                };
                let records = items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| {
                        evaluate_record(fields, item, &path.index(index), issues)
                    })
                    .collect();
                Some(Value::Array(records))
            }
        }
    }
}

/// Validate `value` as a record holding exactly `fields`.
///
/// Unknown keys are dropped from the returned object.
pub fn evaluate_record(
    fields: &[FieldSpec],
    value: &Value,
    path: &FieldPath,
    issues: &mut Vec<FieldIssue>,
) -> Option<Value> {
    let Some(object) = value.as_object() else {
        issues.push(type_mismatch(path, "object", value));
        return None;
    };

    let mut output = Map::new();
    for field in fields {
        let field_path = path.key(field.name);
        if let Some(cleaned) = field.evaluate(object.get(field.name), &field_path, issues) {
            output.insert(field.name.to_owned(), cleaned);
        }
    }
    Some(Value::Object(output))
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(raw) => match raw.as_str() {
            "on" | "true" => Some(true),
            "off" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn type_mismatch(path: &FieldPath, expected: &str, value: &Value) -> FieldIssue {
    FieldIssue::field(
        path,
        format!("Expected {expected}, received {}", kind_of(value)),
    )
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Existing record identifier.
pub fn id() -> FieldSpec {
    FieldSpec::text("id")
        .min(1, "Existing id is required")
        .rule(TextRule::Trimmed {
            message: "Id must not have surrounding whitespace",
        })
}

/// Username: 4 to 20 letters, digits, dots or underscores.
pub fn username() -> FieldSpec {
    FieldSpec::text("username")
        .rule(TextRule::Matches {
            pattern: Pattern::Username,
            message: "Only alphabet, number, dot, underscore allowed",
        })
        .min(USERNAME_MIN, "Username require at least 4 characters")
        .max(USERNAME_MAX, "Username limited to 20 characters")
}

/// Full name.
pub fn name() -> FieldSpec {
    FieldSpec::text("name")
        .min(1, "Full name is required")
        .max(SHORT_TEXT_MAX, "Full name limited to 50 characters")
}

/// Nick name; may be empty.
pub fn nick() -> FieldSpec {
    FieldSpec::text("nick").max(SHORT_TEXT_MAX, "Nick name limited to 50 characters")
}

/// Email address.
pub fn email() -> FieldSpec {
    FieldSpec::text("email")
        .min(1, "Email is required")
        .rule(TextRule::Email {
            message: "This is not an email",
        })
}

/// New password.
pub fn password() -> FieldSpec {
    FieldSpec::text("password")
        .required_message("Password is required")
        .min(PASSWORD_MIN, "Password at least 8 characters")
        .max(PASSWORD_MAX, "Password max of 100 characters")
}

/// Password confirmation; equality is a cross-field rule on the schema.
pub fn confirm_password() -> FieldSpec {
    FieldSpec::text("confirmPassword")
}

/// Password the user currently signs in with.
pub fn current_password() -> FieldSpec {
    FieldSpec::text("currentPassword")
        .required_message("Current password is required")
        .min(1, "Current password is required")
}

/// "Remember me" toggle.
pub fn remember() -> FieldSpec {
    FieldSpec::flag("remember").optional()
}

/// Path to return to after signing in.
pub fn redirect_to() -> FieldSpec {
    FieldSpec::text("redirectTo").optional()
}

/// Username of the inviting user.
pub fn invite_by() -> FieldSpec {
    FieldSpec::text("inviteBy").optional()
}

/// Invitation code.
pub fn invite_code() -> FieldSpec {
    FieldSpec::text("inviteCode").optional()
}

/// Role symbol assigned by administrators.
pub fn role_symbol() -> FieldSpec {
    FieldSpec::text("roleSymbol").min(1, "Role is required")
}

/// Optional list of `{ id, symbol? }` tags.
pub fn tags() -> FieldSpec {
    FieldSpec::records("tags", vec![id(), FieldSpec::text("symbol").optional()]).optional()
}

/// Profile mode name.
pub fn mode_name() -> FieldSpec {
    FieldSpec::text("modeName").min(1, "Profile mode name is required")
}

/// Profile headline; may be empty.
pub fn headline() -> FieldSpec {
    FieldSpec::text("headline").max(SHORT_TEXT_MAX, "Headline limited to 50 characters")
}

/// Optional profile bio.
pub fn bio() -> FieldSpec {
    FieldSpec::text("bio")
        .max(BIO_MAX, "Bio limited to 1000 characters")
        .optional()
}

/// Fields of a single profile link.
pub fn link_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("url").rule(TextRule::Url {
            message: "Please enter a valid URL.",
        }),
        FieldSpec::text("text").optional(),
    ]
}

/// Optional list of `{ url, text? }` links.
pub fn links() -> FieldSpec {
    FieldSpec::records("links", link_fields()).optional()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn run(spec: &FieldSpec, value: Option<Value>) -> (Option<Value>, Vec<String>) {
        let mut issues = Vec::new();
        let path = FieldPath::root().key(spec.name());
        let output = spec.evaluate(value.as_ref(), &path, &mut issues);
        let messages = issues.iter().map(|issue| issue.message().to_owned()).collect();
        (output, messages)
    }

    #[rstest]
    #[case("ab", &["Username require at least 4 characters"])]
    #[case("a!", &[
        "Only alphabet, number, dot, underscore allowed",
        "Username require at least 4 characters",
    ])]
    #[case("abcdefghijklmnopqrstu", &["Username limited to 20 characters"])]
    #[case("valid_user.99", &[])]
    fn username_rules(#[case] raw: &str, #[case] expected: &[&str]) {
        let (_, messages) = run(&username(), Some(json!(raw)));
        assert_eq!(messages, expected);
    }

    #[rstest]
    #[case("ada@example.com", true)]
    #[case("first.last+tag@mail.example.org", true)]
    #[case("o'brien@example.ie", true)]
    #[case(".ada@example.com", false)]
    #[case("ada..lovelace@example.com", false)]
    #[case("ada.@example.com", false)]
    #[case("ada@example", false)]
    #[case("ada@-example.com", false)]
    #[case("ada example.com", false)]
    #[case("", false)]
    fn email_syntax(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(is_email(raw), expected);
    }

    #[rstest]
    fn empty_email_reports_both_checks() {
        let (_, messages) = run(&email(), Some(json!("")));
        assert_eq!(messages, ["Email is required", "This is not an email"]);
    }

    #[rstest]
    #[case(None, &["Password is required"])]
    #[case(Some(json!(null)), &["Password is required"])]
    #[case(Some(json!("short")), &["Password at least 8 characters"])]
    #[case(Some(json!("x".repeat(101))), &["Password max of 100 characters"])]
    #[case(Some(json!(12_345_678)), &["Expected string, received number"])]
    #[case(Some(json!("Abcd1234")), &[])]
    fn password_rules(#[case] value: Option<Value>, #[case] expected: &[&str]) {
        let (_, messages) = run(&password(), value);
        assert_eq!(messages, expected);
    }

    #[rstest]
    fn lengths_count_characters_not_bytes() {
        let (_, messages) = run(&name(), Some(json!("é".repeat(50))));
        assert!(messages.is_empty());
    }

    #[rstest]
    fn optional_fields_may_be_absent() {
        let (output, messages) = run(&bio(), None);
        assert!(output.is_none());
        assert!(messages.is_empty());
    }

    #[rstest]
    #[case(json!("on"), Some(json!(true)))]
    #[case(json!("false"), Some(json!(false)))]
    #[case(json!(true), Some(json!(true)))]
    #[case(json!("maybe"), None)]
    fn flags_accept_form_strings(#[case] value: Value, #[case] expected: Option<Value>) {
        let (output, _) = run(&remember(), Some(value));
        assert_eq!(output, expected);
    }

    #[rstest]
    fn links_report_nested_paths_and_drop_unknown_keys() {
        let mut issues = Vec::new();
        let value = json!([
            { "url": "https://example.com", "text": "Home", "extra": 1 },
            { "url": "not a url" },
        ]);
        let output = links().evaluate(Some(&value), &FieldPath::root().key("links"), &mut issues);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path(), "links[1].url");
        assert_eq!(issues[0].message(), "Please enter a valid URL.");
        assert_eq!(
            output,
            Some(json!([
                { "url": "https://example.com", "text": "Home" },
                { "url": "not a url" },
            ]))
        );
    }

    #[rstest]
    #[case("user-1", &[])]
    #[case("", &["Existing id is required"])]
    #[case(" user-1", &["Id must not have surrounding whitespace"])]
    #[case("user-1\t", &["Id must not have surrounding whitespace"])]
    fn ids_must_be_present_and_trimmed(#[case] raw: &str, #[case] expected: &[&str]) {
        let (_, messages) = run(&id(), Some(json!(raw)));
        assert_eq!(messages, expected);
    }

    #[rstest]
    fn tags_require_ids() {
        let (_, messages) = run(&tags(), Some(json!([{ "symbol": "rust" }])));
        assert_eq!(messages, [REQUIRED_MESSAGE]);
    }
}
