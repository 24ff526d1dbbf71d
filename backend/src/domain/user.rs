//! User identity model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier carried surrounding whitespace.
    #[error("user id must not contain surrounding whitespace")]
    UntrimmedId,
}

/// Stable user identifier.
///
/// Identifiers are opaque: any non-empty, trimmed string is accepted so ids
/// minted by other systems (cuid, UUID, numeric) survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::UntrimmedId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Read model returned to the password settings page.
///
/// The stored password hash never leaves the store; only whether one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    id: UserId,
    has_password: bool,
}

impl AccountSummary {
    /// Build a summary for `id`.
    pub fn new(id: UserId, has_password: bool) -> Self {
        Self { id, has_password }
    }

    /// Account identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Whether the account has a password set.
    pub fn has_password(&self) -> bool {
        self.has_password
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyId)]
    #[case(" abc", UserValidationError::UntrimmedId)]
    #[case("abc\n", UserValidationError::UntrimmedId)]
    fn rejects_invalid_ids(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[rstest]
    #[case("clh3am8xq0000uz0g6tq2v1xz")]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn accepts_opaque_ids(#[case] raw: &str) {
        let id = UserId::new(raw).expect("valid id");
        assert_eq!(id.as_ref(), raw);
    }

    #[rstest]
    fn deserialisation_validates() {
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
        let id: UserId = serde_json::from_str("\"u-1\"").expect("valid id");
        assert_eq!(id.to_string(), "u-1");
    }

    #[rstest]
    fn summary_serialises_without_secrets() {
        let summary = AccountSummary::new(UserId::new("u-1").expect("id"), true);
        let value = serde_json::to_value(&summary).expect("serialise");
        assert_eq!(value, serde_json::json!({ "id": "u-1", "hasPassword": true }));
    }
}
