//! Typed views of validated submissions.
//!
//! Each record mirrors one schema. Build them through
//! [`parse`](super::parse) or [`ValidatedFields::into_record`] so the schema
//! rules have run first; the serde derives only decode shapes.

use serde::Deserialize;

use super::schema::Operation;
use super::submission::ValidatedFields;
use crate::domain::{Error, Secret, UserId};

/// Registration form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: Secret,
    #[serde(default)]
    pub remember: Option<bool>,
    #[serde(default)]
    pub invite_by: Option<String>,
    #[serde(default)]
    pub invite_code: Option<String>,
}

/// Sign-in form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignIn {
    pub email: String,
    pub password: Secret,
    #[serde(default)]
    pub remember: Option<bool>,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Password change request; the confirmation has already been matched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub id: UserId,
    pub current_password: Secret,
    pub password: Secret,
}

/// Profile link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct Link {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Tag reference attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct Tag {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// Administrator edit of another user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserUpdate {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub nick: String,
    pub email: String,
    #[serde(default)]
    pub links: Option<Vec<Link>>,
    pub role_symbol: String,
}

/// Single-field profile edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileChange {
    Username(String),
    Name(String),
    Nick(String),
    Email(String),
    Tags(Vec<Tag>),
    ModeName(String),
    Headline(String),
    Bio(Option<String>),
    Links(Vec<Link>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileFields {
    id: UserId,
    username: Option<String>,
    name: Option<String>,
    nick: Option<String>,
    email: Option<String>,
    tags: Option<Vec<Tag>>,
    mode_name: Option<String>,
    headline: Option<String>,
    bio: Option<String>,
    links: Option<Vec<Link>>,
}

impl ProfileChange {
    /// Build the change described by fields validated for `operation`.
    ///
    /// Returns the target user id alongside the change.
    ///
    /// # Errors
    /// Returns an internal [`Error`] when `operation` is not a profile edit
    /// or the fields do not belong to it.
    pub fn from_fields(
        operation: Operation,
        fields: ValidatedFields,
    ) -> Result<(UserId, Self), Error> {
        let ProfileFields {
            id,
            username,
            name,
            nick,
            email,
            tags,
            mode_name,
            headline,
            bio,
            links,
        } = fields.into_record()?;

        let change = match operation {
            Operation::UpdateUsername => username.map(Self::Username),
            Operation::UpdateName => name.map(Self::Name),
            Operation::UpdateNick => nick.map(Self::Nick),
            Operation::UpdateEmail => email.map(Self::Email),
            Operation::UpdateTags => Some(Self::Tags(tags.unwrap_or_default())),
            Operation::ProfileModeName => mode_name.map(Self::ModeName),
            Operation::ProfileHeadline => headline.map(Self::Headline),
            Operation::ProfileBio => Some(Self::Bio(bio)),
            Operation::ProfileLinks => Some(Self::Links(links.unwrap_or_default())),
            Operation::SignUp
            | Operation::SignIn
            | Operation::UpdatePassword
            | Operation::AdminUpdate => None,
        };

        change
            .map(|change| (id, change))
            .ok_or_else(|| Error::internal(format!("{operation} is not a profile edit")))
    }

    /// Short label used in confirmation messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Username(_) => "Username",
            Self::Name(_) => "Full name",
            Self::Nick(_) => "Nick name",
            Self::Email(_) => "Email",
            Self::Tags(_) => "Tags",
            Self::ModeName(_) => "Profile mode name",
            Self::Headline(_) => "Headline",
            Self::Bio(_) => "Bio",
            Self::Links(_) => "Links",
        }
    }
}
