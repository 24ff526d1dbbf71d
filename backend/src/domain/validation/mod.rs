//! Validation of user account submissions.
//!
//! Field rules ([`rules`]) are plain data bound into per-operation schemas
//! ([`compose`]). [`validate`] evaluates a schema against a raw JSON payload
//! without touching any shared state; typed records ([`records`]) decode the
//! validated fields.

pub mod records;
pub mod rules;
mod schema;
mod submission;

pub use self::records::{
    AdminUserUpdate, Link, PasswordChange, ProfileChange, SignIn, SignUp, Tag,
};
pub use self::rules::{FieldSpec, Pattern, Presence, Shape, TextRule};
pub use self::schema::{CrossFieldRule, Operation, Schema, UnknownOperation, compose, parse, validate};
pub use self::submission::{
    FieldErrors, FieldIssue, FieldPath, IssueKind, SubmissionResult, ValidatedFields,
};
