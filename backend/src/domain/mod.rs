//! Domain primitives, validation rules, and the settings dispatcher.
//!
//! Purpose: Define the account-settings engine independently of HTTP and
//! storage. Adapters reach the domain through [`ports`]; everything else here
//! is pure apart from the dispatcher's delay.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - UserId, AccountSummary: account identity and loader view.
//! - Secret: redacted password buffer.
//! - validation: field rules, schemas, typed records.
//! - slug: title slugs with random suffixes.
//! - SettingsActionDispatcher: intent routing for settings forms.

pub mod auth;
pub mod error;
pub mod ports;
pub mod settings_action;
pub mod slug;
pub mod user;
pub mod validation;

pub use self::auth::Secret;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::settings_action::{
    ActionOutcome, DelayPolicy, FixedDelay, IntentHandler, IntentRegistry, NoDelay,
    SettingsActionDispatcher,
};
pub use self::slug::{Slug, make_slug};
pub use self::user::{AccountSummary, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use account_settings::domain::{ApiResult, Error};
///
/// fn load() -> ApiResult<u32> {
///     Err(Error::forbidden("nope"))
/// }
///
/// assert!(load().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
