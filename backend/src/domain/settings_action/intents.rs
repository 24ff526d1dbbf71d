//! Intent handlers and the registry that routes submissions to them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{PasswordUpdateCommand, ProfileUpdateCommand};
use crate::domain::validation::{Operation, PasswordChange, ProfileChange, ValidatedFields};
use crate::domain::{Error, UserId};

/// Payload key carrying the submitted intent.
pub const INTENT_FIELD: &str = "intent";

/// Intent sent by the password settings form.
pub const UPDATE_USER_PASSWORD: &str = "update-user-password";

/// Older spelling of [`UPDATE_USER_PASSWORD`], still accepted.
pub const UPDATE_PASSWORD_ALIAS: &str = "update-password";

/// Confirmation returned after a password change.
pub const PASSWORD_CHANGED: &str = "Password has been changed.";

/// Refusal returned when the submitted `id` is not the session user.
pub const NOT_YOUR_ACCOUNT: &str = "You can only change your own account";

/// Profile intents and the schema each validates with.
pub const PROFILE_INTENTS: [(&str, Operation); 9] = [
    ("update-user-username", Operation::UpdateUsername),
    ("update-user-name", Operation::UpdateName),
    ("update-user-nick", Operation::UpdateNick),
    ("update-user-email", Operation::UpdateEmail),
    ("update-user-tags", Operation::UpdateTags),
    ("update-profile-mode-name", Operation::ProfileModeName),
    ("update-profile-headline", Operation::ProfileHeadline),
    ("update-profile-bio", Operation::ProfileBio),
    ("update-profile-links", Operation::ProfileLinks),
];

/// Handler for one recognised intent.
///
/// The dispatcher validates the payload with [`IntentHandler::operation`]'s
/// schema before calling [`IntentHandler::handle`].
#[async_trait]
pub trait IntentHandler: Send + Sync {
    /// Schema the payload must satisfy.
    fn operation(&self) -> Operation;

    /// Apply the validated submission on behalf of `user_id`.
    ///
    /// Returns the confirmation message shown to the user. Return a
    /// forbidden or conflict [`Error`] to reject the submission without field
    /// errors.
    async fn handle(&self, user_id: &UserId, fields: ValidatedFields) -> Result<String, Error>;
}

fn ensure_own_account(user_id: &UserId, account: &UserId) -> Result<(), Error> {
    if account == user_id {
        return Ok(());
    }
    warn!(session_user = %user_id, account = %account, "settings change targets another account");
    Err(Error::forbidden(NOT_YOUR_ACCOUNT))
}

/// Applies password changes through a [`PasswordUpdateCommand`].
#[derive(Clone)]
pub struct PasswordUpdateHandler {
    command: Arc<dyn PasswordUpdateCommand>,
}

impl PasswordUpdateHandler {
    pub fn new(command: Arc<dyn PasswordUpdateCommand>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl IntentHandler for PasswordUpdateHandler {
    fn operation(&self) -> Operation {
        Operation::UpdatePassword
    }

    async fn handle(&self, user_id: &UserId, fields: ValidatedFields) -> Result<String, Error> {
        let change: PasswordChange = fields.into_record()?;
        ensure_own_account(user_id, &change.id)?;
        self.command.update_password(&change).await?;
        info!(user_id = %user_id, "password changed");
        Ok(PASSWORD_CHANGED.to_owned())
    }
}

/// Applies one kind of profile edit through a [`ProfileUpdateCommand`].
#[derive(Clone)]
pub struct ProfileFieldHandler {
    operation: Operation,
    command: Arc<dyn ProfileUpdateCommand>,
}

impl ProfileFieldHandler {
    pub fn new(operation: Operation, command: Arc<dyn ProfileUpdateCommand>) -> Self {
        Self { operation, command }
    }
}

#[async_trait]
impl IntentHandler for ProfileFieldHandler {
    fn operation(&self) -> Operation {
        self.operation
    }

    async fn handle(&self, user_id: &UserId, fields: ValidatedFields) -> Result<String, Error> {
        let (account, change) = ProfileChange::from_fields(self.operation, fields)?;
        ensure_own_account(user_id, &account)?;
        self.command.apply(&account, &change).await?;
        info!(user_id = %user_id, field = change.label(), "profile updated");
        Ok(format!("{} has been changed.", change.label()))
    }
}

/// Explicit mapping from intent strings to handlers.
///
/// # Examples
/// ```
/// use account_settings::domain::IntentRegistry;
///
/// let registry = IntentRegistry::new();
/// assert!(registry.get("update-user-password").is_none());
/// ```
#[derive(Clone, Default)]
pub struct IntentRegistry {
    handlers: HashMap<String, Arc<dyn IntentHandler>>,
}

impl IntentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `intent` to `handler`, replacing any previous registration.
    #[must_use]
    pub fn register(mut self, intent: impl Into<String>, handler: Arc<dyn IntentHandler>) -> Self {
        self.handlers.insert(intent.into(), handler);
        self
    }

    /// Registry for the password settings form.
    pub fn password_settings(command: Arc<dyn PasswordUpdateCommand>) -> Self {
        let handler: Arc<dyn IntentHandler> = Arc::new(PasswordUpdateHandler::new(command));
        Self::new()
            .register(UPDATE_USER_PASSWORD, Arc::clone(&handler))
            .register(UPDATE_PASSWORD_ALIAS, handler)
    }

    /// Registry for the profile settings forms.
    pub fn profile_settings(command: Arc<dyn ProfileUpdateCommand>) -> Self {
        PROFILE_INTENTS
            .into_iter()
            .fold(Self::new(), |registry, (intent, operation)| {
                let handler = ProfileFieldHandler::new(operation, Arc::clone(&command));
                registry.register(intent, Arc::new(handler))
            })
    }

    /// Handler registered for `intent`.
    pub fn get(&self, intent: &str) -> Option<&Arc<dyn IntentHandler>> {
        self.handlers.get(intent)
    }

    /// Registered intents in lexical order.
    pub fn intents(&self) -> Vec<&str> {
        let mut intents: Vec<_> = self.handlers.keys().map(String::as_str).collect();
        intents.sort_unstable();
        intents
    }
}

impl fmt::Debug for IntentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentRegistry")
            .field("intents", &self.intents())
            .finish()
    }
}
