//! Driven ports for account mutations.
//!
//! Settings intents hand validated records to these ports. Adapters report a
//! refusal the user can act on (wrong current password) as
//! [`AccountUpdateError::Rejected`] and a value another account already holds
//! as [`AccountUpdateError::Taken`]. Infrastructure trouble is
//! [`AccountUpdateError::Unavailable`].

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::validation::{PasswordChange, ProfileChange};
use crate::domain::{Error, UserId};

define_port_error! {
    /// Errors raised by account mutation adapters.
    pub enum AccountUpdateError {
        /// The store refused the change; the message is shown to the user.
        Rejected { message: String } => "{message}",
        /// A unique value such as a username belongs to another account.
        Taken { message: String } => "{message}",
        /// The store could not be reached or failed mid-write.
        Unavailable { message: String } => "account store unavailable: {message}",
    }
}

impl From<AccountUpdateError> for Error {
    fn from(value: AccountUpdateError) -> Self {
        match value {
            AccountUpdateError::Rejected { message } => Self::forbidden(message),
            AccountUpdateError::Taken { message } => Self::conflict(message),
            AccountUpdateError::Unavailable { message } => {
                Self::internal(format!("account store unavailable: {message}"))
            }
        }
    }
}

/// Port for replacing a user's password.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordUpdateCommand: Send + Sync {
    /// Verify the current password and store the new one.
    async fn update_password(&self, change: &PasswordChange) -> Result<(), AccountUpdateError>;
}

/// Port for single-field profile edits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileUpdateCommand: Send + Sync {
    /// Apply `change` to the profile of `user_id`.
    async fn apply(
        &self,
        user_id: &UserId,
        change: &ProfileChange,
    ) -> Result<(), AccountUpdateError>;
}
