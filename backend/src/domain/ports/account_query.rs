//! Driving port for reading account summaries.

use async_trait::async_trait;

use crate::domain::{AccountSummary, Error, UserId};

/// Domain use-case port for the password settings loader.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Load the summary for `user_id`, or [`Error::not_found`].
    async fn account(&self, user_id: &UserId) -> Result<AccountSummary, Error>;
}
