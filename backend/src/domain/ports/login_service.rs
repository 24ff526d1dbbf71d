//! Driving port for sign-in.
//!
//! Inbound adapters call it to authenticate a validated sign-in form without
//! knowing the backing store.

use async_trait::async_trait;

use crate::domain::validation::SignIn;
use crate::domain::{Error, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Check the credentials and return the authenticated user id.
    ///
    /// Unknown emails and wrong passwords both yield
    /// [`ErrorCode::Unauthorized`](crate::domain::ErrorCode::Unauthorized).
    async fn authenticate(&self, credentials: &SignIn) -> Result<UserId, Error>;
}
