//! Driving-side view of the request session.
//!
//! The settings dispatcher only needs to know who (if anyone) is signed in.
//! HTTP adapters implement this over the cookie session; tests use
//! [`FixtureSession`].

use crate::domain::{Error, UserId};

/// Source of the authenticated user for one request.
pub trait SessionSource {
    /// Return the signed-in user, or `None` when the request is anonymous.
    fn current_user(&self) -> Result<Option<UserId>, Error>;
}

/// Fixed session used by tests and tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSession(Option<UserId>);

impl FixtureSession {
    /// Session signed in as `user_id`.
    pub fn signed_in(user_id: UserId) -> Self {
        Self(Some(user_id))
    }

    /// Anonymous session.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl SessionSource for FixtureSession {
    fn current_user(&self) -> Result<Option<UserId>, Error> {
        Ok(self.0.clone())
    }
}
