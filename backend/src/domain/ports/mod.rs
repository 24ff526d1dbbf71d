//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the domain expects to interact with adapters (account
//! stores, sessions). Mutation ports expose strongly typed errors so adapters
//! map their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod account_query;
mod account_update_command;
mod login_service;
mod session_source;

#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::AccountQuery;
#[cfg(test)]
pub use account_update_command::{MockPasswordUpdateCommand, MockProfileUpdateCommand};
pub use account_update_command::{AccountUpdateError, PasswordUpdateCommand, ProfileUpdateCommand};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
pub use session_source::{FixtureSession, SessionSource};
