//! Process-local adapters for the account ports.
//!
//! Used by the server binary and by HTTP tests; state is lost on restart.

mod accounts;
mod password_hash;

pub use accounts::{AccountProfile, DEMO_EMAIL, DEMO_PASSWORD, InMemoryAccounts, NewAccount};
pub use password_hash::PasswordHashing;
