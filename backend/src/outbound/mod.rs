//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators between domain types and storage. They
//! contain no validation; records arrive already checked by the schemas.
//!
//! - **memory**: in-process account store with Argon2id password hashes

pub mod memory;
