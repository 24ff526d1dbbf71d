//! Account settings backend: field validation, schema composition, settings
//! actions and the HTTP adapter serving them.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
