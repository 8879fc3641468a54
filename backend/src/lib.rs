//! Yard appointment slots and truck queue service.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the model, the
//! services, and the port traits; [`inbound`] adapts HTTP requests onto the
//! driving ports; [`outbound`] implements the driven ports with PostgreSQL,
//! in-memory stores, and SMS and email transports.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
