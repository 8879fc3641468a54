//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: mutex-guarded in-process store implementing the same ports
//! - **sms**: Twilio transport and a logging stub
//! - **email**: HTTP mail relay transport and a logging stub
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod email;
pub mod memory;
pub mod persistence;
pub mod sms;
