//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod facility;
pub mod health;
pub mod queue;
pub mod schedule;
pub mod schemas;
pub mod session;
pub mod sms;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub(crate) mod validation;

pub use error::ApiResult;
