//! Request middleware.
//!
//! Purpose: attach a trace identifier to every request for log and error
//! correlation.

pub mod trace;

pub use trace::Trace;
