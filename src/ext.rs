//! Caller-supplied extension hooks.
//!
//! The crate exposes the contract; callers bring the implementation (a sidecar, a managed
//! identity endpoint, a test double).

pub mod app_token_provider;

pub use app_token_provider::*;
