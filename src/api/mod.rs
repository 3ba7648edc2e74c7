//! The authenticated API gateway.
//!
//! This module provides `SessionGateway`, the single point through which the
//! admin console talks to the REST API: it injects the bearer credential,
//! intercepts authorization failures, and owns the logout procedure and the
//! inactivity watchdog.

pub mod error;
pub mod gateway;

pub use error::GatewayError;
pub use gateway::{
    LogoutOptions, Navigator, Notifier, RequestBody, RequestOptions, SessionGateway,
};
