//! Core session and API-gateway library for the Yulita Cakes admin console.
//!
//! The console's UI layers never construct HTTP requests themselves. They
//! hold a [`SessionGateway`], read `token`/`user` from it, send every API
//! call through [`SessionGateway::auth_fetch`], and feed it user-activity
//! signals. The gateway owns the rest: bearer-credential injection, 401
//! interception, the single-flight logout procedure, and the inactivity
//! watchdog that ends idle sessions.
//!
//! Construct one gateway at application start and clone it wherever needed;
//! clones share the same session state and connection pool.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{
    GatewayError, LogoutOptions, Navigator, Notifier, RequestBody, RequestOptions, SessionGateway,
};
pub use auth::{InactivityMonitor, MemoryStorage, MonitorState, SessionStorage, SessionStore};
pub use config::GatewayConfig;
pub use models::AdminUser;
