//! Session state and inactivity tracking.
//!
//! This module provides:
//! - `SessionStore`: token/user pair mirrored to tab-scoped storage
//! - `InactivityMonitor`: watchdog that ends idle sessions
//!
//! Both are owned by the `SessionGateway`; UI code reaches them only through
//! the gateway surface.

pub mod monitor;
pub mod session;

pub use monitor::{InactivityMonitor, MonitorState};
pub use session::{MemoryStorage, SessionStorage, SessionStore};
