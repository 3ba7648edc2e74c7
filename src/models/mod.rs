//! Domain models shared between the session gateway and its callers.

pub mod admin;

pub use admin::AdminUser;
