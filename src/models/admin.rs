//! The authenticated admin principal.

use serde::{Deserialize, Serialize};

/// Denormalized snapshot of the signed-in admin, as returned by the login
/// and profile endpoints. Replaced wholesale when the profile changes; the
/// gateway never merges individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
