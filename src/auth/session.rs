//! Session persistence: the current token/user pair and its storage mirror.
//!
//! The store keeps both values in memory and writes every change through to
//! a `SessionStorage` backend synchronously, so a read issued right after a
//! write always sees the new value. Hydration happens once, at construction:
//! whatever the backend holds becomes the initial session. A stored user
//! entry that fails to parse is discarded rather than propagated — a corrupt
//! entry must never take the console down.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::models::AdminUser;

/// Storage key for the bearer token.
const TOKEN_KEY: &str = "admin_token";

/// Storage key for the serialized user snapshot.
const USER_KEY: &str = "admin_user";

/// String key/value storage scoped to the current session of the app shell.
///
/// The contract mirrors browser tab storage: entries live for the lifetime
/// of the shell and are not durable across restarts. Implementations must be
/// synchronous; the store relies on read-after-write visibility.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Process-local storage backend, the default.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// The current session: bearer token plus the admin it belongs to.
///
/// Login sets both, logout clears both. The store tolerates a token without
/// a user (token-only restore) but never the reverse path on its own.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    token: Mutex<Option<String>>,
    user: Mutex<Option<AdminUser>>,
}

impl SessionStore {
    /// Build the store and hydrate it from the storage backend.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let token = storage.get(TOKEN_KEY);

        let user = match storage.get(USER_KEY) {
            Some(raw) => match serde_json::from_str::<AdminUser>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(error = %err, "stored user entry is corrupt, discarding it");
                    storage.remove(USER_KEY);
                    None
                }
            },
            None => None,
        };

        if token.is_some() {
            debug!("restored session token from storage");
        }

        Self {
            storage,
            token: Mutex::new(token),
            user: Mutex::new(user),
        }
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    /// Replace the token. `None` removes the stored entry as well.
    pub fn set_token(&self, token: Option<String>) {
        match &token {
            Some(value) => self.storage.set(TOKEN_KEY, value),
            None => self.storage.remove(TOKEN_KEY),
        }
        *self.token.lock().unwrap() = token;
    }

    /// Current admin snapshot, if any.
    pub fn user(&self) -> Option<AdminUser> {
        self.user.lock().unwrap().clone()
    }

    /// Replace the user wholesale. Last write wins; no field merging.
    pub fn set_user(&self, user: Option<AdminUser>) {
        match &user {
            Some(value) => match serde_json::to_string(value) {
                Ok(raw) => self.storage.set(USER_KEY, &raw),
                Err(err) => warn!(error = %err, "failed to serialize user for storage"),
            },
            None => self.storage.remove(USER_KEY),
        }
        *self.user.lock().unwrap() = user;
    }

    /// Clear token and user together (the logout teardown).
    pub fn clear(&self) {
        self.set_token(None);
        self.set_user(None);
    }
}
