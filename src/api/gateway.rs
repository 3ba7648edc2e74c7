//! The session gateway: authenticated requests, logout, inactivity handling.
//!
//! One `SessionGateway` is constructed at application start and handed to
//! every UI component that talks to the API. Components read `token`/`user`,
//! send requests through `auth_fetch`, and feed activity signals; the
//! gateway reacts to authorization failures and idle sessions by running the
//! one logout procedure all teardown paths share.
//!
//! Clone is cheap - the inner state is behind an Arc, the same way
//! `reqwest::Client` shares its connection pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::{InactivityMonitor, MonitorState, SessionStorage, SessionStore};
use crate::config::GatewayConfig;
use crate::models::AdminUser;

use super::GatewayError;

// ============================================================================
// Constants
// ============================================================================

/// Server path for credential sign-in.
const LOGIN_PATH: &str = "/admin/login";

/// Server path for best-effort token invalidation.
const LOGOUT_PATH: &str = "/admin/logout";

/// Default message for an explicit sign-out.
const SIGNED_OUT_MESSAGE: &str = "You have been signed out.";

/// Shown when an API call comes back 401 and the session is torn down.
const SESSION_ENDED_MESSAGE: &str = "Your session has ended. Please sign in again.";

/// Shown when the inactivity watchdog ends the session.
const INACTIVITY_MESSAGE: &str = "Your session ended due to inactivity.";

// ============================================================================
// Side-channels
// ============================================================================

/// Navigation side-channel: where "go back to the login screen" is routed.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Notification side-channel for user-facing session messages (toasts).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

// ============================================================================
// Request shaping
// ============================================================================

/// Body of an outgoing API request.
///
/// JSON payloads get `Content-Type: application/json`; multipart uploads are
/// passed through untouched so the client can set its own boundary header.
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

/// Options for a single `auth_fetch` call.
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn json(method: Method, body: serde_json::Value) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: RequestBody::Json(body),
        }
    }

    pub fn multipart(method: Method, form: reqwest::multipart::Form) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: RequestBody::Multipart(form),
        }
    }

    pub fn with_header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Options for `handle_logout`.
#[derive(Debug, Clone)]
pub struct LogoutOptions {
    /// Whether to surface a message through the `Notifier`.
    pub notify: bool,
    /// Message to surface; `None` falls back to the sign-out default.
    pub message: Option<String>,
}

impl Default for LogoutOptions {
    fn default() -> Self {
        Self {
            notify: true,
            message: None,
        }
    }
}

impl LogoutOptions {
    pub fn silent() -> Self {
        Self {
            notify: false,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            notify: true,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: AdminUser,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// ============================================================================
// Gateway
// ============================================================================

struct GatewayInner {
    http: Client,
    config: GatewayConfig,
    store: SessionStore,
    monitor: InactivityMonitor,
    logging_out: AtomicBool,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

/// The single point through which all authenticated API calls flow.
#[derive(Clone)]
pub struct SessionGateway {
    inner: Arc<GatewayInner>,
}

impl SessionGateway {
    /// Build a gateway with the default in-memory storage backend.
    pub fn new(
        config: GatewayConfig,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, GatewayError> {
        Self::with_storage(
            config,
            Arc::new(crate::auth::MemoryStorage::new()),
            navigator,
            notifier,
        )
    }

    /// Build a gateway over an injected storage backend, hydrating any
    /// session it already holds. A restored token arms the inactivity
    /// monitor immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_storage(
        config: GatewayConfig,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        let monitor = InactivityMonitor::new(config.inactivity_timeout);
        let store = SessionStore::new(storage);

        let gateway = Self {
            inner: Arc::new(GatewayInner {
                http,
                config,
                store,
                monitor,
                logging_out: AtomicBool::new(false),
                navigator,
                notifier,
            }),
        };
        if gateway.inner.store.token().is_some() {
            gateway.arm_monitor();
        }
        Ok(gateway)
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.inner.store.token()
    }

    /// Current admin snapshot, if any.
    pub fn user(&self) -> Option<AdminUser> {
        self.inner.store.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Replace the token. Setting one arms the inactivity monitor, clearing
    /// it detaches the monitor.
    pub fn set_token(&self, token: Option<String>) {
        let present = token.is_some();
        self.inner.store.set_token(token);
        if present {
            self.arm_monitor();
        } else {
            self.inner.monitor.detach();
        }
    }

    /// Replace the user snapshot wholesale (post-login or profile update).
    pub fn set_user(&self, user: Option<AdminUser>) {
        self.inner.store.set_user(user);
    }

    /// Feed a user-activity signal (pointer, key, scroll, touch) to the
    /// inactivity watchdog.
    pub fn record_activity(&self) {
        self.inner.monitor.record_activity();
    }

    /// Observable state of the inactivity watchdog.
    pub fn monitor_state(&self) -> MonitorState {
        self.inner.monitor.state()
    }

    /// Sign in with admin credentials.
    ///
    /// Goes straight to the login endpoint rather than through `auth_fetch`:
    /// a 401 here means rejected credentials, not a dead session, and must
    /// not trigger the teardown. On success the session is stored and the
    /// watchdog armed.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, GatewayError> {
        let url = format!("{}{}", self.inner.config.api_base_url, LOGIN_PATH);
        let response = self
            .inner
            .http
            .post(&url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("login failed with status {}", status));
            debug!(%status, "login rejected");
            return Err(GatewayError::LoginRejected(message));
        }

        let login: LoginResponse = serde_json::from_str(&body)
            .map_err(|err| GatewayError::InvalidResponse(format!("login response: {}", err)))?;

        self.set_token(Some(login.token));
        self.set_user(Some(login.user.clone()));
        info!(admin_id = login.user.id, "admin signed in");
        Ok(login.user)
    }

    /// Send an authenticated request to a relative API path.
    ///
    /// Attaches `Accept: application/json` and, when a token is present,
    /// `Authorization: Bearer <token>`. Caller headers are merged in but can
    /// never displace the auth header. A 401 response runs the logout
    /// sequence and comes back as `GatewayError::Unauthorized`; transport
    /// failures come back as `GatewayError::Network` and leave the session
    /// alone.
    pub async fn auth_fetch(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response, GatewayError> {
        let url = format!("{}{}", self.inner.config.api_base_url, path);
        let RequestOptions {
            method,
            headers,
            body,
        } = options;

        let mut merged = HeaderMap::new();
        merged.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // Multipart uploads negotiate their own content type (boundary
        // included), so the gateway stays out of the way.
        if !matches!(body, RequestBody::Multipart(_)) {
            merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        for (name, value) in headers.iter() {
            merged.insert(name, value.clone());
        }
        if let Some(token) = self.inner.store.token() {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", token))?;
            merged.insert(AUTHORIZATION, bearer);
        }

        let mut request = self.inner.http.request(method, &url).headers(merged);
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(path, error = %err, "request failed");
                return Err(GatewayError::Network(err));
            }
        };

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!(path, "got 401, ending session");
            self.handle_logout(LogoutOptions::with_message(SESSION_ENDED_MESSAGE))
                .await;
            return Err(GatewayError::Unauthorized);
        }

        Ok(response)
    }

    /// Run the logout sequence: best-effort server-side invalidation, clear
    /// the session, detach the watchdog, notify, redirect.
    ///
    /// Single-flight: a call arriving while a teardown is already underway
    /// (or within the cooldown that follows it) is a no-op, so a burst of
    /// near-simultaneous 401s produces exactly one teardown.
    pub async fn handle_logout(&self, options: LogoutOptions) {
        if self
            .inner
            .logging_out
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("logout already in flight, ignoring");
            return;
        }

        // Invalidate server-side with the current token. Failure here is
        // logged and nothing more: the local teardown proceeds regardless.
        if let Some(token) = self.inner.store.token() {
            let url = format!("{}{}", self.inner.config.api_base_url, LOGOUT_PATH);
            let result = self
                .inner
                .http
                .post(&url)
                .header(ACCEPT, HeaderValue::from_static("application/json"))
                .bearer_auth(&token)
                .send()
                .await;
            if let Err(err) = result {
                warn!(error = %err, "server-side logout call failed");
            }
        }

        self.inner.store.clear();
        self.inner.monitor.detach();

        if options.notify {
            let message = options.message.as_deref().unwrap_or(SIGNED_OUT_MESSAGE);
            self.inner.notifier.notify(message);
        }
        self.inner.navigator.redirect_to_login();
        info!("admin signed out");

        // Release the guard after the cooldown. Weak keeps a gateway dropped
        // mid-cooldown from being held alive by its own timer.
        let weak = Arc::downgrade(&self.inner);
        let cooldown = self.inner.config.logout_cooldown;
        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            if let Some(inner) = weak.upgrade() {
                inner.logging_out.store(false, Ordering::SeqCst);
            }
        });
    }

    /// Point the inactivity watchdog at the logout sequence.
    fn arm_monitor(&self) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.monitor.arm(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let gateway = SessionGateway { inner };
            tokio::spawn(async move {
                gateway
                    .handle_logout(LogoutOptions::with_message(INACTIVITY_MESSAGE))
                    .await;
            });
        });
    }
}
