use thiserror::Error;

/// Failures surfaced by the session gateway.
///
/// Callers branch on the variant, not on message text: `Unauthorized` means
/// the session was torn down and its own notification already shown, so the
/// caller should stay quiet; everything else is the caller's to present.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Unauthorized - the session has been ended")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token is not a valid header value: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
}

impl GatewayError {
    /// True when the failure already produced its own user-facing message
    /// via the logout sequence. UI code uses this to suppress the generic
    /// connectivity toast.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized)
    }
}
