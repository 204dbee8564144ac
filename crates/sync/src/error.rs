//! Errors from the remote API layer.

pub type ApiResult<T> = Result<T, ApiError>;

/// Message shown when the server rejects the credential without detail.
pub const SESSION_EXPIRED_DETAIL: &str = "Session expired. Please log in again.";

/// Errors from the Skillstack REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server rejected the credential (401 or 403).  Every endpoint
    /// treats this uniformly as an expired session.
    #[error("{detail}")]
    Unauthorized { detail: String },

    /// Any other non-2xx response.
    #[error("API error ({status}): {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body, or a fallback.
        detail: String,
    },
}

impl ApiError {
    /// An authentication failure carrying the default expiry message.
    pub fn session_expired() -> Self {
        ApiError::Unauthorized {
            detail: SESSION_EXPIRED_DETAIL.to_string(),
        }
    }

    /// `true` for the 401/403 session-expiry path.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Display-ready message for the failed operation, falling back to
    /// an operation-specific default when the transport gave us nothing
    /// human-readable.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized { detail } => detail.clone(),
            ApiError::Status { detail, .. } => detail.clone(),
            ApiError::Request(_) => fallback.to_string(),
        }
    }
}
