use evently_core::{CoreError, Role};
use evently_store::SessionError;

/// Errors from the portal API layer
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 401/403 on an authenticated call. The session has already been
    /// cleared and a redirect published by the time this is returned.
    #[error("Session expired, please log in again")]
    Unauthorized { status: u16 },

    /// No token stored for the role; nothing was sent
    #[error("Not logged in as {0}")]
    NotLoggedIn(Role),

    /// Backend refused the request; `message` is its own wording
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Response body did not match the pinned contract for the endpoint
    #[error("Unexpected response from {endpoint}: {detail}")]
    UnexpectedShape { endpoint: &'static str, detail: String },

    /// Caught client-side before any request was made
    #[error("{0}")]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    pub fn shape(endpoint: &'static str, detail: impl Into<String>) -> Self {
        ApiError::UnexpectedShape {
            endpoint,
            detail: detail.into(),
        }
    }

    /// Authentication failure: the caller should send the user to login
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. } | ApiError::NotLoggedIn(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status } | ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}
