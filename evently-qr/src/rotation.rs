//! Countdown state for the rotating QR display.
//!
//! [`RotationMachine`] owns no timers. The driver feeds it one `tick()` per
//! second and the outcome of each fetch, and performs the [`Effect`] it
//! returns.

use std::time::Duration;

use evently_client::ApiError;
use evently_core::{Role, Route};
use evently_shared::models::RotatingQrCredential;
use evently_store::app_config::QrConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationState {
    /// No rotation window known yet
    Syncing,
    /// Whole seconds until the next fetch, always >= 1
    Counting(u32),
    /// Countdown hit zero; waiting on the new credential
    Refreshing,
    Error(RotationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationError {
    /// 401/403: the student is sent back to login
    SessionExpired,
    /// Anything else, retried automatically
    Fetch(String),
}

/// What the driver must do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Idle,
    Fetch,
    RetryAfter(Duration),
    RedirectAfter(Route, Duration),
}

/// Why a fetch failed, as far as the display cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Unauthorized,
    Other(String),
}

impl From<ApiError> for FetchFailure {
    fn from(err: ApiError) -> Self {
        if err.is_auth_failure() {
            FetchFailure::Unauthorized
        } else {
            FetchFailure::Other(err.to_string())
        }
    }
}

impl RotationState {
    pub fn label(&self) -> String {
        match self {
            RotationState::Syncing => "Syncing...".to_string(),
            RotationState::Counting(n) => format!("Refreshes in {}s", n),
            RotationState::Refreshing => "Refreshing...".to_string(),
            RotationState::Error(RotationError::SessionExpired) => {
                "Session expired. Redirecting to login...".to_string()
            }
            RotationState::Error(RotationError::Fetch(msg)) => msg.clone(),
        }
    }
}

pub struct RotationMachine {
    state: RotationState,
    credential: Option<RotatingQrCredential>,
    in_flight: bool,
    default_seconds: u32,
    retry_delay: Duration,
    redirect_delay: Duration,
}

impl RotationMachine {
    pub fn new(default_seconds: u32, retry_delay: Duration, redirect_delay: Duration) -> Self {
        Self {
            state: RotationState::Syncing,
            credential: None,
            in_flight: false,
            default_seconds: default_seconds.max(1),
            retry_delay,
            redirect_delay,
        }
    }

    pub fn from_config(config: &QrConfig) -> Self {
        Self::new(
            config.default_rotation_seconds,
            config.retry_delay(),
            config.session_expired_redirect(),
        )
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn credential(&self) -> Option<&RotatingQrCredential> {
        self.credential.as_ref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Initial fetch on mount
    pub fn start(&mut self) -> Effect {
        self.state = RotationState::Syncing;
        self.begin_fetch()
    }

    /// One second elapsed. Only a running countdown reacts.
    pub fn tick(&mut self) -> Effect {
        match self.state {
            RotationState::Counting(n) if n > 1 => {
                self.state = RotationState::Counting(n - 1);
                Effect::Idle
            }
            RotationState::Counting(_) => {
                self.state = RotationState::Refreshing;
                self.begin_fetch()
            }
            _ => Effect::Idle,
        }
    }

    pub fn on_fetch(&mut self, result: Result<RotatingQrCredential, FetchFailure>) -> Effect {
        self.in_flight = false;
        match result {
            Ok(credential) => {
                let seconds = credential
                    .rotation
                    .declared_seconds()
                    .unwrap_or(self.default_seconds);
                tracing::debug!(seconds, "QR credential refreshed");
                self.credential = Some(credential);
                self.state = RotationState::Counting(seconds);
                Effect::Idle
            }
            Err(FetchFailure::Unauthorized) => {
                tracing::warn!("QR fetch rejected, session expired");
                self.credential = None;
                self.state = RotationState::Error(RotationError::SessionExpired);
                Effect::RedirectAfter(Role::Student.login_route(), self.redirect_delay)
            }
            Err(FetchFailure::Other(message)) => {
                tracing::warn!(error = %message, "QR fetch failed, retrying");
                self.state = RotationState::Error(RotationError::Fetch(message));
                Effect::RetryAfter(self.retry_delay)
            }
        }
    }

    /// The retry delay elapsed
    pub fn on_retry(&mut self) -> Effect {
        match self.state {
            RotationState::Error(RotationError::Fetch(_)) => {
                self.state = if self.credential.is_some() {
                    RotationState::Refreshing
                } else {
                    RotationState::Syncing
                };
                self.begin_fetch()
            }
            _ => Effect::Idle,
        }
    }

    fn begin_fetch(&mut self) -> Effect {
        if self.in_flight {
            return Effect::Idle;
        }
        self.in_flight = true;
        Effect::Fetch
    }
}
