//! Scan sessions: decode a payload, verify it with the backend once, and
//! either finish with a navigation target or show the rejection and keep
//! scanning.

use std::time::Duration;

use async_trait::async_trait;
use evently_client::{ApiClient, ApiError};
use evently_core::{Role, Route};
use evently_shared::models::{ScanEvent, StallIdentity};
use evently_store::app_config::ScannerConfig;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::scanner::{CameraError, DecodeResult, QrScanner};

/// Backend check for a decoded payload
#[async_trait]
pub trait ScanVerifier: Send + Sync {
    type Output: Send;

    /// Role whose login the user is sent to on auth failure
    fn role(&self) -> Role;

    async fn verify(&self, payload: &str) -> Result<Self::Output, ApiError>;

    fn success_route(&self, output: Self::Output) -> Route;
}

/// Volunteer check-in/out desk
pub struct CheckInVerifier {
    client: ApiClient,
}

impl CheckInVerifier {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScanVerifier for CheckInVerifier {
    type Output = ScanEvent;

    fn role(&self) -> Role {
        Role::Volunteer
    }

    async fn verify(&self, payload: &str) -> Result<ScanEvent, ApiError> {
        self.client.check_in_out(payload).await
    }

    fn success_route(&self, scan: ScanEvent) -> Route {
        Route::ScanResult(scan)
    }
}

/// Student scanning a stall before leaving feedback
pub struct StallGateVerifier {
    client: ApiClient,
}

impl StallGateVerifier {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScanVerifier for StallGateVerifier {
    type Output = StallIdentity;

    fn role(&self) -> Role {
        Role::Student
    }

    async fn verify(&self, payload: &str) -> Result<StallIdentity, ApiError> {
        self.client.scan_stall(payload).await
    }

    fn success_route(&self, stall: StallIdentity) -> Route {
        Route::FeedbackForm(stall)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Scanning,
    Verifying,
    /// Backend message, cleared when scanning resumes
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("Session expired")]
    SessionExpired { redirect: Route },

    #[error("Scan cancelled")]
    Cancelled,
}

pub struct ScanSession<V> {
    scanner: QrScanner,
    verifier: V,
    error_clear: Duration,
    status: watch::Sender<ScanStatus>,
}

impl<V: ScanVerifier> ScanSession<V> {
    pub fn new(scanner: QrScanner, verifier: V, config: &ScannerConfig) -> Self {
        let (status, _) = watch::channel(ScanStatus::Idle);
        Self {
            scanner,
            verifier,
            error_clear: config.error_clear(),
            status,
        }
    }

    pub fn status(&self) -> watch::Receiver<ScanStatus> {
        self.status.subscribe()
    }

    /// Scan until one payload verifies. The camera is released on every
    /// exit path.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<Route, ScanError> {
        let result = self.scan(cancel).await;
        self.scanner.stop().await;
        self.status.send_replace(ScanStatus::Idle);
        result
    }

    async fn scan(&mut self, cancel: &CancellationToken) -> Result<Route, ScanError> {
        let mut stream = self.scanner.start().await?;
        self.status.send_replace(ScanStatus::Scanning);

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Err(ScanError::Cancelled),
                next = stream.recv() => next,
            };

            let payload = match next {
                Some(DecodeResult::Decoded(payload)) => payload,
                Some(DecodeResult::Failed(e)) => return Err(e.into()),
                None => return Err(CameraError::Lost("decoder stopped".to_string()).into()),
            };

            self.status.send_replace(ScanStatus::Verifying);
            let verified = tokio::select! {
                _ = cancel.cancelled() => return Err(ScanError::Cancelled),
                verified = self.verifier.verify(&payload) => verified,
            };

            match verified {
                Ok(output) => {
                    tracing::info!(role = %self.verifier.role(), "Scan verified");
                    return Ok(self.verifier.success_route(output));
                }
                Err(e) if e.is_auth_failure() => {
                    return Err(ScanError::SessionExpired {
                        redirect: self.verifier.role().login_route(),
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Scan rejected");
                    self.status.send_replace(ScanStatus::Rejected(e.to_string()));
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(ScanError::Cancelled),
                        _ = tokio::time::sleep(self.error_clear) => {}
                    }
                    self.status.send_replace(ScanStatus::Scanning);
                    stream.resume();
                }
            }
        }
    }
}
