//! Tokio driver for the rotating QR display.
//!
//! One task per display owns the countdown ticker, the retry deadline and
//! the single in-flight fetch. Stopping the display cancels all three.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use evently_client::ApiClient;
use evently_core::Route;
use evently_shared::models::RotatingQrCredential;
use evently_store::app_config::QrConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::rotation::{Effect, FetchFailure, RotationMachine, RotationState};

const TICK: Duration = Duration::from_secs(1);

/// Where the display gets its credential from
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> Result<RotatingQrCredential, FetchFailure>;
}

#[async_trait]
impl CredentialSource for ApiClient {
    async fn fetch(&self) -> Result<RotatingQrCredential, FetchFailure> {
        self.fetch_qr_code().await.map_err(FetchFailure::from)
    }
}

/// What the screen shows right now
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    pub state: RotationState,
    /// Present only while its window is open (`Counting`)
    pub credential: Option<RotatingQrCredential>,
    /// Set once, when the display gives up and leaves
    pub redirect: Option<Route>,
}

impl Default for DisplayFrame {
    fn default() -> Self {
        Self {
            state: RotationState::Syncing,
            credential: None,
            redirect: None,
        }
    }
}

pub struct QrDisplay {
    cancel: CancellationToken,
    frames: watch::Receiver<DisplayFrame>,
    handle: Option<JoinHandle<()>>,
}

impl QrDisplay {
    pub fn start(source: Arc<dyn CredentialSource>, config: &QrConfig) -> Self {
        Self::with_machine(source, RotationMachine::from_config(config))
    }

    pub fn with_machine(source: Arc<dyn CredentialSource>, machine: RotationMachine) -> Self {
        let cancel = CancellationToken::new();
        let (tx, frames) = watch::channel(DisplayFrame::default());
        let handle = tokio::spawn(run(source, machine, tx, cancel.clone()));
        tracing::info!("QR display started");
        Self {
            cancel,
            frames,
            handle: Some(handle),
        }
    }

    pub fn frames(&self) -> watch::Receiver<DisplayFrame> {
        self.frames.clone()
    }

    pub fn current(&self) -> DisplayFrame {
        self.frames.borrow().clone()
    }

    /// Cancel timers and any in-flight fetch, then wait for the task to end
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        tracing::info!("QR display stopped");
    }
}

impl Drop for QrDisplay {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    source: Arc<dyn CredentialSource>,
    mut machine: RotationMachine,
    tx: watch::Sender<DisplayFrame>,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut effect = machine.start();

    loop {
        publish(&tx, &machine);

        match effect {
            Effect::Fetch => {
                let result = tokio::select! {
                    _ = cancel.cancelled() => return,
                    result = source.fetch() => result,
                };
                effect = machine.on_fetch(result);
                // A fresh countdown gets a full first second
                ticker.reset();
                continue;
            }
            Effect::RetryAfter(delay) => {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
                effect = machine.on_retry();
                continue;
            }
            Effect::RedirectAfter(route, delay) => {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
                tracing::info!(route = %route, "QR display redirecting");
                tx.send_modify(|frame| frame.redirect = Some(route));
                return;
            }
            Effect::Idle => {}
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => effect = machine.tick(),
        }
    }
}

fn publish(tx: &watch::Sender<DisplayFrame>, machine: &RotationMachine) {
    tx.send_if_modified(|frame| {
        let credential = match machine.state() {
            RotationState::Counting(_) => machine.credential().cloned(),
            _ => None,
        };
        if frame.state == *machine.state() && frame.credential == credential {
            return false;
        }
        frame.state = machine.state().clone();
        frame.credential = credential;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use evently_core::Role;
    use evently_shared::models::RotationInfo;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedSource {
        results: Mutex<VecDeque<Result<RotatingQrCredential, FetchFailure>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(results: Vec<Result<RotatingQrCredential, FetchFailure>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialSource for ScriptedSource {
        async fn fetch(&self) -> Result<RotatingQrCredential, FetchFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchFailure::Other("exhausted".to_string())))
        }
    }

    fn credential(payload: &str, expires: i64) -> RotatingQrCredential {
        RotatingQrCredential {
            subject_id: None,
            encoded_payload: payload.to_string(),
            issued_at: Utc::now(),
            rotation: RotationInfo {
                expires_in_seconds: Some(expires),
                rotation_interval: None,
            },
        }
    }

    fn config() -> QrConfig {
        QrConfig {
            default_rotation_seconds: 30,
            retry_delay_seconds: 5,
            session_expired_redirect_seconds: 2,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetches_when_countdown_expires() {
        let source = ScriptedSource::new(vec![
            Ok(credential("first", 3)),
            Ok(credential("second", 10)),
        ]);
        let display = QrDisplay::start(source.clone(), &config());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(display.current().state, RotationState::Counting(2));
        assert_eq!(source.calls(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let frame = display.current();
        assert_eq!(source.calls(), 2);
        assert_eq!(frame.state, RotationState::Counting(10));
        assert_eq!(frame.credential.unwrap().encoded_payload, "second");

        display.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_credential_is_withdrawn_while_backend_is_down() {
        let source = ScriptedSource::new(vec![
            Ok(credential("stale", 2)),
            Err(FetchFailure::Other("offline".to_string())),
        ]);
        let display = QrDisplay::start(source.clone(), &config());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(display.current().credential.unwrap().encoded_payload, "stale");

        tokio::time::sleep(Duration::from_secs(2)).await;
        let frame = display.current();
        assert_eq!(source.calls(), 2);
        assert_eq!(frame.state.label(), "offline");
        assert!(frame.credential.is_none());

        display.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_generic_error_retries_after_delay() {
        let source = ScriptedSource::new(vec![
            Err(FetchFailure::Other("missing `qr_code`".to_string())),
            Ok(credential("ok", 20)),
        ]);
        let display = QrDisplay::start(source.clone(), &config());

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(display.current().state.label(), "missing `qr_code`");

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(display.current().state, RotationState::Counting(20));

        display.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_expiry_redirects_to_login() {
        let source = ScriptedSource::new(vec![Err(FetchFailure::Unauthorized)]);
        let display = QrDisplay::start(source.clone(), &config());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(display.current().redirect, None);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(display.current().redirect, Some(Route::Login(Role::Student)));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_retry() {
        let source = ScriptedSource::new(vec![Err(FetchFailure::Other("offline".to_string()))]);
        let display = QrDisplay::start(source.clone(), &config());

        tokio::time::sleep(Duration::from_secs(1)).await;
        display.stop().await;

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls(), 1);
    }
}
