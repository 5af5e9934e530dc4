//! Camera ownership and the decode loop.
//!
//! A [`QrScanner`] owns the camera device and runs at most one decode task.
//! `start()` hands back a single-consumer [`DecodeStream`]; the first payload
//! decoded pauses the stream so nothing else is delivered until the consumer
//! calls [`DecodeStream::resume`]. The device stays open while paused.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const DECODE_BUFFER: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    #[error("Camera disconnected: {0}")]
    Lost(String),
}

/// A camera that can be opened for decoding
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self) -> Result<Box<dyn FrameSource>, CameraError>;
}

/// An open camera with its decoder attached. Dropping it releases the device.
#[async_trait]
pub trait FrameSource: Send {
    /// Next decoded payload; `Ok(None)` when the device has closed
    async fn next_payload(&mut self) -> Result<Option<String>, CameraError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    Decoded(String),
    /// The device failed; the loop has ended and the camera is released
    Failed(CameraError),
}

pub struct DecodeStream {
    rx: mpsc::Receiver<DecodeResult>,
    paused: Arc<AtomicBool>,
}

impl DecodeStream {
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub async fn recv(&mut self) -> Option<DecodeResult> {
        self.rx.recv().await
    }
}

impl Stream for DecodeStream {
    type Item = DecodeResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

struct ActiveLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct QrScanner {
    camera: Arc<dyn CameraDevice>,
    active: Option<ActiveLoop>,
}

impl QrScanner {
    pub fn new(camera: Arc<dyn CameraDevice>) -> Self {
        Self {
            camera,
            active: None,
        }
    }

    /// Open the camera and start decoding. Any previous session is stopped
    /// first.
    pub async fn start(&mut self) -> Result<DecodeStream, CameraError> {
        self.stop().await;

        let frames = self.camera.open().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to acquire camera");
            e
        })?;

        let (tx, rx) = mpsc::channel(DECODE_BUFFER);
        let paused = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(decode_loop(frames, tx, paused.clone(), cancel.clone()));

        self.active = Some(ActiveLoop { cancel, handle });
        tracing::info!("Scanner started");
        Ok(DecodeStream { rx, paused })
    }

    /// Stop decoding and release the camera. Returns once the device is
    /// closed.
    pub async fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            let _ = active.handle.await;
            tracing::info!("Scanner stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .map(|a| !a.handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for QrScanner {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
        }
    }
}

async fn decode_loop(
    mut frames: Box<dyn FrameSource>,
    tx: mpsc::Sender<DecodeResult>,
    paused: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = frames.next_payload() => next,
        };

        match next {
            Ok(Some(payload)) => {
                let payload = payload.trim();
                if payload.is_empty() {
                    continue;
                }
                // First decode wins; everything after it is dropped until resume
                if paused
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    tracing::trace!("Decode discarded while paused");
                    continue;
                }
                if tx.send(DecodeResult::Decoded(payload.to_string())).await.is_err() {
                    break;
                }
            }
            Ok(None) => {
                tracing::error!("Camera closed unexpectedly");
                let _ = tx
                    .send(DecodeResult::Failed(CameraError::Lost("device closed".to_string())))
                    .await;
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "Camera failure");
                let _ = tx.send(DecodeResult::Failed(e)).await;
                break;
            }
        }
    }
    drop(frames);
    tracing::debug!("Decode loop ended");
}


#[cfg(test)]
mod tests {
    use super::testing::FakeCamera;
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_decode_pauses_stream() {
        let camera = Arc::new(FakeCamera::default());
        let mut scanner = QrScanner::new(camera.clone());
        let mut stream = scanner.start().await.unwrap();

        camera.show("first");
        camera.show("second");
        assert_eq!(stream.next().await, Some(DecodeResult::Decoded("first".to_string())));
        settle().await;
        assert!(stream.is_paused());

        stream.resume();
        camera.show("third");
        assert_eq!(stream.next().await, Some(DecodeResult::Decoded("third".to_string())));

        scanner.stop().await;
        assert_eq!(camera.live(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_leaves_single_decode_loop() {
        let camera = Arc::new(FakeCamera::default());
        let mut scanner = QrScanner::new(camera.clone());

        let mut old = scanner.start().await.unwrap();
        let mut current = scanner.start().await.unwrap();
        assert_eq!(camera.live(), 1);

        // The first session's feed goes nowhere
        let stale = camera.feeds.lock().unwrap()[0].clone();
        let _ = stale.send(Ok(Some("stale".to_string())));
        camera.show("fresh");

        assert_eq!(current.next().await, Some(DecodeResult::Decoded("fresh".to_string())));
        assert_eq!(old.next().await, None);
        assert!(scanner.is_running());

        scanner.stop().await;
        assert!(!scanner.is_running());
        assert_eq!(camera.live(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_camera_unavailable() {
        let camera = Arc::new(FakeCamera::default());
        camera.unavailable.store(true, Ordering::SeqCst);
        let mut scanner = QrScanner::new(camera.clone());

        let err = scanner.start().await.err().unwrap();
        assert!(matches!(err, CameraError::Unavailable(_)));
        assert!(!scanner.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_device_loss_ends_loop_and_releases() {
        let camera = Arc::new(FakeCamera::default());
        let mut scanner = QrScanner::new(camera.clone());
        let mut stream = scanner.start().await.unwrap();

        let _ = camera.feed().send(Err(CameraError::Lost("unplugged".to_string())));

        assert_eq!(
            stream.next().await,
            Some(DecodeResult::Failed(CameraError::Lost("unplugged".to_string())))
        );
        assert_eq!(stream.next().await, None);
        assert_eq!(camera.live(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_camera() {
        let camera = Arc::new(FakeCamera::default());
        let mut scanner = QrScanner::new(camera.clone());
        let _stream = scanner.start().await.unwrap();

        drop(scanner);
        settle().await;
        assert_eq!(camera.live(), 0);
    }
}
