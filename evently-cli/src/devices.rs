//! Terminal stand-ins for the browser's camera and payment widget.

use std::sync::Arc;

use async_trait::async_trait;
use evently_core::payment::{PaymentWidget, WidgetOutcome};
use evently_qr::{CameraDevice, CameraError, FrameSource};
use evently_shared::models::{PaymentCallback, PaymentOrder};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Line reader shared by everything that prompts
pub struct LineInput<R> {
    lines: Arc<Mutex<Lines<R>>>,
}

impl<R> Clone for LineInput<R> {
    fn clone(&self) -> Self {
        Self {
            lines: self.lines.clone(),
        }
    }
}

impl<R: AsyncBufRead + Unpin + Send> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Arc::new(Mutex::new(reader.lines())),
        }
    }

    /// Next line, trimmed. `None` at end of input.
    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        let line = self.lines.lock().await.next_line().await?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    pub async fn prompt(&self, label: &str) -> std::io::Result<Option<String>> {
        println!("{}", label);
        self.next_line().await
    }
}

impl LineInput<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

/// Camera whose decoder output is typed or piped in, one payload per line
pub struct LineCamera<R> {
    input: LineInput<R>,
}

impl<R> LineCamera<R> {
    pub fn new(input: LineInput<R>) -> Self {
        Self { input }
    }
}

struct LineFrames<R> {
    input: LineInput<R>,
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send + 'static> FrameSource for LineFrames<R> {
    async fn next_payload(&mut self) -> Result<Option<String>, CameraError> {
        self.input
            .next_line()
            .await
            .map_err(|e| CameraError::Lost(e.to_string()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send + 'static> CameraDevice for LineCamera<R> {
    async fn open(&self) -> Result<Box<dyn FrameSource>, CameraError> {
        Ok(Box::new(LineFrames {
            input: self.input.clone(),
        }))
    }
}

/// Prints the order and reads back what the provider's checkout returned.
/// A blank payment id means the student closed the widget.
pub struct LinePaymentWidget<R> {
    input: LineInput<R>,
}

impl<R> LinePaymentWidget<R> {
    pub fn new(input: LineInput<R>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send + 'static> PaymentWidget for LinePaymentWidget<R> {
    async fn open(
        &self,
        order: &PaymentOrder,
    ) -> Result<WidgetOutcome, Box<dyn std::error::Error + Send + Sync>> {
        println!(
            "Payment order {}: {} {} (smallest unit)",
            order.order_id, order.amount, order.currency
        );

        let payment_id = self
            .input
            .prompt("Provider payment id (blank to cancel):")
            .await?
            .unwrap_or_default();
        if payment_id.is_empty() {
            return Ok(WidgetOutcome::Dismissed);
        }

        let signature = self
            .input
            .prompt("Provider signature:")
            .await?
            .unwrap_or_default();
        if signature.is_empty() {
            return Ok(WidgetOutcome::Failed("No payment signature returned".to_string()));
        }

        Ok(WidgetOutcome::Completed(PaymentCallback {
            provider_order_id: order.order_id.clone(),
            provider_payment_id: payment_id,
            provider_signature: signature,
        }))
    }
}
