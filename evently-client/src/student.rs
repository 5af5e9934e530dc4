use chrono::Utc;
use evently_core::{FeedbackForm, Role};
use evently_shared::models::{
    EventDetail, EventRegistration, EventSummary, PaymentCallback, PaymentOrder,
    RotatingQrCredential, StallIdentity,
};
use serde_json::json;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::normalize;

impl ApiClient {
    /// `GET /student/qr-code`: the student's current rotating credential
    pub async fn fetch_qr_code(&self) -> Result<RotatingQrCredential, ApiError> {
        let body = self.get(Role::Student, "/student/qr-code").await?;
        normalize::qr_credential(&body, Utc::now())
    }

    /// `POST /student/scan-stall`: gate check before feedback. Fails when
    /// the student is not checked in or the code is not a stall.
    pub async fn scan_stall(&self, stall_qr_token: &str) -> Result<StallIdentity, ApiError> {
        let body = self
            .post(
                Role::Student,
                "/student/scan-stall",
                &json!({ "stall_qr_token": stall_qr_token }),
            )
            .await?;
        normalize::stall(body)
    }

    /// `POST /student/submit-feedback`. Invalid forms are rejected before
    /// any request; duplicate feedback comes back as the backend's message.
    pub async fn submit_feedback(&self, form: &FeedbackForm) -> Result<Option<String>, ApiError> {
        let submission = form.submission()?;
        let body = self
            .post(Role::Student, "/student/submit-feedback", &submission)
            .await?;
        Ok(normalize::message(&body))
    }

    pub async fn list_events(&self) -> Result<Vec<EventSummary>, ApiError> {
        let body = self.get(Role::Student, "/student/events").await?;
        normalize::list(body, "events", "student/events")
    }

    pub async fn event_detail(&self, event_id: &str) -> Result<EventDetail, ApiError> {
        let body = self
            .get(Role::Student, &format!("/student/events/{}", event_id))
            .await?;
        normalize::event_detail(body)
    }

    /// Free events only
    pub async fn register_free(&self, event_id: &str) -> Result<EventRegistration, ApiError> {
        let body = self
            .post_empty(Role::Student, &format!("/student/events/{}/register", event_id))
            .await?;
        normalize::entity(body, "registration", "student/events/:id/register")
    }

    pub async fn initiate_payment(&self, event_id: &str) -> Result<PaymentOrder, ApiError> {
        let body = self
            .post_empty(
                Role::Student,
                &format!("/student/events/{}/payment/initiate", event_id),
            )
            .await?;
        normalize::entity(body, "order", "student/events/:id/payment/initiate")
    }

    /// Forward the widget's callback fields; the backend checks them
    /// against the provider.
    pub async fn verify_payment(
        &self,
        event_id: &str,
        callback: &PaymentCallback,
    ) -> Result<EventRegistration, ApiError> {
        let body = self
            .post(
                Role::Student,
                &format!("/student/events/{}/payment/verify", event_id),
                callback,
            )
            .await?;
        normalize::entity(body, "registration", "student/events/:id/payment/verify")
    }
}
