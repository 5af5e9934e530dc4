use evently_core::Role;
use evently_shared::models::ScanEvent;
use serde_json::json;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::normalize;

impl ApiClient {
    /// `POST /volunteer/check-in-out` with a decoded student QR payload.
    /// The backend decides between IN and OUT.
    pub async fn check_in_out(&self, qr_token: &str) -> Result<ScanEvent, ApiError> {
        let body = self
            .post(Role::Volunteer, "/volunteer/check-in-out", &json!({ "qr_token": qr_token }))
            .await?;
        normalize::scan_event(body)
    }
}
