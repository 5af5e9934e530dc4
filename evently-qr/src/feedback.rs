//! Rating form reached through the stall gate.
//!
//! A [`FeedbackScreen`] can only be built from the [`StallIdentity`] the
//! gate check returned, so feedback is never sent for an unscanned stall.

use evently_client::{ApiClient, ApiError};
use evently_core::{FeedbackForm, Route};
use evently_shared::models::StallIdentity;

pub struct FeedbackScreen {
    stall: StallIdentity,
    form: FeedbackForm,
}

impl FeedbackScreen {
    pub fn new(stall: StallIdentity) -> Self {
        let form = FeedbackForm::new(stall.id.clone());
        Self { stall, form }
    }

    /// Only reachable from a verified gate scan
    pub fn from_route(route: Route) -> Option<Self> {
        match route {
            Route::FeedbackForm(stall) => Some(Self::new(stall)),
            _ => None,
        }
    }

    pub fn stall(&self) -> &StallIdentity {
        &self.stall
    }

    pub fn set_rating(&mut self, rating: i64) {
        self.form.rating = Some(rating);
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.form.comment = Some(comment.into());
    }

    /// Whether the submit button is enabled
    pub fn can_submit(&self) -> bool {
        self.form.submission().is_ok()
    }

    /// Send the rating. Validation failures and the backend's own refusal
    /// (one feedback per stall) come back as errors with displayable text.
    pub async fn submit(&self, client: &ApiClient) -> Result<Route, ApiError> {
        let message = client.submit_feedback(&self.form).await?;
        tracing::info!(
            stall_id = %self.stall.id,
            message = message.as_deref().unwrap_or(""),
            "Feedback submitted"
        );
        Ok(Route::FeedbackThanks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stall() -> StallIdentity {
        StallIdentity {
            id: "stall-9".to_string(),
            name: "Robotics Club".to_string(),
        }
    }

    #[test]
    fn test_submit_enabled_only_with_valid_rating() {
        let mut screen = FeedbackScreen::new(stall());
        assert!(!screen.can_submit());

        screen.set_rating(7);
        assert!(!screen.can_submit());

        screen.set_rating(4);
        screen.set_comment("Loved the demo");
        assert!(screen.can_submit());
    }

    #[test]
    fn test_only_built_from_gate_route() {
        assert!(FeedbackScreen::from_route(Route::FeedbackForm(stall())).is_some());
        assert!(FeedbackScreen::from_route(Route::Scanner).is_none());
    }

    #[tokio::test]
    async fn test_invalid_submission_never_sent() {
        // Nothing listens on this address; a request would fail as Request
        let client = ApiClient::new("http://127.0.0.1:9", evently_store::Session::in_memory());
        let screen = FeedbackScreen::new(stall());
        let err = screen.submit(&client).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
