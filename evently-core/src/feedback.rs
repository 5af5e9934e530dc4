use serde::Serialize;
use validator::Validate;

use crate::{validation_message, CoreResult};

/// Stall rating form as filled in by the student. Nothing here reaches the
/// network until [`FeedbackForm::submission`] accepts it.
#[derive(Debug, Clone, Default, Validate)]
pub struct FeedbackForm {
    #[validate(length(min = 1, message = "Scan a stall before leaving feedback"))]
    pub stall_id: String,

    #[validate(
        required(message = "Please select a rating"),
        range(min = 1, max = 5, message = "Rating must be between 1 and 5")
    )]
    pub rating: Option<i64>,

    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    pub comment: Option<String>,
}

/// Body of `POST /student/submit-feedback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackSubmission {
    pub stall_id: String,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl FeedbackForm {
    pub fn new(stall_id: impl Into<String>) -> Self {
        Self {
            stall_id: stall_id.into(),
            ..Default::default()
        }
    }

    pub fn with_rating(mut self, rating: i64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Validate and build the request body. Blank comments are dropped.
    pub fn submission(&self) -> CoreResult<FeedbackSubmission> {
        self.validate().map_err(|e| validation_message(&e))?;

        // range-checked above
        let rating = self.rating.unwrap_or_default() as u8;
        let comment = self
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(FeedbackSubmission {
            stall_id: self.stall_id.clone(),
            rating,
            comment,
        })
    }
}
