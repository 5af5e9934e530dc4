pub mod availability;
pub mod feedback;
pub mod forms;
pub mod identity;
pub mod payment;

pub use availability::Availability;
pub use feedback::{FeedbackForm, FeedbackSubmission};
pub use identity::{Role, Route};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Collapse validator output into the single message shown inline.
/// Fields are visited in name order so the message is stable.
pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> CoreError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let message = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .next()
        .unwrap_or_else(|| "Invalid input".to_string());

    CoreError::ValidationError(message)
}
