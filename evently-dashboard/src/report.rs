use std::collections::HashSet;

use evently_client::ApiClient;
use evently_shared::models::{FeedbackRecord, RegistrationRecord, School};
use serde::Serialize;

use crate::source::{failures, settle, SourceFailure};

/// Per-event report for admins
#[derive(Debug, Clone, Default)]
pub struct EventReport {
    pub event_id: String,
    pub registrations: Vec<RegistrationRecord>,
    pub feedback: Vec<FeedbackRecord>,
    pub schools: Vec<School>,
    pub failures: Vec<SourceFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStats {
    pub registrations: usize,
    pub checked_in: usize,
    pub schools_represented: usize,
    pub feedback_count: usize,
    pub average_rating: Option<f64>,
}

impl EventReport {
    pub async fn load(client: &ApiClient, event_id: &str) -> Self {
        let ((registrations, reg_err), (feedback, fb_err), (schools, schools_err)) = tokio::join!(
            settle("registrations", client.event_registrations(event_id)),
            settle("feedback", client.event_feedback(event_id)),
            settle("schools", client.list_schools()),
        );

        Self {
            event_id: event_id.to_string(),
            registrations,
            feedback,
            schools,
            failures: failures([reg_err, fb_err, schools_err]),
        }
    }

    fn represented_ids(&self) -> HashSet<&str> {
        self.registrations
            .iter()
            .filter_map(|r| r.school_id.as_deref())
            .collect()
    }

    /// Names of represented schools, sorted. Ids missing from the school
    /// list are shown as-is.
    pub fn school_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .represented_ids()
            .into_iter()
            .map(|id| {
                self.schools
                    .iter()
                    .find(|s| s.id == id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();
        names.sort();
        names
    }

    pub fn stats(&self) -> ReportStats {
        let ratings: Vec<f64> = self.feedback.iter().map(|f| f64::from(f.rating)).collect();
        ReportStats {
            registrations: self.registrations.len(),
            checked_in: self.registrations.iter().filter(|r| r.checked_in).count(),
            schools_represented: self.represented_ids().len(),
            feedback_count: ratings.len(),
            average_rating: (!ratings.is_empty())
                .then(|| ratings.iter().sum::<f64>() / ratings.len() as f64),
        }
    }
}
