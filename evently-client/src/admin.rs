use evently_core::forms::RejectionForm;
use evently_core::Role;
use evently_shared::models::{
    EventSummary, FeedbackRecord, NewSchool, NewVolunteer, RegistrationRecord, School, Stall,
    Volunteer,
};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::normalize;

impl ApiClient {
    /// `PATCH /admin/events/:id/approve`
    pub async fn approve_event(&self, event_id: &str) -> Result<Option<String>, ApiError> {
        let body = self
            .patch::<()>(Role::Admin, &format!("/admin/events/{}/approve", event_id), None)
            .await?;
        tracing::info!(event_id, "Event approved");
        Ok(normalize::message(&body))
    }

    /// `PATCH /admin/events/:id/reject`; a blank reason never leaves the client
    pub async fn reject_event(&self, event_id: &str, reason: &str) -> Result<Option<String>, ApiError> {
        let form = RejectionForm::new(reason)?;
        let body = self
            .patch(Role::Admin, &format!("/admin/events/{}/reject", event_id), Some(&form))
            .await?;
        tracing::info!(event_id, "Event rejected");
        Ok(normalize::message(&body))
    }

    pub async fn admin_events(&self) -> Result<Vec<EventSummary>, ApiError> {
        let body = self.get(Role::Admin, "/admin/events").await?;
        normalize::list(body, "events", "admin/events")
    }

    pub async fn list_schools(&self) -> Result<Vec<School>, ApiError> {
        let body = self.get(Role::Admin, "/admin/schools").await?;
        normalize::list(body, "schools", "admin/schools")
    }

    pub async fn list_stalls(&self) -> Result<Vec<Stall>, ApiError> {
        let body = self.get(Role::Admin, "/admin/stalls").await?;
        normalize::list(body, "stalls", "admin/stalls")
    }

    pub async fn list_volunteers(&self) -> Result<Vec<Volunteer>, ApiError> {
        let body = self.get(Role::Admin, "/admin/volunteers").await?;
        normalize::list(body, "volunteers", "admin/volunteers")
    }

    pub async fn list_registrations(&self) -> Result<Vec<RegistrationRecord>, ApiError> {
        let body = self.get(Role::Admin, "/admin/registrations").await?;
        normalize::list(body, "registrations", "admin/registrations")
    }

    pub async fn event_registrations(&self, event_id: &str) -> Result<Vec<RegistrationRecord>, ApiError> {
        let body = self
            .get(Role::Admin, &format!("/admin/events/{}/registrations", event_id))
            .await?;
        normalize::list(body, "registrations", "admin/events/:id/registrations")
    }

    pub async fn event_feedback(&self, event_id: &str) -> Result<Vec<FeedbackRecord>, ApiError> {
        let body = self
            .get(Role::Admin, &format!("/admin/events/{}/feedback", event_id))
            .await?;
        normalize::list(body, "feedback", "admin/events/:id/feedback")
    }

    pub async fn create_school(&self, school: &NewSchool) -> Result<School, ApiError> {
        let body = self.post(Role::Admin, "/admin/schools", school).await?;
        normalize::entity(body, "school", "admin/schools")
    }

    pub async fn create_volunteer(&self, volunteer: &NewVolunteer) -> Result<Volunteer, ApiError> {
        let body = self.post(Role::Admin, "/admin/volunteers", volunteer).await?;
        normalize::entity(body, "volunteer", "admin/volunteers")
    }
}
