use evently_core::Role;
use evently_shared::models::{EventSummary, NewEvent, NewStall, Stall};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::normalize;

impl ApiClient {
    /// Events owned by the logged-in event manager
    pub async fn manager_events(&self) -> Result<Vec<EventSummary>, ApiError> {
        let body = self.get(Role::EventManager, "/event-manager/events").await?;
        normalize::list(body, "events", "event-manager/events")
    }

    /// New events start in PENDING until an admin moderates them
    pub async fn create_event(&self, event: &NewEvent) -> Result<EventSummary, ApiError> {
        let body = self.post(Role::EventManager, "/event-manager/events", event).await?;
        normalize::entity(body, "event", "event-manager/events")
    }

    pub async fn create_stall(&self, stall: &NewStall) -> Result<Stall, ApiError> {
        let body = self.post(Role::EventManager, "/event-manager/stalls", stall).await?;
        normalize::entity(body, "stall", "event-manager/stalls")
    }
}
