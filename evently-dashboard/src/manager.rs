use evently_client::ApiClient;
use evently_shared::models::{EventStatus, EventSummary};
use serde::Serialize;

use crate::source::{failures, settle, SourceFailure};

/// The event manager's own events
#[derive(Debug, Clone, Default)]
pub struct ManagerDashboard {
    pub events: Vec<EventSummary>,
    pub failures: Vec<SourceFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerStats {
    pub total_events: usize,
    pub pending_events: usize,
    pub approved_events: usize,
    pub rejected_events: usize,
    pub total_registrations: u32,
    /// Registrations over capacity across capped events; `None` when no
    /// event has a capacity
    pub capacity_utilisation: Option<f64>,
}

impl ManagerDashboard {
    pub async fn load(client: &ApiClient) -> Self {
        let (events, err) = settle("events", client.manager_events()).await;
        Self {
            events,
            failures: failures([err]),
        }
    }

    /// Rejected events with the admin's reason
    pub fn rejections(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .filter(|e| e.status == EventStatus::Rejected)
            .map(|e| (e.title.as_str(), e.rejection_reason.as_deref().unwrap_or("")))
            .collect()
    }

    pub fn stats(&self) -> ManagerStats {
        let count = |status: EventStatus| self.events.iter().filter(|e| e.status == status).count();

        let (registered, capacity) = self
            .events
            .iter()
            .filter_map(|e| e.max_capacity.map(|max| (e.current_registrations, max)))
            .fold((0u64, 0u64), |(r, c), (cur, max)| (r + cur as u64, c + max as u64));

        ManagerStats {
            total_events: self.events.len(),
            pending_events: count(EventStatus::Pending),
            approved_events: count(EventStatus::Approved),
            rejected_events: count(EventStatus::Rejected),
            total_registrations: self.events.iter().map(|e| e.current_registrations).sum(),
            capacity_utilisation: (capacity > 0).then(|| registered as f64 / capacity as f64),
        }
    }
}
