use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::registration::EventRegistration;

/// Moderation state of an event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

/// An event as listed by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    pub status: EventStatus,
    /// `None` means unlimited capacity
    #[serde(default)]
    pub max_capacity: Option<u32>,
    #[serde(default)]
    pub current_registrations: u32,
    /// Fee in minor currency units; zero for free events
    #[serde(default)]
    pub registration_fee: u32,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub manager_id: Option<String>,
}

impl EventSummary {
    pub fn is_paid(&self) -> bool {
        self.registration_fee > 0
    }
}

/// Event detail as seen by one student, with their registration if any
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventDetail {
    pub event: EventSummary,
    #[serde(default)]
    pub registration: Option<EventRegistration>,
}

/// Payload for creating an event (event manager)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub venue: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub max_capacity: Option<u32>,
    pub registration_fee: u32,
    pub description: Option<String>,
}
