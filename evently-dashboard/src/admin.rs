use std::collections::HashSet;

use evently_client::ApiClient;
use evently_shared::models::{EventStatus, EventSummary, RegistrationRecord, School, Stall, Volunteer};
use serde::Serialize;

use crate::source::{failures, settle, SourceFailure};

/// Everything the admin dashboard shows
#[derive(Debug, Clone, Default)]
pub struct AdminOverview {
    pub events: Vec<EventSummary>,
    pub schools: Vec<School>,
    pub stalls: Vec<Stall>,
    pub volunteers: Vec<Volunteer>,
    pub registrations: Vec<RegistrationRecord>,
    pub failures: Vec<SourceFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total_events: usize,
    pub pending_events: usize,
    pub approved_events: usize,
    pub rejected_events: usize,
    pub schools: usize,
    pub stalls: usize,
    pub volunteers: usize,
    pub registrations: usize,
    /// Schools with at least one registered student
    pub schools_represented: usize,
}

impl AdminOverview {
    pub async fn load(client: &ApiClient) -> Self {
        let (
            (events, events_err),
            (schools, schools_err),
            (stalls, stalls_err),
            (volunteers, volunteers_err),
            (registrations, registrations_err),
        ) = tokio::join!(
            settle("events", client.admin_events()),
            settle("schools", client.list_schools()),
            settle("stalls", client.list_stalls()),
            settle("volunteers", client.list_volunteers()),
            settle("registrations", client.list_registrations()),
        );

        Self {
            events,
            schools,
            stalls,
            volunteers,
            registrations,
            failures: failures([
                events_err,
                schools_err,
                stalls_err,
                volunteers_err,
                registrations_err,
            ]),
        }
    }

    pub fn events_with_status(&self, status: EventStatus) -> Vec<&EventSummary> {
        self.events.iter().filter(|e| e.status == status).collect()
    }

    /// Events awaiting moderation
    pub fn pending(&self) -> Vec<&EventSummary> {
        self.events_with_status(EventStatus::Pending)
    }

    pub fn schools_represented(&self) -> usize {
        self.registrations
            .iter()
            .filter_map(|r| r.school_id.as_deref())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn stats(&self) -> AdminStats {
        AdminStats {
            total_events: self.events.len(),
            pending_events: self.events_with_status(EventStatus::Pending).len(),
            approved_events: self.events_with_status(EventStatus::Approved).len(),
            rejected_events: self.events_with_status(EventStatus::Rejected).len(),
            schools: self.schools.len(),
            stalls: self.stalls.len(),
            volunteers: self.volunteers.len(),
            registrations: self.registrations.len(),
            schools_represented: self.schools_represented(),
        }
    }
}
