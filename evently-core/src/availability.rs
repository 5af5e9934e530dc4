use evently_shared::models::{EventDetail, EventStatus, EventSummary};

/// Remaining capacity of an event, as shown on the event card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Unlimited,
    Remaining(u32),
    Full,
}

impl Availability {
    pub fn of(event: &EventSummary) -> Self {
        match event.max_capacity {
            None => Availability::Unlimited,
            Some(max) if event.current_registrations >= max => Availability::Full,
            Some(max) => Availability::Remaining(max - event.current_registrations),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Availability::Full)
    }

    pub fn label(&self) -> String {
        match self {
            Availability::Unlimited => "Unlimited spots".to_string(),
            Availability::Remaining(1) => "1 spot left".to_string(),
            Availability::Remaining(n) => format!("{} spots left", n),
            Availability::Full => "Event Full".to_string(),
        }
    }
}

/// Whether the register button is shown for this student
pub fn can_register(detail: &EventDetail) -> bool {
    if detail.event.status != EventStatus::Approved {
        return false;
    }
    if Availability::of(&detail.event).is_full() {
        return false;
    }
    match &detail.registration {
        Some(reg) => !reg.is_active(),
        None => true,
    }
}
