use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Waitlisted,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    NotRequired,
}

/// A student's registration for one event. The backend owns every
/// transition; CONFIRMED for paid events only follows payment verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRegistration {
    pub event_id: String,
    pub student_id: String,
    pub registration_status: RegistrationStatus,
    pub payment_status: PaymentStatus,
}

impl EventRegistration {
    /// Whether the registration still holds (or waits for) a place
    pub fn is_active(&self) -> bool {
        !matches!(self.registration_status, RegistrationStatus::Cancelled)
    }
}

/// Registration row as returned to admin views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationRecord {
    #[serde(flatten)]
    pub registration: EventRegistration,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub checked_in: bool,
}

/// Order handed to the third-party payment widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: u32,
    pub currency: String,
    #[serde(default)]
    pub key_id: Option<String>,
}

/// Fields the payment widget returns on completion. Forwarded as-is to the
/// backend, which checks the signature against the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentCallback {
    pub provider_order_id: String,
    pub provider_payment_id: String,
    pub provider_signature: String,
}
