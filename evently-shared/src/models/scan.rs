use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validity window the backend declares for a rotating QR code
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RotationInfo {
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
    #[serde(default)]
    pub rotation_interval: Option<i64>,
}

impl RotationInfo {
    /// Seconds until the next rotation: `expires_in_seconds` first, then
    /// `rotation_interval`. Non-positive values are treated as absent.
    pub fn declared_seconds(&self) -> Option<u32> {
        self.expires_in_seconds
            .filter(|s| *s > 0)
            .or(self.rotation_interval.filter(|s| *s > 0))
            .map(|s| u32::try_from(s).unwrap_or(u32::MAX))
    }
}

/// A student's current check-in credential. Only valid inside the window
/// declared by `rotation`; the next poll supersedes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RotatingQrCredential {
    pub subject_id: Option<String>,
    /// Opaque QR payload (usually a data URL of the rendered image)
    pub encoded_payload: String,
    pub issued_at: DateTime<Utc>,
    pub rotation: RotationInfo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScanType {
    #[serde(rename = "IN", alias = "CHECK_IN")]
    In,
    #[serde(rename = "OUT", alias = "CHECK_OUT")]
    Out,
}

impl ScanType {
    pub fn headline(&self) -> &'static str {
        match self {
            ScanType::In => "Checked In ✓",
            ScanType::Out => "Checked Out ✓",
        }
    }
}

/// Result of a volunteer check-in/out scan, as recorded by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanEvent {
    #[serde(rename = "student_id")]
    pub scanned_subject_id: String,
    pub student_name: String,
    pub registration_id: String,
    pub scan_type: ScanType,
    #[serde(default)]
    pub scanned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub checked_in_count: Option<u32>,
    #[serde(default)]
    pub checked_out_count: Option<u32>,
}

/// Stall unlocked for feedback by a successful gate check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StallIdentity {
    pub id: String,
    pub name: String,
}
