use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct School {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub school_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Volunteer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub event_id: Option<String>,
}

/// One submitted stall rating
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub stall_id: String,
    #[serde(default)]
    pub student_id: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSchool {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVolunteer {
    pub name: String,
    pub email: String,
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStall {
    pub name: String,
    pub event_id: String,
    pub school_id: Option<String>,
}
