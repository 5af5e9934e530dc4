use std::fmt;
use std::str::FromStr;

use evently_shared::models::{ScanEvent, StallIdentity};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Portal persona. Each role holds its own bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Student,
    Volunteer,
    EventManager,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Student, Role::Volunteer, Role::EventManager];

    /// URL segment the backend and the portal routes use for this role
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Volunteer => "volunteer",
            Role::EventManager => "event-manager",
        }
    }

    pub fn login_route(&self) -> Route {
        Route::Login(*self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_prefix())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            "volunteer" => Ok(Role::Volunteer),
            "event-manager" | "event_manager" | "eventmanager" => Ok(Role::EventManager),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

/// Navigation target. Flows return one of these instead of touching any UI;
/// variants carry the payload the destination screen needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Login(Role),
    Dashboard(Role),
    QrDisplay,
    Scanner,
    ScanResult(ScanEvent),
    StallScanner,
    FeedbackForm(StallIdentity),
    FeedbackThanks,
    EventDetail(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Login(role) => format!("/{}/login", role.path_prefix()),
            Route::Dashboard(role) => format!("/{}/dashboard", role.path_prefix()),
            Route::QrDisplay => "/student/qr-code".to_string(),
            Route::Scanner => "/volunteer/scanner".to_string(),
            Route::ScanResult(_) => "/volunteer/scan-result".to_string(),
            Route::StallScanner => "/student/scan-stall".to_string(),
            Route::FeedbackForm(stall) => format!("/student/feedback/{}", stall.id),
            Route::FeedbackThanks => "/student/feedback/thanks".to_string(),
            Route::EventDetail(id) => format!("/student/events/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
