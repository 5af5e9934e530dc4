//! Dashboard aggregation.
//!
//! Each view fires its independent GETs together, falls back to an empty
//! list for any source that fails, and derives its numbers only once every
//! request has settled. Nothing derived here is stored.

pub mod admin;
pub mod manager;
pub mod report;
pub mod source;

pub use admin::{AdminOverview, AdminStats};
pub use manager::{ManagerDashboard, ManagerStats};
pub use report::{EventReport, ReportStats};
pub use source::SourceFailure;
