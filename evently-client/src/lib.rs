//! HTTP client for the portal backend.
//!
//! Every authenticated call goes through [`ApiClient`], which attaches the
//! calling role's bearer token and runs the central 401/403 interceptor.
//! Raw response JSON is mapped to fixed types in [`normalize`] before any
//! caller sees it.

pub mod admin;
pub mod auth;
pub mod client;
pub mod error;
pub mod guard;
pub mod manager;
pub mod normalize;
pub mod student;
pub mod volunteer;

pub use client::ApiClient;
pub use error::ApiError;
pub use guard::require_role;
