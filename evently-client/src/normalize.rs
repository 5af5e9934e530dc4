//! Mapping from raw response JSON to the fixed types the rest of the
//! portal uses. Each endpoint has one accepted shape; anything else is an
//! [`ApiError::UnexpectedShape`] rather than a silent fallback.

use chrono::{DateTime, Utc};
use evently_shared::models::{
    EventDetail, RotatingQrCredential, RotationInfo, ScanEvent, StallIdentity,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// `{ "<key>": [ ... ] }`
pub fn list<T: DeserializeOwned>(
    value: Value,
    key: &'static str,
    endpoint: &'static str,
) -> Result<Vec<T>, ApiError> {
    match take(value, key) {
        Some(items @ Value::Array(_)) => {
            serde_json::from_value(items).map_err(|e| ApiError::shape(endpoint, e.to_string()))
        }
        Some(_) => Err(ApiError::shape(endpoint, format!("`{}` is not an array", key))),
        None => Err(ApiError::shape(endpoint, format!("missing `{}`", key))),
    }
}

/// `{ "<key>": { ... } }`
pub fn entity<T: DeserializeOwned>(
    value: Value,
    key: &'static str,
    endpoint: &'static str,
) -> Result<T, ApiError> {
    let inner = take(value, key)
        .filter(Value::is_object)
        .ok_or_else(|| ApiError::shape(endpoint, format!("missing `{}` object", key)))?;
    serde_json::from_value(inner).map_err(|e| ApiError::shape(endpoint, e.to_string()))
}

/// Human-readable `message` (or `error`) field of a response body
pub fn message(value: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}

pub fn token(value: &Value) -> Result<String, ApiError> {
    value
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::shape("login", "missing `token`"))
}

/// `GET /student/qr-code`. A body without a non-empty `qr_code` string is
/// a failed fetch.
pub fn qr_credential(value: &Value, now: DateTime<Utc>) -> Result<RotatingQrCredential, ApiError> {
    let encoded_payload = value
        .get("qr_code")
        .and_then(Value::as_str)
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::shape("student/qr-code", "missing `qr_code`"))?
        .to_string();

    let info = value.get("rotation_info");
    let rotation = RotationInfo {
        expires_in_seconds: info.and_then(|i| whole_seconds(i.get("expires_in_seconds"))),
        rotation_interval: info.and_then(|i| whole_seconds(i.get("rotation_interval"))),
    };

    let issued_at = value
        .get("issued_at")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(now);

    let subject_id = value
        .get("student_id")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(RotatingQrCredential {
        subject_id,
        encoded_payload,
        issued_at,
        rotation,
    })
}

/// `POST /student/scan-stall` → `{ "stall": { id, name } }`
pub fn stall(value: Value) -> Result<StallIdentity, ApiError> {
    entity(value, "stall", "student/scan-stall")
}

/// `POST /volunteer/check-in-out` → `{ "scan": { ... } }`
pub fn scan_event(value: Value) -> Result<ScanEvent, ApiError> {
    entity(value, "scan", "volunteer/check-in-out")
}

/// `GET /student/events/:id` → `{ "event": {...}, "registration": {...}? }`
pub fn event_detail(value: Value) -> Result<EventDetail, ApiError> {
    if !value.get("event").map(Value::is_object).unwrap_or(false) {
        return Err(ApiError::shape("student/events/:id", "missing `event` object"));
    }
    serde_json::from_value(value).map_err(|e| ApiError::shape("student/events/:id", e.to_string()))
}

/// Positive JSON number rounded down to whole seconds, never below 1.
/// Anything else is treated as absent.
fn whole_seconds(field: Option<&Value>) -> Option<i64> {
    field
        .and_then(Value::as_f64)
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| (s.floor() as i64).max(1))
}

fn take(value: Value, key: &str) -> Option<Value> {
    match value {
        Value::Object(mut map) => map.remove(key),
        _ => None,
    }
}
