use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use evently_client::{ApiClient, ApiError};
use evently_core::forms::LoginForm;
use evently_core::{FeedbackForm, Role, Route};
use evently_shared::models::ScanType;
use evently_store::Session;
use serde_json::{json, Value};

// ============================================================================
// Mock backend
// ============================================================================

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn logged_in_everywhere() -> Session {
    let session = Session::in_memory();
    for role in Role::ALL {
        session.set_token(role, format!("tok-{}", role)).unwrap();
    }
    session
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

// ============================================================================
// Interceptor
// ============================================================================

#[tokio::test]
async fn test_401_clears_every_role_and_redirects_to_root() {
    let router = Router::new().route(
        "/api/student/events",
        get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" }))) }),
    );
    let base = spawn(router).await;

    let session = logged_in_everywhere();
    let client = ApiClient::new(base, session.clone());
    let mut nav = client.subscribe_navigation();

    let err = client.list_events().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { status: 401 }));

    for role in Role::ALL {
        assert!(session.token(role).is_none(), "{} token survived", role);
    }
    assert_eq!(nav.recv().await.unwrap(), Route::Root);
    assert_eq!(Route::Root.path(), "/");
}

#[tokio::test]
async fn test_403_is_treated_like_401() {
    let router = Router::new().route(
        "/api/admin/events",
        get(|| async { StatusCode::FORBIDDEN }),
    );
    let base = spawn(router).await;

    let session = logged_in_everywhere();
    let client = ApiClient::new(base, session.clone());

    let err = client.admin_events().await.unwrap_err();
    assert!(err.is_auth_failure());
    assert!(!session.is_logged_in(Role::Student));
}

#[tokio::test]
async fn test_bad_credentials_on_login_do_not_clear_session() {
    let router = Router::new().route(
        "/api/volunteer/login",
        post(|| async {
            (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" })))
        }),
    );
    let base = spawn(router).await;

    let session = Session::in_memory();
    session.set_token(Role::Student, "still-here").unwrap();
    let client = ApiClient::new(base, session.clone());

    let err = client
        .login(Role::Volunteer, LoginForm::new("v@example.org", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(session.is_logged_in(Role::Student));
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/api/student/qr-code",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "qr_code": "x" }))
            }),
        )
        .with_state(hits.clone());
    let base = spawn(router).await;

    let client = ApiClient::new(base, Session::in_memory());
    let err = client.fetch_qr_code().await.unwrap_err();

    assert!(matches!(err, ApiError::NotLoggedIn(Role::Student)));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Endpoints
// ============================================================================

#[tokio::test]
async fn test_login_stores_role_token() {
    let router = Router::new().route(
        "/api/event-manager/login",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["email"], "em@example.org");
            Json(json!({ "token": "em-token" }))
        }),
    );
    let base = spawn(router).await;

    let session = Session::in_memory();
    let client = ApiClient::new(base, session.clone());
    client
        .login(Role::EventManager, LoginForm::new(" em@example.org ", "pw"))
        .await
        .unwrap();

    assert_eq!(session.token(Role::EventManager).unwrap().expose(), "em-token");
    client.logout(Role::EventManager).unwrap();
    assert!(!session.is_logged_in(Role::EventManager));
}

#[tokio::test]
async fn test_role_token_is_attached() {
    let router = Router::new().route(
        "/api/volunteer/check-in-out",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(bearer(&headers).as_deref(), Some("tok-volunteer"));
            assert_eq!(body["qr_token"], "payload-1");
            Json(json!({ "scan": {
                "student_id": "st-1",
                "student_name": "Asha",
                "registration_id": "REG-9",
                "scan_type": "OUT",
                "checked_out_count": 4
            }}))
        }),
    );
    let base = spawn(router).await;

    let client = ApiClient::new(base, logged_in_everywhere());
    let scan = client.check_in_out("payload-1").await.unwrap();
    assert_eq!(scan.scan_type, ScanType::Out);
    assert_eq!(scan.student_name, "Asha");
    assert_eq!(scan.checked_out_count, Some(4));
}

#[tokio::test]
async fn test_business_rejection_is_surfaced_verbatim() {
    let router = Router::new().route(
        "/api/student/submit-feedback",
        post(|| async {
            (
                StatusCode::CONFLICT,
                Json(json!({ "message": "You have already submitted feedback for this stall" })),
            )
        }),
    );
    let base = spawn(router).await;

    let client = ApiClient::new(base, logged_in_everywhere());
    let form = FeedbackForm::new("stall-1").with_rating(4);
    let err = client.submit_feedback(&form).await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(err.to_string(), "You have already submitted feedback for this stall");
}

#[tokio::test]
async fn test_invalid_rating_never_reaches_backend() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/api/student/submit-feedback",
            post(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "message": "ok" }))
            }),
        )
        .with_state(hits.clone());
    let base = spawn(router).await;
    let client = ApiClient::new(base, logged_in_everywhere());

    for form in [
        FeedbackForm::new("stall-1"),
        FeedbackForm::new("stall-1").with_rating(0),
        FeedbackForm::new("stall-1").with_rating(6),
    ] {
        let err = client.submit_feedback(&form).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let ok = client
        .submit_feedback(&FeedbackForm::new("stall-1").with_rating(5))
        .await
        .unwrap();
    assert_eq!(ok.as_deref(), Some("ok"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_qr_code_without_payload_is_shape_error() {
    let router = Router::new().route(
        "/api/student/qr-code",
        get(|| async { Json(json!({ "rotation_info": { "expires_in_seconds": 12 } })) }),
    );
    let base = spawn(router).await;

    let session = logged_in_everywhere();
    let client = ApiClient::new(base, session.clone());
    let err = client.fetch_qr_code().await.unwrap_err();

    assert!(matches!(err, ApiError::UnexpectedShape { .. }));
    assert!(!err.is_auth_failure());
    assert!(session.is_logged_in(Role::Student));
}

#[tokio::test]
async fn test_events_require_envelope() {
    let router = Router::new().route(
        "/api/student/events",
        get(|| async { Json(json!([{ "id": "e1", "title": "Expo", "status": "APPROVED" }])) }),
    );
    let base = spawn(router).await;

    let client = ApiClient::new(base, logged_in_everywhere());
    let err = client.list_events().await.unwrap_err();
    assert!(matches!(err, ApiError::UnexpectedShape { endpoint: "student/events", .. }));
}

#[tokio::test]
async fn test_reject_requires_reason_and_sends_it() {
    let router = Router::new().route(
        "/api/admin/events/{id}/reject",
        patch(|Path(id): Path<String>, Json(body): Json<Value>| async move {
            assert_eq!(id, "ev-3");
            Json(json!({ "message": format!("Rejected: {}", body["rejection_reason"].as_str().unwrap_or("")) }))
        }),
    );
    let base = spawn(router).await;
    let client = ApiClient::new(base, logged_in_everywhere());

    let err = client.reject_event("ev-3", "   ").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let msg = client.reject_event("ev-3", " Venue unavailable ").await.unwrap();
    assert_eq!(msg.as_deref(), Some("Rejected: Venue unavailable"));
}

#[tokio::test]
async fn test_approve_without_body() {
    let router = Router::new().route(
        "/api/admin/events/{id}/approve",
        patch(|Path(id): Path<String>| async move {
            Json(json!({ "message": format!("Event {} approved", id) }))
        }),
    );
    let base = spawn(router).await;
    let client = ApiClient::new(base, logged_in_everywhere());

    let msg = client.approve_event("ev-1").await.unwrap();
    assert_eq!(msg.as_deref(), Some("Event ev-1 approved"));
}
