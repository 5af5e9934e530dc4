use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use evently_client::ApiClient;
use evently_core::Role;
use evently_dashboard::{AdminOverview, EventReport, ManagerDashboard};
use evently_store::Session;
use serde_json::json;

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn client(base: String, role: Role) -> ApiClient {
    let session = Session::in_memory();
    session.set_token(role, "tok").unwrap();
    ApiClient::new(base, session)
}

fn registrations() -> serde_json::Value {
    json!({ "registrations": [
        { "event_id": "ev-1", "student_id": "s1", "school_id": "sch-a", "checked_in": true,
          "registration_status": "CONFIRMED", "payment_status": "COMPLETED" },
        { "event_id": "ev-1", "student_id": "s2", "school_id": "sch-a", "checked_in": false,
          "registration_status": "CONFIRMED", "payment_status": "NOT_REQUIRED" },
        { "event_id": "ev-1", "student_id": "s3", "school_id": "sch-b", "checked_in": true,
          "registration_status": "PENDING", "payment_status": "PENDING" }
    ]})
}

#[tokio::test]
async fn test_admin_overview_survives_one_failing_source() {
    let router = Router::new()
        .route(
            "/api/admin/events",
            get(|| async {
                Json(json!({ "events": [
                    { "id": "e1", "title": "Expo", "status": "PENDING" },
                    { "id": "e2", "title": "Quiz", "status": "APPROVED" },
                    { "id": "e3", "title": "Debate", "status": "APPROVED" },
                    { "id": "e4", "title": "Robotics", "status": "REJECTED", "rejection_reason": "Clash" }
                ]}))
            }),
        )
        .route(
            "/api/admin/schools",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "db down" }))) }),
        )
        .route(
            "/api/admin/stalls",
            get(|| async { Json(json!({ "stalls": [{ "id": "st1", "name": "Solar" }] })) }),
        )
        .route(
            "/api/admin/volunteers",
            get(|| async {
                Json(json!({ "volunteers": [{ "id": "v1", "name": "Tara", "email": "t@x.org" }] }))
            }),
        )
        .route("/api/admin/registrations", get(|| async { Json(registrations()) }));
    let base = spawn(router).await;

    let overview = AdminOverview::load(&client(base, Role::Admin)).await;
    let stats = overview.stats();

    assert_eq!(overview.failures.len(), 1);
    assert_eq!(overview.failures[0].source, "schools");
    assert_eq!(overview.failures[0].error, "db down");

    assert_eq!(stats.total_events, 4);
    assert_eq!(stats.pending_events, 1);
    assert_eq!(stats.approved_events, 2);
    assert_eq!(stats.rejected_events, 1);
    assert_eq!(stats.schools, 0);
    assert_eq!(stats.stalls, 1);
    assert_eq!(stats.volunteers, 1);
    assert_eq!(stats.registrations, 3);
    assert_eq!(stats.schools_represented, 2);
    assert_eq!(overview.pending()[0].id, "e1");
}

#[tokio::test]
async fn test_event_report_aggregates() {
    let router = Router::new()
        .route("/api/admin/events/{id}/registrations", get(|| async { Json(registrations()) }))
        .route(
            "/api/admin/events/{id}/feedback",
            get(|| async {
                Json(json!({ "feedback": [
                    { "stall_id": "st1", "rating": 5 },
                    { "stall_id": "st1", "rating": 4, "comment": "Nice" },
                    { "stall_id": "st2", "rating": 3 }
                ]}))
            }),
        )
        .route(
            "/api/admin/schools",
            get(|| async { Json(json!({ "schools": [{ "id": "sch-a", "name": "Greenwood High" }] })) }),
        );
    let base = spawn(router).await;

    let report = EventReport::load(&client(base, Role::Admin), "ev-1").await;
    let stats = report.stats();

    assert!(report.failures.is_empty());
    assert_eq!(stats.registrations, 3);
    assert_eq!(stats.checked_in, 2);
    assert_eq!(stats.schools_represented, 2);
    assert_eq!(stats.feedback_count, 3);
    assert_eq!(stats.average_rating, Some(4.0));
    assert_eq!(report.school_names(), vec!["Greenwood High".to_string(), "sch-b".to_string()]);
}

#[tokio::test]
async fn test_event_report_without_feedback() {
    let router = Router::new()
        .route("/api/admin/events/{id}/registrations", get(|| async { Json(registrations()) }))
        .route("/api/admin/events/{id}/feedback", get(|| async { StatusCode::NOT_FOUND }))
        .route("/api/admin/schools", get(|| async { Json(json!({ "schools": [] })) }));
    let base = spawn(router).await;

    let report = EventReport::load(&client(base, Role::Admin), "ev-1").await;
    let stats = report.stats();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(stats.feedback_count, 0);
    assert_eq!(stats.average_rating, None);
    assert_eq!(stats.registrations, 3);
}

#[tokio::test]
async fn test_manager_dashboard_stats() {
    let router = Router::new().route(
        "/api/event-manager/events",
        get(|| async {
            Json(json!({ "events": [
                { "id": "e1", "title": "Expo", "status": "APPROVED", "max_capacity": 100, "current_registrations": 40 },
                { "id": "e2", "title": "Quiz", "status": "APPROVED", "max_capacity": 100, "current_registrations": 60 },
                { "id": "e3", "title": "Open Mic", "status": "PENDING", "current_registrations": 7 },
                { "id": "e4", "title": "Debate", "status": "REJECTED", "rejection_reason": "Venue clash" }
            ]}))
        }),
    );
    let base = spawn(router).await;

    let dashboard = ManagerDashboard::load(&client(base, Role::EventManager)).await;
    let stats = dashboard.stats();

    assert_eq!(stats.total_events, 4);
    assert_eq!(stats.approved_events, 2);
    assert_eq!(stats.total_registrations, 107);
    assert_eq!(stats.capacity_utilisation, Some(0.5));
    assert_eq!(dashboard.rejections(), vec![("Debate", "Venue clash")]);
}

#[tokio::test]
async fn test_logged_out_dashboard_is_empty_not_blank() {
    let base = spawn(Router::new()).await;
    let overview = AdminOverview::load(&ApiClient::new(base, Session::in_memory())).await;

    assert_eq!(overview.failures.len(), 5);
    assert_eq!(overview.stats().total_events, 0);
}
