//! API integration tests
//!
//! Each test spins the real router on an ephemeral port and exercises the
//! wire contract end to end, client gateway included.

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use waypoint_server::{
    api,
    client::{ApiClient, RetryPolicy},
    config::AppConfig,
    lock::RequestLock,
    models::user::{CreateUser, Role},
    models::{Activity, Location, OverrideState},
    services::Services,
    store::RowStore,
    AppState,
};

const LOC_LAT: f64 = 13.7563;
const LOC_LNG: f64 = 100.5018;

struct TestApp {
    base_url: String,
    store: RowStore,
    /// A seeded standard user allowed to check in.
    user_id: String,
}

/// Boot the app on an ephemeral port with a seeded in-memory store:
/// an admin (admin/admin123), a standard user (walker/walk123), location
/// LOC-1 (radius 50 m) and activity ACT-1 (capacity 2, window open).
async fn spawn_app() -> TestApp {
    let store = RowStore::in_memory();
    let config = AppConfig::default();
    let services = Services::new(store.clone(), config.auth.clone());

    services
        .users
        .create(CreateUser {
            username: "admin".into(),
            password: Some("admin123".into()),
            display_name: None,
            role: Some(Role::Admin),
            line_id: None,
            assigned_activities: None,
        })
        .unwrap();
    let walker = services
        .users
        .create(CreateUser {
            username: "walker".into(),
            password: Some("walk123".into()),
            display_name: Some("Walker".into()),
            role: None,
            line_id: None,
            assigned_activities: None,
        })
        .unwrap();

    store
        .locations
        .insert(&Location {
            id: "LOC-1".into(),
            name: "Main Stage".into(),
            latitude: LOC_LAT,
            longitude: LOC_LNG,
            radius_m: 50.0,
            description: None,
            image_url: None,
            floor: None,
            room: None,
        })
        .unwrap();
    store
        .activities
        .insert(&Activity {
            id: "ACT-1".into(),
            location_id: "LOC-1".into(),
            name: "Opening Talk".into(),
            description: None,
            active: true,
            start_at: Some(Utc::now() - ChronoDuration::hours(1)),
            end_at: Some(Utc::now() + ChronoDuration::hours(1)),
            capacity: 2,
            override_state: OverrideState::Auto,
        })
        .unwrap();

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        lock: RequestLock::new(Duration::from_secs(5)),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(state)).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        store,
        user_id: walker.id,
    }
}

async fn post_action(app: &TestApp, body: Value) -> Value {
    let response = Client::new()
        .post(format!("{}/api", app.base_url))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse response")
}

async fn post_action_as(app: &TestApp, token: &str, body: Value) -> Value {
    let response = Client::new()
        .post(format!("{}/api", app.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse response")
}

async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let body = post_action(
        app,
        json!({"action": "login", "username": username, "password": password}),
    )
    .await;
    assert_eq!(body["status"], "success");
    body["token"].as_str().expect("No token in response").to_string()
}

fn check_in_body(app: &TestApp) -> Value {
    json!({
        "action": "checkIn",
        "userId": app.user_id,
        "activityId": "ACT-1",
        "locationId": "LOC-1",
        // ~30 m north of LOC-1, inside the 75 m effective radius.
        "userLat": LOC_LAT + 30.0 / 111_195.0,
        "userLng": LOC_LNG,
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = Client::new()
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_login_and_invalid_credentials() {
    let app = spawn_app().await;

    let token = login(&app, "admin", "admin123").await;
    assert!(!token.is_empty());

    // A failed login is a business-level error: HTTP 200, error envelope.
    let body = post_action(
        &app,
        json!({"action": "login", "username": "admin", "password": "wrong"}),
    )
    .await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_get_init_data() {
    let app = spawn_app().await;

    let body = post_action(&app, json!({"action": "getInitData"})).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["locations"].as_array().unwrap().len(), 1);
    assert_eq!(body["activities"].as_array().unwrap().len(), 1);
    assert_eq!(body["activities"][0]["checked_in"], 0);
    assert_eq!(body["activities"][0]["open"], true);
    assert!(body["announcements"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_check_in_and_capacity() {
    let app = spawn_app().await;

    let body = post_action(&app, check_in_body(&app)).await;
    assert_eq!(body["status"], "success");
    assert!(body["checkInId"].as_str().unwrap().starts_with("CK-"));

    let body = post_action(&app, check_in_body(&app)).await;
    assert_eq!(body["status"], "success");

    // Capacity 2: the third attempt is rejected, table unchanged.
    let body = post_action(&app, check_in_body(&app)).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "ACTIVITY_FULL");
    assert_eq!(body["message"], "กิจกรรมเต็มแล้ว");
    assert_eq!(app.store.checkins.count_for_activity("ACT-1").unwrap(), 2);
}

#[tokio::test]
async fn test_check_in_out_of_range() {
    let app = spawn_app().await;

    let mut body = check_in_body(&app);
    body["userLat"] = json!(LOC_LAT + 200.0 / 111_195.0);
    let reply = post_action(&app, body).await;
    assert_eq!(reply["status"], "error");
    assert_eq!(reply["code"], "OUT_OF_RANGE");
    // The message names the actual distance and the configured radius.
    let message = reply["message"].as_str().unwrap();
    assert!(message.contains("200"), "message was: {}", message);
    assert!(message.contains("50"), "message was: {}", message);
}

#[tokio::test]
async fn test_admin_actions_require_admin_token() {
    let app = spawn_app().await;
    let create = json!({
        "action": "createLocation",
        "name": "Annex",
        "latitude": 13.7,
        "longitude": 100.5,
    });

    // No token.
    let body = post_action(&app, create.clone()).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "UNAUTHORIZED");

    // Standard user token.
    let walker = login(&app, "walker", "walk123").await;
    let body = post_action_as(&app, &walker, create.clone()).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "FORBIDDEN");

    // Admin token.
    let admin = login(&app, "admin", "admin123").await;
    let body = post_action_as(&app, &admin, create).await;
    assert_eq!(body["status"], "success");
    assert!(body["location"]["id"].as_str().unwrap().starts_with("LOC-"));
}

#[tokio::test]
async fn test_delete_location_blocked_while_referenced() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;

    let body = post_action_as(
        &app,
        &admin,
        json!({"action": "deleteLocation", "id": "LOC-1"}),
    )
    .await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "CONFLICT");

    let body = post_action_as(
        &app,
        &admin,
        json!({"action": "deleteActivity", "id": "ACT-1"}),
    )
    .await;
    assert_eq!(body["status"], "success");

    let body = post_action_as(
        &app,
        &admin,
        json!({"action": "deleteLocation", "id": "LOC-1"}),
    )
    .await;
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_activity_override_flow() {
    let app = spawn_app().await;
    let admin = login(&app, "admin", "admin123").await;

    let body = post_action_as(
        &app,
        &admin,
        json!({"action": "setActivityOverride", "id": "ACT-1", "state": "force-closed"}),
    )
    .await;
    assert_eq!(body["status"], "success");

    let reply = post_action(&app, check_in_body(&app)).await;
    assert_eq!(reply["status"], "error");
    assert_eq!(reply["code"], "ALREADY_ENDED");

    // Back to automatic; the open window admits again.
    post_action_as(
        &app,
        &admin,
        json!({"action": "setActivityOverride", "id": "ACT-1", "state": "auto"}),
    )
    .await;
    let reply = post_action(&app, check_in_body(&app)).await;
    assert_eq!(reply["status"], "success");
}

#[tokio::test]
async fn test_survey_status_flow() {
    let app = spawn_app().await;

    let body = post_action(&app, check_in_body(&app)).await;
    let check_in_id = body["checkInId"].as_str().unwrap().to_string();

    // Needs a token.
    let body = post_action(
        &app,
        json!({"action": "updateSurveyStatus", "checkInId": check_in_id}),
    )
    .await;
    assert_eq!(body["code"], "UNAUTHORIZED");

    let walker = login(&app, "walker", "walk123").await;
    let body = post_action_as(
        &app,
        &walker,
        json!({"action": "updateSurveyStatus", "checkInId": check_in_id}),
    )
    .await;
    assert_eq!(body["status"], "success");

    let record = app.store.checkins.get(&check_in_id).unwrap();
    assert!(record.survey_done);
}

#[tokio::test]
async fn test_unknown_action() {
    let app = spawn_app().await;

    let body = post_action(&app, json!({"action": "frobnicate"})).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "UNKNOWN_ACTION");
}

#[tokio::test]
async fn test_read_actions_are_idempotent() {
    let app = spawn_app().await;

    let first = post_action(&app, json!({"action": "getActivities"})).await;
    let second = post_action(&app, json!({"action": "getActivities"})).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_gateway_end_to_end() {
    let app = spawn_app().await;
    let client = ApiClient::with_retry(
        app.base_url.clone(),
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_jitter_ms: 5,
        },
    );

    let lat = LOC_LAT + 30.0 / 111_195.0;
    let payload = client
        .check_in(&app.user_id, "ACT-1", "LOC-1", lat, LOC_LNG)
        .await
        .unwrap();
    assert!(payload["checkInId"].as_str().unwrap().starts_with("CK-"));

    // A terminal rejection comes back as-is, no retry loop.
    let far_lat = LOC_LAT + 500.0 / 111_195.0;
    let err = client
        .check_in(&app.user_id, "ACT-1", "LOC-1", far_lat, LOC_LNG)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some("OUT_OF_RANGE"));

    let token = client.login("walker", "walk123").await.unwrap();
    assert!(!token.is_empty());
}
