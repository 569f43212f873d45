//! HTTP Action Tests
//!
//! Drives the router in-process:
//! - form and JSON bodies reach the same feature
//! - 200 / 422 / 400 / 404 status mapping
//! - schema description endpoint

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use formgate::auth::Role;
use formgate::features::Features;
use formgate::http_server::{HttpServer, HttpServerConfig};
use formgate::services::Services;
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Helpers
// =============================================================================

fn router() -> Router {
    let services = Services::in_memory();
    services
        .seed_user("ana@example.com", "Passw0rd!", Role::Client)
        .unwrap();
    let features = Arc::new(Features::new(&services).unwrap());
    HttpServer::new(HttpServerConfig::default(), features).router()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_form_login_succeeds() {
    let (status, body) = send(
        router(),
        form_post(
            "/actions/login",
            "email=ana%40example.com&password=Passw0rd%21&remember=on",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["redirectTo"], "/client/dashboard");
    assert!(body["data"]["sessionToken"].is_string());
}

#[tokio::test]
async fn test_field_errors_are_422() {
    let (status, body) = send(router(), form_post("/actions/login", "email=")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "fields");
    assert!(body["fieldErrors"]["email"].is_array());
    assert!(body["fieldErrors"]["password"].is_array());
}

#[tokio::test]
async fn test_action_failure_is_400() {
    let (status, body) = send(
        router(),
        json_post(
            "/actions/login",
            json!({"email": "ana@example.com", "password": "wrong"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "general");
    assert!(body.get("fieldErrors").is_none());
}

#[tokio::test]
async fn test_json_booleans_and_numbers() {
    let (status, body) = send(
        router(),
        json_post(
            "/actions/billing",
            json!({
                "type": "debit_card",
                "holderName": "Ana Lima",
                "last4": "0042",
                "expMonth": 7,
                "expYear": 2031,
                "isDefault": true,
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["expMonth"], 7);
    assert_eq!(body["data"]["isDefault"], true);
}

#[tokio::test]
async fn test_unreadable_bodies_are_400() {
    let (status, body) = send(router(), json_post("/actions/settings", json!(["a"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Expected a JSON object");

    let request = Request::builder()
        .method("POST")
        .uri("/actions/settings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contact_form_post() {
    let (status, body) = send(
        router(),
        form_post(
            "/actions/contact",
            "fullName=Ana+Lima&email=ana%40example.com&companyName=&phone=\
             &serviceInterest=consultation&message=Looking+for+a+redesign+quote.",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Thank you! We will be in touch soon.");
}

#[tokio::test]
async fn test_unknown_feature_is_404() {
    let (status, body) = send(router(), form_post("/actions/admin", "x=1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_schema_description() {
    let request = Request::builder()
        .uri("/actions/verify_otp/schema")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "verify_otp");
    let names: Vec<_> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["email", "otp", "type"]);
    assert_eq!(
        body["fields"][2]["rule"]["allowed"],
        json!(["email_confirmation", "password_reset"])
    );
}
