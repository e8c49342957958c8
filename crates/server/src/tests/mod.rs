// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    }
}

/// Sends one request and returns the status and JSON body.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<(&str, &str)>,
    body: Option<Value>,
) -> (HttpStatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, roles)) = user {
        builder = builder
            .header(identity::USER_ID_HEADER, id)
            .header(identity::USER_ROLES_HEADER, roles);
    }
    let request: Request<Body> = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status: HttpStatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

const PLANNER: (&str, &str) = ("planner-1", "PLANNER");
const VALIDATOR: (&str, &str) = ("validator-1", "VALIDATOR");
const REVIEWER: (&str, &str) = ("reviewer-1", "REVIEWER");
const AUDITOR: (&str, &str) = ("auditor-1", "AUDITOR");

async fn create(app: &Router, kind: &str, code: &str, budget: Option<i64>) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/entities",
        Some(PLANNER),
        Some(json!({
            "kind": kind,
            "code": code,
            "name": format!("Entity {code}"),
            "institution": "Ministry of Planning",
            "budget_assigned": budget,
        })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CREATED);
    body["data"]["entity"]["entity_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_objective_validated_end_to_end() {
    let app: Router = build_router(create_test_app_state());
    let id: i64 = create(&app, "objective", "OBJ-001", None).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/entities/{id}/submit"),
        Some(PLANNER),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/entities/{id}/approve"),
        Some(VALIDATOR),
        Some(json!({ "expected_version": 2 })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["entity"]["state"], json!("Validated"));

    let (status, body) = send(
        &app,
        "GET",
        &format!("/entities/{id}/decisions"),
        Some(AUDITOR),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    let decisions = body["data"]["decisions"].as_array().unwrap();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0]["decision"], json!("APPROVED"));
}

#[tokio::test]
async fn test_blank_rejection_is_unprocessable() {
    let app: Router = build_router(create_test_app_state());
    let id: i64 = create(&app, "project", "PRJ-002", Some(50_000)).await;
    send(
        &app,
        "POST",
        &format!("/entities/{id}/submit"),
        Some(PLANNER),
        Some(json!({})),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/entities/{id}/reject"),
        Some(REVIEWER),
        Some(json!({ "justification": "" })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("justification"));

    let (_, body) = send(&app, "GET", &format!("/entities/{id}"), Some(PLANNER), None).await;
    assert_eq!(body["data"]["state"], json!("SentForReview"));
}

#[tokio::test]
async fn test_missing_identity_is_unauthenticated() {
    let app: Router = build_router(create_test_app_state());
    let (status, body) = send(&app, "GET", "/capabilities", None, None).await;
    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    let app: Router = build_router(create_test_app_state());
    let id: i64 = create(&app, "project", "PRJ-002", Some(1_000)).await;
    send(
        &app,
        "POST",
        &format!("/entities/{id}/submit"),
        Some(PLANNER),
        Some(json!({})),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/entities/{id}/approve"),
        Some(VALIDATOR),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, HttpStatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_transition_and_stale_version_conflict() {
    let app: Router = build_router(create_test_app_state());
    let id: i64 = create(&app, "objective", "OBJ-001", None).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/entities/{id}/approve"),
        Some(VALIDATOR),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/entities/{id}/submit"),
        Some(PLANNER),
        Some(json!({ "expected_version": 7 })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("concurrently"));
}

#[tokio::test]
async fn test_unknown_entity_is_not_found() {
    let app: Router = build_router(create_test_app_state());
    let (status, _) = send(&app, "GET", "/entities/999", Some(AUDITOR), None).await;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_module_capabilities_for_auditor() {
    let app: Router = build_router(create_test_app_state());
    let (status, body) = send(&app, "GET", "/capabilities/projects", Some(AUDITOR), None).await;
    assert_eq!(status, HttpStatusCode::OK);

    let caps: &Value = &body["data"]["capabilities"];
    assert_eq!(caps["canView"], json!(true));
    assert_eq!(caps["canEdit"], json!(false));
    assert_eq!(caps["canApprove"], json!(false));
}

#[tokio::test]
async fn test_list_filters_by_viewable_kind() {
    let app: Router = build_router(create_test_app_state());
    create(&app, "objective", "OBJ-001", None).await;
    create(&app, "project", "PRJ-001", Some(10)).await;

    let (status, body) = send(&app, "GET", "/entities", Some(REVIEWER), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    let entities = body["data"]["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["kind"], json!("project"));

    let (status, _) = send(
        &app,
        "GET",
        "/entities?kind=objective",
        Some(REVIEWER),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_limited_export_omits_budget_rows() {
    let app: Router = build_router(create_test_app_state());
    create(&app, "project", "PRJ-001", Some(10)).await;

    let (status, body) = send(&app, "GET", "/reports/compliance", Some(REVIEWER), None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["data"]["export_level"], json!("limited"));
    assert_eq!(body["data"]["report"]["budget_rows"], json!([]));

    let (_, body) = send(&app, "GET", "/reports/compliance", Some(PLANNER), None).await;
    assert_eq!(body["data"]["export_level"], json!("full"));
    assert_eq!(
        body["data"]["report"]["budget_rows"].as_array().unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_audit_timeline_requires_auditor() {
    let app: Router = build_router(create_test_app_state());
    let id: i64 = create(&app, "objective", "OBJ-001", None).await;

    let (status, _) = send(&app, "GET", "/audit/timeline", Some(PLANNER), None).await;
    assert_eq!(status, HttpStatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/audit/timeline?entity_id={id}"),
        Some(AUDITOR),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["data"]["events"].as_array().unwrap().len(), 1);
}

/// Sends a request with a raw body and returns the status and JSON body.
async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &'static str,
) -> (HttpStatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(identity::USER_ID_HEADER, PLANNER.0)
        .header(identity::USER_ROLES_HEADER, PLANNER.1);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request: Request<Body> = builder.body(Body::from(body)).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status: HttpStatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_submit_without_body() {
    let app: Router = build_router(create_test_app_state());
    let id: i64 = create(&app, "objective", "OBJ-001", None).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/entities/{id}/submit"),
        Some(PLANNER),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["data"]["entity"]["state"], json!("SentForReview"));
}

#[tokio::test]
async fn test_malformed_json_uses_envelope() {
    let app: Router = build_router(create_test_app_state());
    let id: i64 = create(&app, "objective", "OBJ-001", None).await;

    let (status, body) = send_raw(
        &app,
        "POST",
        &format!("/entities/{id}/submit"),
        Some("application/json"),
        "{not json",
    )
    .await;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("JSON"));

    let (status, body) = send_raw(
        &app,
        "POST",
        "/entities",
        Some("application/json"),
        "{not json",
    )
    .await;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_create_without_json_content_type_uses_envelope() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = send_raw(&app, "POST", "/entities", None, "{}").await;
    assert_eq!(status, HttpStatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_missing_body_fields_are_unprocessable() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = send(
        &app,
        "POST",
        "/entities",
        Some(PLANNER),
        Some(json!({ "kind": "objective" })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_non_numeric_id_uses_envelope() {
    let app: Router = build_router(create_test_app_state());

    let (status, body) = send(&app, "GET", "/entities/abc", Some(AUDITOR), None).await;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].is_string());

    let (status, body) = send(
        &app,
        "GET",
        "/audit/timeline?entity_id=abc",
        Some(AUDITOR),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}
