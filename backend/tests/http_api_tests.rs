//! End-to-end tests for the REST API, driving the axum router in-process.
#![cfg(feature = "http-server")]

mod support;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use staff_directory::db::repository::FullRepository;
use staff_directory::db::LocalRepository;
use staff_directory::http::{create_router, AppState};
use support::{seeded_repo, teacher_json};

async fn seeded_app() -> Router {
    create_router(AppState::new(seeded_repo().await))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = seeded_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_list_returns_seeded_teachers() {
    let app = seeded_app().await;
    let (status, body) = send(&app, Method::GET, "/api/teachers", None).await;
    assert_eq!(status, StatusCode::OK);

    let teachers = body.as_array().unwrap();
    assert_eq!(teachers.len(), 3);
    assert_eq!(teachers[0]["employeeId"], "TCH001");
    assert_eq!(teachers[0]["firstName"], "Sarah");
    assert_eq!(teachers[1]["status"], "on_leave");
    assert!(teachers[0]["avatar"].is_null());
}

#[tokio::test]
async fn test_search_query_parameters() {
    let app = seeded_app().await;

    let (_, body) = send(&app, Method::GET, "/api/teachers?search=chen", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/teachers?search=&department=all&status=active",
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(&app, Method::GET, "/api/teachers?search=nomatch123", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_empty_filters_match_everything() {
    let app = seeded_app().await;
    let (status, body) = send(&app, Method::GET, "/api/teachers?department=&status=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = send(&app, Method::GET, "/api/teachers?department=Science&status=", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bad_query_string_is_json_400() {
    let app = seeded_app().await;
    let request = Request::builder()
        .uri("/api/teachers?search=a&search=b")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("application/json"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("search"));
}

#[tokio::test]
async fn test_stats_route_is_not_an_id() {
    let app = seeded_app().await;
    let (status, body) = send(&app, Method::GET, "/api/teachers/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"totalTeachers": 3, "activeTeachers": 2, "onLeave": 1, "departments": 3})
    );
}

#[tokio::test]
async fn test_get_by_id() {
    let app = seeded_app().await;
    let (status, body) = send(&app, Method::GET, "/api/teachers/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);
    assert_eq!(body["lastName"], "Chen");
}

#[tokio::test]
async fn test_get_invalid_and_missing_ids() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::GET, "/api/teachers/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid teacher ID");

    let (status, _) = send(&app, Method::GET, "/api/teachers/12abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/teachers/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Teacher not found");
}

#[tokio::test]
async fn test_create_returns_201_and_defaults_status() {
    let app = seeded_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/teachers",
        Some(teacher_json("TCH100", "g.hopper@school.edu")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 4);
    assert_eq!(body["status"], "active");
    assert_eq!(body["subjects"], json!(["Programming", "Compilers"]));

    let (_, stats) = send(&app, Method::GET, "/api/teachers/stats", None).await;
    assert_eq!(stats["totalTeachers"], 4);
    assert_eq!(stats["departments"], 4);
}

#[tokio::test]
async fn test_create_duplicate_employee_id() {
    let app = seeded_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/teachers",
        Some(teacher_json("TCH001", "fresh@school.edu")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["message"], "Employee ID already exists");
}

#[tokio::test]
async fn test_create_duplicate_email() {
    let app = seeded_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/teachers",
        Some(teacher_json("TCH200", "sarah.j@school.edu")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = seeded_app().await;
    let mut payload = teacher_json("TCH300", "not-an-email");
    payload["experience"] = json!(-1);

    let (status, body) = send(&app, Method::POST, "/api/teachers", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "Validation error");

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"experience"));

    let (_, stats) = send(&app, Method::GET, "/api/teachers/stats", None).await;
    assert_eq!(stats["totalTeachers"], 3);
}

#[tokio::test]
async fn test_create_malformed_json() {
    let app = seeded_app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/teachers")
        .header("content-type", "application/json")
        .body(Body::from("{\"employeeId\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_update_partial_fields() {
    let app = seeded_app().await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/teachers/1",
        Some(json!({"id": 99, "experience": 0, "status": "inactive"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["experience"], 0);
    assert_eq!(body["status"], "inactive");
    assert_eq!(body["firstName"], "Sarah");

    let (status, _) = send(&app, Method::GET, "/api/teachers/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_empty_body_is_noop() {
    let app = seeded_app().await;
    let (_, before) = send(&app, Method::GET, "/api/teachers/3", None).await;
    let (status, after) = send(&app, Method::PUT, "/api/teachers/3", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_update_errors() {
    let app = seeded_app().await;

    let (status, _) = send(&app, Method::PUT, "/api/teachers/x", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/teachers/404",
        Some(json!({"firstName": "Nobody"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/teachers/1",
        Some(json!({"status": "retired"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "status");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/teachers/1",
        Some(json!({"email": "m.chen@school.edu"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_delete_twice() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::DELETE, "/api/teachers/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Teacher deleted successfully"}));

    let (status, _) = send(&app, Method::DELETE, "/api/teachers/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/teachers/two", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_departments() {
    let app = seeded_app().await;
    let (status, body) = send(&app, Method::GET, "/api/departments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["English", "Mathematics", "Science"]));
}

#[tokio::test]
async fn test_storage_failure_is_500() {
    let local = Arc::new(LocalRepository::new());
    let app = create_router(AppState::new(local.clone() as Arc<dyn FullRepository>));
    local.set_healthy(false);

    let (status, body) = send(&app, Method::GET, "/api/teachers", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "REPOSITORY_ERROR");
    assert_eq!(body["message"], "Internal server error");

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "disconnected");
}
