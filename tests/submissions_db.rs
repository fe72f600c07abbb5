//! End-to-end submission flows against Postgres.
//!
//! These need a server reachable through `DATABASE_URL`; run them with
//! `cargo test -- --ignored`.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, get, json_request, sample_payload};
use serde_json::json;
use sqlx::PgPool;

async fn create(pool: &PgPool, dir: &std::path::Path, email: &str) -> i64 {
    let app = build_test_app(pool.clone(), dir);
    let response = json_request(app, Method::POST, "/api/submit", &sample_payload(email)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn submit_stores_sanitized_record(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(pool.clone(), dir.path());

    let mut payload = sample_payload("JOHN@EXAMPLE.COM");
    payload["firstName"] = json!("  Jo<br>hn ");

    let response = json_request(app, Method::POST, "/api/submit", &payload).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["firstName"], "Jo&lt;br&gt;hn");
    assert_eq!(body["data"]["email"], "john@example.com");
    assert_eq!(body["data"]["status"], "pending");
    assert!(body["data"]["reviewedAt"].is_null());
    assert_eq!(body["data"]["createdAt"], body["data"]["updatedAt"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn duplicate_email_conflicts(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    create(&pool, dir.path(), "dup@example.com").await;

    // normalizes to the same address
    let app = build_test_app(pool.clone(), dir.path());
    let payload = sample_payload("DUP@example.com");
    let response = json_request(app, Method::POST, "/api/submit", &payload).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["success"], false);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn get_and_delete(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let id = create(&pool, dir.path(), "get@example.com").await;

    let app = build_test_app(pool.clone(), dir.path());
    let response = get(app, &format!("/api/submissions/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], id);

    let response = json_request(
        build_test_app(pool.clone(), dir.path()),
        Method::DELETE,
        &format!("/api/submissions/{id}"),
        &json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["deletedId"], id);

    let app = build_test_app(pool.clone(), dir.path());
    let response = get(app, &format!("/api/submissions/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Submission not found");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn partial_update_touches_only_supplied_fields(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let id = create(&pool, dir.path(), "update@example.com").await;

    let response = json_request(
        build_test_app(pool.clone(), dir.path()),
        Method::PUT,
        &format!("/api/submissions/{id}"),
        &json!({ "lastName": "O'Brien", "id": 999, "createdAt": "2000-01-01T00:00:00Z" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["id"], id);
    assert_eq!(data["lastName"], "O&#x27;Brien");
    assert_eq!(data["firstName"], "John");
    assert_ne!(data["createdAt"], "2000-01-01T00:00:00Z");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn update_error_cases(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let id = create(&pool, dir.path(), "errors@example.com").await;

    let response = json_request(
        build_test_app(pool.clone(), dir.path()),
        Method::PUT,
        &format!("/api/submissions/{id}"),
        &json!({ "unknown": "x" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "No fields to update");

    let response = json_request(
        build_test_app(pool.clone(), dir.path()),
        Method::PUT,
        &format!("/api/submissions/{id}"),
        &json!({ "email": "<script>alert(1)</script>", "firstName": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(
        body["errors"],
        json!([
            "First name is required and must be a non-empty string",
            "Valid email address is required",
        ])
    );

    let app = build_test_app(pool.clone(), dir.path());
    let response = get(app, &format!("/api/submissions/{id}")).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["email"], "errors@example.com");
    assert_eq!(data["firstName"], "John");

    let response = json_request(
        build_test_app(pool.clone(), dir.path()),
        Method::PUT,
        "/api/submissions/424242",
        &json!({ "firstName": "Ghost" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn review_sets_reviewed_at(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let id = create(&pool, dir.path(), "review@example.com").await;

    let response = json_request(
        build_test_app(pool.clone(), dir.path()),
        Method::PATCH,
        &format!("/api/submissions/{id}/status"),
        &json!({ "status": "approved", "notes": "Strong <b>pitch</b>" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["status"], "approved");
    assert!(data["reviewedAt"].is_string());
    assert_eq!(data["notes"], "Strong &lt;b&gt;pitch&lt;&#x2F;b&gt;");

    let response = json_request(
        build_test_app(pool.clone(), dir.path()),
        Method::PATCH,
        &format!("/api/submissions/{id}/status"),
        &json!({ "status": "pending" }),
    )
    .await;
    let data = body_json(response).await["data"].clone();
    assert!(data["reviewedAt"].is_null());
    assert_eq!(data["notes"], "Strong &lt;b&gt;pitch&lt;&#x2F;b&gt;");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn list_paginates_and_statistics_count(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    for n in 0..3 {
        create(&pool, dir.path(), &format!("list{n}@example.com")).await;
    }

    let response = get(
        build_test_app(pool.clone(), dir.path()),
        "/api/submissions?limit=2&offset=2&sortBy=email&order=asc",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["email"], "list2@example.com");
    assert_eq!(body["pagination"], json!({ "total": 3, "limit": 2, "offset": 2, "page": 2 }));

    let response = get(build_test_app(pool.clone(), dir.path()), "/api/statistics").await;
    let stats = body_json(response).await["statistics"].clone();
    assert_eq!(stats["totalSubmissions"], 3);
    assert_eq!(stats["recentSubmissions"], 3);
    assert_eq!(stats["pending"], 3);
    assert_eq!(stats["approved"], 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn health_reports_database_time(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let response = get(build_test_app(pool, dir.path()), "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["database"].is_string());
}
