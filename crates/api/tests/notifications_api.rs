//! HTTP-level integration tests for failure notifications.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{
    audit_payload, body_json, build_test_app, build_test_app_with_mailer, count_rows, get,
    post_json, send, RecordingMailer, TEST_USER,
};
use sqlx::PgPool;

async fn seed_audit(pool: &PgPool) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/audits",
        &audit_payload("P1", "PO-1"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["auditId"].as_i64().unwrap()
}

async fn seed_recipients(pool: &PgPool) {
    sqlx::query(
        "INSERT INTO plant_email_recipients (plant, email_type, email) VALUES \
            ('P1', 'to', 'qa-lead@example.com'), \
            ('P1', 'cc', 'plant-manager@example.com')",
    )
    .execute(pool)
    .await
    .unwrap();
}

fn notify_request(audit_id: i64) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/audits/{audit_id}/notifications"))
        .header("x-user-email", TEST_USER)
        .body(Body::empty())
        .unwrap()
}

async fn log_status(pool: &PgPool) -> String {
    let row: (String,) = sqlx::query_as("SELECT status FROM email_log ORDER BY id DESC LIMIT 1")
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recipients_for_plant(pool: PgPool) {
    seed_recipients(&pool).await;

    let response = get(build_test_app(pool.clone()), "/api/v1/plants/P1/recipients").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["email"], "qa-lead@example.com");
    assert_eq!(json["data"][0]["emailType"], "to");
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_send_to_every_recipient(pool: PgPool) {
    let audit_id = seed_audit(&pool).await;
    seed_recipients(&pool).await;
    let mailer = Arc::new(RecordingMailer::default());

    let app = build_test_app_with_mailer(pool.clone(), mailer.clone());
    let response = send(app, notify_request(audit_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "Sent");
    assert_eq!(json["subject"], "FCA Failure Notification - P1 - PO: PO-1");
    assert_eq!(json["results"].as_array().unwrap().len(), 2);

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].html.contains("S01"));
    assert!(sent[0].html.contains("&lt;b&gt;near&lt;/b&gt;"));
    assert!(!sent[0].html.contains("<b>near</b>"));
    drop(sent);

    assert_eq!(count_rows(&pool, "email_log").await, 1);
    assert_eq!(log_status(&pool).await, "Sent");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_delivery_is_multi_status(pool: PgPool) {
    let audit_id = seed_audit(&pool).await;
    seed_recipients(&pool).await;
    let mailer = Arc::new(RecordingMailer::rejecting(&["plant-manager@example.com"]));

    let app = build_test_app_with_mailer(pool.clone(), mailer);
    let response = send(app, notify_request(audit_id)).await;
    assert_eq!(response.status(), StatusCode::MULTI_STATUS);

    let json = body_json(response).await;
    assert_eq!(json["status"], "Partial");
    let failed: Vec<_> = json["results"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["sent"] == false)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["email"], "plant-manager@example.com");
    assert!(failed[0]["error"].is_string());

    assert_eq!(log_status(&pool).await, "Partial");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unconfigured_mailer_is_bad_gateway(pool: PgPool) {
    let audit_id = seed_audit(&pool).await;
    seed_recipients(&pool).await;

    let response = send(build_test_app(pool.clone()), notify_request(audit_id)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_ERROR");

    assert_eq!(log_status(&pool).await, "Failed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_no_recipients_is_ok(pool: PgPool) {
    let audit_id = seed_audit(&pool).await;

    let response = send(build_test_app(pool.clone()), notify_request(audit_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "NoRecipients");
    assert!(json["results"].as_array().unwrap().is_empty());
    assert_eq!(log_status(&pool).await, "NoRecipients");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_send_requires_identity(pool: PgPool) {
    let audit_id = seed_audit(&pool).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/audits/{audit_id}/notifications"))
        .body(Body::empty())
        .unwrap();
    let response = send(build_test_app(pool.clone()), request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    assert_eq!(count_rows(&pool, "email_log").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_send_for_unknown_audit_is_not_found(pool: PgPool) {
    let response = send(build_test_app(pool.clone()), notify_request(4242)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(count_rows(&pool, "email_log").await, 0);
}
