//! HTTP-level integration tests for audit submission, listing, revision and
//! deletion.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{
    audit_payload, body_json, build_test_app, count_rows, delete, get, post_json, put_json, send,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Submit `payload` and return the new audit id.
async fn create(pool: &PgPool, payload: &serde_json::Value) -> i64 {
    let response = post_json(build_test_app(pool.clone()), "/api/v1/audits", payload).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["auditId"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Test: POST /api/v1/audits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_returns_audit_and_defect_ids(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/audits", &audit_payload("P1", "PO-1")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["auditId"].as_i64().unwrap() > 0);
    let defects = json["defects"].as_array().unwrap();
    assert_eq!(defects.len(), 2);
    assert!(defects[0]["id"].as_i64().unwrap() > 0);
    assert_eq!(defects[0]["defectCode"], "S01");

    assert_eq!(count_rows(&pool, "audits").await, 1);
    assert_eq!(count_rows(&pool, "defects").await, 2);

    let created_by: (String,) = sqlx::query_as("SELECT created_by FROM audits")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(created_by.0, common::TEST_USER);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_inspected_quantity_is_rejected_without_storage(pool: PgPool) {
    let mut payload = audit_payload("P1", "PO-1");
    payload.as_object_mut().unwrap().remove("inspectedQuantity");

    let response = post_json(build_test_app(pool.clone()), "/api/v1/audits", &payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "MISSING_FIELD");
    assert!(json["error"].as_str().unwrap().contains("inspectedQuantity"));

    assert_eq!(count_rows(&pool, "audits").await, 0);
    assert_eq!(count_rows(&pool, "users").await, 0);
}

/// A pool that refuses every acquire: any query issued through it surfaces
/// as `503 STORAGE_ERROR`.
async fn closed_pool() -> PgPool {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://fca@localhost/fca")
        .unwrap();
    pool.close().await;
    pool
}

#[tokio::test]
async fn test_invalid_submission_issues_no_query() {
    let pool = closed_pool().await;

    let mut payload = audit_payload("P1", "PO-1");
    payload.as_object_mut().unwrap().remove("inspectedQuantity");
    let response = post_json(build_test_app(pool.clone()), "/api/v1/audits", &payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "MISSING_FIELD");

    // The same pool fails a valid submission, so the 400 above was
    // produced before any storage call.
    let response = post_json(
        build_test_app(pool),
        "/api/v1/audits",
        &audit_payload("P1", "PO-1"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "STORAGE_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bad_defect_entry_rejects_whole_submission(pool: PgPool) {
    let mut payload = audit_payload("P1", "PO-1");
    payload["defectDetails"][1]["quantity"] = serde_json::json!(0);

    let response = post_json(build_test_app(pool.clone()), "/api/v1/audits", &payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_DEFECT_ENTRY");

    assert_eq!(count_rows(&pool, "audits").await, 0);
    assert_eq!(count_rows(&pool, "defects").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_identity_and_created_by_is_rejected(pool: PgPool) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/audits")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&audit_payload("P1", "PO-1")).unwrap()))
        .unwrap();
    let response = send(build_test_app(pool.clone()), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "MISSING_FIELD");
    assert!(json["error"].as_str().unwrap().contains("createdBy"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_json_is_a_bad_request(pool: PgPool) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/audits")
        .header("content-type", "application/json")
        .body(Body::from("{\"plant\": "))
        .unwrap();
    let response = send(build_test_app(pool), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: GET /api/v1/audits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_paginates_and_nests_defects(pool: PgPool) {
    let mut ids = Vec::new();
    for i in 0..25 {
        ids.push(create(&pool, &audit_payload("P1", &format!("PO-{i}"))).await);
    }

    let response = get(build_test_app(pool.clone()), "/api/v1/audits?page=1&limit=10").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total"], 25);
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 10);
    assert_eq!(data[0]["id"].as_i64().unwrap(), *ids.iter().max().unwrap());
    assert_eq!(data[0]["defects"].as_array().unwrap().len(), 2);
    assert_eq!(data[0]["defects"][0]["defectCode"], "S01");
    assert_eq!(data[0]["type"], "Inline");

    let response = get(build_test_app(pool), "/api/v1/audits?page=3&limit=10").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_plant_po_and_status(pool: PgPool) {
    create(&pool, &audit_payload("P1", "PO-ALPHA")).await;
    create(&pool, &audit_payload("P2", "PO-BETA")).await;
    let mut passing = audit_payload("P1", "PO-GAMMA");
    passing["status"] = serde_json::json!("Pass");
    create(&pool, &passing).await;

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/audits?plant=P1").await).await;
    assert_eq!(json["total"], 2);

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/audits?po=BET").await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["purchaseOrder"], "PO-BETA");

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/audits?status=pass").await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["purchaseOrder"], "PO-GAMMA");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_rejects_bad_paging_and_status(pool: PgPool) {
    let response = get(build_test_app(pool.clone()), "/api/v1/audits?page=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_VALUE");

    let response = get(build_test_app(pool.clone()), "/api/v1/audits?status=Maybe").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(build_test_app(pool), "/api/v1/audits?date=yesterday").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: GET / PUT / DELETE /api/v1/audits/{id}
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_replaces_defects(pool: PgPool) {
    let id = create(&pool, &audit_payload("P1", "PO-1")).await;

    let mut revised = audit_payload("P1", "PO-1");
    revised["defectQuantity"] = serde_json::json!(4);
    revised["defectRate"] = serde_json::json!(4.0);
    revised["defectDetails"] = serde_json::json!([
        { "defectCategory": "Measurement", "defectCode": "M07", "quantity": 4 }
    ]);

    let uri = format!("/api/v1/audits/{id}");
    let response = put_json(build_test_app(pool.clone()), &uri, &revised).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["message"].is_string());

    let json = body_json(get(build_test_app(pool.clone()), &uri).await).await;
    assert_eq!(json["defectQuantity"], 4);
    let defects = json["defects"].as_array().unwrap();
    assert_eq!(defects.len(), 1);
    assert_eq!(defects[0]["defectCode"], "M07");
    assert_eq!(count_rows(&pool, "defects").await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_unknown_audit_returns_404(pool: PgPool) {
    let response = put_json(
        build_test_app(pool.clone()),
        "/api/v1/audits/999",
        &audit_payload("P1", "PO-1"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    assert_eq!(count_rows(&pool, "audits").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_then_get_returns_404(pool: PgPool) {
    let id = create(&pool, &audit_payload("P1", "PO-1")).await;
    let uri = format!("/api/v1/audits/{id}");

    let response = delete(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["message"].is_string());

    assert_eq!(get(build_test_app(pool.clone()), &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete(build_test_app(pool.clone()), &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(count_rows(&pool, "defects").await, 0);
}

// ---------------------------------------------------------------------------
// Test: GET /api/v1/audits/{id}/report
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failure_report_summarizes_defects(pool: PgPool) {
    let id = create(&pool, &audit_payload("P1", "PO-1")).await;

    let response = get(build_test_app(pool.clone()), &format!("/api/v1/audits/{id}/report")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], id);
    assert_eq!(json["defectEntries"].as_array().unwrap().len(), 2);
    assert!(json["defectEntries"][0]["photos"].as_array().unwrap().is_empty());
    assert_eq!(json["summary"]["totalDefects"], 3);
    assert_eq!(json["summary"]["categorySummary"]["Sewing"], 2);
    assert_eq!(json["summary"]["categorySummary"]["Fabric"], 1);
    assert_eq!(json["summary"]["totalPhotos"], 0);

    let missing = get(build_test_app(pool), "/api/v1/audits/424242/report").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
