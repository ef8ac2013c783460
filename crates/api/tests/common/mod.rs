#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fca_api::config::ServerConfig;
use fca_api::notifications::{DisabledMailer, MailError, Mailer, OutgoingMessage};
use fca_api::router::build_app_router;
use fca_api::state::AppState;

/// Caller identity sent by the request helpers.
pub const TEST_USER: &str = "qa@example.com";

/// Build a test `ServerConfig` with safe defaults and a small photo cap.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        photo_max_bytes: 1024,
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// with mail delivery disabled.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_mailer(pool, Arc::new(DisabledMailer))
}

pub fn build_test_app_with_mailer(pool: PgPool, mailer: Arc<dyn Mailer>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mailer,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn with_json(
    app: Router,
    method: Method,
    uri: &str,
    body: &serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-email", TEST_USER)
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    with_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    with_json(app, Method::PUT, uri, body).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a single-file multipart form.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    field: &str,
    file_name: &str,
    mime_type: &str,
    bytes: &[u8],
) -> Response<Body> {
    const BOUNDARY: &str = "fca-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {mime_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A complete, valid audit payload with two defects. `createdBy` is left to
/// the identity header.
pub fn audit_payload(plant: &str, po: &str) -> serde_json::Value {
    serde_json::json!({
        "plant": plant,
        "module": "M1",
        "shift": "A",
        "purchaseOrder": po,
        "size": "M",
        "customer": "Acme",
        "style": "ST-1",
        "colorCode": "BLK",
        "colorDescription": "Black",
        "inspectedQuantity": 100,
        "defectQuantity": 3,
        "status": "Fail",
        "defectRate": 3.0,
        "remarks": "Loose threads <b>near</b> collar",
        "type": "Inline",
        "defectDetails": [
            { "defectCategory": "Sewing", "defectCode": "S01", "quantity": 2,
              "locationCategory": "Front", "defectLocation": "Collar" },
            { "defectCategory": "Fabric", "defectCode": "F03", "quantity": 1 }
        ]
    })
}

pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

// ---------------------------------------------------------------------------
// Mailer double
// ---------------------------------------------------------------------------

/// Records every message and fails sends to addresses in `reject`.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMessage>>,
    pub reject: Vec<String>,
}

impl RecordingMailer {
    pub fn rejecting(reject: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: reject.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: OutgoingMessage) -> Result<(), MailError> {
        if self.reject.contains(&message.to) {
            return Err(MailError::Transport("550 mailbox unavailable".into()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}
