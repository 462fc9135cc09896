//! Router-level tests against the in-memory storage backend.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tos_upload_api::{AppState, create_router};
use tos_upload_core::storage::{StorageConfig, StorageProvider, StorageService};
use tos_upload_shared::AppConfig;

const API_KEY: &str = "test-key";
const BOUNDARY: &str = "XyZ-boundary";

const JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00,
];
const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H',
];

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.api_key = API_KEY.to_string();
    config
}

fn test_state(max_file_size_mb: u64) -> AppState {
    let mut config = test_config();
    config.upload.max_file_size_mb = max_file_size_mb;

    let storage = StorageService::from_config(StorageConfig::new(
        StorageProvider::Memory,
        "cdn.example.com",
    ))
    .expect("memory storage should build");

    AppState::new(config, storage)
}

/// Filesystem storage rooted at a regular file: it builds, but every
/// connectivity check fails.
fn unreachable_storage_state() -> (AppState, std::path::PathBuf) {
    let root = std::env::temp_dir().join(format!("tos-upload-not-a-dir-{}", std::process::id()));
    std::fs::write(&root, b"occupied").expect("scratch file");

    let storage = StorageService::from_config(
        StorageConfig::new(StorageProvider::local_fs(&root), "cdn.example.com")
            .with_max_retries(0),
    )
    .expect("fs storage should build over an existing path");

    (AppState::new(test_config(), storage), root)
}

fn app(state: &AppState) -> Router {
    create_router(state.clone())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-API-Key", API_KEY)
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content_type, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match content_type {
            Some(ct) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"upload\"\r\nContent-Type: {ct}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    Request::post("/api/v1/upload/image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("X-API-Key", API_KEY)
        .body(Body::from(multipart_body(parts)))
        .expect("request")
}

// ============================================================================
// Public routes
// ============================================================================

#[tokio::test]
async fn test_root_reports_service_info() {
    let state = test_state(10);
    let (status, body) = send(app(&state), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "TOS Upload Service");
    assert_eq!(body["port"], 10086);
    assert_eq!(body["health"], "/api/v1/health");
    // Only routes that exist are advertised
    assert!(body.get("docs").is_none());
}

#[tokio::test]
async fn test_health_endpoints() {
    let state = test_state(10);

    let (status, body) = send(app(&state), get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tos_connection"], "ok");
    assert!(body["timestamp"].is_string());

    let (_, body) = send(app(&state), get("/api/v1/health/live")).await;
    assert_eq!(body, json!({ "status": "alive" }));

    let (status, body) = send(app(&state), get("/api/v1/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ready" }));
}

#[tokio::test]
async fn test_health_reports_unreachable_storage() {
    let (state, root) = unreachable_storage_state();

    let (status, body) = send(app(&state), get("/api/v1/health/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body,
        json!({ "status": "not_ready", "reason": "TOS connection failed" })
    );

    // The service itself stays up while storage is down
    let (status, body) = send(app(&state), get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tos_connection"], "error");

    let (status, _) = send(app(&state), get("/api/v1/health/live")).await;
    assert_eq!(status, StatusCode::OK);

    let _ = std::fs::remove_file(root);
}

#[tokio::test]
async fn test_slow_request_times_out_with_envelope() {
    let mut config = test_config();
    config.server.request_timeout_secs = 1;
    let storage = StorageService::from_config(StorageConfig::new(
        StorageProvider::Memory,
        "cdn.example.com",
    ))
    .expect("memory storage should build");
    let state = AppState::new(config, storage);

    let stalled = futures::stream::once(async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok::<_, std::io::Error>(Bytes::from_static(b"{}"))
    });
    let request = Request::post("/api/v1/upload/base64")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-API-Key", API_KEY)
        .body(Body::from_stream(stalled))
        .expect("request");

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 50002);
    assert_eq!(body["message"], "Request timed out after 1s");
    assert!(body["data"].is_null());
}

#[test]
fn test_shutdown_releases_storage() {
    assert!(test_state(10).shutdown());

    let state = test_state(10);
    let router = app(&state);
    assert!(!state.shutdown());
    drop(router);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_missing_api_key() {
    let state = test_state(10);
    let request = Request::post("/api/v1/upload/base64")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "image_base64": "" }).to_string()))
        .expect("request");

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 40101);
}

#[tokio::test]
async fn test_invalid_api_key() {
    let state = test_state(10);
    let request = Request::post("/api/v1/upload/base64")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-API-Key", "wrong")
        .body(Body::from(json!({ "image_base64": "" }).to_string()))
        .expect("request");

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 40102);
}

// ============================================================================
// Base64 upload
// ============================================================================

#[tokio::test]
async fn test_base64_upload_round_trip() {
    let state = test_state(10);
    let request = post_json(
        "/api/v1/upload/base64",
        &json!({ "image_base64": STANDARD.encode(PNG), "format": "jpeg", "prefix": "avatars/" }),
    );

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["code"], 0);

    let data = &body["data"];
    assert_eq!(data["content_type"], "image/png");
    assert_eq!(data["size_bytes"], PNG.len());

    let key = data["object_key"].as_str().expect("object key");
    assert!(key.starts_with("avatars/") && key.ends_with(".png"));
    assert_eq!(data["public_url"], format!("https://cdn.example.com/{key}"));

    let stored = state.storage.read(key).await.expect("object stored");
    assert_eq!(stored.as_ref(), PNG);
}

#[tokio::test]
async fn test_base64_decode_failure() {
    let state = test_state(10);
    let request = post_json("/api/v1/upload/base64", &json!({ "image_base64": "@@@@" }));

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40003);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_base64_unrecognized_content() {
    let state = test_state(10);
    let request = post_json(
        "/api/v1/upload/base64",
        &json!({ "image_base64": STANDARD.encode(b"GIF89a....") }),
    );

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40001);
}

#[tokio::test]
async fn test_base64_over_limit_within_body_limit() {
    let state = test_state(1);
    let mut data = JPEG.to_vec();
    data.resize(1024 * 1024 + 10, 0);
    let request = post_json(
        "/api/v1/upload/base64",
        &json!({ "image_base64": STANDARD.encode(&data) }),
    );

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40002);
    assert_eq!(body["message"], "File size exceeds maximum limit of 1MB");
}

#[tokio::test]
async fn test_body_over_transport_limit() {
    let state = test_state(1);
    let data = vec![0u8; 3 * 1024 * 1024];
    let request = post_json(
        "/api/v1/upload/base64",
        &json!({ "image_base64": STANDARD.encode(&data) }),
    );

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40002);
}

#[tokio::test]
async fn test_malformed_json_and_quality() {
    let state = test_state(10);

    let (status, body) = send(
        app(&state),
        post_json("/api/v1/upload/base64", &json!({ "prefix": "x/" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40000);

    let (_, body) = send(
        app(&state),
        post_json(
            "/api/v1/upload/base64",
            &json!({ "image_base64": STANDARD.encode(JPEG), "quality": 0 }),
        ),
    )
    .await;
    assert_eq!(body["code"], 40000);
}

// ============================================================================
// Multipart upload
// ============================================================================

#[tokio::test]
async fn test_multipart_upload() {
    let state = test_state(10);
    let request = post_multipart(&[
        ("file", Some("image/jpeg"), JPEG),
        ("prefix", None, b"uploads/"),
        ("quality", None, b"80"),
    ]);

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content_type"], "image/jpeg");
    assert_eq!(body["data"]["size_bytes"], JPEG.len());
    let key = body["data"]["object_key"].as_str().expect("object key");
    assert!(key.starts_with("uploads/") && key.ends_with(".jpg"));
}

#[tokio::test]
async fn test_multipart_octet_stream_is_sniffed() {
    let state = test_state(10);
    let request = post_multipart(&[("file", Some("application/octet-stream"), PNG)]);

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content_type"], "image/png");
}

#[tokio::test]
async fn test_multipart_rejects_declared_non_image() {
    let state = test_state(10);
    let request = post_multipart(&[("file", Some("text/plain"), JPEG)]);

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40001);
}

#[tokio::test]
async fn test_multipart_requires_file() {
    let state = test_state(10);
    let request = post_multipart(&[("prefix", None, b"uploads/")]);

    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40000);
}

// ============================================================================
// Batch upload
// ============================================================================

#[tokio::test]
async fn test_batch_reports_items_in_order() {
    let state = test_state(10);
    let items = json!([
        { "image_base64": STANDARD.encode(JPEG) },
        { "image_base64": "not base64!" },
        { "image_base64": STANDARD.encode(PNG) },
    ]);

    let (status, body) = send(app(&state), post_json("/api/v1/upload/batch", &items)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Uploaded 2 of 3 images");

    let data = body["data"].as_array().expect("item envelopes");
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["data"]["content_type"], "image/jpeg");
    assert_eq!(data[1]["success"], false);
    assert_eq!(data[1]["code"], 40003);
    assert!(data[1]["data"].is_null());
    assert_eq!(data[2]["data"]["content_type"], "image/png");
}

#[tokio::test]
async fn test_batch_bad_hints_fail_only_their_item() {
    let state = test_state(10);
    let items = json!([
        { "image_base64": STANDARD.encode(JPEG) },
        { "image_base64": STANDARD.encode(PNG), "format": "gif" },
        { "image_base64": STANDARD.encode(PNG), "quality": 300 },
    ]);

    let (status, body) = send(app(&state), post_json("/api/v1/upload/batch", &items)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Uploaded 1 of 3 images");

    let data = body["data"].as_array().expect("item envelopes");
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["success"], true);
    assert_eq!(data[0]["data"]["content_type"], "image/jpeg");
    assert_eq!(data[1]["success"], false);
    assert_eq!(data[1]["code"], 40001);
    assert_eq!(data[2]["success"], false);
    assert_eq!(data[2]["code"], 40000);
}

#[tokio::test]
async fn test_batch_too_large() {
    let state = test_state(10);
    let item = json!({ "image_base64": STANDARD.encode(JPEG) });
    let items = Value::Array(vec![item; 11]);

    let (status, body) = send(app(&state), post_json("/api/v1/upload/batch", &items)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40001);
    assert_eq!(body["message"], "Maximum 10 images per batch upload");
}

#[tokio::test]
async fn test_empty_batch() {
    let state = test_state(10);
    let (status, body) = send(app(&state), post_json("/api/v1/upload/batch", &json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 40001);
}
