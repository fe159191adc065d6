//! # Print Service Client
//!
//! Runs the HTTP client and submitter against a stub print service bound
//! to an ephemeral local port.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tapecraft::library::{MemoryStore, TemplateLibrary};
use tapecraft::submit::client::DEFAULT_REJECTION_MESSAGE;
use tapecraft::submit::{HttpLabelService, LabelService, Payload, Submitter};
use tapecraft::{Builder, TapecraftError, Template};
use tokio::sync::Mutex;

/// How the stub answers label requests.
#[derive(Clone, Copy)]
enum Mode {
    Ok,
    Fail,
    /// Preview answers `204 No Content`; print answers `{"success": false}`.
    Declined,
}

struct Stub {
    mode: Mode,
    calls: AtomicUsize,
    last_body: Mutex<Option<Value>>,
}

async fn preview_custom(State(stub): State<Arc<Stub>>, Json(body): Json<Value>) -> Response {
    stub.calls.fetch_add(1, Ordering::SeqCst);
    *stub.last_body.lock().await = Some(body);
    match stub.mode {
        Mode::Ok => ([(header::CONTENT_TYPE, "image/png")], vec![0x89u8, b'P', b'N', b'G']).into_response(),
        Mode::Fail => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Preview generation failed: printer offline"})),
        )
            .into_response(),
        Mode::Declined => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn print_custom(State(stub): State<Arc<Stub>>, Json(body): Json<Value>) -> Response {
    stub.calls.fetch_add(1, Ordering::SeqCst);
    *stub.last_body.lock().await = Some(body);
    match stub.mode {
        Mode::Ok => Json(json!({
            "success": true,
            "message": "Custom label printed successfully",
            "filename": "custom_label_20261016.png"
        }))
        .into_response(),
        Mode::Fail => (StatusCode::SERVICE_UNAVAILABLE, "").into_response(),
        Mode::Declined => Json(json!({"success": false})).into_response(),
    }
}

async fn status() -> Json<Value> {
    Json(json!({
        "printer_ready": true,
        "tape_width_mm": 12.0,
        "print_height_px": 76,
        "container_id": "abc123",
        "timestamp": "2026-10-16T09:30:00.123456"
    }))
}

/// Start a stub service; returns its base URL and shared state.
async fn spawn_stub(mode: Mode) -> (String, Arc<Stub>) {
    let stub = Arc::new(Stub {
        mode,
        calls: AtomicUsize::new(0),
        last_body: Mutex::new(None),
    });
    let app = Router::new()
        .route("/preview-custom", post(preview_custom))
        .route("/print-custom", post(print_custom))
        .route("/status", get(status))
        .with_state(Arc::clone(&stub));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/", addr), stub)
}

fn client(base_url: &str) -> Arc<HttpLabelService> {
    Arc::new(HttpLabelService::new(base_url, Some(Duration::from_secs(5))).unwrap())
}

fn device_payload() -> Payload {
    Payload::from_template(&Template::from_starter("device").unwrap())
}

#[tokio::test]
async fn preview_returns_image() {
    let (url, stub) = spawn_stub(Mode::Ok).await;
    let submitter = Submitter::new(client(&url));

    let image = submitter.preview(&device_payload()).await.unwrap();
    assert_eq!(image.content_type, "image/png");
    assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G']);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn payload_carries_elements_and_settings() {
    let (url, stub) = spawn_stub(Mode::Ok).await;
    let submitter = Submitter::new(client(&url));
    let payload = device_payload();

    submitter.print(&payload).await.unwrap();

    let body = stub.last_body.lock().await.clone().unwrap();
    assert_eq!(body["settings"], json!({"width": 200, "height": 62, "margin": 5}));
    assert_eq!(
        body["elements"].as_array().unwrap().len(),
        payload.elements.len()
    );
    assert_eq!(body["elements"][0]["type"], "text");
}

#[tokio::test]
async fn print_confirmation_is_parsed() {
    let (url, _stub) = spawn_stub(Mode::Ok).await;
    let confirmation = client(&url).print(&device_payload()).await.unwrap();
    assert!(confirmation.success);
    assert_eq!(confirmation.message, "Custom label printed successfully");
    assert_eq!(
        confirmation.filename.as_deref(),
        Some("custom_label_20261016.png")
    );
}

#[tokio::test]
async fn server_error_detail_becomes_transport_error() {
    let (url, _stub) = spawn_stub(Mode::Fail).await;
    let err = client(&url).preview(&device_payload()).await.unwrap_err();
    match err {
        TapecraftError::Transport(text) => {
            assert_eq!(text, "Preview generation failed: printer offline")
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status_line() {
    let (url, _stub) = spawn_stub(Mode::Fail).await;
    let err = client(&url).print(&device_payload()).await.unwrap_err();
    match err {
        TapecraftError::Transport(text) => assert_eq!(text, "HTTP 503 Service Unavailable"),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn preview_without_content_is_an_error() {
    let (url, _stub) = spawn_stub(Mode::Declined).await;
    let err = client(&url).preview(&device_payload()).await.unwrap_err();
    match err {
        TapecraftError::Transport(text) => assert_eq!(text, "HTTP 204 No Content"),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn declined_print_without_message_is_explained() {
    let (url, _stub) = spawn_stub(Mode::Declined).await;
    let err = client(&url).print(&device_payload()).await.unwrap_err();
    match err {
        TapecraftError::Transport(text) => assert_eq!(text, DEFAULT_REJECTION_MESSAGE),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_template_never_reaches_the_service() {
    let (url, stub) = spawn_stub(Mode::Ok).await;
    let submitter = Submitter::new(client(&url));
    let empty = Payload::from_template(&Template::new());

    let err = submitter.print(&empty).await.unwrap_err();
    assert!(matches!(err, TapecraftError::EmptyTemplate));
    let err = submitter.preview(&empty).await.unwrap_err();
    assert!(matches!(err, TapecraftError::EmptyTemplate));
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_preview_notifies_and_keeps_template() {
    let (url, _stub) = spawn_stub(Mode::Fail).await;
    let submitter = Submitter::new(client(&url));
    let mut builder = Builder::with_template(
        TemplateLibrary::open(MemoryStore::new()).unwrap(),
        Template::from_starter("cable").unwrap(),
    );
    let before = builder.template().elements().to_vec();

    let result = submitter.preview(&builder.payload()).await;
    assert!(builder.finish_preview(result).is_err());

    assert_eq!(builder.template().elements(), before.as_slice());
    assert!(!builder.overlay().is_open());
    let notes = builder.drain_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(
        notes[0].message,
        "Preview failed: Preview generation failed: printer offline"
    );
}

#[tokio::test]
async fn status_is_read() {
    let (url, _stub) = spawn_stub(Mode::Ok).await;
    let status = client(&url).status().await.unwrap();
    assert!(status.printer_ready);
    assert_eq!(status.tape_width_mm, 12.0);
    assert_eq!(status.print_height_px, Some(76));
    assert_eq!(status.container_id.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .status()
        .await
        .unwrap_err();
    assert!(matches!(err, TapecraftError::Transport(_)));
}
