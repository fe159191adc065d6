//! Print service handlers: preview, print, status.
//!
//! Each request snapshots the payload under the builder lock, releases it,
//! talks to the service, then re-locks only to record the outcome.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use crate::submit::PrinterState;

use super::super::state::AppState;
use super::error_response;

/// Handle POST /api/preview - preview via the print service.
pub async fn preview(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let payload = state.builder.lock().await.payload();
    let result = state.submitter.preview(&payload).await;

    let mut builder = state.builder.lock().await;
    builder.finish_preview(result).map_err(|e| error_response(&e))?;
    let image = builder
        .overlay()
        .image()
        .cloned()
        .ok_or_else(|| (StatusCode::INTERNAL_SERVER_ERROR, "Preview was dismissed".to_string()))?;

    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes))
}

/// Handle GET /api/preview/image - image held by the open preview overlay.
pub async fn preview_image(State(state): State<Arc<AppState>>) -> Response {
    let builder = state.builder.lock().await;
    match builder.overlay().image() {
        Some(image) => (
            [(header::CONTENT_TYPE, image.content_type.clone())],
            image.bytes.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "No preview open".to_string()).into_response(),
    }
}

/// Handle POST /api/print - print via the print service.
pub async fn print(State(state): State<Arc<AppState>>) -> Response {
    let payload = state.builder.lock().await.payload();
    let result = state.submitter.print(&payload).await;

    let mut builder = state.builder.lock().await;
    match builder.finish_print(result) {
        Ok(confirmation) => Json(confirmation).into_response(),
        Err(e) => (
            super::status_for(&e),
            Json(serde_json::json!({ "success": false, "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub summary: String,
    pub ready: bool,
    #[serde(flatten)]
    pub state: PrinterState,
}

/// Handle GET /api/status - last polled printer state. Never blocks on the service.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusView> {
    let printer = state.status.state().await;
    Json(StatusView {
        summary: printer.summary(),
        ready: printer.is_ready(),
        state: printer,
    })
}
