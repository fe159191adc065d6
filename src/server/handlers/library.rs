//! Saved-template library and document handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::builder::Action;
use crate::library::export_file_name;

use super::super::state::AppState;
use super::{error_response, view};

/// Handle GET /api/library - saved templates in insertion order.
pub async fn list(State(state): State<Arc<AppState>>) -> Response {
    let builder = state.builder.lock().await;
    Json(builder.library().entries()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub name: Option<String>,
}

/// Handle GET /api/export - the live template as a downloadable document.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let doc = state.builder.lock().await.export(query.name.as_deref());
    let body = doc.to_json_pretty().map_err(|e| error_response(&e))?;
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(&doc.name));
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Handle POST /api/import - replace the live template from a document.
///
/// A malformed document leaves the template untouched and answers 422.
pub async fn import(State(state): State<Arc<AppState>>, body: String) -> Response {
    let mut builder = state.builder.lock().await;
    let value = match serde_json::from_str::<Value>(&body) {
        Ok(value) => value,
        // A string body that is not JSON still goes through the import path so
        // the failure is reported the same way.
        Err(_) => Value::String(body),
    };
    let ok = builder.dispatch(Action::Import(value));
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(view(&mut builder, ok))).into_response()
}
