//! Template editing handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::element::{ElementTypeMeta, element_kinds};
use crate::error::TapecraftError;
use crate::render::raster;
use crate::template::starter;

use super::super::state::AppState;
use super::{error_response, view};

/// Handle GET /api/element-types - palette entries.
pub async fn element_types() -> Json<Vec<ElementTypeMeta>> {
    Json(element_kinds())
}

#[derive(Debug, Serialize)]
pub struct StarterInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub elements: usize,
}

/// Handle GET /api/starters - built-in starter layouts.
pub async fn starters() -> Json<Vec<StarterInfo>> {
    Json(
        starter::all()
            .into_iter()
            .map(|s| StarterInfo {
                name: s.name,
                description: s.description,
                elements: s.elements.len(),
            })
            .collect(),
    )
}

/// Handle GET /api/template - current builder view.
pub async fn show(State(state): State<Arc<AppState>>) -> Response {
    let mut builder = state.builder.lock().await;
    Json(view(&mut builder, true)).into_response()
}

/// Handle GET /api/template/scene - the rendered scene.
pub async fn scene(State(state): State<Arc<AppState>>) -> Response {
    let builder = state.builder.lock().await;
    Json(builder.scene()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct PngQuery {
    pub scale: Option<u32>,
}

/// Handle GET /api/template/png - offline PNG of the scene.
pub async fn png(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PngQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let scene = state.builder.lock().await.scene().clone();
    let scale = query.scale.unwrap_or(raster::DEFAULT_SCALE);
    let png_bytes = tokio::task::spawn_blocking(move || raster::to_png_scaled(&scene, scale))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task error: {}", e)))?
        .map_err(|e| error_response(&TapecraftError::from(e)))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}

/// Handle POST /api/actions/:name - run a builder action.
///
/// The body is the action's argument object; it may be omitted for actions
/// without arguments. Failures answer 400 with the same view, carrying the
/// error as a notification.
pub async fn action(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> Response {
    let args = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let mut builder = state.builder.lock().await;
    let ok = builder.dispatch_named(&name, &args);
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(view(&mut builder, ok))).into_response()
}
