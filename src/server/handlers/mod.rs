//! HTTP handlers for the server.

pub mod library;
pub mod submit;
pub mod template;

use axum::http::StatusCode;
use serde::Serialize;

use crate::builder::Notification;
use crate::element::Element;
use crate::error::TapecraftError;
use crate::property::PanelRow;
use crate::template::{LabelSettings, Template};

use super::state::SharedBuilder;

/// Status code for a failed operation.
pub(super) fn status_for(err: &TapecraftError) -> StatusCode {
    match err {
        TapecraftError::Validation(msg) if msg.ends_with("already in progress") => {
            StatusCode::CONFLICT
        }
        TapecraftError::Validation(_) | TapecraftError::EmptyTemplate => StatusCode::BAD_REQUEST,
        TapecraftError::Format(_) | TapecraftError::Json(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TapecraftError::Transport(_) => StatusCode::BAD_GATEWAY,
        TapecraftError::Raster(_) | TapecraftError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(super) fn error_response(err: &TapecraftError) -> (StatusCode, String) {
    (status_for(err), err.to_string())
}

/// What the UI needs after any change.
#[derive(Debug, Serialize)]
pub(super) struct BuilderView<'a> {
    pub ok: bool,
    pub elements: &'a [Element],
    #[serde(rename = "selectedElementId")]
    pub selected: Option<&'a str>,
    pub settings: LabelSettings,
    /// Element type whose property group is shown, if any.
    pub panel: Option<&'static str>,
    pub properties: Vec<PanelRow>,
    pub preview_open: bool,
    pub notifications: Vec<Notification>,
}

/// Snapshot the builder and hand its queued notifications to the caller.
pub(super) fn view(builder: &mut SharedBuilder, ok: bool) -> BuilderView<'_> {
    let notifications = builder.drain_notifications();
    let properties = builder.panel_rows();
    let preview_open = builder.overlay().is_open();
    let template: &Template = builder.template();
    BuilderView {
        ok,
        elements: template.elements(),
        selected: template.selected_id().map(|id| id.as_str()),
        settings: template.settings(),
        panel: template.selected().map(|e| e.element_type().name()),
        properties,
        preview_open,
        notifications,
    }
}
