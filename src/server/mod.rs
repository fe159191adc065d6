//! # HTTP Server for the Label Builder
//!
//! Exposes the builder over a JSON API so any front end can drive it.
//!
//! ## Usage
//!
//! ```bash
//! tapecraft serve --listen 0.0.0.0:8080 --service-url http://printer-host:8000
//! ```
//!
//! ## Routes
//!
//! | Method | Path                    | Purpose                                  |
//! |--------|-------------------------|------------------------------------------|
//! | GET    | `/api/element-types`    | Palette: kinds and labels                |
//! | GET    | `/api/template`         | Template, panel, notifications           |
//! | GET    | `/api/template/scene`   | Rendered scene                           |
//! | GET    | `/api/template/png`     | Offline PNG preview                      |
//! | POST   | `/api/actions/:name`    | Run a builder action                     |
//! | GET    | `/api/starters`         | Built-in starter layouts                 |
//! | GET    | `/api/library`          | Saved templates                          |
//! | GET    | `/api/export`           | Download the live template               |
//! | POST   | `/api/import`           | Replace the live template from a document|
//! | POST   | `/api/preview`          | Service preview (image)                  |
//! | GET    | `/api/preview/image`    | Image held by the preview overlay        |
//! | POST   | `/api/print`            | Print via the service                    |
//! | GET    | `/api/status`           | Last polled printer state                |

mod handlers;
mod state;

pub use state::{AppState, SharedBuilder};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{Result, TapecraftError};

/// Build the API router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Template
        .route("/api/element-types", get(handlers::template::element_types))
        .route("/api/template", get(handlers::template::show))
        .route("/api/template/scene", get(handlers::template::scene))
        .route("/api/template/png", get(handlers::template::png))
        .route("/api/actions/:name", post(handlers::template::action))
        .route("/api/starters", get(handlers::template::starters))
        // Library
        .route("/api/library", get(handlers::library::list))
        .route("/api/export", get(handlers::library::export))
        .route("/api/import", post(handlers::library::import))
        // Print service
        .route("/api/preview", post(handlers::submit::preview))
        .route("/api/preview/image", get(handlers::submit::preview_image))
        .route("/api/print", post(handlers::submit::print))
        .route("/api/status", get(handlers::submit::status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use tapecraft::config::ServerConfig;
/// use tapecraft::server::serve;
///
/// # async fn example() -> Result<(), tapecraft::TapecraftError> {
/// serve(ServerConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<()> {
    let app_state = Arc::new(AppState::new(config.clone())?);

    let poller = app_state
        .status
        .spawn(app_state.submitter.service(), config.poll_interval);

    let app = router(app_state);

    tracing::info!(
        listen = %config.listen_addr,
        service = %config.service.service_url,
        library = %config.service.library.display(),
        "tapecraft server starting"
    );

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            TapecraftError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    let result = axum::serve(listener, app)
        .await
        .map_err(|e| TapecraftError::Transport(format!("Server error: {}", e)));
    poller.abort();
    result
}
