//! HTTP client for the label print service.
//!
//! | Call      | Request                         | Success                    |
//! |-----------|---------------------------------|----------------------------|
//! | preview   | `POST {base}/preview-custom`    | 200, image body            |
//! | print     | `POST {base}/print-custom`      | 200, `{success, message}`  |
//! | status    | `GET {base}/status`             | 200, `PrinterStatus` JSON  |
//!
//! Anything other than a 2xx response is a [`TapecraftError::Transport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::status::PrinterStatus;
use super::{Payload, PreviewImage, PrintConfirmation};
use crate::error::{Result, TapecraftError};

/// Content type assumed when a preview response does not name one.
pub const DEFAULT_PREVIEW_CONTENT_TYPE: &str = "image/png";

/// Reported when the service declines a print without saying why.
pub const DEFAULT_REJECTION_MESSAGE: &str = "printer rejected the label";

/// The external service that previews and prints labels.
#[async_trait]
pub trait LabelService: Send + Sync {
    async fn preview(&self, payload: &Payload) -> Result<PreviewImage>;

    async fn print(&self, payload: &Payload) -> Result<PrintConfirmation>;

    async fn status(&self) -> Result<PrinterStatus>;
}

/// [`LabelService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLabelService {
    http_client: Client,
    base_url: String,
}

impl HttpLabelService {
    /// Create a client for the service at `base_url`.
    ///
    /// `timeout` of `None` keeps reqwest's default (no overall timeout).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(TapecraftError::Validation(
                "print service URL must not be empty".into(),
            ));
        }

        let mut builder = Client::builder().user_agent(concat!("tapecraft/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| TapecraftError::Transport(format!("HTTP client error: {}", e)))?;

        tracing::debug!(base_url = %base_url, ?timeout, "label service client initialized");
        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post(&self, path: &str, payload: &Payload) -> Result<reqwest::Response> {
        let url = self.url(path);
        tracing::debug!(url = %url, elements = payload.elements.len(), "sending label");
        let response = self
            .http_client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| TapecraftError::Transport(format!("{} failed: {}", path, e)))?;
        ensure_success(response).await
    }
}

#[async_trait]
impl LabelService for HttpLabelService {
    async fn preview(&self, payload: &Payload) -> Result<PreviewImage> {
        let response = self.post("preview-custom", payload).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_PREVIEW_CONTENT_TYPE)
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TapecraftError::Transport(format!("preview body: {}", e)))?;
        Ok(PreviewImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    async fn print(&self, payload: &Payload) -> Result<PrintConfirmation> {
        let response = self.post("print-custom", payload).await?;
        let body = response
            .text()
            .await
            .map_err(|e| TapecraftError::Transport(format!("print body: {}", e)))?;
        let confirmation = parse_confirmation(&body);
        if !confirmation.success {
            return Err(TapecraftError::Transport(rejection_text(&confirmation)));
        }
        Ok(confirmation)
    }

    async fn status(&self) -> Result<PrinterStatus> {
        let response = self
            .http_client
            .get(self.url("status"))
            .send()
            .await
            .map_err(|e| TapecraftError::Transport(format!("status failed: {}", e)))?;
        let response = ensure_success(response).await?;
        response
            .json::<PrinterStatus>()
            .await
            .map_err(|e| TapecraftError::Transport(format!("status body: {}", e)))
    }
}

/// Pass `200 OK` through; turn anything else, other 2xx included, into a
/// transport error carrying the best human-readable text available.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status == reqwest::StatusCode::OK {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let text = failure_text(status.as_u16(), status.canonical_reason(), &body);
    tracing::warn!(status = status.as_u16(), error = %text, "label service rejected request");
    Err(TapecraftError::Transport(text))
}

/// Failure text for a non-success response: the JSON body's `detail`,
/// `message` or `error` field, else the raw body, else the status line.
pub fn failure_text(status: u16, reason: Option<&str>, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error"] {
            match map.get(key) {
                Some(Value::String(s)) if !s.trim().is_empty() => return s.clone(),
                Some(v @ (Value::Array(_) | Value::Object(_))) => return v.to_string(),
                _ => {}
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    match reason {
        Some(reason) => format!("HTTP {} {}", status, reason),
        None => format!("HTTP {}", status),
    }
}

/// Message for a `success: false` confirmation; never empty.
fn rejection_text(confirmation: &PrintConfirmation) -> String {
    let message = confirmation.message.trim();
    if message.is_empty() {
        DEFAULT_REJECTION_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

/// Interpret a `200 OK` print body. A non-JSON body still counts as success.
fn parse_confirmation(body: &str) -> PrintConfirmation {
    match serde_json::from_str::<PrintConfirmation>(body) {
        Ok(confirmation) => confirmation,
        Err(_) => PrintConfirmation {
            success: true,
            message: if body.trim().is_empty() {
                "Label sent to printer".to_string()
            } else {
                body.trim().to_string()
            },
            filename: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_text_prefers_detail() {
        let body = r#"{"detail": "Printer not ready", "message": "ignored"}"#;
        assert_eq!(failure_text(503, Some("Service Unavailable"), body), "Printer not ready");
    }

    #[test]
    fn test_failure_text_falls_back() {
        assert_eq!(failure_text(500, None, r#"{"error": "boom"}"#), "boom");
        assert_eq!(failure_text(500, None, "  plain text  "), "plain text");
        assert_eq!(
            failure_text(502, Some("Bad Gateway"), ""),
            "HTTP 502 Bad Gateway"
        );
        assert_eq!(failure_text(599, None, ""), "HTTP 599");
    }

    #[test]
    fn test_failure_text_structured_detail() {
        let body = r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#;
        assert!(failure_text(422, None, body).contains("field required"));
    }

    #[test]
    fn test_parse_confirmation() {
        let ok = parse_confirmation(r#"{"success": true, "message": "Printed", "filename": "label_1.png"}"#);
        assert!(ok.success);
        assert_eq!(ok.filename.as_deref(), Some("label_1.png"));

        let plain = parse_confirmation("done");
        assert!(plain.success);
        assert_eq!(plain.message, "done");
    }

    #[test]
    fn test_rejection_text_never_empty() {
        let bare = parse_confirmation(r#"{"success": false}"#);
        assert!(!bare.success);
        assert_eq!(rejection_text(&bare), DEFAULT_REJECTION_MESSAGE);

        let blank = parse_confirmation(r#"{"success": false, "message": "  "}"#);
        assert_eq!(rejection_text(&blank), DEFAULT_REJECTION_MESSAGE);

        let told = parse_confirmation(r#"{"success": false, "message": "Tape jam"}"#);
        assert_eq!(rejection_text(&told), "Tape jam");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(HttpLabelService::new("  ", None).is_err());
        let svc = HttpLabelService::new("http://printer:8000/", None).unwrap();
        assert_eq!(svc.url("status"), "http://printer:8000/status");
    }
}
