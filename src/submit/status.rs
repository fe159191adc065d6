//! Printer status polling.
//!
//! The status endpoint is read-only and optional: when it is unreachable the
//! printer is shown as offline and editing carries on.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::client::LabelService;

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterStatus {
    pub printer_ready: bool,
    #[serde(default)]
    pub tape_width_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_height_px: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Last known printer state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PrinterState {
    /// No poll has finished yet.
    #[default]
    Unknown,
    /// The service answered.
    Online { status: PrinterStatus },
    /// The service could not be reached or answered with an error.
    Offline { reason: String },
}

impl PrinterState {
    /// Service reachable and printer reporting ready.
    pub fn is_ready(&self) -> bool {
        matches!(self, PrinterState::Online { status } if status.printer_ready)
    }

    /// Short label for a status indicator.
    pub fn summary(&self) -> String {
        match self {
            PrinterState::Unknown => "Checking printer...".to_string(),
            PrinterState::Online { status } if status.printer_ready => {
                format!("Printer ready ({} mm tape)", status.tape_width_mm)
            }
            PrinterState::Online { .. } => "Printer not ready".to_string(),
            PrinterState::Offline { .. } => "Printer service offline".to_string(),
        }
    }
}

/// Shared, periodically refreshed printer state.
#[derive(Debug, Clone, Default)]
pub struct StatusMonitor {
    state: Arc<RwLock<PrinterState>>,
}

impl StatusMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self) -> PrinterState {
        self.state.read().await.clone()
    }

    /// Query the service once and record the outcome.
    pub async fn poll_once(&self, service: &dyn LabelService) -> PrinterState {
        let next = match service.status().await {
            Ok(status) => PrinterState::Online { status },
            Err(e) => {
                tracing::debug!(error = %e, "printer status unavailable");
                PrinterState::Offline {
                    reason: e.to_string(),
                }
            }
        };

        let mut state = self.state.write().await;
        if std::mem::discriminant(&*state) != std::mem::discriminant(&next) {
            tracing::info!(status = %next.summary(), "printer state changed");
        }
        *state = next.clone();
        next
    }

    /// Poll every `period` in a background task until the handle is aborted.
    pub fn spawn(&self, service: Arc<dyn LabelService>, period: Duration) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period.max(Duration::from_secs(1)));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                monitor.poll_once(service.as_ref()).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TapecraftError};
    use crate::submit::{Payload, PreviewImage, PrintConfirmation};
    use async_trait::async_trait;

    struct FixedStatus(Option<PrinterStatus>);

    #[async_trait]
    impl LabelService for FixedStatus {
        async fn preview(&self, _: &Payload) -> Result<PreviewImage> {
            unreachable!()
        }
        async fn print(&self, _: &Payload) -> Result<PrintConfirmation> {
            unreachable!()
        }
        async fn status(&self) -> Result<PrinterStatus> {
            self.0
                .clone()
                .ok_or_else(|| TapecraftError::Transport("connection refused".into()))
        }
    }

    #[test]
    fn test_status_parses_service_shape() {
        let json = r#"{"printer_ready": true, "tape_width_mm": 12, "print_height_px": 70,
                       "container_id": "abc", "timestamp": "2024-05-01T12:00:00"}"#;
        let status: PrinterStatus = serde_json::from_str(json).unwrap();
        assert!(status.printer_ready);
        assert_eq!(status.tape_width_mm, 12.0);
        assert_eq!(status.print_height_px, Some(70));

        let json = r#"{"printer_ready": false, "tape_width_mm": 9}"#;
        let status: PrinterStatus = serde_json::from_str(json).unwrap();
        assert!(!status.printer_ready);
        assert_eq!(status.print_height_px, None);
    }

    #[tokio::test]
    async fn test_poll_records_state() {
        let monitor = StatusMonitor::new();
        assert_eq!(monitor.state().await, PrinterState::Unknown);

        let ready = PrinterStatus {
            printer_ready: true,
            tape_width_mm: 12.0,
            print_height_px: Some(70),
            container_id: None,
            timestamp: None,
        };
        monitor.poll_once(&FixedStatus(Some(ready))).await;
        assert!(monitor.state().await.is_ready());

        monitor.poll_once(&FixedStatus(None)).await;
        let state = monitor.state().await;
        assert!(!state.is_ready());
        assert_eq!(state.summary(), "Printer service offline");
    }
}
