//! # Print/Preview Submitter
//!
//! Sends the live template to the external print service.
//!
//! ```text
//! Template ──Payload::from_template──▶ Submitter ──LabelService──▶ preview-custom / print-custom
//!                                         │
//!                                         ├─ empty template: fails before any network call
//!                                         └─ one in-flight request per action
//! ```
//!
//! The submitter never touches the template. A payload is a snapshot, so a
//! slow or stuck request cannot corrupt editing state.

pub mod client;
pub mod status;

pub use client::{HttpLabelService, LabelService};
pub use status::{PrinterState, PrinterStatus, StatusMonitor};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{Result, TapecraftError};
use crate::template::{LabelSettings, Template};

/// Request body for `preview-custom` and `print-custom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub elements: Vec<Element>,
    pub settings: LabelSettings,
}

impl Payload {
    pub fn from_template(template: &Template) -> Self {
        Self {
            elements: template.elements().to_vec(),
            settings: template.settings(),
        }
    }
}

/// A rendered preview returned by the service.
#[derive(Clone, PartialEq)]
pub struct PreviewImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewImage")
            .field("content_type", &self.content_type)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// Print service confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintConfirmation {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// The two submit actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Preview,
    Print,
}

impl SubmitAction {
    pub fn name(self) -> &'static str {
        match self {
            SubmitAction::Preview => "preview",
            SubmitAction::Print => "print",
        }
    }
}

/// Marks an action busy for as long as it lives.
///
/// Dropping the guard (including when the request future is dropped
/// mid-flight) frees the action again.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, action: SubmitAction) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TapecraftError::Validation(format!(
                "{} already in progress",
                action.name()
            )));
        }
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Guards and dispatches preview/print requests.
pub struct Submitter {
    service: Arc<dyn LabelService>,
    preview_busy: AtomicBool,
    print_busy: AtomicBool,
}

impl Submitter {
    pub fn new(service: Arc<dyn LabelService>) -> Self {
        Self {
            service,
            preview_busy: AtomicBool::new(false),
            print_busy: AtomicBool::new(false),
        }
    }

    pub fn service(&self) -> Arc<dyn LabelService> {
        Arc::clone(&self.service)
    }

    pub fn is_busy(&self, action: SubmitAction) -> bool {
        self.flag(action).load(Ordering::Acquire)
    }

    fn flag(&self, action: SubmitAction) -> &AtomicBool {
        match action {
            SubmitAction::Preview => &self.preview_busy,
            SubmitAction::Print => &self.print_busy,
        }
    }

    fn begin(&self, action: SubmitAction, payload: &Payload) -> Result<InFlight<'_>> {
        if payload.elements.is_empty() {
            return Err(TapecraftError::EmptyTemplate);
        }
        InFlight::acquire(self.flag(action), action)
    }

    pub async fn preview(&self, payload: &Payload) -> Result<PreviewImage> {
        let _guard = self.begin(SubmitAction::Preview, payload)?;
        let image = self.service.preview(payload).await?;
        tracing::info!(
            content_type = %image.content_type,
            bytes = image.bytes.len(),
            "preview received"
        );
        Ok(image)
    }

    pub async fn print(&self, payload: &Payload) -> Result<PrintConfirmation> {
        let _guard = self.begin(SubmitAction::Print, payload)?;
        let confirmation = self.service.print(payload).await?;
        tracing::info!(
            message = %confirmation.message,
            filename = confirmation.filename.as_deref().unwrap_or(""),
            "label printed"
        );
        Ok(confirmation)
    }
}

/// Holds the preview currently shown to the user, if any.
#[derive(Debug, Default)]
pub struct PreviewOverlay {
    image: Option<PreviewImage>,
}

impl PreviewOverlay {
    /// Show `image`, replacing any preview already open.
    pub fn show(&mut self, image: PreviewImage) {
        self.image = Some(image);
    }

    /// Close the overlay and release the image. Safe to call when closed.
    pub fn dismiss(&mut self) -> bool {
        self.image.take().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&PreviewImage> {
        self.image.as_ref()
    }
}
