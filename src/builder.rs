//! # Builder
//!
//! The controller behind the editor UI. It owns the live template, the
//! saved-template library and the preview overlay, and turns named UI
//! actions into calls on them.
//!
//! ```text
//! UI event ──Action::parse(name, args)──▶ Builder::dispatch ──▶ Template / Library
//!                                              │
//!                                              ├─ scene re-rendered after every action
//!                                              └─ failures become notifications
//! ```
//!
//! Nothing here is fatal. A failed action leaves the template as it was and
//! queues an error notification; the builder keeps accepting actions.

use std::collections::VecDeque;

use serde::Serialize;
use serde_json::Value;

use crate::element::{ElementId, ElementType};
use crate::error::{Result, TapecraftError};
use crate::library::{LibraryStore, TemplateDocument, TemplateLibrary, document};
use crate::property::{self, PanelRow, PropertyEdit, PropertyPanel};
use crate::render::bounds::Point;
use crate::render::{self, Scene};
use crate::submit::{Payload, PreviewImage, PreviewOverlay, PrintConfirmation, SubmitAction};
use crate::template::{LabelSettings, Template, coerce_int};

/// Notifications kept before the oldest is dropped.
pub const MAX_NOTIFICATIONS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Error category for failures (see [`TapecraftError::kind`]).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

// ============================================================================
// ACTIONS
// ============================================================================

/// A UI action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddElement {
        element_type: ElementType,
        at: Option<Point>,
    },
    Select(Option<ElementId>),
    SelectAt(Point),
    SetProperty { key: String, value: String },
    DeleteElement,
    Clear,
    LoadStarter(String),
    Save(String),
    Load(usize),
    DeleteSaved(usize),
    Import(Value),
    Settings {
        width: Option<i32>,
        height: Option<i32>,
        margin: Option<i32>,
    },
    DismissPreview,
}

/// Action names, as used in `POST /api/actions/:name`.
pub const ACTION_NAMES: &[&str] = &[
    "add-element",
    "select",
    "select-at",
    "set-property",
    "delete-element",
    "clear",
    "load-starter",
    "save",
    "load",
    "delete-saved",
    "import",
    "settings",
    "dismiss-preview",
];

fn missing(action: &str, arg: &str) -> TapecraftError {
    TapecraftError::Validation(format!("{}: missing \"{}\"", action, arg))
}

/// String argument; numbers are accepted and printed.
fn arg_str(args: &Value, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer argument, coerced the same way property edits are.
fn arg_int(args: &Value, key: &str) -> Option<i32> {
    match args.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            .or_else(|| n.as_f64().map(|f| coerce_int(&f.to_string()))),
        Value::String(s) => Some(coerce_int(s)),
        _ => None,
    }
}

fn arg_index(args: &Value, action: &str) -> Result<usize> {
    let raw = arg_int(args, "index").ok_or_else(|| missing(action, "index"))?;
    usize::try_from(raw)
        .map_err(|_| TapecraftError::Validation(format!("{}: index must not be negative", action)))
}

impl Action {
    /// Parse an action from its name and a JSON argument object.
    pub fn parse(name: &str, args: &Value) -> Result<Self> {
        let action = match name {
            "add-element" => {
                let ty = arg_str(args, "type").ok_or_else(|| missing(name, "type"))?;
                let element_type = ElementType::from_name(&ty).ok_or_else(|| {
                    TapecraftError::Validation(format!("unknown element type '{}'", ty))
                })?;
                let at = match (arg_int(args, "x"), arg_int(args, "y")) {
                    (Some(x), Some(y)) => Some(Point::new(x, y)),
                    _ => None,
                };
                Action::AddElement { element_type, at }
            }
            "select" => Action::Select(arg_str(args, "id").map(ElementId::from)),
            "select-at" => {
                let x = arg_int(args, "x").ok_or_else(|| missing(name, "x"))?;
                let y = arg_int(args, "y").ok_or_else(|| missing(name, "y"))?;
                Action::SelectAt(Point::new(x, y))
            }
            "set-property" => Action::SetProperty {
                key: arg_str(args, "key").ok_or_else(|| missing(name, "key"))?,
                value: arg_str(args, "value").unwrap_or_default(),
            },
            "delete-element" => Action::DeleteElement,
            "clear" => Action::Clear,
            "load-starter" => {
                Action::LoadStarter(arg_str(args, "name").ok_or_else(|| missing(name, "name"))?)
            }
            "save" => Action::Save(arg_str(args, "name").unwrap_or_default()),
            "load" => Action::Load(arg_index(args, name)?),
            "delete-saved" => Action::DeleteSaved(arg_index(args, name)?),
            "import" => Action::Import(args.get("document").cloned().unwrap_or_else(|| args.clone())),
            "settings" => Action::Settings {
                width: arg_int(args, "width"),
                height: arg_int(args, "height"),
                margin: arg_int(args, "margin"),
            },
            "dismiss-preview" => Action::DismissPreview,
            other => {
                return Err(TapecraftError::Validation(format!(
                    "unknown action '{}'",
                    other
                )));
            }
        };
        Ok(action)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::AddElement { .. } => "add-element",
            Action::Select(_) => "select",
            Action::SelectAt(_) => "select-at",
            Action::SetProperty { .. } => "set-property",
            Action::DeleteElement => "delete-element",
            Action::Clear => "clear",
            Action::LoadStarter(_) => "load-starter",
            Action::Save(_) => "save",
            Action::Load(_) => "load",
            Action::DeleteSaved(_) => "delete-saved",
            Action::Import(_) => "import",
            Action::Settings { .. } => "settings",
            Action::DismissPreview => "dismiss-preview",
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

pub struct Builder<S: LibraryStore> {
    template: Template,
    library: TemplateLibrary<S>,
    overlay: PreviewOverlay,
    notifications: VecDeque<Notification>,
    scene: Scene,
}

impl<S: LibraryStore> Builder<S> {
    /// A builder with an empty template.
    pub fn new(library: TemplateLibrary<S>) -> Self {
        Self::with_template(library, Template::new())
    }

    pub fn with_template(library: TemplateLibrary<S>, template: Template) -> Self {
        let scene = render::render(&template);
        Self {
            template,
            library,
            overlay: PreviewOverlay::default(),
            notifications: VecDeque::new(),
            scene,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn library(&self) -> &TemplateLibrary<S> {
        &self.library
    }

    pub fn overlay(&self) -> &PreviewOverlay {
        &self.overlay
    }

    /// Scene for the current template state.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn panel(&self) -> PropertyPanel {
        PropertyPanel::for_template(&self.template)
    }

    /// Property rows for the selected element; empty without a selection.
    pub fn panel_rows(&self) -> Vec<PanelRow> {
        self.template
            .selected()
            .map(property::panel_rows)
            .unwrap_or_default()
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Take every queued notification, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>, kind: Option<&'static str>) {
        if self.notifications.len() >= MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(Notification {
            level,
            message: message.into(),
            kind,
        });
    }

    fn notify_error(&mut self, err: &TapecraftError) {
        self.notify(NotificationLevel::Error, err.to_string(), Some(err.kind()));
    }

    /// Run one action. Returns whether it succeeded; failures are queued as
    /// notifications.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let name = action.name();
        let result = self.apply(action);
        self.scene = render::render(&self.template);
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(action = name, error = %e, "action failed");
                self.notify_error(&e);
                false
            }
        }
    }

    /// Parse and run a named action.
    pub fn dispatch_named(&mut self, name: &str, args: &Value) -> bool {
        match Action::parse(name, args) {
            Ok(action) => self.dispatch(action),
            Err(e) => {
                self.notify_error(&e);
                false
            }
        }
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::AddElement { element_type, at } => {
                match at {
                    Some(p) => self.template.add_element_at(element_type, p.x, p.y),
                    None => self.template.add_element(element_type),
                };
            }
            Action::Select(Some(id)) => self.template.select_element(&id),
            Action::Select(None) => self.template.clear_selection(),
            Action::SelectAt(point) => match self.template.hit_test(point).map(|e| e.id.clone()) {
                Some(id) => self.template.select_element(&id),
                None => self.template.clear_selection(),
            },
            Action::SetProperty { key, value } => {
                if let PropertyEdit::Ignored(reason) =
                    property::apply_edit(&mut self.template, &key, &value)
                {
                    tracing::debug!(key = %key, ?reason, "property edit ignored");
                }
            }
            Action::DeleteElement => {
                if let Some(id) = self.template.selected_id().cloned() {
                    self.template.remove_element(&id);
                }
            }
            Action::Clear => self.template.remove_all(),
            Action::LoadStarter(name) => {
                let starter = Template::from_starter(&name).ok_or_else(|| {
                    TapecraftError::Validation(format!("unknown starter layout '{}'", name))
                })?;
                self.template = starter;
            }
            Action::Save(name) => {
                let index = self.library.save(&name, self.template.elements())?;
                let saved = name.trim().to_string();
                self.notify(
                    NotificationLevel::Success,
                    format!("Template '{}' saved (#{})", saved, index),
                    None,
                );
            }
            Action::Load(index) => {
                if self.library.load(index, &mut self.template) {
                    self.notify(NotificationLevel::Info, "Template loaded", None);
                }
            }
            Action::DeleteSaved(index) => {
                if let Some(removed) = self.library.remove(index)? {
                    self.notify(
                        NotificationLevel::Info,
                        format!("Template '{}' deleted", removed.name),
                        None,
                    );
                }
            }
            Action::Import(value) => {
                let doc = document::import_into(&mut self.template, &value)?;
                let message = match doc.name {
                    Some(name) => format!("Template '{}' imported", name),
                    None => "Template imported".to_string(),
                };
                self.notify(NotificationLevel::Success, message, None);
            }
            Action::Settings {
                width,
                height,
                margin,
            } => {
                let current = self.template.settings();
                let next = LabelSettings {
                    width: width.unwrap_or(current.width),
                    height: height.unwrap_or(current.height),
                    margin: margin.unwrap_or(current.margin),
                };
                if next.width <= 0 || next.height <= 0 || next.margin < 0 {
                    return Err(TapecraftError::Validation(
                        "label width and height must be positive, margin must not be negative"
                            .into(),
                    ));
                }
                self.template.set_settings(next);
            }
            Action::DismissPreview => {
                self.overlay.dismiss();
            }
        }
        Ok(())
    }

    /// Snapshot for the print service.
    pub fn payload(&self) -> Payload {
        Payload::from_template(&self.template)
    }

    /// Export document for the live template.
    pub fn export(&self, name: Option<&str>) -> TemplateDocument {
        document::export(name, self.template.elements())
    }

    /// Record a finished preview request.
    pub fn finish_preview(&mut self, result: Result<PreviewImage>) -> Result<()> {
        match result {
            Ok(image) => {
                self.overlay.show(image);
                Ok(())
            }
            Err(e) => {
                self.report_failure(SubmitAction::Preview, &e);
                Err(e)
            }
        }
    }

    /// Record a finished print request.
    pub fn finish_print(&mut self, result: Result<PrintConfirmation>) -> Result<PrintConfirmation> {
        match result {
            Ok(confirmation) => {
                let message = if confirmation.message.is_empty() {
                    "Label printed".to_string()
                } else {
                    confirmation.message.clone()
                };
                self.notify(NotificationLevel::Success, message, None);
                Ok(confirmation)
            }
            Err(e) => {
                self.report_failure(SubmitAction::Print, &e);
                Err(e)
            }
        }
    }

    fn report_failure(&mut self, action: SubmitAction, err: &TapecraftError) {
        tracing::warn!(action = action.name(), error = %err, "submit failed");
        let message = match err {
            TapecraftError::Transport(text) => format!("{} failed: {}", capitalize(action.name()), text),
            other => other.to_string(),
        };
        self.notify(NotificationLevel::Error, message, Some(err.kind()));
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
