//! # Element Model
//!
//! One visual primitive on the label canvas: a common header (`id`, `x`, `y`)
//! plus a closed, kind-tagged payload.
//!
//! ```
//! use tapecraft::element::*;
//!
//! // Rust construction
//! let el = Element::new(10, 5, ElementKind::Text(Text::new("Rack A")));
//!
//! // JSON: the kind tag is `"type"`, fields are camelCase
//! let json = r#"{"id":"a1","type":"qr","x":0,"y":0,"data":"hello","size":32}"#;
//! let qr: Element = serde_json::from_str(json).unwrap();
//! assert_eq!(qr.element_type(), ElementType::Qr);
//! # let _ = el;
//! ```

pub mod types;

pub use types::*;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Position of a freshly added element.
pub const DEFAULT_POSITION: (i32, i32) = (50, 25);

// ============================================================================
// ELEMENT ID
// ============================================================================

/// Opaque element identifier, stable for the element's lifetime.
///
/// Generated ids are UUID v4 strings. Documents written by older builders
/// may carry numeric ids (millisecond timestamps); those are accepted and
/// kept as their decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh, collision-free id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum IdValue {
            Str(String),
            Int(i64),
            Float(f64),
        }

        match IdValue::deserialize(deserializer)? {
            IdValue::Str(s) if s.trim().is_empty() => {
                Err(serde::de::Error::custom("element id must not be empty"))
            }
            IdValue::Str(s) => Ok(Self(s)),
            IdValue::Int(n) => Ok(Self(n.to_string())),
            IdValue::Float(f) => Ok(Self(f.to_string())),
        }
    }
}

// ============================================================================
// ELEMENT KINDS
// ============================================================================

/// Define the `ElementKind` payload enum, the `ElementType` discriminant and
/// their dispatch methods from a single list.
macro_rules! define_elements {
    ($($variant:ident($inner:ty) => $name:literal),+ $(,)?) => {
        /// Kind-specific payload of an element.
        ///
        /// `#[serde(tag = "type")]` gives JSON like `{"type": "text", "text": "Hi"}`.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", rename_all = "lowercase")]
        pub enum ElementKind {
            $($variant($inner),)+
        }

        /// Fieldless discriminant of [`ElementKind`], used by the palette and
        /// the property panel.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum ElementType {
            $($variant,)+
        }

        impl ElementKind {
            pub fn element_type(&self) -> ElementType {
                match self { $(ElementKind::$variant(_) => ElementType::$variant,)+ }
            }
        }

        impl ElementType {
            /// Every kind, in palette order.
            pub const ALL: &'static [ElementType] = &[$(ElementType::$variant,)+];

            /// Serde tag of this kind (`"text"`, `"qr"`, ...).
            pub fn name(self) -> &'static str {
                match self { $(ElementType::$variant => $name,)+ }
            }

            /// Human-readable label (from [`ElementMeta::label`]).
            pub fn label(self) -> &'static str {
                match self { $(ElementType::$variant => <$inner>::label(),)+ }
            }

            /// Look a kind up by its tag, case-insensitively.
            pub fn from_name(name: &str) -> Option<Self> {
                let name = name.trim();
                Self::ALL.iter().copied().find(|t| t.name().eq_ignore_ascii_case(name))
            }

            /// Editor default payload for this kind (from [`ElementMeta::editor_default`]).
            pub fn editor_default(self) -> ElementKind {
                match self { $(ElementType::$variant => ElementKind::$variant(<$inner>::editor_default()),)+ }
            }
        }
    };
}

define_elements! {
    Text(Text) => "text",
    Qr(Qr) => "qr",
    Barcode(Barcode) => "barcode",
    Icon(Icon) => "icon",
    Line(Line) => "line",
    Rect(Rect) => "rect",
    Table(Table) => "table",
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ELEMENT
// ============================================================================

/// One positioned element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Assigned at creation; documents without an id get a fresh one.
    #[serde(default = "ElementId::generate")]
    pub id: ElementId,
    /// Top-left position in canvas units. For lines this is the start point.
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create an element with a fresh id.
    pub fn new(x: i32, y: i32, kind: ElementKind) -> Self {
        Self {
            id: ElementId::generate(),
            x,
            y,
            kind,
        }
    }

    /// Create an element of `element_type` with its editor defaults at `(x, y)`.
    ///
    /// A line's endpoint is placed [`LINE_DEFAULT_LENGTH`] to the right of the start.
    pub fn with_defaults(element_type: ElementType, x: i32, y: i32) -> Self {
        let mut kind = element_type.editor_default();
        if let ElementKind::Line(line) = &mut kind {
            line.x2 = x.saturating_add(LINE_DEFAULT_LENGTH);
            line.y2 = y;
        }
        Self::new(x, y, kind)
    }

    /// Editor defaults at [`DEFAULT_POSITION`].
    pub fn editor_default(element_type: ElementType) -> Self {
        let (x, y) = DEFAULT_POSITION;
        Self::with_defaults(element_type, x, y)
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }
}

/// Palette entry for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct ElementTypeMeta {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub label: &'static str,
}

/// All element kinds with their labels, in palette order.
pub fn element_kinds() -> Vec<ElementTypeMeta> {
    ElementType::ALL
        .iter()
        .map(|t| ElementTypeMeta {
            type_name: t.name(),
            label: t.label(),
        })
        .collect()
}
