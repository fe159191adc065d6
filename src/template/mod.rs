//! # Template Store
//!
//! The live, editable label: an ordered list of elements (later elements are
//! drawn on top), an optional selection and label-level settings.
//!
//! Every mutation goes through the methods here. The store never validates
//! which fields a caller writes beyond ignoring fields the element's kind
//! does not have; key mapping and panel logic live in [`crate::property`].

pub mod starter;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::element::{Element, ElementId, ElementKind, ElementType, FontWeight};
use crate::render::bounds::{self, Point};

// ============================================================================
// SETTINGS
// ============================================================================

/// Label-level settings, in canvas units (printer dots or mm, a device-level
/// convention this crate does not enforce).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSettings {
    pub width: i32,
    pub height: i32,
    pub margin: i32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            width: 200,
            height: 62,
            margin: 5,
        }
    }
}

// ============================================================================
// FIELDS
// ============================================================================

/// A schema field of some element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementField {
    X,
    Y,
    Text,
    FontSize,
    FontWeight,
    Color,
    Data,
    Size,
    Width,
    Height,
    Icon,
    X2,
    Y2,
    Thickness,
    FillColor,
    BorderColor,
    BorderWidth,
    Rows,
    Cols,
}

/// Declared type of a field, used for coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int,
    Text,
}

impl ElementField {
    pub fn field_type(self) -> FieldType {
        use ElementField::*;
        match self {
            X | Y | FontSize | Size | Width | Height | X2 | Y2 | Thickness | BorderWidth
            | Rows | Cols => FieldType::Int,
            Text | FontWeight | Color | Data | Icon | FillColor | BorderColor => FieldType::Text,
        }
    }

    /// Wire name of the field (camelCase, as serialized).
    pub fn name(self) -> &'static str {
        use ElementField::*;
        match self {
            X => "x",
            Y => "y",
            Text => "text",
            FontSize => "fontSize",
            FontWeight => "fontWeight",
            Color => "color",
            Data => "data",
            Size => "size",
            Width => "width",
            Height => "height",
            Icon => "icon",
            X2 => "x2",
            Y2 => "y2",
            Thickness => "thickness",
            FillColor => "fillColor",
            BorderColor => "borderColor",
            BorderWidth => "borderWidth",
            Rows => "rows",
            Cols => "cols",
        }
    }

    /// Whether `element_type`'s schema has this field.
    pub fn applies_to(self, element_type: ElementType) -> bool {
        use ElementField as F;
        match self {
            F::X | F::Y => true,
            F::Text | F::FontSize | F::FontWeight => element_type == ElementType::Text,
            F::Color => matches!(element_type, ElementType::Text | ElementType::Line),
            F::Data => matches!(
                element_type,
                ElementType::Qr | ElementType::Barcode | ElementType::Table
            ),
            F::Size => matches!(element_type, ElementType::Qr | ElementType::Icon),
            F::Width | F::Height => {
                matches!(element_type, ElementType::Barcode | ElementType::Rect)
            }
            F::Icon => element_type == ElementType::Icon,
            F::X2 | F::Y2 | F::Thickness => element_type == ElementType::Line,
            F::FillColor | F::BorderColor | F::BorderWidth => element_type == ElementType::Rect,
            F::Rows | F::Cols => element_type == ElementType::Table,
        }
    }
}

/// A raw value handed to [`Template::set_element_property`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Integer view: text is parsed leniently, out-of-range saturates.
    pub fn as_int(&self) -> i32 {
        match self {
            FieldValue::Int(n) => (*n).clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            FieldValue::Text(s) => coerce_int(s),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

/// Parse user input as an integer: leading numeric prefix, floored.
///
/// `"12.7"` → 12, `"-3.5"` → -4, `"40px"` → 40, `"abc"` / `""` → 0.
/// Values beyond `i32` saturate.
pub fn coerce_int(raw: &str) -> i32 {
    let s = raw.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || int_digits > 0 {
            end = frac_end;
        }
    }
    if int_digits == 0 && !s[digits_start..end].chars().any(|c| c.is_ascii_digit()) {
        return 0;
    }

    match s[..end].parse::<f64>() {
        Ok(v) if v.is_finite() => {
            let floored = v.floor();
            if floored >= i32::MAX as f64 {
                i32::MAX
            } else if floored <= i32::MIN as f64 {
                i32::MIN
            } else {
                floored as i32
            }
        }
        _ => 0,
    }
}

// ============================================================================
// TEMPLATE
// ============================================================================

/// The live label being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    elements: Vec<Element>,
    #[serde(rename = "selectedElementId")]
    selected: Option<ElementId>,
    settings: LabelSettings,
}

impl Template {
    /// Empty template with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Template seeded from a built-in starter layout, or `None` for an
    /// unknown starter name.
    pub fn from_starter(name: &str) -> Option<Self> {
        let starter = starter::by_name(name)?;
        let mut template = Self::new();
        template.settings = starter.settings;
        template.load_elements(&starter.elements);
        Some(template)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn settings(&self) -> LabelSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: LabelSettings) {
        self.settings = settings;
    }

    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// The selected element, if the selection still resolves.
    pub fn selected(&self) -> Option<&Element> {
        self.selected.as_ref().and_then(|id| self.element(id))
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    fn element_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    /// Append an element of `element_type` with editor defaults and select it.
    pub fn add_element(&mut self, element_type: ElementType) -> &Element {
        self.push_element(Element::editor_default(element_type))
    }

    /// Append an element of `element_type` with editor defaults at `(x, y)` and select it.
    pub fn add_element_at(&mut self, element_type: ElementType, x: i32, y: i32) -> &Element {
        self.push_element(Element::with_defaults(element_type, x, y))
    }

    /// Append a prepared element and select it. A colliding id is re-issued.
    pub fn push_element(&mut self, mut element: Element) -> &Element {
        if self.element(&element.id).is_some() {
            element.id = ElementId::generate();
        }
        tracing::debug!(
            id = %element.id,
            kind = %element.element_type(),
            x = element.x,
            y = element.y,
            "element added"
        );
        self.selected = Some(element.id.clone());
        self.elements.push(element);
        &self.elements[self.elements.len() - 1]
    }

    /// Select `id`. An id that is not on the canvas clears the selection.
    pub fn select_element(&mut self, id: &ElementId) {
        self.selected = self.element(id).map(|e| e.id.clone());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Write `value` into `field` of element `id`, coercing it to the field's type.
    ///
    /// Returns whether anything was written. An unknown id, or a field the
    /// element's kind does not have, is a silent no-op.
    pub fn set_element_property(
        &mut self,
        id: &ElementId,
        field: ElementField,
        value: FieldValue,
    ) -> bool {
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        if !field.applies_to(element.element_type()) {
            return false;
        }

        let int = || value.as_int();
        match field {
            ElementField::X => element.x = int(),
            ElementField::Y => element.y = int(),
            _ => write_kind_field(&mut element.kind, field, &value),
        }
        tracing::debug!(id = %id, field = field.name(), "property set");
        true
    }

    /// Remove one element; clears the selection if it pointed at it.
    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| &e.id != id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.elements.len() != before
    }

    /// Remove every element and the selection. Idempotent.
    pub fn remove_all(&mut self) {
        self.elements.clear();
        self.selected = None;
    }

    /// Replace all elements with a deep copy of `snapshot` and clear the selection.
    ///
    /// Duplicate ids inside the snapshot are re-issued for the later copies so
    /// ids stay unique on the canvas.
    pub fn load_elements(&mut self, snapshot: &[Element]) {
        let mut seen = HashSet::new();
        self.elements = snapshot
            .iter()
            .cloned()
            .map(|mut e| {
                if !seen.insert(e.id.clone()) {
                    e.id = ElementId::generate();
                    seen.insert(e.id.clone());
                }
                e
            })
            .collect();
        self.selected = None;
    }

    /// Topmost element whose bounding box, grown by the hit tolerance,
    /// contains `point`.
    pub fn hit_test(&self, point: Point) -> Option<&Element> {
        self.elements
            .iter()
            .rev()
            .find(|e| bounds::element_bounds(e).expand(bounds::HIT_TOLERANCE).contains(point))
    }
}

fn write_kind_field(kind: &mut ElementKind, field: ElementField, value: &FieldValue) {
    use ElementField as F;
    match kind {
        ElementKind::Text(t) => match field {
            F::Text => t.text = value.as_text(),
            F::FontSize => t.font_size = value.as_int(),
            F::FontWeight => t.font_weight = FontWeight::parse_lenient(&value.as_text()),
            F::Color => t.color = value.as_text(),
            _ => {}
        },
        ElementKind::Qr(q) => match field {
            F::Data => q.data = value.as_text(),
            F::Size => q.size = value.as_int(),
            _ => {}
        },
        ElementKind::Barcode(b) => match field {
            F::Data => b.data = value.as_text(),
            F::Width => b.width = value.as_int(),
            F::Height => b.height = value.as_int(),
            _ => {}
        },
        ElementKind::Icon(i) => match field {
            F::Icon => i.icon = value.as_text(),
            F::Size => i.size = value.as_int(),
            _ => {}
        },
        ElementKind::Line(l) => match field {
            F::X2 => l.x2 = value.as_int(),
            F::Y2 => l.y2 = value.as_int(),
            F::Thickness => l.thickness = value.as_int(),
            F::Color => l.color = value.as_text(),
            _ => {}
        },
        ElementKind::Rect(r) => match field {
            F::Width => r.width = value.as_int(),
            F::Height => r.height = value.as_int(),
            F::FillColor => r.fill_color = value.as_text(),
            F::BorderColor => r.border_color = value.as_text(),
            F::BorderWidth => r.border_width = value.as_int(),
            _ => {}
        },
        ElementKind::Table(t) => match field {
            F::Rows => {
                t.rows = value.as_int();
                t.reshape();
            }
            F::Cols => {
                t.cols = value.as_int();
                t.reshape();
            }
            F::Data => t.set_data_from_text(&value.as_text()),
            _ => {}
        },
    }
}
