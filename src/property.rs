//! # Property Editor Bridge
//!
//! Turns a flat `(key, value)` edit from the property panel into a typed
//! field write on the selected element.
//!
//! Keys are matched after normalization (lowercase, separators dropped), so
//! `font-size`, `font_size` and `FontSize` all resolve to
//! [`ElementField::FontSize`]. Numeric fields are parsed leniently
//! (see [`coerce_int`]); unmapped keys are dropped. Edits never fail.
//!
//! The same tables drive panel visibility: only the group for the selected
//! element's kind is shown, and nothing is shown without a selection.

use serde::Serialize;

use crate::element::{Element, ElementKind, ElementType};
use crate::template::{ElementField, FieldType, FieldValue, Template, coerce_int};

/// Which property group the panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyPanel {
    None,
    Group(ElementType),
}

impl PropertyPanel {
    /// Panel state for the template's current selection.
    pub fn for_template(template: &Template) -> Self {
        template
            .selected()
            .map(|e| PropertyPanel::Group(e.element_type()))
            .unwrap_or(PropertyPanel::None)
    }

    pub fn is_visible(&self, element_type: ElementType) -> bool {
        *self == PropertyPanel::Group(element_type)
    }
}

/// Result of a panel edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyEdit {
    Applied(ElementField),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoSelection,
    UnknownKey,
}

// ============================================================================
// KEY TABLES
// ============================================================================

type KeyTable = &'static [(&'static str, ElementField)];

const POSITION: KeyTable = &[("x", ElementField::X), ("y", ElementField::Y)];

const TEXT_KEYS: KeyTable = &[
    ("text", ElementField::Text),
    ("content", ElementField::Text),
    ("fontsize", ElementField::FontSize),
    ("fontweight", ElementField::FontWeight),
    ("weight", ElementField::FontWeight),
    ("color", ElementField::Color),
];

const QR_KEYS: KeyTable = &[
    ("data", ElementField::Data),
    ("value", ElementField::Data),
    ("size", ElementField::Size),
];

const BARCODE_KEYS: KeyTable = &[
    ("data", ElementField::Data),
    ("value", ElementField::Data),
    ("width", ElementField::Width),
    ("height", ElementField::Height),
];

const ICON_KEYS: KeyTable = &[
    ("icon", ElementField::Icon),
    ("glyph", ElementField::Icon),
    ("size", ElementField::Size),
];

const LINE_KEYS: KeyTable = &[
    ("x2", ElementField::X2),
    ("y2", ElementField::Y2),
    ("thickness", ElementField::Thickness),
    ("color", ElementField::Color),
];

const RECT_KEYS: KeyTable = &[
    ("width", ElementField::Width),
    ("height", ElementField::Height),
    ("fillcolor", ElementField::FillColor),
    ("fill", ElementField::FillColor),
    ("bordercolor", ElementField::BorderColor),
    ("borderwidth", ElementField::BorderWidth),
];

const TABLE_KEYS: KeyTable = &[
    ("rows", ElementField::Rows),
    ("cols", ElementField::Cols),
    ("columns", ElementField::Cols),
    ("data", ElementField::Data),
];

fn kind_keys(element_type: ElementType) -> KeyTable {
    match element_type {
        ElementType::Text => TEXT_KEYS,
        ElementType::Qr => QR_KEYS,
        ElementType::Barcode => BARCODE_KEYS,
        ElementType::Icon => ICON_KEYS,
        ElementType::Line => LINE_KEYS,
        ElementType::Rect => RECT_KEYS,
        ElementType::Table => TABLE_KEYS,
    }
}

/// Lowercase and drop every non-alphanumeric character.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve a UI key against `element_type`'s table.
pub fn resolve_key(element_type: ElementType, key: &str) -> Option<ElementField> {
    let norm = normalize_key(key);
    POSITION
        .iter()
        .chain(kind_keys(element_type))
        .find(|(k, _)| *k == norm)
        .map(|(_, f)| *f)
}

/// Fields shown in `element_type`'s property group, in panel order.
///
/// Aliases are not listed; each field appears once.
pub fn panel_fields(element_type: ElementType) -> Vec<ElementField> {
    let mut fields: Vec<ElementField> = Vec::new();
    for (_, f) in POSITION.iter().chain(kind_keys(element_type)) {
        if !fields.contains(f) {
            fields.push(*f);
        }
    }
    fields
}

// ============================================================================
// EDITS
// ============================================================================

/// Convert a raw panel value to the field's declared type.
pub fn coerce(field: ElementField, raw: &str) -> FieldValue {
    match field.field_type() {
        FieldType::Int => FieldValue::Int(coerce_int(raw) as i64),
        FieldType::Text => FieldValue::Text(raw.to_string()),
    }
}

/// Apply a panel edit to the selected element.
pub fn apply_edit(template: &mut Template, key: &str, raw: &str) -> PropertyEdit {
    let Some(selected) = template.selected() else {
        return PropertyEdit::Ignored(IgnoreReason::NoSelection);
    };
    let id = selected.id.clone();
    let Some(field) = resolve_key(selected.element_type(), key) else {
        tracing::debug!(key, kind = %selected.element_type(), "unmapped property key dropped");
        return PropertyEdit::Ignored(IgnoreReason::UnknownKey);
    };

    template.set_element_property(&id, field, coerce(field, raw));
    PropertyEdit::Applied(field)
}

/// One row of the property panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow {
    pub key: &'static str,
    pub numeric: bool,
    pub value: String,
}

/// Current values for the panel of `element`.
pub fn panel_rows(element: &Element) -> Vec<PanelRow> {
    panel_fields(element.element_type())
        .into_iter()
        .map(|field| PanelRow {
            key: field.name(),
            numeric: field.field_type() == FieldType::Int,
            value: read_field(element, field).unwrap_or_default(),
        })
        .collect()
}

/// Current value of `field` as panel text, or `None` if the kind lacks it.
pub fn read_field(element: &Element, field: ElementField) -> Option<String> {
    use ElementField as F;
    let value = match (&element.kind, field) {
        (_, F::X) => element.x.to_string(),
        (_, F::Y) => element.y.to_string(),
        (ElementKind::Text(t), F::Text) => t.text.clone(),
        (ElementKind::Text(t), F::FontSize) => t.font_size.to_string(),
        (ElementKind::Text(t), F::FontWeight) => t.font_weight.as_str().to_string(),
        (ElementKind::Text(t), F::Color) => t.color.clone(),
        (ElementKind::Qr(q), F::Data) => q.data.clone(),
        (ElementKind::Qr(q), F::Size) => q.size.to_string(),
        (ElementKind::Barcode(b), F::Data) => b.data.clone(),
        (ElementKind::Barcode(b), F::Width) => b.width.to_string(),
        (ElementKind::Barcode(b), F::Height) => b.height.to_string(),
        (ElementKind::Icon(i), F::Icon) => i.icon.clone(),
        (ElementKind::Icon(i), F::Size) => i.size.to_string(),
        (ElementKind::Line(l), F::X2) => l.x2.to_string(),
        (ElementKind::Line(l), F::Y2) => l.y2.to_string(),
        (ElementKind::Line(l), F::Thickness) => l.thickness.to_string(),
        (ElementKind::Line(l), F::Color) => l.color.clone(),
        (ElementKind::Rect(r), F::Width) => r.width.to_string(),
        (ElementKind::Rect(r), F::Height) => r.height.to_string(),
        (ElementKind::Rect(r), F::FillColor) => r.fill_color.clone(),
        (ElementKind::Rect(r), F::BorderColor) => r.border_color.clone(),
        (ElementKind::Rect(r), F::BorderWidth) => r.border_width.to_string(),
        (ElementKind::Table(t), F::Rows) => t.rows.to_string(),
        (ElementKind::Table(t), F::Cols) => t.cols.to_string(),
        (ElementKind::Table(t), F::Data) => t.data_as_text(),
        _ => return None,
    };
    Some(value)
}
