//! Element struct types for the label template model.
//!
//! All types derive `Serialize + Deserialize` so the same types work for
//! Rust construction, template documents and the print service payload.
//! Field names are camelCase on the wire (`fontSize`, `borderColor`, ...).
//!
//! Each element implements [`ElementMeta`] to declare its display label
//! and editor default.

use serde::{Deserialize, Serialize};

/// Metadata that every element struct must provide.
///
/// Adding a new element kind: implement this trait and add one line to
/// `define_elements!` in `element/mod.rs`. The compiler then points at every
/// exhaustive match (renderer, bounds, property tables) that needs a case.
pub trait ElementMeta: Sized {
    /// Human-readable display label (e.g. "QR Code").
    fn label() -> &'static str;

    /// Starter value used when the kind is added from the palette.
    ///
    /// Distinct from `Default`: editor defaults carry example content so a
    /// freshly added element is visible on the canvas.
    fn editor_default() -> Self;
}

/// Default ink color.
pub const BLACK: &str = "#000000";

fn default_color() -> String {
    BLACK.to_string()
}

fn default_font_size() -> i32 {
    12
}

// ============================================================================
// TEXT
// ============================================================================

/// Font weight of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// Parse a UI value. Anything other than "bold" (any case) is normal.
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("bold") {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

/// Literal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: i32,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default = "default_color")]
    pub color: String,
}

impl ElementMeta for Text {
    fn label() -> &'static str {
        "Text"
    }
    fn editor_default() -> Self {
        Self::new("Text")
    }
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: default_font_size(),
            font_weight: FontWeight::Normal,
            color: default_color(),
        }
    }
}

// ============================================================================
// CODES
// ============================================================================

fn default_qr_size() -> i32 {
    40
}

/// QR code. Only a placeholder is drawn locally; the print service encodes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qr {
    pub data: String,
    /// Side length of the square symbol.
    #[serde(default = "default_qr_size")]
    pub size: i32,
}

impl ElementMeta for Qr {
    fn label() -> &'static str {
        "QR Code"
    }
    fn editor_default() -> Self {
        Self::new("https://example.com")
    }
}

impl Qr {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            size: default_qr_size(),
        }
    }
}

fn default_barcode_width() -> i32 {
    100
}

fn default_barcode_height() -> i32 {
    30
}

/// 1D barcode. Only a placeholder is drawn locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barcode {
    pub data: String,
    #[serde(default = "default_barcode_width")]
    pub width: i32,
    #[serde(default = "default_barcode_height")]
    pub height: i32,
}

impl ElementMeta for Barcode {
    fn label() -> &'static str {
        "Barcode"
    }
    fn editor_default() -> Self {
        Self::new("123456789")
    }
}

impl Barcode {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            width: default_barcode_width(),
            height: default_barcode_height(),
        }
    }
}

// ============================================================================
// ICON
// ============================================================================

fn default_icon_size() -> i32 {
    20
}

/// A single glyph (emoji or symbol) drawn at `size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    pub icon: String,
    #[serde(default = "default_icon_size")]
    pub size: i32,
}

impl ElementMeta for Icon {
    fn label() -> &'static str {
        "Icon"
    }
    fn editor_default() -> Self {
        Self::new("\u{26A0}")
    }
}

impl Icon {
    pub fn new(icon: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            size: default_icon_size(),
        }
    }
}

// ============================================================================
// SHAPES
// ============================================================================

/// Horizontal length of a freshly added line.
pub const LINE_DEFAULT_LENGTH: i32 = 50;

fn default_thickness() -> i32 {
    2
}

/// Straight segment from the element's `(x, y)` to `(x2, y2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub x2: i32,
    pub y2: i32,
    #[serde(default = "default_thickness")]
    pub thickness: i32,
    #[serde(default = "default_color")]
    pub color: String,
}

impl ElementMeta for Line {
    fn label() -> &'static str {
        "Line"
    }
    /// Endpoint is relative to the origin here; `Element::with_defaults`
    /// moves it to `x + LINE_DEFAULT_LENGTH`.
    fn editor_default() -> Self {
        Self {
            x2: LINE_DEFAULT_LENGTH,
            y2: 0,
            thickness: default_thickness(),
            color: default_color(),
        }
    }
}

fn default_fill() -> String {
    "transparent".to_string()
}

fn default_border_width() -> i32 {
    1
}

/// Filled and/or bordered box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_fill")]
    pub fill_color: String,
    #[serde(default = "default_color")]
    pub border_color: String,
    #[serde(default = "default_border_width")]
    pub border_width: i32,
}

impl ElementMeta for Rect {
    fn label() -> &'static str {
        "Rectangle"
    }
    fn editor_default() -> Self {
        Self {
            width: 60,
            height: 30,
            fill_color: default_fill(),
            border_color: default_color(),
            border_width: default_border_width(),
        }
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// Upper bound on table rows and columns that get cells allocated or drawn.
pub const MAX_TABLE_DIM: usize = 100;

/// Grid of text cells, `rows × cols`.
///
/// `data` is expected to be `rows × cols` but may not be (imported
/// documents); the renderer pads or truncates without complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub rows: i32,
    pub cols: i32,
    #[serde(default)]
    pub data: Vec<Vec<String>>,
}

impl ElementMeta for Table {
    fn label() -> &'static str {
        "Table"
    }
    fn editor_default() -> Self {
        Self {
            rows: 2,
            cols: 2,
            data: vec![
                vec!["A".into(), "B".into()],
                vec!["C".into(), "D".into()],
            ],
        }
    }
}

impl Table {
    /// Build an empty `rows × cols` table.
    pub fn new(rows: i32, cols: i32) -> Self {
        let mut table = Self {
            rows,
            cols,
            data: Vec::new(),
        };
        table.reshape();
        table
    }

    /// Clamp `rows`/`cols` to `0..=MAX_TABLE_DIM` and pad or truncate `data`
    /// to exactly that shape.
    pub fn reshape(&mut self) {
        let (rows, cols) = self.dims();
        self.rows = rows as i32;
        self.cols = cols as i32;
        self.data.resize_with(rows, Vec::new);
        for row in &mut self.data {
            row.resize_with(cols, String::new);
        }
    }

    /// `(rows, cols)` clamped to `0..=MAX_TABLE_DIM`.
    pub fn dims(&self) -> (usize, usize) {
        let clamp = |n: i32| (n.max(0) as usize).min(MAX_TABLE_DIM);
        (clamp(self.rows), clamp(self.cols))
    }

    /// Cell text at `(row, col)`, or "" when `data` is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Replace `data` from editor text: rows split on newlines, cells on `|`.
    /// The result is reshaped to the current `rows × cols`.
    pub fn set_data_from_text(&mut self, text: &str) {
        self.data = text
            .lines()
            .map(|line| line.split('|').map(|c| c.trim().to_string()).collect())
            .collect();
        self.reshape();
    }

    /// Inverse of [`Table::set_data_from_text`].
    pub fn data_as_text(&self) -> String {
        self.data
            .iter()
            .map(|row| row.join("|"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_defaults_from_json() {
        let text: Text = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(text.font_size, 12);
        assert_eq!(text.font_weight, FontWeight::Normal);
        assert_eq!(text.color, BLACK);
    }

    #[test]
    fn test_text_camel_case_fields() {
        let json = serde_json::to_value(Text::new("x")).unwrap();
        assert!(json.get("fontSize").is_some());
        assert!(json.get("fontWeight").is_some());
        assert!(json.get("font_size").is_none());
    }

    #[test]
    fn test_font_weight_lenient() {
        assert_eq!(FontWeight::parse_lenient("BOLD"), FontWeight::Bold);
        assert_eq!(FontWeight::parse_lenient(" bold "), FontWeight::Bold);
        assert_eq!(FontWeight::parse_lenient("heavy"), FontWeight::Normal);
    }

    #[test]
    fn test_table_reshape_pads_and_truncates() {
        let mut table = Table {
            rows: 2,
            cols: 3,
            data: vec![vec!["a".into()], vec![], vec!["x".into()]],
        };
        table.reshape();
        assert_eq!(table.data.len(), 2);
        assert!(table.data.iter().all(|r| r.len() == 3));
        assert_eq!(table.cell(0, 0), "a");
        assert_eq!(table.cell(0, 2), "");
    }

    #[test]
    fn test_table_negative_dimensions() {
        let table = Table::new(-1, 4);
        assert!(table.data.is_empty());
    }

    #[test]
    fn test_table_text_editing() {
        let mut table = Table::new(2, 2);
        table.set_data_from_text("1 | 2\n3|4|5\n6");
        assert_eq!(table.data, vec![vec!["1", "2"], vec!["3", "4"]]);
        assert_eq!(table.data_as_text(), "1|2\n3|4");
    }

    #[test]
    fn test_table_dims_clamped() {
        let table = Table::new(5000, 2);
        assert_eq!(table.dims(), (MAX_TABLE_DIM, 2));
        assert_eq!(table.rows, MAX_TABLE_DIM as i32);
        assert_eq!(table.data.len(), MAX_TABLE_DIM);

        let table = Table::new(-3, 2);
        assert_eq!((table.rows, table.cols), (0, 2));
        assert!(table.data.is_empty());
    }

    #[test]
    fn test_cell_out_of_range() {
        let table = Table::new(1, 1);
        assert_eq!(table.cell(5, 5), "");
    }
}
