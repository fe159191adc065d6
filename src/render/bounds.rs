//! Bounding boxes shared by the renderer and hit-testing.
//!
//! Clicking a drawn element must resolve to that element, so both sides call
//! [`element_bounds`] and nothing else.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementKind, FontWeight};

/// Extra margin around every box when hit-testing, so thin lines stay clickable.
pub const HIT_TOLERANCE: i32 = 5;

/// Box used when a kind has no usable extent (zero or negative size).
pub const DEFAULT_EXTENT: (i32, i32) = (50, 20);

/// Estimated glyph advance as a fraction of the font size.
pub const GLYPH_WIDTH_RATIO: f32 = 0.6;

/// Line height as a fraction of the font size.
pub const LINE_HEIGHT_RATIO: f32 = 1.2;

/// Extra width for bold text.
pub const BOLD_WIDTH_RATIO: f32 = 1.1;

/// Table cell size.
pub const CELL_WIDTH: i32 = 40;
pub const CELL_HEIGHT: i32 = 14;

/// A point in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in canvas units. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Grow by `margin` on every side.
    pub fn expand(&self, margin: i32) -> Self {
        Self {
            x: self.x.saturating_sub(margin),
            y: self.y.saturating_sub(margin),
            width: self.width.saturating_add(margin.saturating_mul(2)),
            height: self.height.saturating_add(margin.saturating_mul(2)),
        }
    }
}

/// Estimated size of a single line of text.
pub fn text_extent(content: &str, font_size: i32, weight: FontWeight) -> (i32, i32) {
    let size = font_size.max(0) as f32;
    let chars = content.chars().count() as f32;
    let mut width = chars * size * GLYPH_WIDTH_RATIO;
    if weight == FontWeight::Bold {
        width *= BOLD_WIDTH_RATIO;
    }
    let height = size * LINE_HEIGHT_RATIO;
    (to_units(width), to_units(height))
}

fn to_units(v: f32) -> i32 {
    v.ceil().min(i32::MAX as f32) as i32
}

fn clamp_units(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Bounding box of an element on the canvas.
pub fn element_bounds(element: &Element) -> BoundingBox {
    let (x, y) = (element.x, element.y);
    let (bx, by, w, h) = match &element.kind {
        ElementKind::Text(t) => {
            let (w, h) = text_extent(&t.text, t.font_size, t.font_weight);
            (x, y, w, h)
        }
        ElementKind::Qr(q) => (x, y, q.size, q.size),
        ElementKind::Icon(i) => (x, y, i.size, i.size),
        ElementKind::Barcode(b) => (x, y, b.width, b.height),
        ElementKind::Rect(r) => (x, y, r.width, r.height),
        ElementKind::Line(l) => {
            let half = (i64::from(l.thickness.max(1)) + 1) / 2;
            let (x0, x1) = (i64::from(x.min(l.x2)), i64::from(x.max(l.x2)));
            let (y0, y1) = (i64::from(y.min(l.y2)), i64::from(y.max(l.y2)));
            (
                clamp_units(x0 - half),
                clamp_units(y0 - half),
                clamp_units(x1 - x0 + 2 * half),
                clamp_units(y1 - y0 + 2 * half),
            )
        }
        ElementKind::Table(t) => {
            let (rows, cols) = t.dims();
            (x, y, cols as i32 * CELL_WIDTH, rows as i32 * CELL_HEIGHT)
        }
    };

    if w <= 0 || h <= 0 {
        let (dw, dh) = DEFAULT_EXTENT;
        BoundingBox::new(bx, by, dw, dh)
    } else {
        BoundingBox::new(bx, by, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementType, Line, Qr, Table, Text};

    #[test]
    fn test_text_bounds() {
        let el = Element::editor_default(ElementType::Text);
        // "Text": 4 chars × 12 × 0.6 = 28.8 → 29; 12 × 1.2 = 14.4 → 15
        assert_eq!(element_bounds(&el), BoundingBox::new(50, 25, 29, 15));
    }

    #[test]
    fn test_bold_is_wider() {
        let normal = text_extent("Label", 20, FontWeight::Normal);
        let bold = text_extent("Label", 20, FontWeight::Bold);
        assert!(bold.0 > normal.0);
        assert_eq!(bold.1, normal.1);
    }

    #[test]
    fn test_empty_text_uses_default_extent() {
        let el = Element::new(3, 4, ElementKind::Text(Text::new("")));
        assert_eq!(element_bounds(&el), BoundingBox::new(3, 4, 50, 20));
    }

    #[test]
    fn test_zero_size_qr_uses_default_extent() {
        let el = Element::new(0, 0, ElementKind::Qr(Qr { data: "x".into(), size: 0 }));
        assert_eq!(element_bounds(&el), BoundingBox::new(0, 0, 50, 20));
    }

    #[test]
    fn test_line_bounds_any_direction() {
        let el = Element::new(
            100,
            40,
            ElementKind::Line(Line {
                x2: 20,
                y2: 10,
                thickness: 4,
                color: "#000".into(),
            }),
        );
        assert_eq!(element_bounds(&el), BoundingBox::new(18, 8, 84, 34));
    }

    #[test]
    fn test_table_bounds() {
        let el = Element::editor_default(ElementType::Table);
        assert_eq!(element_bounds(&el), BoundingBox::new(50, 25, 80, 28));
    }

    #[test]
    fn test_line_bounds_extreme_values() {
        let el = Element::new(
            i32::MIN,
            i32::MAX,
            ElementKind::Line(Line {
                x2: i32::MAX,
                y2: i32::MIN,
                thickness: i32::MAX,
                color: "#000".into(),
            }),
        );
        let b = element_bounds(&el);
        assert_eq!((b.x, b.y), (i32::MIN, i32::MIN));
        assert_eq!((b.width, b.height), (i32::MAX, i32::MAX));

        let dot = Element::new(
            7,
            7,
            ElementKind::Line(Line {
                x2: 7,
                y2: 7,
                thickness: i32::MAX,
                color: "#000".into(),
            }),
        );
        let b = element_bounds(&dot);
        assert_eq!(b.x, 7 - (1 << 30));
        assert_eq!(b.width, i32::MAX);
        assert!(b.contains(Point::new(7, 7)));
    }

    #[test]
    fn test_table_bounds_follow_capped_grid() {
        let mut table = Table::new(2, 2);
        // Stored shape as it may arrive from an imported document.
        table.rows = 1000;
        table.cols = 3;
        let el = Element::new(0, 0, ElementKind::Table(table));
        let b = element_bounds(&el);
        assert_eq!(b, BoundingBox::new(0, 0, 3 * CELL_WIDTH, 100 * CELL_HEIGHT));
        assert!(!b.contains(Point::new(10, 100 * CELL_HEIGHT + 1)));
    }

    #[test]
    fn test_contains_inclusive_edges() {
        let b = BoundingBox::new(0, 0, 10, 10);
        assert!(b.contains(Point::new(0, 0)));
        assert!(b.contains(Point::new(10, 10)));
        assert!(!b.contains(Point::new(11, 10)));
        assert!(b.expand(5).contains(Point::new(-5, 15)));
    }
}
