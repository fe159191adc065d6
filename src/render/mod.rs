//! # Canvas Renderer
//!
//! Pure mapping from a [`Template`] to a drawable [`Scene`].
//!
//! ```text
//! Template ──render()──▶ Scene { nodes: [Node { bounds, shape, outline }] }
//!                           │
//!                           └──raster::to_png()──▶ PNG bytes (offline preview)
//! ```
//!
//! Rendering is idempotent: the same template state always yields an equal
//! scene. Node order is element order, so later nodes draw on top. The
//! selected node carries an `outline` box; its geometry is untouched.
//!
//! QR codes and barcodes are placeholders sized to their box. Real symbol
//! encoding happens in the print service.

pub mod bounds;
pub mod raster;

use serde::Serialize;

use crate::element::{Element, ElementId, ElementKind, FontWeight};
use crate::template::{LabelSettings, Template};
use bounds::{BoundingBox, CELL_HEIGHT, CELL_WIDTH, HIT_TOLERANCE, Point, element_bounds};

/// What to draw for one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    /// Literal text, top-left anchored at the node origin.
    Text {
        content: String,
        font_size: i32,
        font_weight: FontWeight,
        color: String,
    },
    /// Square QR stand-in filling the node box.
    QrPlaceholder { data: String },
    /// Barcode stand-in filling the node box.
    BarcodePlaceholder { data: String },
    /// A single glyph at `size`.
    Glyph { icon: String, size: i32 },
    /// Line segment between two absolute points.
    Segment {
        from: Point,
        to: Point,
        thickness: i32,
        color: String,
    },
    /// Bordered and/or filled box filling the node box.
    Box {
        fill_color: String,
        border_color: String,
        border_width: i32,
    },
    /// `rows × cols` grid, `cells` already padded/truncated to that shape.
    Grid {
        rows: usize,
        cols: usize,
        cell_width: i32,
        cell_height: i32,
        cells: Vec<Vec<String>>,
    },
}

/// One drawable element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub element_id: ElementId,
    /// Same box hit-testing uses.
    pub bounds: BoundingBox,
    pub shape: Shape,
    /// Selection outline, present only on the selected node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<BoundingBox>,
}

impl Node {
    pub fn is_selected(&self) -> bool {
        self.outline.is_some()
    }
}

/// The full visual tree of a label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: i32,
    pub height: i32,
    pub margin: i32,
    pub nodes: Vec<Node>,
}

impl Scene {
    /// Node for `id`, if it is on the canvas.
    pub fn node(&self, id: &ElementId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.element_id == id)
    }

    pub fn selected(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_selected())
    }
}

/// Render a template into a scene.
pub fn render(template: &Template) -> Scene {
    let LabelSettings {
        width,
        height,
        margin,
    } = template.settings();
    let selected = template.selected_id();

    let nodes = template
        .elements()
        .iter()
        .map(|el| render_element(el, selected == Some(&el.id)))
        .collect();

    Scene {
        width,
        height,
        margin,
        nodes,
    }
}

/// Render a single element.
pub fn render_element(element: &Element, selected: bool) -> Node {
    let bounds = element_bounds(element);
    let shape = match &element.kind {
        ElementKind::Text(t) => Shape::Text {
            content: t.text.clone(),
            font_size: t.font_size,
            font_weight: t.font_weight,
            color: t.color.clone(),
        },
        ElementKind::Qr(q) => Shape::QrPlaceholder {
            data: q.data.clone(),
        },
        ElementKind::Barcode(b) => Shape::BarcodePlaceholder {
            data: b.data.clone(),
        },
        ElementKind::Icon(i) => Shape::Glyph {
            icon: i.icon.clone(),
            size: i.size,
        },
        ElementKind::Line(l) => Shape::Segment {
            from: Point::new(element.x, element.y),
            to: Point::new(l.x2, l.y2),
            thickness: l.thickness.max(0),
            color: l.color.clone(),
        },
        ElementKind::Rect(r) => Shape::Box {
            fill_color: r.fill_color.clone(),
            border_color: r.border_color.clone(),
            border_width: r.border_width.max(0),
        },
        ElementKind::Table(t) => {
            let (rows, cols) = t.dims();
            let cells = (0..rows)
                .map(|r| (0..cols).map(|c| t.cell(r, c).to_string()).collect())
                .collect();
            Shape::Grid {
                rows,
                cols,
                cell_width: CELL_WIDTH,
                cell_height: CELL_HEIGHT,
                cells,
            }
        }
    };

    Node {
        element_id: element.id.clone(),
        bounds,
        shape,
        outline: selected.then(|| bounds.expand(HIT_TOLERANCE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementType, Table};
    use crate::template::ElementField;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_is_idempotent() {
        let mut t = Template::from_starter("device").unwrap();
        t.add_element(ElementType::Barcode);
        assert_eq!(render(&t), render(&t));
    }

    #[test]
    fn test_settings_carried() {
        let scene = render(&Template::new());
        assert_eq!((scene.width, scene.height, scene.margin), (200, 62, 5));
        assert!(scene.nodes.is_empty());
    }

    #[test]
    fn test_selected_outline_keeps_geometry() {
        let mut t = Template::new();
        let id = t.add_element(ElementType::Rect).id.clone();
        let selected = render(&t);
        t.clear_selection();
        let plain = render(&t);

        let a = selected.node(&id).unwrap();
        let b = plain.node(&id).unwrap();
        assert!(a.is_selected());
        assert!(!b.is_selected());
        assert_eq!(a.bounds, b.bounds);
        assert_eq!(a.shape, b.shape);
        assert_eq!(a.outline, Some(a.bounds.expand(HIT_TOLERANCE)));
    }

    #[test]
    fn test_z_order_follows_elements() {
        let mut t = Template::new();
        let first = t.add_element(ElementType::Text).id.clone();
        let second = t.add_element(ElementType::Qr).id.clone();
        let scene = render(&t);
        assert_eq!(scene.nodes[0].element_id, first);
        assert_eq!(scene.nodes[1].element_id, second);
        assert_eq!(scene.selected().map(|n| &n.element_id), Some(&second));
    }

    #[test]
    fn test_table_grid_padded_and_truncated() {
        let el = Element::new(
            0,
            0,
            ElementKind::Table(Table {
                rows: 2,
                cols: 2,
                data: vec![
                    vec!["a".into(), "b".into(), "extra".into()],
                ],
            }),
        );
        let node = render_element(&el, false);
        match node.shape {
            Shape::Grid { rows, cols, cells, .. } => {
                assert_eq!((rows, cols), (2, 2));
                assert_eq!(cells, vec![vec!["a", "b"], vec!["", ""]]);
            }
            other => panic!("expected grid, got {:?}", other),
        }
    }

    #[test]
    fn test_line_segment_endpoints() {
        let mut t = Template::new();
        let id = t.add_element_at(ElementType::Line, 5, 5).id.clone();
        t.set_element_property(&id, ElementField::Y2, "30".into());
        let scene = render(&t);
        match &scene.nodes[0].shape {
            Shape::Segment { from, to, .. } => {
                assert_eq!(*from, Point::new(5, 5));
                assert_eq!(*to, Point::new(55, 30));
            }
            other => panic!("expected segment, got {:?}", other),
        }
    }

    #[test]
    fn test_hit_test_matches_rendered_bounds() {
        let t = Template::from_starter("warning").unwrap();
        let scene = render(&t);
        for node in &scene.nodes {
            // Center of a node resolves to that node or one drawn above it.
            let center = Point::new(
                node.bounds.x + node.bounds.width / 2,
                node.bounds.y + node.bounds.height / 2,
            );
            let hit = t.hit_test(center).expect("center must hit");
            let hit_index = scene.nodes.iter().position(|n| n.element_id == hit.id).unwrap();
            let node_index = scene.nodes.iter().position(|n| n.element_id == node.element_id).unwrap();
            assert!(hit_index >= node_index);
        }
    }
}
