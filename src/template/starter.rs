//! Built-in starter layouts.
//!
//! Each starter mirrors one of the fixed label types a Brother PT print
//! service offers (cable, device, warning, plain text), rebuilt as ordinary
//! editable elements on the default 200×62 canvas.

use crate::element::{Element, ElementKind, FontWeight, Icon, Line, Qr, Rect, Text};

use super::LabelSettings;

/// A named, ready-to-edit layout.
#[derive(Debug, Clone)]
pub struct Starter {
    pub name: &'static str,
    pub description: &'static str,
    pub settings: LabelSettings,
    pub elements: Vec<Element>,
}

/// Names accepted by [`by_name`], in menu order.
pub const STARTER_NAMES: &[&str] = &["cable", "device", "warning", "text"];

/// Look up a starter by name (case-insensitive).
pub fn by_name(name: &str) -> Option<Starter> {
    let starter = match name.trim().to_ascii_lowercase().as_str() {
        "cable" => cable(),
        "device" => device(),
        "warning" => warning(),
        "text" => text(),
        _ => return None,
    };
    Some(starter)
}

/// All starters, in menu order.
pub fn all() -> Vec<Starter> {
    STARTER_NAMES.iter().filter_map(|n| by_name(n)).collect()
}

fn text_at(x: i32, y: i32, content: &str, font_size: i32, font_weight: FontWeight) -> Element {
    Element::new(
        x,
        y,
        ElementKind::Text(Text {
            font_size,
            font_weight,
            ..Text::new(content)
        }),
    )
}

fn cable() -> Starter {
    Starter {
        name: "cable",
        description: "Cable type, voltage and destination",
        settings: LabelSettings::default(),
        elements: vec![
            text_at(10, 4, "CAT6 PATCH", 14, FontWeight::Bold),
            text_at(10, 23, "\u{26A1} 230V", 10, FontWeight::Normal),
            text_at(10, 38, "\u{2192} Rack A / U12", 9, FontWeight::Normal),
            Element::new(
                5,
                54,
                ElementKind::Line(Line {
                    x2: 195,
                    y2: 54,
                    thickness: 1,
                    color: crate::element::BLACK.to_string(),
                }),
            ),
        ],
    }
}

fn device() -> Starter {
    Starter {
        name: "device",
        description: "Device name, network addresses and a QR link",
        settings: LabelSettings::default(),
        elements: vec![
            text_at(8, 4, "SRV-01", 14, FontWeight::Bold),
            text_at(8, 24, "IP: 192.168.1.10", 10, FontWeight::Normal),
            text_at(8, 40, "MAC: ...A1B2C3", 9, FontWeight::Normal),
            Element::new(
                148,
                8,
                ElementKind::Qr(Qr {
                    data: "http://192.168.1.10".into(),
                    size: 44,
                }),
            ),
        ],
    }
}

fn warning() -> Starter {
    Starter {
        name: "warning",
        description: "Framed hazard warning with icons",
        settings: LabelSettings::default(),
        elements: vec![
            Element::new(
                2,
                2,
                ElementKind::Rect(Rect {
                    width: 196,
                    height: 58,
                    fill_color: "transparent".into(),
                    border_color: crate::element::BLACK.into(),
                    border_width: 2,
                }),
            ),
            Element::new(10, 18, ElementKind::Icon(Icon { size: 24, ..Icon::new("\u{26A0}") })),
            text_at(42, 12, "HIGH VOLTAGE", 12, FontWeight::Bold),
            text_at(58, 34, ">>> 400V <<<", 10, FontWeight::Normal),
            Element::new(166, 18, ElementKind::Icon(Icon { size: 24, ..Icon::new("\u{26A0}") })),
        ],
    }
}

fn text() -> Starter {
    Starter {
        name: "text",
        description: "One line of large text",
        settings: LabelSettings::default(),
        elements: vec![text_at(10, 18, "Label", 20, FontWeight::Bold)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::bounds::element_bounds;

    #[test]
    fn test_every_name_resolves() {
        for name in STARTER_NAMES {
            let starter = by_name(name).unwrap();
            assert_eq!(starter.name, *name);
            assert!(!starter.elements.is_empty());
        }
        assert_eq!(all().len(), STARTER_NAMES.len());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(by_name(" Warning ").is_some());
        assert!(by_name("shipping").is_none());
    }

    #[test]
    fn test_elements_fit_canvas() {
        for starter in all() {
            let s = starter.settings;
            for el in &starter.elements {
                let b = element_bounds(el);
                assert!(b.x >= 0 && b.y >= 0, "{}: {:?}", starter.name, b);
                assert!(b.right() <= s.width && b.bottom() <= s.height, "{}: {:?}", starter.name, b);
            }
        }
    }
}
