//! # Scene to PNG Rasterizer
//!
//! Draws a [`Scene`] into a grayscale bitmap for an offline preview. This is
//! an approximation of what the print service produces, not a reproduction:
//! codes are encoded for real but stretched to the element box, and text uses
//! the Spleen bitmap font stretched to the same box the hit-tester uses.
//!
//! ```text
//! Scene ──▶ Rasterizer (scale px per canvas unit)
//!              ├─ Box / Grid / Segment: filled and stroked primitives
//!              ├─ Text / Glyph: Spleen glyphs, nearest-neighbor scaled
//!              ├─ QR / Barcode: qrcode / Code 128 modules, placeholder if unencodable
//!              └─ selection: dashed gray outline
//!           ──▶ PNG bytes
//! ```

use barcoders::sym::code128::Code128;
use image::{GrayImage, ImageEncoder, Luma};
use qrcode::{EcLevel, QrCode};
use spleen_font::{FONT_6X12, FONT_12X24, PSF2Font};
use thiserror::Error;

use super::bounds::{BOLD_WIDTH_RATIO, BoundingBox, GLYPH_WIDTH_RATIO, Point, text_extent};
use super::{Node, Scene, Shape};
use crate::element::FontWeight;

/// Pixels per canvas unit when no scale is given.
pub const DEFAULT_SCALE: u32 = 4;

/// Largest bitmap side we are willing to allocate.
const MAX_SIDE_PX: u32 = 8192;

/// Font size used for table cell text.
const CELL_FONT_SIZE: i32 = 10;

const WHITE: u8 = 255;
const BLACK: u8 = 0;
const OUTLINE_GRAY: u8 = 128;

/// Errors that can occur while rasterizing a scene.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    #[error("Font error: {0}")]
    Font(String),
}

/// Render a scene to PNG bytes at [`DEFAULT_SCALE`].
pub fn to_png(scene: &Scene) -> Result<Vec<u8>, RasterError> {
    to_png_scaled(scene, DEFAULT_SCALE)
}

/// Render a scene to PNG bytes at `scale` pixels per canvas unit.
pub fn to_png_scaled(scene: &Scene, scale: u32) -> Result<Vec<u8>, RasterError> {
    let img = rasterize(scene, scale)?;

    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .map_err(|e: image::ImageError| RasterError::ImageEncode(e.to_string()))?;

    Ok(png_bytes)
}

/// Render a scene to a grayscale bitmap.
pub fn rasterize(scene: &Scene, scale: u32) -> Result<GrayImage, RasterError> {
    let mut r = Rasterizer::new(scene.width, scene.height, scale)?;
    for node in &scene.nodes {
        r.draw_node(node);
    }
    for node in scene.nodes.iter().filter(|n| n.is_selected()) {
        if let Some(outline) = node.outline {
            r.dashed_outline(outline);
        }
    }
    Ok(r.img)
}

struct Rasterizer {
    img: GrayImage,
    scale: i64,
}

/// Half-open pixel span `[start, end)` of `start..start + len` clipped to `0..limit`.
fn clip_span(start: i64, len: i64, limit: i64) -> (i64, i64) {
    (start.max(0), start.saturating_add(len).min(limit))
}

/// Parameter interval over which `a + d·t` stays within `h` of `p`.
fn axis_window(p: f64, a: f64, d: f64, h: f64) -> (f64, f64) {
    if d == 0.0 {
        if (p - a).abs() <= h {
            (f64::NEG_INFINITY, f64::INFINITY)
        } else {
            (f64::INFINITY, f64::NEG_INFINITY)
        }
    } else {
        let t0 = (p - h - a) / d;
        let t1 = (p + h - a) / d;
        (t0.min(t1), t0.max(t1))
    }
}

impl Rasterizer {
    fn new(width: i32, height: i32, scale: u32) -> Result<Self, RasterError> {
        let scale = scale.clamp(1, 32);
        let side = |units: i32| (units.max(1) as u32).saturating_mul(scale).min(MAX_SIDE_PX);
        let img = GrayImage::from_pixel(side(width), side(height), Luma([WHITE]));
        for data in [FONT_6X12, FONT_12X24] {
            PSF2Font::new(data).map_err(|e| RasterError::Font(format!("{:?}", e)))?;
        }
        Ok(Self {
            img,
            scale: i64::from(scale),
        })
    }

    fn width(&self) -> i64 {
        i64::from(self.img.width())
    }

    fn height(&self) -> i64 {
        i64::from(self.img.height())
    }

    /// Canvas units to pixels.
    fn px(&self, units: i32) -> i64 {
        i64::from(units) * self.scale
    }

    fn put(&mut self, x: i64, y: i64, luma: u8) {
        if x >= 0 && y >= 0 && x < self.width() && y < self.height() {
            self.img.put_pixel(x as u32, y as u32, Luma([luma]));
        }
    }

    /// Fill a pixel-space rectangle, clipped to the image.
    fn fill_px(&mut self, x: i64, y: i64, w: i64, h: i64, luma: u8) {
        let (x0, x1) = clip_span(x, w, self.width());
        let (y0, y1) = clip_span(y, h, self.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.img.put_pixel(px as u32, py as u32, Luma([luma]));
            }
        }
    }

    /// Stroke the inside edge of a pixel-space rectangle.
    fn stroke_px(&mut self, x: i64, y: i64, w: i64, h: i64, line: i64, luma: u8) {
        if line <= 0 {
            return;
        }
        self.fill_px(x, y, w, line, luma);
        self.fill_px(x, y + h - line, w, line, luma);
        self.fill_px(x, y, line, h, luma);
        self.fill_px(x + w - line, y, line, h, luma);
    }

    fn draw_node(&mut self, node: &Node) {
        let b = node.bounds;
        let (x, y, w, h) = (self.px(b.x), self.px(b.y), self.px(b.width), self.px(b.height));
        match &node.shape {
            Shape::Text {
                content,
                font_size,
                font_weight,
                color,
            } => {
                let luma = color_luma(color).unwrap_or(BLACK);
                self.draw_text(x, y, content, *font_size, *font_weight, luma);
            }
            Shape::QrPlaceholder { data } => match qr_modules(data) {
                Some((width, modules)) => self.draw_qr(x, y, w.min(h), width, &modules),
                None => self.draw_qr_placeholder(x, y, w, h),
            },
            Shape::BarcodePlaceholder { data } => match code128_bars(data) {
                Some(bars) => self.draw_bars(x, y, w, h, &bars),
                None => self.draw_barcode_placeholder(x, y, w, h, data),
            },
            Shape::Glyph { icon, size } => {
                let side = self.px(*size);
                self.draw_glyph_box(x, y, side, side, icon, BLACK, false)
            }
            Shape::Segment {
                from,
                to,
                thickness,
                color,
            } => {
                let luma = color_luma(color).unwrap_or(BLACK);
                self.draw_segment(*from, *to, (*thickness).max(1), luma);
            }
            Shape::Box {
                fill_color,
                border_color,
                border_width,
            } => {
                if let Some(fill) = color_luma(fill_color) {
                    self.fill_px(x, y, w, h, fill);
                }
                if let Some(border) = color_luma(border_color) {
                    let line = self.px(*border_width);
                    self.stroke_px(x, y, w, h, line, border);
                }
            }
            Shape::Grid {
                rows,
                cols,
                cell_width,
                cell_height,
                cells,
            } => {
                let (cw, ch) = (self.px(*cell_width), self.px(*cell_height));
                let inset = self.px(1);
                for r in 0..*rows {
                    for c in 0..*cols {
                        let px = x + c as i64 * cw;
                        let py = y + r as i64 * ch;
                        self.stroke_px(px, py, cw + 1, ch + 1, 1, BLACK);
                        let text = cells
                            .get(r)
                            .and_then(|row| row.get(c))
                            .map(String::as_str)
                            .unwrap_or("");
                        let fit = fit_chars(text, cell_width.saturating_sub(2), CELL_FONT_SIZE);
                        self.draw_text(
                            px + inset,
                            py + inset,
                            &fit,
                            CELL_FONT_SIZE,
                            FontWeight::Normal,
                            BLACK,
                        );
                    }
                }
            }
        }
    }

    /// Draw one line of text with its top-left corner at pixel `(x, y)`.
    fn draw_text(&mut self, x: i64, y: i64, content: &str, font_size: i32, weight: FontWeight, luma: u8) {
        if font_size <= 0 {
            return;
        }
        let (_, line_h) = text_extent("x", font_size, FontWeight::Normal);
        let glyph_h = self.px(line_h);
        if y >= self.height() || y.saturating_add(glyph_h) <= 0 {
            return;
        }
        let bold = weight == FontWeight::Bold;
        let mut advance = (font_size as f64 * GLYPH_WIDTH_RATIO as f64 * self.scale as f64).max(1.0);
        if bold {
            advance *= BOLD_WIDTH_RATIO as f64;
        }
        let gw = advance.ceil() as i64;
        let mut pen_x = x as f64;
        for ch in content.chars() {
            if pen_x >= self.width() as f64 {
                break;
            }
            if !ch.is_whitespace() && pen_x + advance > 0.0 {
                self.draw_glyph_box(pen_x as i64, y, gw, glyph_h, &ch.to_string(), luma, bold);
            }
            pen_x += advance;
        }
    }

    /// Stretch a single character's glyph into a `w × h` pixel box.
    /// Unknown characters draw as an outlined box.
    #[allow(clippy::too_many_arguments)]
    fn draw_glyph_box(&mut self, x: i64, y: i64, w: i64, h: i64, text: &str, luma: u8, bold: bool) {
        if w <= 0 || h <= 0 {
            return;
        }
        let Some(ch) = text.chars().next() else {
            return;
        };
        let (src_w, src_h, data) = if h >= 24 {
            (12usize, 24usize, FONT_12X24)
        } else {
            (6, 12, FONT_6X12)
        };
        let mut bitmap = vec![false; src_w * src_h];
        let mut found = false;
        if let Ok(mut spleen) = PSF2Font::new(data) {
            let utf8 = ch.to_string();
            if let Some(glyph) = spleen.glyph_for_utf8(utf8.as_bytes()) {
                found = true;
                for (row_y, row) in glyph.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        if row_y < src_h && col_x < src_w {
                            bitmap[row_y * src_w + col_x] = on;
                        }
                    }
                }
            }
        }
        if !found {
            self.stroke_px(x, y, w, h, (w / 10).max(1), luma);
            return;
        }

        // Only the part of the box inside the image is visited.
        let (x0, x1) = clip_span(x, w, self.width());
        let (y0, y1) = clip_span(y, h, self.height());
        for py in y0..y1 {
            let sy = ((py - y) as i128 * src_h as i128 / h as i128) as usize;
            for px in x0..x1 {
                let sx = ((px - x) as i128 * src_w as i128 / w as i128) as usize;
                if bitmap.get(sy * src_w + sx).copied().unwrap_or(false) {
                    self.put(px, py, luma);
                    if bold {
                        self.put(px + 1, py, luma);
                    }
                }
            }
        }
    }

    /// Sweep a square pen of `thickness` units from `from` to `to`.
    ///
    /// Each pixel inside the segment's clipped bounding box is tested against
    /// the swept square, so the cost is bounded by the image size.
    fn draw_segment(&mut self, from: Point, to: Point, thickness: i32, luma: u8) {
        let (x0, y0) = (self.px(from.x) as f64, self.px(from.y) as f64);
        let (x1, y1) = (self.px(to.x) as f64, self.px(to.y) as f64);
        let half = (self.px(thickness).max(1) as f64) / 2.0;
        let (dx, dy) = (x1 - x0, y1 - y0);

        let clip = |lo: f64, hi: f64, limit: i64| {
            let start = (lo - half).floor().max(0.0);
            let end = (hi + half).ceil().min(limit as f64);
            (start as i64, end as i64)
        };
        let (bx0, bx1) = clip(x0.min(x1), x0.max(x1), self.width());
        let (by0, by1) = clip(y0.min(y1), y0.max(y1), self.height());

        for py in by0..by1 {
            let (ty0, ty1) = axis_window(py as f64 + 0.5, y0, dy, half);
            for px in bx0..bx1 {
                let (tx0, tx1) = axis_window(px as f64 + 0.5, x0, dx, half);
                let lo = tx0.max(ty0).max(0.0);
                let hi = tx1.min(ty1).min(1.0);
                if lo <= hi {
                    self.put(px, py, luma);
                }
            }
        }
    }

    /// Draw `width × width` QR modules (row-major, `true` = dark) into a
    /// `side`-pixel square.
    fn draw_qr(&mut self, x: i64, y: i64, side: i64, width: usize, modules: &[bool]) {
        if side <= 0 || width == 0 {
            return;
        }
        let n = width as i64;
        for qy in 0..n {
            for qx in 0..n {
                if modules[(qy * n + qx) as usize] {
                    let x0 = x + qx * side / n;
                    let y0 = y + qy * side / n;
                    let x1 = x + (qx + 1) * side / n;
                    let y1 = y + (qy + 1) * side / n;
                    self.fill_px(x0, y0, (x1 - x0).max(1), (y1 - y0).max(1), BLACK);
                }
            }
        }
    }

    /// Stretch encoded bars across a `w`-pixel span.
    fn draw_bars(&mut self, x: i64, y: i64, w: i64, h: i64, bars: &[bool]) {
        if w <= 0 || h <= 0 || bars.is_empty() {
            return;
        }
        let n = bars.len() as i64;
        for (i, _) in bars.iter().enumerate().filter(|(_, on)| **on) {
            let i = i as i64;
            let x0 = x + i * w / n;
            let x1 = x + (i + 1) * w / n;
            self.fill_px(x0, y, (x1 - x0).max(1), h, BLACK);
        }
    }

    fn draw_qr_placeholder(&mut self, x: i64, y: i64, w: i64, h: i64) {
        let side = w.min(h);
        if side <= 0 {
            return;
        }
        self.stroke_px(x, y, side, side, (side / 25).max(1), BLACK);
        let finder = side * 7 / 25;
        let line = (finder / 7).max(1);
        for (fx, fy) in [(x, y), (x + side - finder, y), (x, y + side - finder)] {
            self.stroke_px(fx, fy, finder, finder, line, BLACK);
            let inner = finder - 4 * line;
            if inner > 0 {
                self.fill_px(fx + 2 * line, fy + 2 * line, inner, inner, BLACK);
            }
        }
    }

    fn draw_barcode_placeholder(&mut self, x: i64, y: i64, w: i64, h: i64, data: &str) {
        if w <= 0 || h <= 0 {
            return;
        }
        let module = (self.scale / 2).max(1);
        let bits: Vec<bool> = data
            .bytes()
            .chain(std::iter::once(0xA5))
            .flat_map(|b| (0..8).rev().map(move |i| (b >> i) & 1 == 1))
            .collect();
        // Walk only the modules that land inside the image.
        let (x0, x1) = clip_span(x, w, self.width());
        let mut i = (x0 - x) / module;
        let mut px = x + i * module;
        while px < x1 {
            if bits[(i % bits.len() as i64) as usize] {
                self.fill_px(px, y, module, h, BLACK);
            }
            px += module;
            i += 1;
        }
    }

    fn dashed_outline(&mut self, b: BoundingBox) {
        let (x, y, w, h) = (self.px(b.x), self.px(b.y), self.px(b.width), self.px(b.height));
        let dash = 4;
        let (x0, x1) = clip_span(x, w.max(0), self.width());
        for px in x0..x1 {
            if ((px - x) / dash) % 2 == 0 {
                self.put(px, y, OUTLINE_GRAY);
                self.put(px, y + h, OUTLINE_GRAY);
            }
        }
        let (y0, y1) = clip_span(y, h.max(0), self.height());
        for py in y0..y1 {
            if ((py - y) / dash) % 2 == 0 {
                self.put(x, py, OUTLINE_GRAY);
                self.put(x + w, py, OUTLINE_GRAY);
            }
        }
    }
}

/// Encode `data` as QR modules: `(width, row-major dark flags)`.
fn qr_modules(data: &str) -> Option<(usize, Vec<bool>)> {
    if data.is_empty() {
        return None;
    }
    let code = QrCode::with_error_correction_level(data, EcLevel::M).ok()?;
    let width = code.width();
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();
    Some((width, modules))
}

/// Encode `data` as Code 128 (character set B) bars, `true` = bar.
fn code128_bars(data: &str) -> Option<Vec<bool>> {
    if data.is_empty() {
        return None;
    }
    let code = Code128::new(format!("\u{0181}{}", data)).ok()?;
    Some(code.encode().into_iter().map(|m| m == 1).collect())
}

/// Truncate `text` to the characters that fit `width` units at `font_size`.
fn fit_chars(text: &str, width: i32, font_size: i32) -> String {
    let per_char = font_size as f32 * GLYPH_WIDTH_RATIO;
    let max = if per_char > 0.0 {
        (width.max(0) as f32 / per_char).floor() as usize
    } else {
        0
    };
    text.chars().take(max).collect()
}

/// Map a CSS-like color value to a gray level. `None` means "draw nothing".
///
/// Accepts `#rgb`, `#rrggbb` and a few names; anything unparseable is black.
pub fn color_luma(color: &str) -> Option<u8> {
    let c = color.trim().to_ascii_lowercase();
    let rgb = match c.as_str() {
        "" | "none" | "transparent" => return None,
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        hex if hex.starts_with('#') => parse_hex(&hex[1..]).unwrap_or((0, 0, 0)),
        _ => (0, 0, 0),
    };
    let (r, g, b) = rgb;
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    Some(luma.round().clamp(0.0, 255.0) as u8)
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| channel(&format!("{c}{c}")));
            Some((it.next()??, it.next()??, it.next()??))
        }
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use crate::render::render;
    use crate::template::{ElementField, FieldValue, Template};

    fn dark_pixels(img: &GrayImage) -> usize {
        img.pixels().filter(|p| p[0] < 200).count()
    }

    #[test]
    fn test_empty_scene_is_white() {
        let img = rasterize(&render(&Template::new()), 2).unwrap();
        assert_eq!((img.width(), img.height()), (400, 124));
        assert_eq!(dark_pixels(&img), 0);
    }

    #[test]
    fn test_every_kind_draws_something() {
        for ty in ElementType::ALL {
            let mut t = Template::new();
            t.add_element(*ty);
            t.clear_selection();
            let img = rasterize(&render(&t), 2).unwrap();
            assert!(dark_pixels(&img) > 0, "{} drew nothing", ty);
        }
    }

    #[test]
    fn test_png_signature() {
        let t = Template::from_starter("text").unwrap();
        let png = to_png(&render(&t)).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_deterministic_output() {
        let t = Template::from_starter("cable").unwrap();
        assert_eq!(to_png(&render(&t)).unwrap(), to_png(&render(&t)).unwrap());
    }

    #[test]
    fn test_color_luma() {
        assert_eq!(color_luma("#000000"), Some(0));
        assert_eq!(color_luma("#fff"), Some(255));
        assert_eq!(color_luma("transparent"), None);
        assert_eq!(color_luma("chartreuse-ish"), Some(0));
    }

    #[test]
    fn test_codes_encode() {
        let (width, modules) = qr_modules("https://example.com").unwrap();
        assert_eq!(modules.len(), width * width);
        assert!(modules.iter().any(|m| *m));
        assert!(qr_modules("").is_none());

        let bars = code128_bars("123456789").unwrap();
        assert!(bars.first().copied().unwrap_or(false));
        assert!(code128_bars("").is_none());
    }

    #[test]
    fn test_unencodable_barcode_still_draws() {
        let mut t = Template::new();
        t.add_element(ElementType::Barcode);
        let id = t.elements()[0].id.clone();
        t.set_element_property(
            &id,
            ElementField::Data,
            "\u{2603}".into(),
        );
        t.clear_selection();
        assert!(code128_bars("\u{2603}").is_none());
        let img = rasterize(&render(&t), 2).unwrap();
        assert!(dark_pixels(&img) > 0);
    }

    /// Render one element of `ty` after integer edits, keeping it selected.
    fn render_edited(ty: ElementType, edits: &[(ElementField, i64)]) -> GrayImage {
        let mut t = Template::new();
        t.add_element(ty);
        let id = t.elements()[0].id.clone();
        for (field, value) in edits {
            t.set_element_property(&id, *field, FieldValue::Int(*value));
        }
        rasterize(&render(&t), 2).unwrap()
    }

    #[test]
    fn test_extreme_geometry_is_clipped() {
        let max = i64::from(i32::MAX);
        let min = i64::from(i32::MIN);
        let cases: Vec<(ElementType, Vec<(ElementField, i64)>)> = vec![
            (ElementType::Text, vec![(ElementField::FontSize, 1_000_000)]),
            (ElementType::Text, vec![(ElementField::FontSize, max), (ElementField::X, min)]),
            (ElementType::Rect, vec![(ElementField::Width, max), (ElementField::Height, max)]),
            (ElementType::Rect, vec![(ElementField::X, min), (ElementField::BorderWidth, max)]),
            (ElementType::Line, vec![(ElementField::X2, min), (ElementField::Y2, max)]),
            (ElementType::Qr, vec![(ElementField::Size, max)]),
            (ElementType::Qr, vec![(ElementField::X, max), (ElementField::Y, max)]),
            (ElementType::Barcode, vec![(ElementField::Width, max), (ElementField::X, min)]),
            (ElementType::Icon, vec![(ElementField::Size, max)]),
            (ElementType::Table, vec![(ElementField::Rows, max), (ElementField::X, max)]),
        ];
        for (ty, edits) in cases {
            let img = render_edited(ty, &edits);
            assert_eq!((img.width(), img.height()), (400, 124), "{} {:?}", ty, edits);
        }
    }

    #[test]
    fn test_thick_line_covers_canvas() {
        let img = render_edited(
            ElementType::Line,
            &[
                (ElementField::X2, i64::from(i32::MIN)),
                (ElementField::Thickness, i64::from(i32::MAX)),
            ],
        );
        assert_eq!(dark_pixels(&img), 400 * 124);
    }

    #[test]
    fn test_segment_matches_thickness() {
        let mut t = Template::new();
        t.add_element(ElementType::Line);
        let id = t.elements()[0].id.clone();
        for (field, value) in [
            (ElementField::X, 10),
            (ElementField::Y, 20),
            (ElementField::X2, 60),
            (ElementField::Y2, 20),
            (ElementField::Thickness, 2),
        ] {
            t.set_element_property(&id, field, FieldValue::Int(value));
        }
        t.clear_selection();
        let img = rasterize(&render(&t), 1).unwrap();
        let column: Vec<u32> = (0..img.height())
            .filter(|y| img.get_pixel(35, *y)[0] < 200)
            .collect();
        assert_eq!(column, vec![19, 20]);
        assert!(img.get_pixel(5, 20)[0] > 200);
        assert!(img.get_pixel(65, 20)[0] > 200);
    }

    #[test]
    fn test_fit_chars() {
        assert_eq!(fit_chars("abcdefghij", 38, 10), "abcdef");
        assert_eq!(fit_chars("abc", 0, 10), "");
    }
}
