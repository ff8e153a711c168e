//! Software painter for the icon view
//!
//! Draws one frame from [`IconView::render_items`] with tiny-skia: label
//! boxes, icons (or a placeholder glyph when no image is cached), state
//! decorations, the rubber band and the drop highlight. Glyphs are not
//! rasterised here; a text backend draws [`RenderItem::lines`] on top.

use anyhow::{anyhow, Result};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect,
    Stroke, StrokeDash, Transform,
};
use tracing::warn;

use crate::config::{Colors, Config};
use crate::geometry;
use crate::view::{IconView, ItemState, RenderItem};

/// Opacity multiplier for insensitive items
const INSENSITIVE_OPACITY: f32 = 0.5;

pub struct Painter {
    label_radius: f32,
    label_fg: Color,
    label_bg: Color,
    label_shadow: Color,
    selection: Color,
    focus: Color,
    rubber_band: Color,
    drop_highlight: Color,
}

impl Painter {
    pub fn new(config: &Config) -> Self {
        let defaults = Colors::default();
        let colors = &config.colors;
        let pick = |value: &str, fallback: &str| {
            parse_color(value).unwrap_or_else(|| {
                warn!("Invalid color {:?}, using {}", value, fallback);
                parse_color(fallback).unwrap_or(Color::WHITE)
            })
        };

        Self {
            label_radius: config.style.label_radius,
            label_fg: pick(&colors.label_fg, &defaults.label_fg),
            label_bg: pick(&colors.label_bg, &defaults.label_bg),
            label_shadow: pick(&colors.label_shadow, &defaults.label_shadow),
            selection: pick(&colors.selection, &defaults.selection),
            focus: pick(&colors.focus, &defaults.focus),
            rubber_band: pick(&colors.rubber_band, &defaults.rubber_band),
            drop_highlight: pick(&colors.drop_highlight, &defaults.drop_highlight),
        }
    }

    /// Colour a text backend should use for label glyphs and their shadow
    pub fn label_colors(&self) -> (Color, Color) {
        (self.label_fg, self.label_shadow)
    }

    /// Render the whole view into a new pixmap of the view's size
    pub fn render_frame(&self, view: &IconView) -> Result<Pixmap> {
        let (width, height) = view.size();
        let mut pixmap = Pixmap::new(width.max(1), height.max(1))
            .ok_or_else(|| anyhow!("Failed to create {}x{} pixmap", width, height))?;
        self.paint(view, &mut pixmap);
        Ok(pixmap)
    }

    /// Paint the view over a transparent background
    pub fn paint(&self, view: &IconView, pixmap: &mut Pixmap) {
        pixmap.fill(Color::TRANSPARENT);

        for item in view.render_items() {
            self.draw_item(pixmap, &item);
        }
        if let Some(slot) = view.drop_highlight_rect() {
            self.draw_drop_highlight(pixmap, slot);
        }
        if let Some(band) = view.rubber_band() {
            self.draw_rubber_band(pixmap, band);
        }
    }

    fn draw_item(&self, pixmap: &mut Pixmap, item: &RenderItem) {
        let selected = item.state.contains(ItemState::SELECTED);
        let mut opacity = item.opacity.clamp(0.0, 1.0);
        if item.state.contains(ItemState::INSENSITIVE) {
            opacity *= INSENSITIVE_OPACITY;
        }

        if selected {
            if let Some(path) = rounded_rect(item.icon_rect, self.label_radius) {
                fill(pixmap, &path, self.selection);
            }
        }

        match &item.icon {
            Some(image) => {
                let icon = item.icon_rect;
                let x = icon.x + (icon.width - image.width() as i32) / 2;
                let y = icon.y + (icon.height - image.height() as i32) / 2;
                let paint = PixmapPaint {
                    opacity,
                    ..Default::default()
                };
                pixmap.draw_pixmap(x, y, Pixmap::as_ref(image), &paint, Transform::identity(), None);
            }
            None => {
                let folder = item.icon_name.as_deref() == Some("folder");
                self.draw_placeholder(pixmap, item.icon_rect, folder, opacity);
            }
        }

        if item.state.contains(ItemState::PRELIT) {
            if let Some(path) = rounded_rect(item.icon_rect, self.label_radius) {
                fill(pixmap, &path, Color::from_rgba8(255, 255, 255, 48));
            }
        }

        if !item.text_rect.is_empty() {
            let background = if selected { self.selection } else { self.label_bg };
            if let Some(path) = rounded_rect(item.text_rect, self.label_radius) {
                fill(pixmap, &path, background);
            }
            if item.state.contains(ItemState::FOCUSED) {
                self.draw_focus_ring(pixmap, item.text_rect);
            }
        }
    }

    /// Document or folder outline standing in for an unresolved icon
    fn draw_placeholder(&self, pixmap: &mut Pixmap, area: geometry::Rect, folder: bool, opacity: f32) {
        let alpha = (255.0 * opacity) as u8;
        let margin = area.width as f32 / 6.0;
        let size = area.width as f32 - margin * 2.0;
        let (x, y) = (area.x as f32 + margin, area.y as f32 + margin);

        let mut pb = PathBuilder::new();
        if folder {
            pb.move_to(x, y + size * 0.15);
            pb.line_to(x + size * 0.4, y + size * 0.15);
            pb.line_to(x + size * 0.5, y);
            pb.line_to(x + size, y);
            pb.line_to(x + size, y + size);
            pb.line_to(x, y + size);
        } else {
            let fold = size * 0.25;
            pb.move_to(x, y);
            pb.line_to(x + size - fold, y);
            pb.line_to(x + size, y + fold);
            pb.line_to(x + size, y + size);
            pb.line_to(x, y + size);
        }
        pb.close();

        let color = if folder {
            Color::from_rgba8(229, 192, 123, alpha)
        } else {
            Color::from_rgba8(171, 178, 191, alpha)
        };
        if let Some(path) = pb.finish() {
            fill(pixmap, &path, color);
        }
    }

    fn draw_focus_ring(&self, pixmap: &mut Pixmap, area: geometry::Rect) {
        let Some(path) = rounded_rect(area, self.label_radius) else {
            return;
        };
        let stroke = Stroke {
            width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            dash: StrokeDash::new(vec![2.0, 2.0], 0.0),
            ..Default::default()
        };
        stroke_path(pixmap, &path, self.focus, &stroke);
    }

    fn draw_rubber_band(&self, pixmap: &mut Pixmap, band: geometry::Rect) {
        let Some(rect) = to_skia(band) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(self.rubber_band);
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);

        let mut outline = self.rubber_band;
        outline.set_alpha(1.0);
        let path = PathBuilder::from_rect(rect);
        stroke_path(pixmap, &path, outline, &Stroke::default());
    }

    fn draw_drop_highlight(&self, pixmap: &mut Pixmap, slot: geometry::Rect) {
        if let Some(path) = rounded_rect(slot.shrink(1), self.label_radius) {
            let stroke = Stroke {
                width: 2.0,
                ..Default::default()
            };
            stroke_path(pixmap, &path, self.drop_highlight, &stroke);
        }
    }
}

fn to_skia(rect: geometry::Rect) -> Option<Rect> {
    Rect::from_xywh(rect.x as f32, rect.y as f32, rect.width as f32, rect.height as f32)
}

fn fill(pixmap: &mut Pixmap, path: &Path, color: Color) {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn stroke_path(pixmap: &mut Pixmap, path: &Path, color: Color, stroke: &Stroke) {
    let mut paint = Paint::default();
    paint.set_color(color);
    pixmap.stroke_path(path, &paint, stroke, Transform::identity(), None);
}

/// Rectangle with quadratic corners of `radius`
fn rounded_rect(rect: geometry::Rect, radius: f32) -> Option<Path> {
    let r = to_skia(rect)?;
    let radius = radius.clamp(0.0, r.width().min(r.height()) / 2.0);
    if radius == 0.0 {
        return Some(PathBuilder::from_rect(r));
    }

    let (left, top, right, bottom) = (r.left(), r.top(), r.right(), r.bottom());
    let mut pb = PathBuilder::new();
    pb.move_to(left + radius, top);
    pb.line_to(right - radius, top);
    pb.quad_to(right, top, right, top + radius);
    pb.line_to(right, bottom - radius);
    pb.quad_to(right, bottom, right - radius, bottom);
    pb.line_to(left + radius, bottom);
    pb.quad_to(left, bottom, left, bottom - radius);
    pb.line_to(left, top + radius);
    pb.quad_to(left, top, left + radius, top);
    pb.close();
    pb.finish()
}

/// Parse a color string (`#rrggbb` or `#rrggbbaa`)
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim_start_matches('#');
    if !s.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

    match s.len() {
        6 => Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, 255)),
        8 => Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::grid::Slot;
    use crate::view::tests::{populated, test_config};
    use crate::view::{Button, Modifiers};

    fn alpha_at(pixmap: &Pixmap, p: Point) -> u8 {
        pixmap.pixel(p.x as u32, p.y as u32).unwrap().alpha()
    }

    #[test]
    fn test_parse_color() {
        let c = parse_color("#ff8000").unwrap();
        assert_eq!(c.to_color_u8().red(), 255);
        assert_eq!(c.to_color_u8().alpha(), 255);
        assert_eq!(parse_color("00000080").unwrap().to_color_u8().alpha(), 128);
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("#gg0000").is_none());
    }

    #[test]
    fn test_frame_matches_view_size() {
        let (view, _) = populated(2, 3, &["a"]);
        let frame = Painter::new(&test_config()).render_frame(&view).unwrap();
        assert_eq!((frame.width(), frame.height()), view.size());
    }

    #[test]
    fn test_items_and_empty_slots() {
        let (view, _) = populated(2, 2, &["a"]);
        let frame = Painter::new(&test_config()).render_frame(&view).unwrap();
        let a = view.item_at_slot(Slot::new(0, 0)).unwrap();
        let icon = view.item_extents(a).unwrap().icon;
        let text = view.item_extents(a).unwrap().text;

        // placeholder glyph and label box are painted
        assert!(alpha_at(&frame, Point::new(icon.x + icon.width / 2, icon.y + icon.height / 2)) > 0);
        assert!(alpha_at(&frame, Point::new(text.x + text.width / 2, text.y + text.height / 2)) > 0);

        // an empty slot stays transparent
        let empty = view.geometry().slot_rect(Slot::new(1, 1));
        assert_eq!(alpha_at(&frame, Point::new(empty.x + 50, empty.y + 50)), 0);
    }

    #[test]
    fn test_rubber_band_is_painted() {
        let (mut view, _) = populated(2, 2, &[]);
        view.button_press(20, 20, Button::Primary, Modifiers::empty(), 1);
        view.motion(120, 120);
        let frame = Painter::new(&test_config()).render_frame(&view).unwrap();
        assert!(alpha_at(&frame, Point::new(70, 70)) > 0);
        assert_eq!(alpha_at(&frame, Point::new(150, 150)), 0);
    }
}
