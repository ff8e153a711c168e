//! Items and their cached geometry

use std::rc::Rc;

use tiny_skia::Pixmap;

use super::ItemId;
use crate::config::Style;
use crate::geometry::Rect;
use crate::grid::Slot;
use crate::model::{ItemRef, RowData};
use crate::text::{layout_label, TextMeasurer};

/// Lines shown for an unselected label
const COLLAPSED_LABEL_LINES: usize = 2;

/// Cell measurements resolved from style, icon size and font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellMetrics {
    pub icon_size: u32,
    pub padding: u32,
    pub spacing: u32,
    pub text_width: u32,
    pub line_height: u32,
    pub ellipsize: bool,
}

impl CellMetrics {
    pub fn new(icon_size: u32, style: &Style, measurer: &dyn TextMeasurer) -> Self {
        Self {
            icon_size,
            padding: style.cell_padding,
            spacing: style.cell_spacing,
            text_width: (icon_size as f32 * style.text_width_ratio.max(0.1)).round() as u32,
            line_height: measurer.line_height(),
            ellipsize: style.ellipsize_labels,
        }
    }

    /// Square slot fitting the icon, a two-line label and padding
    pub fn slot_size(&self) -> u32 {
        let wide = self.text_width + 2 * self.padding;
        let tall =
            3 * self.padding + self.icon_size + self.spacing + COLLAPSED_LABEL_LINES as u32 * self.line_height;
        wide.max(tall)
    }
}

/// Pixel geometry of a placed item
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemExtents {
    pub icon: Rect,
    /// Label box, including its padding
    pub text: Rect,
    /// Icon and label, clipped to the slot; used for hit testing
    pub hit: Rect,
    /// Label as displayed
    pub lines: Vec<String>,
}

impl ItemExtents {
    pub(crate) fn compute(
        metrics: &CellMetrics,
        measurer: &dyn TextMeasurer,
        slot: Rect,
        label: &str,
        selected: bool,
    ) -> Self {
        let size = metrics.icon_size as i32;
        let pad = metrics.padding as i32;
        let icon = Rect::new(slot.x + (slot.width - size) / 2, slot.y + pad, size, size);

        // selected labels show in full
        let (max_lines, ellipsize) = if selected {
            (None, false)
        } else {
            (Some(COLLAPSED_LABEL_LINES), metrics.ellipsize)
        };
        let layout = layout_label(measurer, label, metrics.text_width, max_lines, ellipsize);

        let text = if layout.lines.is_empty() {
            Rect::empty()
        } else {
            let width = layout.width as i32 + pad;
            let height = layout.height as i32 + pad;
            Rect::new(
                slot.x + (slot.width - width) / 2,
                icon.bottom() + metrics.spacing as i32,
                width,
                height,
            )
        };

        let hit = icon.union(&text).intersection(&slot).unwrap_or_default();

        Self {
            icon,
            text,
            hit,
            lines: layout.lines,
        }
    }

    /// Everything painted for the item; selected labels may overflow the slot
    pub fn bounds(&self) -> Rect {
        self.icon.union(&self.text)
    }
}

/// A rendered icon and the cache generation it came from
#[derive(Clone)]
pub(crate) struct CachedIcon {
    pub pixmap: Rc<Pixmap>,
    pub generation: u64,
}

pub(crate) struct Item {
    pub id: ItemId,
    pub reference: ItemRef,
    pub data: RowData,
    /// Current slot; `Some` exactly when the grid cell points back here
    pub slot: Option<Slot>,
    /// Slot the item returns to when the grid is rebuilt
    pub home: Option<Slot>,
    pub selected: bool,
    pub extents: ItemExtents,
    pub icon: Option<CachedIcon>,
}

impl Item {
    pub fn new(id: ItemId, reference: ItemRef, data: RowData) -> Self {
        Self {
            id,
            reference,
            home: data.position,
            data,
            slot: None,
            selected: false,
            extents: ItemExtents::default(),
            icon: None,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.slot.is_some()
    }

    /// Can be selected, hovered and dragged
    pub fn is_interactive(&self) -> bool {
        self.is_placed() && self.data.sensitive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::FixedMeasurer;

    fn metrics() -> CellMetrics {
        CellMetrics {
            icon_size: 48,
            padding: 6,
            spacing: 2,
            text_width: 84,
            line_height: 16,
            ellipsize: true,
        }
    }

    fn measurer() -> FixedMeasurer {
        FixedMeasurer {
            advance: 7,
            line_height: 16,
        }
    }

    #[test]
    fn test_icon_centered_at_top() {
        let e = ItemExtents::compute(&metrics(), &measurer(), Rect::new(0, 0, 100, 100), "x", false);
        assert_eq!(e.icon, Rect::new(26, 6, 48, 48));
        assert_eq!(e.text.y, 56);
    }

    #[test]
    fn test_unselected_label_is_collapsed() {
        let label = "a very long label that needs more than two lines";
        let slot = Rect::new(0, 0, 100, 100);
        let collapsed = ItemExtents::compute(&metrics(), &measurer(), slot, label, false);
        let full = ItemExtents::compute(&metrics(), &measurer(), slot, label, true);
        assert_eq!(collapsed.lines.len(), 2);
        assert!(full.lines.len() > 2);
        assert!(full.text.height > collapsed.text.height);
    }

    #[test]
    fn test_hit_region_clipped_to_slot() {
        let label = "a very long label that needs more than two lines";
        let slot = Rect::new(100, 100, 100, 100);
        let e = ItemExtents::compute(&metrics(), &measurer(), slot, label, true);
        assert!(e.bounds().bottom() > slot.bottom());
        assert!(e.hit.bottom() <= slot.bottom());
    }

    #[test]
    fn test_empty_label_has_no_text_rect() {
        let e = ItemExtents::compute(&metrics(), &measurer(), Rect::new(0, 0, 100, 100), "", false);
        assert!(e.text.is_empty());
        assert_eq!(e.hit, e.icon);
    }

    #[test]
    fn test_slot_size() {
        assert_eq!(metrics().slot_size(), 100);
    }
}
