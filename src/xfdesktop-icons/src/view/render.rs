//! What a painter needs to draw the view
//!
//! The view hands out plain snapshots. Painters never reach into items.

use std::rc::Rc;

use bitflags::bitflags;
use tiny_skia::Pixmap;
use tracing::debug;

use super::item::CachedIcon;
use super::{IconView, ItemId};
use crate::geometry::Rect;
use crate::icons::IconCache;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ItemState: u8 {
        const SELECTED    = 0b0001;
        /// Under the pointer
        const PRELIT      = 0b0010;
        /// Keyboard cursor with a visible focus ring
        const FOCUSED     = 0b0100;
        const INSENSITIVE = 0b1000;
    }
}

/// One placed item, ready to paint
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub id: ItemId,
    pub icon_rect: Rect,
    pub text_rect: Rect,
    /// Label lines, already wrapped and ellipsized
    pub lines: Vec<String>,
    pub icon_name: Option<String>,
    pub opacity: f32,
    pub state: ItemState,
    pub icon: Option<Rc<Pixmap>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub icon: Option<String>,
    pub text: Option<String>,
    pub icon_size: u32,
    /// Rectangle the popup is anchored to
    pub anchor: Rect,
}

impl IconView {
    /// Placed items in model order
    pub fn render_items(&self) -> Vec<RenderItem> {
        self.collect_render_items(None)
    }

    /// Placed items touching `area`
    pub fn render_items_in(&self, area: Rect) -> Vec<RenderItem> {
        self.collect_render_items(Some(area))
    }

    fn collect_render_items(&self, area: Option<Rect>) -> Vec<RenderItem> {
        self.items
            .values()
            .filter(|item| item.is_placed())
            .filter(|item| area.map_or(true, |a| item.extents.bounds().intersects(&a)))
            .map(|item| {
                let mut state = ItemState::empty();
                state.set(ItemState::SELECTED, item.selected);
                state.set(ItemState::PRELIT, self.hovered == Some(item.id));
                state.set(
                    ItemState::FOCUSED,
                    self.has_focus && self.focus_ring && self.cursor == Some(item.id),
                );
                state.set(ItemState::INSENSITIVE, !item.data.sensitive);

                RenderItem {
                    id: item.id,
                    icon_rect: item.extents.icon,
                    text_rect: item.extents.text,
                    lines: item.extents.lines.clone(),
                    icon_name: item.data.icon.clone(),
                    opacity: item.data.opacity,
                    state,
                    icon: item.icon.as_ref().map(|cached| Rc::clone(&cached.pixmap)),
                }
            })
            .collect()
    }

    /// Slot outline to draw while a drag hovers a free slot
    pub fn drop_highlight_rect(&self) -> Option<Rect> {
        self.drop_highlight.map(|slot| self.geometry.slot_rect(slot))
    }

    /// Tooltip for the hovered item
    pub fn tooltip(&self) -> Option<Tooltip> {
        self.hovered.and_then(|id| self.tooltip_for(id))
    }

    pub fn tooltip_for(&self, id: ItemId) -> Option<Tooltip> {
        let item = self.items.get(&id).filter(|item| item.is_placed())?;
        if item.data.tooltip_text.is_none() && item.data.tooltip_icon.is_none() {
            return None;
        }
        Some(Tooltip {
            icon: item.data.tooltip_icon.clone(),
            text: item.data.tooltip_text.clone(),
            icon_size: self.config.style.tooltip_icon_size,
            anchor: item.extents.hit,
        })
    }

    /// Resolve icons for placed items whose cached image is missing or
    /// older than the cache generation. Returns how many were refreshed.
    pub fn refresh_icons(&mut self, cache: &mut IconCache) -> usize {
        let generation = cache.generation();
        let size = self.metrics.icon_size;
        let stale: Vec<ItemId> = self
            .items
            .values()
            .filter(|item| item.is_placed() && item.data.icon.is_some())
            .filter(|item| item.icon.as_ref().map_or(true, |c| c.generation != generation))
            .map(|item| item.id)
            .collect();

        let mut refreshed = 0;
        for id in stale {
            let Some(item) = self.items.get_mut(&id) else {
                continue;
            };
            let Some(name) = item.data.icon.as_deref() else {
                continue;
            };
            item.icon = cache.get(name, size).map(|pixmap| CachedIcon { pixmap, generation });
            if item.icon.is_some() {
                refreshed += 1;
                self.redraw_item(id);
            }
        }
        if refreshed > 0 {
            debug!("Refreshed {} icons at generation {}", refreshed, generation);
        }
        refreshed
    }

    /// Image to show under the pointer while dragging
    pub fn drag_preview(&self) -> Option<Rc<Pixmap>> {
        let lead = self
            .cursor
            .or_else(|| self.drag.as_ref().and_then(|d| d.icons.first().map(|i| i.item)))?;
        self.items
            .get(&lead)
            .and_then(|item| item.icon.as_ref())
            .map(|cached| Rc::clone(&cached.pixmap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Slot;
    use crate::model::{ListModel, RowData};
    use crate::view::tests::{populated, view_with_grid};
    use crate::view::{Key, Modifiers};

    #[test]
    fn test_state_flags() {
        let (mut view, _) = populated(2, 2, &["a", "b"]);
        let a = view.item_at_slot(Slot::new(0, 0)).unwrap();
        let b = view.item_at_slot(Slot::new(0, 1)).unwrap();
        view.focus_in();
        view.key_press(Key::Home, Modifiers::empty());
        let icon = view.item_extents(b).unwrap().icon;
        view.motion(icon.x + 1, icon.y + 1);

        let items = view.render_items();
        let state_of = |id| items.iter().find(|r| r.id == id).unwrap().state;
        assert_eq!(state_of(a), ItemState::SELECTED | ItemState::FOCUSED);
        assert_eq!(state_of(b), ItemState::PRELIT);
    }

    #[test]
    fn test_unplaced_items_are_not_rendered() {
        let (view, _) = populated(1, 1, &["a", "b"]);
        assert_eq!(view.render_items().len(), 1);
    }

    #[test]
    fn test_render_items_in_area() {
        let (view, _) = populated(2, 2, &["a", "b", "c"]);
        let slot = view.geometry().slot_rect(Slot::new(0, 0));
        let items = view.render_items_in(slot);
        assert_eq!(items.len(), 1);
        assert_eq!(Some(items[0].id), view.item_at_slot(Slot::new(0, 0)));
    }

    #[test]
    fn test_tooltip_anchor_and_size() {
        let mut view = view_with_grid(2, 2);
        let model = ListModel::from_rows([RowData::new("a").with_tooltip("Folder, 3 items"), RowData::new("b")]);
        view.populate(&model);
        let a = view.item_at_index(0).unwrap();
        let b = view.item_at_index(1).unwrap();

        let tip = view.tooltip_for(a).unwrap();
        assert_eq!(tip.text.as_deref(), Some("Folder, 3 items"));
        assert_eq!(tip.icon_size, 64);
        assert_eq!(tip.anchor, view.item_extents(a).unwrap().hit);
        assert!(view.tooltip_for(b).is_none());
    }
}
