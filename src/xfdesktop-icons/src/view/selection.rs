//! Selection set and keyboard cursor
//!
//! `Item::selected` and membership in `IconView::selection` always agree.
//! Only placed, sensitive items can be selected. The `*_item` helpers
//! change state without notifying so bulk operations emit one
//! `SelectionChanged` at the end.

use super::{IconView, ItemId, ViewEvent};
use crate::config::SelectionMode;

impl IconView {
    pub fn select(&mut self, id: ItemId) {
        if self.select_item(id) {
            self.emit(ViewEvent::SelectionChanged);
        }
    }

    pub fn unselect(&mut self, id: ItemId) {
        if self.unselect_item(id) {
            self.emit(ViewEvent::SelectionChanged);
        }
    }

    pub fn toggle_selected(&mut self, id: ItemId) {
        if self.is_selected(id) {
            self.unselect(id);
        } else {
            self.select(id);
        }
    }

    /// Select every placed item. Only meaningful in multiple mode.
    pub fn select_all(&mut self) {
        if self.selection_mode != SelectionMode::Multiple {
            return;
        }
        let ids: Vec<ItemId> = self.items.keys().copied().collect();
        let mut changed = false;
        for id in ids {
            changed |= self.select_item(id);
        }
        if changed {
            self.emit(ViewEvent::SelectionChanged);
        }
    }

    pub fn unselect_all(&mut self) {
        if self.unselect_all_items() {
            self.emit(ViewEvent::SelectionChanged);
        }
    }

    /// Select every placed item inside the rectangle of slots spanned by
    /// `a` and `b`, inclusive, in reading order
    pub fn select_between(&mut self, a: ItemId, b: ItemId) {
        let (Some(sa), Some(sb)) = (self.item_slot(a), self.item_slot(b)) else {
            return;
        };
        let (start, end) = if (sa.row, sa.col) <= (sb.row, sb.col) { (sa, sb) } else { (sb, sa) };
        let (col_lo, col_hi) = (start.col.min(end.col), start.col.max(end.col));

        let in_range: Vec<ItemId> = self
            .grid
            .occupied()
            .filter(|(slot, _)| {
                slot.row >= start.row && slot.row <= end.row && slot.col >= col_lo && slot.col <= col_hi
            })
            .map(|(_, id)| id)
            .collect();

        let mut changed = false;
        for id in in_range {
            changed |= self.select_item(id);
        }
        if changed {
            self.emit(ViewEvent::SelectionChanged);
        }
    }

    /// Move keyboard focus. The focus ring is only drawn for keyboard
    /// driven cursor changes.
    pub fn set_cursor(&mut self, id: Option<ItemId>, from_keyboard: bool) {
        let id = id.filter(|id| self.items.contains_key(id));
        let ring_changed = self.focus_ring != from_keyboard;
        self.focus_ring = from_keyboard;
        if self.cursor == id {
            if ring_changed {
                if let Some(id) = id {
                    self.redraw_item(id);
                }
            }
            return;
        }

        let old = std::mem::replace(&mut self.cursor, id);
        if let Some(old) = old {
            self.redraw_item(old);
        }
        if let Some(id) = id {
            self.redraw_item(id);
        }
        self.emit(ViewEvent::CursorChanged(id));
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        if self.selection_mode == mode {
            return;
        }
        self.selection_mode = mode;
        match mode {
            SelectionMode::None => self.unselect_all(),
            SelectionMode::Single => {
                // keep the most recently selected item
                let keep = self.selection.last().copied();
                let others: Vec<ItemId> =
                    self.selection.iter().copied().filter(|id| Some(*id) != keep).collect();
                let mut changed = false;
                for id in others {
                    changed |= self.unselect_item(id);
                }
                if changed {
                    self.emit(ViewEvent::SelectionChanged);
                }
            }
            SelectionMode::Multiple => {}
        }
    }

    pub(crate) fn select_item(&mut self, id: ItemId) -> bool {
        if self.selection_mode == SelectionMode::None {
            return false;
        }
        match self.items.get(&id) {
            Some(item) if !item.selected && item.is_interactive() => {}
            _ => return false,
        }
        if self.selection_mode == SelectionMode::Single {
            self.unselect_all_items();
        }
        if let Some(item) = self.items.get_mut(&id) {
            item.selected = true;
        }
        self.selection.push(id);
        self.refresh_extents(id);
        true
    }

    pub(crate) fn unselect_item(&mut self, id: ItemId) -> bool {
        let Some(pos) = self.selection.iter().position(|s| *s == id) else {
            return false;
        };
        self.selection.remove(pos);
        if let Some(item) = self.items.get_mut(&id) {
            item.selected = false;
        }
        self.refresh_extents(id);
        true
    }

    pub(crate) fn unselect_all_items(&mut self) -> bool {
        let ids = std::mem::take(&mut self.selection);
        for &id in &ids {
            if let Some(item) = self.items.get_mut(&id) {
                item.selected = false;
            }
            self.refresh_extents(id);
        }
        !ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Slot;
    use crate::model::{ListModel, RowData};
    use crate::view::tests::{assert_consistent, populated, view_with_grid};

    fn id_at(view: &IconView, row: u32, col: u32) -> ItemId {
        view.item_at_slot(Slot::new(row, col)).unwrap()
    }

    #[test]
    fn test_select_is_idempotent() {
        let (mut view, _) = populated(2, 2, &["a", "b"]);
        let a = id_at(&view, 0, 0);
        view.select(a);
        view.select(a);
        assert_eq!(view.selected_items(), &[a]);
        let changes = view
            .take_events()
            .iter()
            .filter(|e| **e == ViewEvent::SelectionChanged)
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_single_mode_replaces_selection() {
        let (mut view, _) = populated(2, 2, &["a", "b"]);
        view.set_selection_mode(SelectionMode::Single);
        let a = id_at(&view, 0, 0);
        let b = id_at(&view, 0, 1);
        view.select(a);
        view.select(b);
        assert_eq!(view.selected_items(), &[b]);
        assert_consistent(&view);
    }

    #[test]
    fn test_switch_to_single_keeps_latest() {
        let (mut view, _) = populated(2, 2, &["a", "b", "c"]);
        let ids: Vec<_> = view.item_ids().collect();
        view.select(ids[2]);
        view.select(ids[0]);
        view.select(ids[1]);
        view.set_selection_mode(SelectionMode::Single);
        assert_eq!(view.selected_items(), &[ids[1]]);
        assert_consistent(&view);
    }

    #[test]
    fn test_none_mode_disables_selection() {
        let (mut view, _) = populated(2, 2, &["a"]);
        let a = id_at(&view, 0, 0);
        view.select(a);
        view.set_selection_mode(SelectionMode::None);
        assert!(view.selected_items().is_empty());
        view.select(a);
        assert!(view.selected_items().is_empty());
    }

    #[test]
    fn test_select_all_skips_insensitive_and_single_mode() {
        let mut view = view_with_grid(2, 2);
        let model = ListModel::from_rows([
            RowData::new("a"),
            RowData::new("b").insensitive(),
            RowData::new("c"),
        ]);
        view.populate(&model);
        view.select_all();
        assert_eq!(view.selected_items().len(), 2);

        view.unselect_all();
        view.set_selection_mode(SelectionMode::Single);
        view.select_all();
        assert!(view.selected_items().is_empty());
    }

    #[test]
    fn test_select_between_is_rectangular() {
        let (mut view, _) = populated(3, 3, &["a", "b", "c", "d", "e", "f", "g", "h", "i"]);
        let b = id_at(&view, 0, 1);
        let h = id_at(&view, 2, 1);
        view.select_between(h, b);
        let mut labels: Vec<_> = view
            .selected_items()
            .iter()
            .map(|id| view.item_label(*id).unwrap().to_string())
            .collect();
        labels.sort();
        assert_eq!(labels, vec!["b", "e", "h"]);

        view.unselect_all();
        let a = id_at(&view, 0, 0);
        let e = id_at(&view, 1, 1);
        view.select_between(a, e);
        assert_eq!(view.selected_items().len(), 4);
        assert_consistent(&view);
    }

    #[test]
    fn test_cursor_is_independent_of_selection() {
        let (mut view, _) = populated(2, 2, &["a", "b"]);
        let a = id_at(&view, 0, 0);
        let b = id_at(&view, 0, 1);
        view.select(a);
        view.set_cursor(Some(b), true);
        assert_eq!(view.cursor(), Some(b));
        assert_eq!(view.selected_items(), &[a]);
        assert!(view.take_events().contains(&ViewEvent::CursorChanged(Some(b))));
    }

    #[test]
    fn test_selecting_widens_label() {
        let (mut view, _) =
            populated(2, 2, &["a label long enough to wrap onto three or more lines"]);
        let a = id_at(&view, 0, 0);
        let collapsed = view.item_extents(a).unwrap().text;
        view.select(a);
        let full = view.item_extents(a).unwrap().text;
        assert!(full.height > collapsed.height);
        view.unselect(a);
        assert_eq!(view.item_extents(a).unwrap().text, collapsed);
    }
}
