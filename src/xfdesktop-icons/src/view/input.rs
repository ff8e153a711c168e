//! Pointer and keyboard input
//!
//! A press moves the pointer state machine from idle to a pending press.
//! Motion past the drag threshold with an item under the press starts an
//! icon drag; motion after a press on empty space draws a rubber band.
//! Release returns to idle.

use bitflags::bitflags;
use tracing::debug;

use super::timers::TimerKind;
use super::{IconView, ItemId, ViewEvent};
use crate::config::SelectionMode;
use crate::dnd::{DragBatch, DraggedIcon};
use crate::geometry::{Point, Rect};
use crate::grid::Walk;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT   = 0b001;
        const CONTROL = 0b010;
        const ALT     = 0b100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    /// Context menu button
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    /// Return or keypad Enter
    Return,
    Space,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Press {
    button: Button,
    origin: Point,
    item: Option<ItemId>,
    /// Ctrl-click on a selected item unselects it on release, unless the
    /// press turns into a drag
    deferred_unselect: bool,
    modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum PointerPhase {
    #[default]
    Idle,
    MaybeDragging(Press),
    Dragging,
    RubberBanding(Press),
}

impl IconView {
    /// Hit test for interaction; insensitive items behave like empty space
    fn interactive_item_at(&self, point: Point) -> Option<ItemId> {
        let id = self.widget_coords_to_item(point.x, point.y)?;
        self.items
            .get(&id)
            .is_some_and(|item| item.is_interactive())
            .then_some(id)
    }

    /// Button press. `click_count` is 2 for the second press of a
    /// double click.
    pub fn button_press(
        &mut self,
        x: i32,
        y: i32,
        button: Button,
        modifiers: Modifiers,
        click_count: u32,
    ) -> bool {
        let point = Point::new(x, y);
        let hit = self.interactive_item_at(point);
        let ctrl = modifiers.contains(Modifiers::CONTROL);
        let shift = modifiers.contains(Modifiers::SHIFT);

        if !self.has_focus {
            self.focus_in();
        }

        if click_count >= 2 && button == Button::Primary {
            self.pointer = PointerPhase::Idle;
            if hit.is_some() {
                self.activate_selection();
            }
            return true;
        }

        if button == Button::Middle {
            return false;
        }

        let mut deferred_unselect = false;
        match hit {
            Some(id) => {
                if self.is_selected(id) {
                    deferred_unselect = ctrl && button == Button::Primary;
                } else if shift && self.selection_mode == SelectionMode::Multiple {
                    let anchor = self.first_clicked.filter(|a| self.item_slot(*a).is_some());
                    if !ctrl {
                        self.unselect_all();
                    }
                    match anchor {
                        Some(anchor) => self.select_between(anchor, id),
                        None => self.select(id),
                    }
                } else {
                    if !ctrl || self.selection_mode != SelectionMode::Multiple {
                        self.unselect_all();
                    }
                    self.select(id);
                }
                if !shift {
                    self.first_clicked = Some(id);
                }
                self.set_cursor(Some(id), false);
            }
            None => {
                if !ctrl {
                    self.unselect_all();
                }
            }
        }

        if button == Button::Secondary {
            match hit {
                Some(_) => {
                    let delay = self.config.context_menu_delay();
                    self.schedule_timer(TimerKind::ContextMenu, delay);
                }
                None => {
                    // desktop menu, no drag possible
                    self.emit(ViewEvent::ContextMenu {
                        item: None,
                        position: point,
                    });
                    self.pointer = PointerPhase::Idle;
                    return true;
                }
            }
        }

        self.pointer = PointerPhase::MaybeDragging(Press {
            button,
            origin: point,
            item: hit,
            deferred_unselect,
            modifiers,
        });
        true
    }

    pub fn motion(&mut self, x: i32, y: i32) -> bool {
        let point = Point::new(x, y);
        match self.pointer {
            PointerPhase::MaybeDragging(press) => {
                if press.item.is_some() {
                    if press.origin.exceeds_threshold(point, self.config.drag_threshold) {
                        self.cancel_timer(TimerKind::ContextMenu);
                        self.begin_drag();
                    }
                } else if press.button == Button::Primary
                    && press.origin.exceeds_threshold(point, self.config.drag_threshold)
                {
                    self.pointer = PointerPhase::RubberBanding(press);
                    self.update_rubber_band(press.origin, point);
                }
                true
            }
            PointerPhase::RubberBanding(press) => {
                self.update_rubber_band(press.origin, point);
                true
            }
            PointerPhase::Dragging => {
                if let Some(batch) = self.drag.take() {
                    self.drag_motion(&batch, x, y);
                    self.drag = Some(batch);
                }
                true
            }
            PointerPhase::Idle => {
                let hovered = self.interactive_item_at(point);
                self.set_hovered(hovered);
                false
            }
        }
    }

    pub fn button_release(&mut self, x: i32, y: i32, button: Button) -> bool {
        let point = Point::new(x, y);
        match std::mem::take(&mut self.pointer) {
            PointerPhase::MaybeDragging(press) if press.button == button => {
                if button == Button::Secondary && self.timer_pending(TimerKind::ContextMenu) {
                    // released before the delay: menu right away
                    self.cancel_timer(TimerKind::ContextMenu);
                    self.emit(ViewEvent::ContextMenu {
                        item: press.item,
                        position: press.origin,
                    });
                }
                if let Some(id) = press.item {
                    if press.deferred_unselect {
                        self.unselect(id);
                    } else if button == Button::Primary
                        && self.config.single_click
                        && press.modifiers.is_empty()
                    {
                        self.activate_selection();
                    }
                }
                true
            }
            PointerPhase::MaybeDragging(press) => {
                self.pointer = PointerPhase::MaybeDragging(press);
                false
            }
            PointerPhase::RubberBanding(_) => {
                if let Some(band) = self.rubber_band.take() {
                    self.redraw(band);
                }
                true
            }
            PointerPhase::Dragging => {
                if let Some(batch) = self.drag.take() {
                    self.drop_batch(batch, point.x, point.y);
                }
                true
            }
            PointerPhase::Idle => false,
        }
    }

    /// The pointer left the view
    pub fn leave(&mut self) {
        self.set_hovered(None);
    }

    pub fn focus_in(&mut self) {
        if !self.has_focus {
            self.has_focus = true;
            if let Some(cursor) = self.cursor {
                self.redraw_item(cursor);
            }
        }
    }

    pub fn focus_out(&mut self) {
        if self.has_focus {
            self.has_focus = false;
            self.focus_ring = false;
            if let Some(cursor) = self.cursor {
                self.redraw_item(cursor);
            }
        }
    }

    pub fn key_press(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let ctrl = modifiers.contains(Modifiers::CONTROL);
        let typing = !ctrl && !modifiers.contains(Modifiers::ALT);
        if !matches!(key, Key::Char(c) if typing && !c.is_control()) {
            self.cancel_typeahead();
        }
        match key {
            Key::Up => self.move_cursor(Walk::ColumnMajor, false, modifiers),
            Key::Down => self.move_cursor(Walk::ColumnMajor, true, modifiers),
            Key::Left => self.move_cursor(Walk::RowMajor, false, modifiers),
            Key::Right => self.move_cursor(Walk::RowMajor, true, modifiers),
            Key::Home => self.jump_cursor(true, modifiers),
            Key::End => self.jump_cursor(false, modifiers),
            Key::Return => {
                self.activate_selection();
                true
            }
            Key::Space => match self.cursor {
                Some(cursor) => {
                    if ctrl {
                        self.toggle_selected(cursor);
                    } else {
                        self.select(cursor);
                    }
                    true
                }
                None => false,
            },
            Key::Escape => {
                if self.drag.is_some() {
                    self.drag_cancel();
                    return true;
                }
                false
            }
            Key::Char(c) if ctrl && c.eq_ignore_ascii_case(&'a') => {
                self.select_all();
                true
            }
            Key::Char(c) if typing && !c.is_control() => {
                self.typeahead_char(c);
                true
            }
            Key::Char(_) => false,
        }
    }

    /// Emit an activation request for the current selection
    pub fn activate_selection(&mut self) {
        if !self.selection.is_empty() {
            let ids = self.selection.clone();
            self.emit(ViewEvent::Activated(ids));
        }
    }

    fn set_hovered(&mut self, hovered: Option<ItemId>) {
        if self.hovered == hovered {
            return;
        }
        let old = std::mem::replace(&mut self.hovered, hovered);
        if let Some(old) = old {
            self.redraw_item(old);
        }
        if let Some(new) = hovered {
            self.redraw_item(new);
        }
    }

    /// Resize the band and update selection incrementally: only items
    /// that crossed the band's edge change state
    fn update_rubber_band(&mut self, origin: Point, point: Point) {
        let old = self.rubber_band.unwrap_or_default();
        let new = Rect::from_points(origin, point);
        self.rubber_band = Some(new);

        match old.intersection(&new) {
            Some(common) => {
                let inner = common.shrink(1);
                let dirty: Vec<Rect> = old
                    .subtract(&inner)
                    .into_iter()
                    .chain(new.subtract(&inner))
                    .collect();
                for area in dirty {
                    self.redraw(area);
                }
            }
            None => {
                self.redraw(old);
                self.redraw(new);
            }
        }

        let mut entering = Vec::new();
        let mut leaving = Vec::new();
        for (id, item) in &self.items {
            if !item.is_interactive() {
                continue;
            }
            let was_in = item.extents.hit.intersects(&old);
            let is_in = item.extents.hit.intersects(&new);
            if is_in && !item.selected {
                entering.push(*id);
            } else if was_in && !is_in && item.selected {
                leaving.push(*id);
            }
        }

        let mut changed = false;
        for id in leaving {
            changed |= self.unselect_item(id);
        }
        for id in entering {
            changed |= self.select_item(id);
        }
        if changed {
            self.emit(ViewEvent::SelectionChanged);
        }
    }

    fn begin_drag(&mut self) {
        let icons: Vec<DraggedIcon> = self
            .selection
            .iter()
            .filter_map(|id| {
                let item = self.items.get(id)?;
                Some(DraggedIcon {
                    item: *id,
                    reference: item.reference,
                    source_slot: item.slot?,
                    destination: None,
                })
            })
            .collect();
        let Some(first) = icons.first().map(|icon| icon.item) else {
            self.pointer = PointerPhase::Idle;
            return;
        };
        let lead = self.cursor.filter(|c| self.is_selected(*c)).unwrap_or(first);

        debug!("Drag of {} icons begins", icons.len());
        self.drag = Some(DragBatch {
            source_view: self.id,
            cursor_slot: self.item_slot(lead),
            icons,
        });
        self.pointer = PointerPhase::Dragging;
        self.emit(ViewEvent::DragBegin(lead));
    }

    fn move_cursor(&mut self, walk: Walk, forward: bool, modifiers: Modifiers) -> bool {
        let current = self.cursor.and_then(|c| self.item_slot(c));
        let target = match current {
            Some(slot) => self.grid.next_occupied(slot, walk, forward),
            None => self.grid.occupied().next(),
        };
        match target {
            Some((_, id)) => {
                self.cursor_moved_to(id, modifiers);
                true
            }
            None => current.is_some(),
        }
    }

    fn jump_cursor(&mut self, first: bool, modifiers: Modifiers) -> bool {
        let target = if first {
            self.grid.occupied().next()
        } else {
            self.grid.occupied().last()
        };
        match target {
            Some((_, id)) => {
                self.cursor_moved_to(id, modifiers);
                true
            }
            None => false,
        }
    }

    /// Apply selection semantics of a keyboard cursor move
    fn cursor_moved_to(&mut self, id: ItemId, modifiers: Modifiers) {
        let shift = modifiers.contains(Modifiers::SHIFT);
        let ctrl = modifiers.contains(Modifiers::CONTROL);

        if shift && self.selection_mode == SelectionMode::Multiple {
            let anchor = self
                .first_clicked
                .filter(|a| self.item_slot(*a).is_some())
                .or(self.cursor)
                .unwrap_or(id);
            self.first_clicked = Some(anchor);
            if !ctrl {
                self.unselect_all();
            }
            self.select_between(anchor, id);
        } else if ctrl {
            if self.selection_mode == SelectionMode::Multiple {
                self.select(id);
            }
        } else {
            self.unselect_all();
            self.select(id);
            self.first_clicked = Some(id);
        }
        self.set_cursor(Some(id), true);
    }

    /// Extend the type-ahead buffer and select the first item in model
    /// order whose label starts with it. A character that matches nothing
    /// stays in the buffer and leaves the selection alone.
    fn cancel_typeahead(&mut self) {
        if !self.typeahead.is_empty() {
            debug!("Type-ahead {:?} cancelled", self.typeahead);
            self.typeahead.clear();
        }
        self.cancel_timer(TimerKind::TypeAheadReset);
    }

    fn typeahead_char(&mut self, c: char) {
        self.typeahead.extend(c.to_lowercase());
        let delay = self.config.typeahead_timeout();
        self.schedule_timer(TimerKind::TypeAheadReset, delay);

        let needle = self.typeahead.as_str();
        let found = self
            .items
            .values()
            .find(|item| item.is_interactive() && item.data.label.to_lowercase().starts_with(needle))
            .map(|item| item.id);

        match found {
            Some(id) => {
                debug!("Type-ahead {:?} matched {:?}", self.typeahead, id);
                self.unselect_all();
                self.select(id);
                self.first_clicked = Some(id);
                self.set_cursor(Some(id), true);
            }
            None => debug!("Type-ahead {:?} matches nothing", self.typeahead),
        }
    }

    /// The context-menu delay expired with the button still held
    pub(crate) fn context_menu_timeout(&mut self) {
        if let PointerPhase::MaybeDragging(press) = self.pointer {
            if press.button == Button::Secondary {
                self.pointer = PointerPhase::Idle;
                self.emit(ViewEvent::ContextMenu {
                    item: press.item,
                    position: press.origin,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::grid::Slot;
    use crate::view::tests::{assert_consistent, populated, test_config, test_measurer};
    use crate::view::{TimerId, ViewId};
    use std::time::Duration;

    fn center_of(view: &IconView, row: u32, col: u32) -> (ItemId, Point) {
        let id = view.item_at_slot(Slot::new(row, col)).unwrap();
        let icon = view.item_extents(id).unwrap().icon;
        (id, Point::new(icon.x + icon.width / 2, icon.y + icon.height / 2))
    }

    fn click(view: &mut IconView, p: Point, modifiers: Modifiers) {
        view.button_press(p.x, p.y, Button::Primary, modifiers, 1);
        view.button_release(p.x, p.y, Button::Primary);
    }

    fn scheduled(events: &[ViewEvent]) -> Vec<(TimerId, Duration)> {
        events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::ScheduleTimer { id, delay } => Some((*id, *delay)),
                _ => None,
            })
            .collect()
    }

    // ========================================================================
    // Clicks
    // ========================================================================

    #[test]
    fn test_click_selects_and_sets_cursor() {
        let (mut view, _) = populated(2, 2, &["a", "b"]);
        let (a, pa) = center_of(&view, 0, 0);
        let (b, pb) = center_of(&view, 0, 1);
        click(&mut view, pa, Modifiers::empty());
        assert_eq!(view.selected_items(), &[a]);
        assert_eq!(view.cursor(), Some(a));

        click(&mut view, pb, Modifiers::empty());
        assert_eq!(view.selected_items(), &[b]);
    }

    #[test]
    fn test_ctrl_click_adds_and_deferred_unselect() {
        let (mut view, _) = populated(2, 2, &["a", "b"]);
        let (a, pa) = center_of(&view, 0, 0);
        let (b, pb) = center_of(&view, 0, 1);
        click(&mut view, pa, Modifiers::empty());
        click(&mut view, pb, Modifiers::CONTROL);
        assert_eq!(view.selected_items(), &[a, b]);

        // still selected while the button is down
        view.button_press(pa.x, pa.y, Button::Primary, Modifiers::CONTROL, 1);
        assert!(view.is_selected(a));
        view.button_release(pa.x, pa.y, Button::Primary);
        assert_eq!(view.selected_items(), &[b]);
        assert_consistent(&view);
    }

    #[test]
    fn test_plain_click_on_selected_keeps_selection() {
        let (mut view, _) = populated(2, 2, &["a", "b"]);
        let (_, pa) = center_of(&view, 0, 0);
        view.select_all();
        click(&mut view, pa, Modifiers::empty());
        assert_eq!(view.selected_items().len(), 2);
    }

    #[test]
    fn test_shift_click_selects_range() {
        let (mut view, _) = populated(3, 3, &["a", "b", "c", "d", "e"]);
        let (_, pa) = center_of(&view, 0, 0);
        let (_, pe) = center_of(&view, 1, 1);
        click(&mut view, pa, Modifiers::empty());
        click(&mut view, pe, Modifiers::SHIFT);
        // a, b, d, e
        assert_eq!(view.selected_items().len(), 4);
    }

    #[test]
    fn test_click_on_empty_space_clears_selection() {
        let (mut view, _) = populated(2, 2, &["a"]);
        let (_, pa) = center_of(&view, 0, 0);
        click(&mut view, pa, Modifiers::empty());
        let empty = view.geometry().slot_rect(Slot::new(1, 1));
        click(&mut view, Point::new(empty.x + 5, empty.y + 5), Modifiers::empty());
        assert!(view.selected_items().is_empty());
    }

    #[test]
    fn test_double_click_activates() {
        let (mut view, _) = populated(2, 2, &["a"]);
        let (a, pa) = center_of(&view, 0, 0);
        click(&mut view, pa, Modifiers::empty());
        view.take_events();
        view.button_press(pa.x, pa.y, Button::Primary, Modifiers::empty(), 2);
        assert!(view.take_events().contains(&ViewEvent::Activated(vec![a])));
    }

    #[test]
    fn test_single_click_mode_activates_on_release() {
        let config = Config {
            single_click: true,
            ..test_config()
        };
        let mut view = IconView::with_measurer(ViewId(1), &config, test_measurer());
        view.resize(216, 216);
        view.populate(&crate::view::tests::model_with(&["a"]));
        let (a, pa) = center_of(&view, 0, 0);
        view.take_events();
        click(&mut view, pa, Modifiers::empty());
        assert!(view.take_events().contains(&ViewEvent::Activated(vec![a])));
    }

    // ========================================================================
    // Context menu
    // ========================================================================

    #[test]
    fn test_right_click_waits_for_delay() {
        let (mut view, _) = populated(2, 2, &["a"]);
        let (a, pa) = center_of(&view, 0, 0);
        view.button_press(pa.x, pa.y, Button::Secondary, Modifiers::empty(), 1);
        let events = view.take_events();
        let timers = scheduled(&events);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].1, Duration::from_millis(225));
        assert!(!events.iter().any(|e| matches!(e, ViewEvent::ContextMenu { .. })));

        view.timer_fired(timers[0].0);
        assert!(view.take_events().contains(&ViewEvent::ContextMenu {
            item: Some(a),
            position: pa
        }));
        assert!(view.is_selected(a));
    }

    #[test]
    fn test_right_release_before_delay_opens_menu() {
        let (mut view, _) = populated(2, 2, &["a"]);
        let (a, pa) = center_of(&view, 0, 0);
        view.button_press(pa.x, pa.y, Button::Secondary, Modifiers::empty(), 1);
        let timer = scheduled(&view.take_events())[0].0;
        view.button_release(pa.x, pa.y, Button::Secondary);
        let events = view.take_events();
        assert!(events.contains(&ViewEvent::CancelTimer(timer)));
        assert!(events.contains(&ViewEvent::ContextMenu {
            item: Some(a),
            position: pa
        }));

        // the cancelled timer firing late does nothing
        view.timer_fired(timer);
        assert!(view.take_events().is_empty());
    }

    #[test]
    fn test_right_drag_cancels_menu() {
        let (mut view, _) = populated(2, 2, &["a"]);
        let (a, pa) = center_of(&view, 0, 0);
        view.button_press(pa.x, pa.y, Button::Secondary, Modifiers::empty(), 1);
        view.take_events();
        view.motion(pa.x + 30, pa.y);
        let events = view.take_events();
        assert!(events.iter().any(|e| matches!(e, ViewEvent::CancelTimer(_))));
        assert!(events.contains(&ViewEvent::DragBegin(a)));
    }

    #[test]
    fn test_right_click_on_desktop_is_immediate() {
        let (mut view, _) = populated(2, 2, &[]);
        view.button_press(20, 20, Button::Secondary, Modifiers::empty(), 1);
        assert!(view.take_events().contains(&ViewEvent::ContextMenu {
            item: None,
            position: Point::new(20, 20)
        }));
    }

    // ========================================================================
    // Rubber band
    // ========================================================================

    #[test]
    fn test_rubber_band_grows_and_shrinks() {
        let (mut view, _) = populated(1, 3, &["a", "b", "c"]);
        let (a, pa) = center_of(&view, 0, 0);
        let (b, pb) = center_of(&view, 0, 1);
        let (c, pc) = center_of(&view, 0, 2);

        // start in the top margin, left of a
        let start = Point::new(2, 2);
        view.button_press(start.x, start.y, Button::Primary, Modifiers::empty(), 1);
        view.motion(pc.x, pc.y);
        assert!(view.is_selected(a) && view.is_selected(b) && view.is_selected(c));

        view.motion(pb.x, pb.y);
        assert!(view.is_selected(a) && view.is_selected(b));
        assert!(!view.is_selected(c));

        view.button_release(pb.x, pb.y, Button::Primary);
        assert_eq!(view.rubber_band(), None);
        let _ = pa;
        assert_consistent(&view);
    }

    #[test]
    fn test_jitter_below_threshold_starts_no_band() {
        let (mut view, _) = populated(2, 2, &["a"]);
        assert_eq!(view.config.drag_threshold, 8);
        let empty = view.geometry().slot_rect(Slot::new(1, 1));
        let p = Point::new(empty.x + 10, empty.y + 10);
        view.button_press(p.x, p.y, Button::Primary, Modifiers::empty(), 1);
        view.motion(p.x + 1, p.y + 1);
        assert_eq!(view.rubber_band(), None);
        view.motion(p.x + 8, p.y);
        assert_eq!(view.rubber_band(), None);

        view.motion(p.x + 9, p.y + 9);
        assert_eq!(view.rubber_band(), Some(Rect::new(p.x, p.y, 9, 9)));
        view.button_release(p.x + 9, p.y + 9, Button::Primary);
        assert_eq!(view.rubber_band(), None);
    }

    #[test]
    fn test_zero_area_band_selects_nothing() {
        let (mut view, _) = populated(2, 2, &["a"]);
        let empty = view.geometry().slot_rect(Slot::new(1, 1));
        let p = Point::new(empty.x + 10, empty.y + 10);
        view.button_press(p.x, p.y, Button::Primary, Modifiers::empty(), 1);
        view.motion(p.x, p.y);
        assert!(view.selected_items().is_empty());
        view.button_release(p.x, p.y, Button::Primary);
    }

    #[test]
    fn test_rubber_band_redraw_skips_interior() {
        let (mut view, _) = populated(2, 2, &[]);
        view.button_press(10, 10, Button::Primary, Modifiers::empty(), 1);
        view.motion(100, 100);
        view.take_events();
        view.motion(110, 100);

        let areas: Vec<Rect> = view
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Redraw(r) => Some(r),
                _ => None,
            })
            .collect();
        assert!(!areas.is_empty());
        let interior = Rect::new(20, 20, 70, 70);
        assert!(areas.iter().all(|r| !r.intersects(&interior)));
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    #[test]
    fn test_arrows_walk_reading_order() {
        let (mut view, _) = populated(2, 2, &["a", "b", "c", "d"]);
        let at = |v: &IconView, r, c| v.item_at_slot(Slot::new(r, c)).unwrap();

        view.key_press(Key::Right, Modifiers::empty());
        assert_eq!(view.cursor(), Some(at(&view, 0, 0)));
        view.key_press(Key::Right, Modifiers::empty());
        view.key_press(Key::Right, Modifiers::empty());
        assert_eq!(view.cursor(), Some(at(&view, 1, 0)));
        view.key_press(Key::Up, Modifiers::empty());
        assert_eq!(view.cursor(), Some(at(&view, 0, 0)));
        view.key_press(Key::Down, Modifiers::empty());
        view.key_press(Key::Down, Modifiers::empty());
        assert_eq!(view.cursor(), Some(at(&view, 0, 1)));
        assert_eq!(view.selected_items(), &[at(&view, 0, 1)]);

        view.key_press(Key::End, Modifiers::empty());
        assert_eq!(view.cursor(), Some(at(&view, 1, 1)));
        view.key_press(Key::Home, Modifiers::SHIFT);
        assert_eq!(view.selected_items().len(), 4);
    }

    #[test]
    fn test_ctrl_arrow_adds_to_selection() {
        let (mut view, _) = populated(1, 3, &["a", "b", "c"]);
        view.key_press(Key::Home, Modifiers::empty());
        view.key_press(Key::Right, Modifiers::CONTROL);
        assert_eq!(view.selected_items().len(), 2);
    }

    #[test]
    fn test_space_and_return() {
        let (mut view, _) = populated(1, 2, &["a", "b"]);
        view.key_press(Key::Home, Modifiers::empty());
        let a = view.cursor().unwrap();
        view.key_press(Key::Space, Modifiers::CONTROL);
        assert!(!view.is_selected(a));
        view.key_press(Key::Space, Modifiers::empty());
        assert!(view.is_selected(a));
        view.take_events();
        view.key_press(Key::Return, Modifiers::empty());
        assert!(view.take_events().contains(&ViewEvent::Activated(vec![a])));
    }

    #[test]
    fn test_ctrl_a_selects_all() {
        let (mut view, _) = populated(2, 2, &["a", "b", "c"]);
        view.key_press(Key::Char('a'), Modifiers::CONTROL);
        assert_eq!(view.selected_items().len(), 3);
        assert_eq!(view.typeahead_buffer(), "");
    }

    #[test]
    fn test_typeahead_first_match_in_model_order() {
        let (mut view, _) = populated(2, 2, &["Apple", "apricot", "Banana"]);
        let apple = view.item_at_index(0).unwrap();
        let apricot = view.item_at_index(1).unwrap();

        view.key_press(Key::Char('a'), Modifiers::empty());
        assert_eq!(view.selected_items(), &[apple]);
        view.key_press(Key::Char('P'), Modifiers::SHIFT);
        assert_eq!(view.typeahead_buffer(), "ap");
        assert_eq!(view.selected_items(), &[apple]);
        view.key_press(Key::Char('r'), Modifiers::empty());
        assert_eq!(view.selected_items(), &[apricot]);
        assert_eq!(view.cursor(), Some(apricot));
    }

    #[test]
    fn test_typeahead_miss_keeps_character_and_selection() {
        let (mut view, _) = populated(2, 2, &["Apple", "Banana"]);
        let apple = view.item_at_index(0).unwrap();
        view.key_press(Key::Char('a'), Modifiers::empty());
        view.key_press(Key::Char('x'), Modifiers::empty());
        assert_eq!(view.typeahead_buffer(), "ax");
        assert_eq!(view.selected_items(), &[apple]);
    }

    #[test]
    fn test_typeahead_resets_after_timeout() {
        let (mut view, _) = populated(2, 2, &["Apple", "Banana"]);
        view.key_press(Key::Char('a'), Modifiers::empty());
        let timers = scheduled(&view.take_events());
        assert_eq!(timers[0].1, Duration::from_millis(1500));
        view.timer_fired(timers[0].0);
        view.key_press(Key::Char('b'), Modifiers::empty());
        assert_eq!(view.typeahead_buffer(), "b");
        assert_eq!(view.selected_items(), &[view.item_at_index(1).unwrap()]);
    }

    #[test]
    fn test_navigation_key_cancels_typeahead() {
        let (mut view, _) = populated(2, 2, &["Apple", "Banana"]);
        view.key_press(Key::Char('a'), Modifiers::empty());
        let timers = scheduled(&view.take_events());
        assert_eq!(timers.len(), 1);

        view.key_press(Key::Right, Modifiers::empty());
        assert_eq!(view.typeahead_buffer(), "");
        assert!(view.take_events().contains(&ViewEvent::CancelTimer(timers[0].0)));

        view.key_press(Key::Char('b'), Modifiers::empty());
        assert_eq!(view.typeahead_buffer(), "b");
        assert_eq!(view.selected_items(), &[view.item_at_index(1).unwrap()]);
    }

    #[test]
    fn test_escape_cancels_typeahead() {
        let (mut view, _) = populated(2, 2, &["Apple", "Banana"]);
        view.key_press(Key::Char('a'), Modifiers::empty());
        view.key_press(Key::Escape, Modifiers::empty());
        assert_eq!(view.typeahead_buffer(), "");
    }

    // ========================================================================
    // Hover and focus
    // ========================================================================

    #[test]
    fn test_hover_and_leave() {
        let (mut view, _) = populated(2, 2, &["a"]);
        let (a, pa) = center_of(&view, 0, 0);
        view.motion(pa.x, pa.y);
        assert_eq!(view.hovered(), Some(a));
        view.leave();
        assert_eq!(view.hovered(), None);
    }

    #[test]
    fn test_focus_out_hides_focus_ring() {
        let (mut view, _) = populated(2, 2, &["a"]);
        view.focus_in();
        view.key_press(Key::Home, Modifiers::empty());
        assert!(view.focus_ring);
        view.focus_out();
        assert!(!view.has_focus());
        assert!(!view.focus_ring);
    }
}
