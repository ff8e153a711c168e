//! The icon view
//!
//! [`IconView`] keeps one item per model row, places items on a slot grid,
//! tracks selection and the keyboard cursor, and turns pointer and key
//! input into those changes. It never talks to a toolkit directly: every
//! outward effect (redraws, timers, notifications) is queued as a
//! [`ViewEvent`] and drained by the host with [`IconView::take_events`].
//!
//! The view does not own its model. The host forwards every
//! [`crate::model::ModelEvent`] to [`IconView::handle_model_event`] in
//! emission order.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Config, SelectionMode, Style};
use crate::dnd::DragBatch;
use crate::geometry::{Point, Rect};
use crate::grid::{Gravity, GridGeometry, Slot, SlotGrid};
use crate::model::ItemRef;
use crate::text::{FixedMeasurer, TextMeasurer};

mod drag;
mod input;
mod item;
mod layout;
mod render;
mod selection;
mod store;
mod timers;

pub use input::{Button, Key, Modifiers};
pub use item::ItemExtents;
pub use layout::{compare_labels, SortOrder};
pub use render::{ItemState, RenderItem, Tooltip};
pub use timers::TimerId;

use input::PointerPhase;
use item::{CellMetrics, Item};
use timers::Timers;

/// Identity of a view, carried in drag batches to tell same-view drops
/// from cross-view transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(pub u32);

/// Identity of an item within its view. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

/// Effects the host must carry out, in order
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    SelectionChanged,
    CursorChanged(Option<ItemId>),
    /// An item now occupies `slot`; hosts write this back to the model
    ItemMoved {
        item: ItemId,
        reference: ItemRef,
        slot: Slot,
    },
    /// An item lost its slot and found no other
    ItemUnplaced { item: ItemId, reference: ItemRef },
    Activated(Vec<ItemId>),
    /// Context menu request; `item` is `None` for the desktop menu
    ContextMenu { item: Option<ItemId>, position: Point },
    /// A drag started; the batch is available from [`IconView::drag_batch`]
    DragBegin(ItemId),
    Redraw(Rect),
    RedrawAll,
    ScheduleTimer { id: TimerId, delay: Duration },
    CancelTimer(TimerId),
}

pub struct IconView {
    id: ViewId,
    config: Config,
    gravity: Gravity,
    selection_mode: SelectionMode,
    measurer: Box<dyn TextMeasurer>,
    metrics: CellMetrics,

    width: u32,
    height: u32,
    geometry: GridGeometry,
    grid: SlotGrid<ItemId>,

    items: IndexMap<ItemId, Item>,
    next_item: u64,

    /// Selected items, oldest first
    selection: Vec<ItemId>,
    cursor: Option<ItemId>,
    focus_ring: bool,
    has_focus: bool,
    hovered: Option<ItemId>,
    /// Anchor for range selection
    first_clicked: Option<ItemId>,

    pointer: PointerPhase,
    rubber_band: Option<Rect>,
    drop_highlight: Option<Slot>,
    drag: Option<DragBatch>,

    typeahead: String,
    timers: Timers,
    events: Vec<ViewEvent>,
}

impl IconView {
    pub fn new(id: ViewId, config: &Config) -> Self {
        Self::with_measurer(id, config, Box::new(FixedMeasurer::for_font_size(config.font_size)))
    }

    pub fn with_measurer(id: ViewId, config: &Config, measurer: Box<dyn TextMeasurer>) -> Self {
        let metrics = CellMetrics::new(config.icon_size, &config.style, measurer.as_ref());
        Self {
            id,
            config: config.clone(),
            gravity: config.gravity(),
            selection_mode: config.selection_mode,
            measurer,
            metrics,
            width: 0,
            height: 0,
            geometry: GridGeometry::default(),
            grid: SlotGrid::new(0, 0),
            items: IndexMap::new(),
            next_item: 1,
            selection: Vec::new(),
            cursor: None,
            focus_ring: false,
            has_focus: false,
            hovered: None,
            first_clicked: None,
            pointer: PointerPhase::Idle,
            rubber_band: None,
            drop_highlight: None,
            drag: None,
            typeahead: String::new(),
            timers: Timers::default(),
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn grid(&self) -> &SlotGrid<ItemId> {
        &self.grid
    }

    pub fn gravity(&self) -> Gravity {
        self.gravity
    }

    pub fn slot_size(&self) -> u32 {
        self.metrics.slot_size()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Drain queued effects
    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item ids in model order
    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.keys().copied()
    }

    /// Id of the item backing model row `index`
    pub fn item_at_index(&self, index: usize) -> Option<ItemId> {
        self.items.get_index(index).map(|(id, _)| *id)
    }

    pub fn index_of_item(&self, id: ItemId) -> Option<usize> {
        self.items.get_index_of(&id)
    }

    pub fn item_label(&self, id: ItemId) -> Option<&str> {
        self.items.get(&id).map(|item| item.data.label.as_str())
    }

    pub fn item_reference(&self, id: ItemId) -> Option<ItemRef> {
        self.items.get(&id).map(|item| item.reference)
    }

    pub fn item_slot(&self, id: ItemId) -> Option<Slot> {
        self.items.get(&id).and_then(|item| item.slot)
    }

    pub fn item_at_slot(&self, slot: Slot) -> Option<ItemId> {
        self.grid.get(slot)
    }

    pub fn item_extents(&self, id: ItemId) -> Option<&ItemExtents> {
        self.items.get(&id).map(|item| &item.extents)
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.items.get(&id).is_some_and(|item| item.selected)
    }

    /// Selected items, least recently selected first
    pub fn selected_items(&self) -> &[ItemId] {
        &self.selection
    }

    pub fn cursor(&self) -> Option<ItemId> {
        self.cursor
    }

    pub fn hovered(&self) -> Option<ItemId> {
        self.hovered
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn typeahead_buffer(&self) -> &str {
        &self.typeahead
    }

    pub fn rubber_band(&self) -> Option<Rect> {
        self.rubber_band
    }

    /// Slot under a view-relative pixel
    pub fn widget_coords_to_slot(&self, x: i32, y: i32) -> Option<Slot> {
        self.geometry.slot_at(x, y)
    }

    /// Placed item whose hit region contains the pixel
    pub fn widget_coords_to_item(&self, x: i32, y: i32) -> Option<ItemId> {
        let slot = self.geometry.slot_at(x, y)?;
        let id = self.grid.get(slot)?;
        let item = self.items.get(&id)?;
        item.extents.hit.contains(x, y).then_some(id)
    }

    /// Placed icons stay where they are; the new gravity governs
    /// placements from now on. Use [`IconView::sort_icons`] to lay
    /// everything out again.
    pub fn set_gravity(&mut self, gravity: Gravity) {
        if self.gravity != gravity {
            self.gravity = gravity;
            debug!("Gravity changed to {:?}", gravity);
        }
    }

    /// Re-apply style parameters. Slot size may change, so this lays the
    /// grid out again.
    pub fn set_style(&mut self, style: Style) {
        self.config.style = style;
        self.reload_metrics();
    }

    pub fn set_icon_size(&mut self, icon_size: u32) {
        self.config.icon_size = icon_size;
        self.reload_metrics();
    }

    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = measurer;
        self.reload_metrics();
    }

    fn reload_metrics(&mut self) {
        self.metrics =
            CellMetrics::new(self.config.icon_size, &self.config.style, self.measurer.as_ref());
        self.relayout(true);
    }

    pub(crate) fn emit(&mut self, event: ViewEvent) {
        self.events.push(event);
    }

    pub(crate) fn redraw(&mut self, area: Rect) {
        if !area.is_empty() {
            self.events.push(ViewEvent::Redraw(area));
        }
    }

    pub(crate) fn redraw_item(&mut self, id: ItemId) {
        if let Some(item) = self.items.get(&id) {
            let area = item.extents.bounds();
            self.redraw(area);
        }
    }

    fn alloc_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item);
        self.next_item += 1;
        id
    }

    /// Recompute one item's extents from its slot and selection state
    pub(crate) fn refresh_extents(&mut self, id: ItemId) {
        let Some(item) = self.items.get_mut(&id) else {
            return;
        };
        let old = item.extents.bounds();
        item.extents = match item.slot {
            Some(slot) => ItemExtents::compute(
                &self.metrics,
                self.measurer.as_ref(),
                self.geometry.slot_rect(slot),
                &item.data.label,
                item.selected,
            ),
            None => ItemExtents::default(),
        };
        let dirty = old.union(&item.extents.bounds());
        self.redraw(dirty);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{IconModel, ListModel, RowData};

    /// Metrics that give a slot size of exactly 100 pixels
    pub(crate) fn test_config() -> Config {
        let mut config = Config::default();
        config.icon_size = 48;
        config.style.cell_padding = 6;
        config.style.cell_spacing = 2;
        config.style.text_width_ratio = 1.75;
        config
    }

    pub(crate) fn test_measurer() -> Box<dyn TextMeasurer> {
        Box::new(FixedMeasurer {
            advance: 7,
            line_height: 16,
        })
    }

    /// A view over a `rows x cols` grid of 100 pixel slots
    pub(crate) fn view_with_grid(rows: u32, cols: u32) -> IconView {
        let mut view = IconView::with_measurer(ViewId(1), &test_config(), test_measurer());
        assert_eq!(view.slot_size(), 100);
        view.resize(cols * 100 + 16, rows * 100 + 16);
        assert_eq!((view.grid().nrows(), view.grid().ncols()), (rows, cols));
        view.take_events();
        view
    }

    pub(crate) fn model_with(labels: &[&str]) -> ListModel {
        ListModel::from_rows(labels.iter().map(|l| RowData::new(*l)))
    }

    pub(crate) fn populated(rows: u32, cols: u32, labels: &[&str]) -> (IconView, ListModel) {
        let mut view = view_with_grid(rows, cols);
        let model = model_with(labels);
        view.populate(&model);
        view.take_events();
        (view, model)
    }

    /// Every placed item is where the grid says it is, and vice versa
    pub(crate) fn assert_consistent(view: &IconView) {
        let mut placed = 0;
        for (id, item) in &view.items {
            if let Some(slot) = item.slot {
                assert_eq!(view.grid.get(slot), Some(*id));
                placed += 1;
            }
            assert_eq!(item.selected, view.selection.contains(id));
        }
        assert_eq!(view.grid.occupied_count(), placed);
        for (slot, id) in view.grid.occupied() {
            assert_eq!(view.items.get(&id).and_then(|i| i.slot), Some(slot));
        }
    }

    #[test]
    fn test_slot_size_from_style() {
        let view = IconView::with_measurer(ViewId(1), &test_config(), test_measurer());
        // wide enough for 84 + 2 * 6, tall enough for 3 * 6 + 48 + 2 + 2 * 16
        assert_eq!(view.slot_size(), 100);
    }

    #[test]
    fn test_widget_coords_to_item_uses_hit_region() {
        let (view, _) = populated(2, 2, &["a"]);
        let id = view.item_at_slot(Slot::new(0, 0)).unwrap();
        let hit = view.item_extents(id).unwrap().hit;
        assert_eq!(view.widget_coords_to_item(hit.x + 1, hit.y + 1), Some(id));

        // inside the slot but outside the icon and label
        let slot = view.geometry().slot_rect(Slot::new(0, 0));
        assert_eq!(view.widget_coords_to_item(slot.x, slot.bottom() - 1), None);
    }

    #[test]
    fn test_item_index_alignment() {
        let (view, model) = populated(3, 3, &["a", "b", "c"]);
        for i in 0..model.n_rows() {
            let id = view.item_at_index(i).unwrap();
            assert_eq!(view.item_label(id), model.get(i).map(|r| r.label.as_str()));
            assert_eq!(view.index_of_item(id), Some(i));
        }
    }
}
