//! Item store: one item per model row, in model order

use tracing::{debug, warn};

use super::item::Item;
use super::{IconView, ItemId, ViewEvent};
use crate::model::{IconModel, ItemRef, ModelEvent};

impl IconView {
    /// Drop all items and rebuild them from the model
    pub fn populate<M: IconModel + ?Sized>(&mut self, model: &M) {
        self.clear_items();

        for index in 0..model.n_rows() {
            let Some(data) = model.row(index) else {
                warn!("Model row {} vanished during populate", index);
                continue;
            };
            let id = self.alloc_item_id();
            let item = Item::new(id, ItemRef::for_row(model, index), data);
            self.items.insert(id, item);
        }

        let ids: Vec<ItemId> = self.items.keys().copied().collect();
        for id in ids {
            self.auto_place(id);
        }
        debug!("Populated {} items", self.items.len());
        self.emit(ViewEvent::RedrawAll);
    }

    /// Apply one model notification. Must be called for every event, in
    /// the order the model emitted them.
    pub fn handle_model_event<M: IconModel + ?Sized>(&mut self, model: &M, event: ModelEvent) {
        match event {
            ModelEvent::RowInserted(index) => self.row_inserted(model, index),
            ModelEvent::RowChanged(index) => self.row_changed(model, index),
            ModelEvent::RowDeleted(index) => self.row_deleted(index),
        }
    }

    fn row_inserted<M: IconModel + ?Sized>(&mut self, model: &M, index: usize) {
        for item in self.items.values_mut() {
            item.reference.row_inserted(index);
        }
        let Some(data) = model.row(index) else {
            warn!("Inserted row {} cannot be read back from the model", index);
            return;
        };
        let id = self.alloc_item_id();
        let item = Item::new(id, ItemRef::for_row(model, index), data);
        let position = index.min(self.items.len());
        self.items.shift_insert(position, id, item);
        self.auto_place(id);
    }

    fn row_changed<M: IconModel + ?Sized>(&mut self, model: &M, index: usize) {
        let Some(id) = self.item_at_index(index) else {
            warn!("Change for unknown row {}", index);
            return;
        };
        let Some(data) = model.row(index) else {
            warn!("Changed row {} cannot be read back from the model", index);
            return;
        };

        let hint = data.position;
        let (current, sensitive) = match self.items.get_mut(&id) {
            Some(item) => {
                item.data = data;
                item.icon = None;
                (item.slot, item.data.sensitive)
            }
            None => return,
        };

        if !sensitive {
            self.forget_item_state(id);
        }

        match hint {
            Some(hint) if Some(hint) != current => {
                debug!("Row {} moved to {:?} by the model", index, hint);
                self.unplace(id, false);
                if !self.place_at(id, hint, true) && !self.auto_place(id) {
                    self.forget_item_state(id);
                    if let Some(reference) = self.item_reference(id) {
                        self.emit(ViewEvent::ItemUnplaced { item: id, reference });
                    }
                }
            }
            _ => {
                if current.is_none() {
                    self.auto_place(id);
                }
                self.refresh_extents(id);
            }
        }
    }

    fn row_deleted(&mut self, index: usize) {
        let Some(id) = self.item_at_index(index) else {
            warn!("Delete for unknown row {}", index);
            return;
        };
        self.unplace(id, true);
        self.forget_item_state(id);
        self.items.shift_remove_index(index);
        for item in self.items.values_mut() {
            item.reference.row_deleted(index);
        }
    }

    fn clear_items(&mut self) {
        let had_selection = !self.selection.is_empty();
        self.selection.clear();
        if self.cursor.take().is_some() {
            self.emit(ViewEvent::CursorChanged(None));
        }
        self.hovered = None;
        self.first_clicked = None;
        self.items.clear();
        self.grid = crate::grid::SlotGrid::new(self.geometry.nrows, self.geometry.ncols);
        if had_selection {
            self.emit(ViewEvent::SelectionChanged);
        }
    }
}
