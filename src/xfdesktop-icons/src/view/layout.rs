//! Layout engine: grid sizing, placement and sorting
//!
//! These functions are the only writers of the live slot grid. An item's
//! `slot` and the grid cell pointing at it are always changed together.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::{IconView, ItemId, ViewEvent};
use crate::grid::{GridGeometry, Slot, SlotGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Case- and accent-insensitive collation key
fn collation_key(label: &str) -> String {
    label
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

impl IconView {
    /// Set the viewport size and lay the grid out again if it changed
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.relayout(false);
    }

    /// Rebuild the grid for the current viewport and slot size.
    ///
    /// Items first go back to their home slots, then the rest are placed
    /// automatically. Items that find no slot stay unplaced.
    pub(crate) fn relayout(&mut self, force: bool) {
        let geometry = GridGeometry::compute(self.width, self.height, self.metrics.slot_size());
        if !force && geometry == self.geometry {
            return;
        }

        debug!(
            "Grid layout {}x{} slots of {}px for {}x{} viewport",
            geometry.ncols, geometry.nrows, geometry.slot_size, self.width, self.height
        );

        self.geometry = geometry;
        self.grid = SlotGrid::new(geometry.nrows, geometry.ncols);
        self.drop_highlight = None;
        for item in self.items.values_mut() {
            item.slot = None;
        }

        let ids: Vec<ItemId> = self.items.keys().copied().collect();

        // stable positions first
        for &id in &ids {
            let home = self.items.get(&id).and_then(|item| item.home);
            if let Some(home) = home {
                if self.grid.is_free(home) {
                    self.place_at(id, home, true);
                }
            }
        }

        let mut homeless = 0;
        for &id in &ids {
            if self.item_slot(id).is_some() {
                continue;
            }
            match self.grid.find_next_free(None, self.gravity) {
                Some(slot) => {
                    let keep_home = self.items.get(&id).is_some_and(|item| item.home.is_some());
                    self.place_at(id, slot, !keep_home);
                }
                None => {
                    self.dropped_from_grid(id);
                    homeless += 1;
                }
            }
        }
        if homeless > 0 {
            warn!("{} icons do not fit on the grid and are unplaced", homeless);
        }

        for &id in &ids {
            self.refresh_extents(id);
        }
        self.emit(ViewEvent::RedrawAll);
    }

    /// First free slot at or after `start` along the gravity walk
    pub fn find_next_free(&self, start: Option<Slot>) -> Option<Slot> {
        self.grid.find_next_free(start, self.gravity)
    }

    /// Place an item at `slot`. Fails when the slot is out of bounds or
    /// taken by another item. A placed item moves.
    pub fn place_item(&mut self, id: ItemId, slot: Slot) -> bool {
        if !self.items.contains_key(&id) {
            return false;
        }
        if self.grid.get(slot) == Some(id) {
            return true;
        }
        if !self.grid.is_free(slot) {
            return false;
        }
        self.unplace(id, false);
        self.place_at(id, slot, true)
    }

    /// Take an item off the grid, dropping any cursor, hover, anchor and
    /// selection state that referred to it. The item forgets its home slot.
    pub fn unplace_item(&mut self, id: ItemId) -> bool {
        if !self.unplace(id, true) {
            return false;
        }
        if let Some(item) = self.items.get_mut(&id) {
            item.home = None;
        }
        true
    }

    /// Occupy `slot`, which must be free, and report the move
    pub(crate) fn place_at(&mut self, id: ItemId, slot: Slot, set_home: bool) -> bool {
        if !self.grid.occupy(slot, id) {
            return false;
        }
        let Some(item) = self.items.get_mut(&id) else {
            self.grid.vacate(slot, id);
            return false;
        };
        item.slot = Some(slot);
        let reference = item.reference;
        if set_home {
            item.home = Some(slot);
            // homeless items must not come back on top of this one
            for other in self.items.values_mut() {
                if other.id != id && other.slot.is_none() && other.home == Some(slot) {
                    other.home = None;
                }
            }
        }
        self.refresh_extents(id);
        self.emit(ViewEvent::ItemMoved {
            item: id,
            reference,
            slot,
        });
        true
    }

    /// Clear the item's cell. With `forget_state` the item is also dropped
    /// from the cursor, hover, range anchor and selection.
    pub(crate) fn unplace(&mut self, id: ItemId, forget_state: bool) -> bool {
        let Some(slot) = self.items.get_mut(&id).and_then(|item| item.slot.take()) else {
            return false;
        };
        self.grid.vacate(slot, id);
        self.refresh_extents(id);
        if forget_state {
            self.forget_item_state(id);
        }
        true
    }

    /// Remove every non-owning reference to an item
    pub(crate) fn forget_item_state(&mut self, id: ItemId) {
        if self.cursor == Some(id) {
            self.cursor = None;
            self.emit(ViewEvent::CursorChanged(None));
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.first_clicked == Some(id) {
            self.first_clicked = None;
        }
        if self.unselect_item(id) {
            self.emit(ViewEvent::SelectionChanged);
        }
    }

    /// An item that was on the grid could not be put back
    fn dropped_from_grid(&mut self, id: ItemId) {
        self.forget_item_state(id);
        if let Some(reference) = self.item_reference(id) {
            self.emit(ViewEvent::ItemUnplaced {
                item: id,
                reference,
            });
        }
    }

    /// Persisted hint if it is free, otherwise the next free slot along
    /// the gravity walk
    pub(crate) fn auto_place(&mut self, id: ItemId) -> bool {
        let Some(item) = self.items.get(&id) else {
            return false;
        };
        let home = item.home;
        if let Some(home) = home {
            if self.grid.is_free(home) {
                return self.place_at(id, home, true);
            }
            debug!("Position hint {:?} for {:?} is unavailable", home, id);
        }
        match self.grid.find_next_free(None, self.gravity) {
            Some(slot) => self.place_at(id, slot, true),
            None => {
                if !self.grid.is_empty() {
                    warn!("No free slot for icon {:?}", self.item_label(id).unwrap_or_default());
                }
                false
            }
        }
    }

    /// Re-place every item in label order, grouped by ascending sort
    /// priority. Items without a priority sort as priority 0.
    pub fn sort_icons(&mut self, order: SortOrder) {
        let mut buckets: BTreeMap<i32, Vec<(String, ItemId)>> = BTreeMap::new();
        for item in self.items.values() {
            let priority = item.data.sort_priority.unwrap_or(0);
            buckets
                .entry(priority)
                .or_default()
                .push((collation_key(&item.data.label), item.id));
        }

        let mut ordered = Vec::with_capacity(self.items.len());
        for (_, mut bucket) in buckets {
            bucket.sort_by(|a, b| {
                let ord = a.0.cmp(&b.0);
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
            ordered.extend(bucket.into_iter().map(|(_, id)| id));
        }

        for &id in &ordered {
            self.unplace(id, false);
            if let Some(item) = self.items.get_mut(&id) {
                item.home = None;
            }
        }

        let mut homeless = 0;
        for &id in &ordered {
            match self.grid.find_next_free(None, self.gravity) {
                Some(slot) => {
                    self.place_at(id, slot, true);
                }
                None => {
                    self.dropped_from_grid(id);
                    homeless += 1;
                }
            }
        }
        if homeless > 0 {
            warn!("{} icons left unplaced after sorting", homeless);
        }
        debug!("Sorted {} icons ({:?})", ordered.len(), order);
        self.emit(ViewEvent::RedrawAll);
    }
}

/// Label comparison used by sorting, exposed for hosts that order rows
/// the same way
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}
