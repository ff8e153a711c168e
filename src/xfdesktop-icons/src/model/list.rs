//! In-memory list model with persistent row keys

use super::{IconModel, ModelEvent, RowData, RowKey};
use crate::grid::Slot;

/// `Vec`-backed implementation of the list-model contract.
///
/// Mutators return the event the owner must forward to the view.
#[derive(Debug, Clone)]
pub struct ListModel {
    rows: Vec<(RowKey, RowData)>,
    next_key: u64,
    iters_persist: bool,
    positions: bool,
}

impl Default for ListModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ListModel {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_key: 1,
            iters_persist: true,
            positions: true,
        }
    }

    pub fn from_rows(rows: impl IntoIterator<Item = RowData>) -> Self {
        let mut model = Self::new();
        for row in rows {
            model.append(row);
        }
        model
    }

    pub fn set_iters_persist(&mut self, persist: bool) {
        self.iters_persist = persist;
    }

    pub fn set_supports_positions(&mut self, supported: bool) {
        self.positions = supported;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RowData> {
        self.rows.get(index).map(|(_, data)| data)
    }

    pub fn append(&mut self, data: RowData) -> ModelEvent {
        self.insert(self.rows.len(), data)
    }

    /// Insert at `index`, clamped to the end of the list
    pub fn insert(&mut self, index: usize, data: RowData) -> ModelEvent {
        let index = index.min(self.rows.len());
        let key = RowKey(self.next_key);
        self.next_key += 1;
        self.rows.insert(index, (key, data));
        ModelEvent::RowInserted(index)
    }

    pub fn update(&mut self, index: usize, data: RowData) -> Option<ModelEvent> {
        let (_, row) = self.rows.get_mut(index)?;
        *row = data;
        Some(ModelEvent::RowChanged(index))
    }

    pub fn remove(&mut self, index: usize) -> Option<ModelEvent> {
        if index >= self.rows.len() {
            return None;
        }
        self.rows.remove(index);
        Some(ModelEvent::RowDeleted(index))
    }

    /// Write a position back. Emits a change only when the stored value
    /// actually differs and the model keeps positions at all.
    pub fn set_position(&mut self, index: usize, slot: Slot) -> Option<ModelEvent> {
        if !self.positions {
            return None;
        }
        let (_, row) = self.rows.get_mut(index)?;
        if row.position == Some(slot) {
            return None;
        }
        row.position = Some(slot);
        Some(ModelEvent::RowChanged(index))
    }

    pub fn clear(&mut self) -> Vec<ModelEvent> {
        let n = self.rows.len();
        self.rows.clear();
        (0..n).rev().map(ModelEvent::RowDeleted).collect()
    }
}

impl IconModel for ListModel {
    fn n_rows(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> Option<RowData> {
        self.get(index).cloned()
    }

    fn iters_persist(&self) -> bool {
        self.iters_persist
    }

    fn key_at(&self, index: usize) -> Option<RowKey> {
        self.rows.get(index).map(|(key, _)| *key)
    }

    fn index_of(&self, key: RowKey) -> Option<usize> {
        self.rows.iter().position(|(k, _)| *k == key)
    }

    fn supports_positions(&self) -> bool {
        self.positions
    }
}
