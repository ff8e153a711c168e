//! List-model contract consumed by the icon view
//!
//! A model is an ordered sequence of rows. Every mutation is announced with
//! a [`ModelEvent`] that the owner forwards to the view synchronously and
//! in emission order; the view's item store stays index-aligned with the
//! model only under that discipline.

use serde::{Deserialize, Serialize};

use crate::grid::Slot;

mod list;

pub use list::ListModel;

/// Stable identity of a model row, valid for as long as the row exists
/// when the model guarantees iterator persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(pub u64);

/// Row change notifications, carrying the row index at emission time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    RowInserted(usize),
    RowChanged(usize),
    RowDeleted(usize),
}

/// One model row as the view sees it
#[derive(Debug, Clone, PartialEq)]
pub struct RowData {
    /// Display text, also the type-ahead and sort key
    pub label: String,
    /// Icon name (freedesktop naming) or absolute path to an image
    pub icon: Option<String>,
    pub opacity: f32,
    pub sensitive: bool,
    pub sort_priority: Option<i32>,
    pub tooltip_icon: Option<String>,
    pub tooltip_text: Option<String>,
    /// Persisted position hint
    pub position: Option<Slot>,
}

impl Default for RowData {
    fn default() -> Self {
        Self {
            label: String::new(),
            icon: None,
            opacity: 1.0,
            sensitive: true,
            sort_priority: None,
            tooltip_icon: None,
            tooltip_text: None,
            position: None,
        }
    }
}

impl RowData {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.sort_priority = Some(priority);
        self
    }

    pub fn with_position(mut self, row: u32, col: u32) -> Self {
        self.position = Some(Slot::new(row, col));
        self
    }

    pub fn with_tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip_text = Some(text.into());
        self
    }

    pub fn insensitive(mut self) -> Self {
        self.sensitive = false;
        self
    }
}

/// The list-model contract
pub trait IconModel {
    fn n_rows(&self) -> usize;

    /// Snapshot of the row at `index`
    fn row(&self, index: usize) -> Option<RowData>;

    /// Whether row keys stay valid across unrelated mutations
    fn iters_persist(&self) -> bool;

    fn key_at(&self, index: usize) -> Option<RowKey>;

    fn index_of(&self, key: RowKey) -> Option<usize>;

    /// Whether the model stores row/column positions written back to it
    fn supports_positions(&self) -> bool {
        false
    }
}

/// How an item refers back to its model row. Chosen once, when the item is
/// created, from [`IconModel::iters_persist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemRef {
    /// Persistent row key, looked up on every resolve
    Persistent(RowKey),
    /// Row index kept current by replaying insert/delete notifications
    Tracked(TrackedRow),
}

/// Path-tracking row reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedRow {
    index: usize,
    valid: bool,
}

impl TrackedRow {
    pub fn new(index: usize) -> Self {
        Self { index, valid: true }
    }
}

impl ItemRef {
    pub fn for_row<M: IconModel + ?Sized>(model: &M, index: usize) -> Self {
        if model.iters_persist() {
            if let Some(key) = model.key_at(index) {
                return ItemRef::Persistent(key);
            }
        }
        ItemRef::Tracked(TrackedRow::new(index))
    }

    /// Current row index, `None` if the row no longer exists
    pub fn resolve<M: IconModel + ?Sized>(&self, model: &M) -> Option<usize> {
        match self {
            ItemRef::Persistent(key) => model.index_of(*key),
            ItemRef::Tracked(row) => {
                (row.valid && row.index < model.n_rows()).then_some(row.index)
            }
        }
    }

    /// Replay a row insertion at `index`
    pub(crate) fn row_inserted(&mut self, index: usize) {
        if let ItemRef::Tracked(row) = self {
            if row.valid && row.index >= index {
                row.index += 1;
            }
        }
    }

    /// Replay a row deletion at `index`
    pub(crate) fn row_deleted(&mut self, index: usize) {
        if let ItemRef::Tracked(row) = self {
            if !row.valid {
                return;
            }
            if row.index == index {
                row.valid = false;
            } else if row.index > index {
                row.index -= 1;
            }
        }
    }
}
