//! Icon drag and drop
//!
//! A drag carries the whole selection as a [`DragBatch`]. Dropping it
//! shifts every icon by the offset between the drop slot and the lead
//! icon's source slot. Destinations are resolved on a scratch copy of the
//! grid in two passes: exact offsets first, then a free-slot search for
//! the icons whose offset slot was taken. The live grid is only touched
//! once every destination is known.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::grid::{Gravity, Slot, SlotGrid};
use crate::model::ItemRef;
use crate::view::{ItemId, ViewId};

mod payload;

pub use payload::{DragEncoding, DragPayload, DRAG_TARGET, PAYLOAD_VERSION};

/// One icon of a drag batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraggedIcon {
    pub item: ItemId,
    pub reference: ItemRef,
    pub source_slot: Slot,
    /// Filled in by drop resolution
    pub destination: Option<Slot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragBatch {
    pub source_view: ViewId,
    /// Source slot of the keyboard cursor item, the offset anchor
    pub cursor_slot: Option<Slot>,
    pub icons: Vec<DraggedIcon>,
}

impl DragBatch {
    pub(crate) fn anchor(&self) -> Option<Slot> {
        self.cursor_slot
            .or_else(|| self.icons.first().map(|icon| icon.source_slot))
    }

    /// Whether `item` of `view` is part of this batch
    pub(crate) fn contains(&self, view: ViewId, item: ItemId) -> bool {
        self.source_view == view && self.icons.iter().any(|icon| icon.item == item)
    }
}

/// Answer to a drag hovering the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStatus {
    /// The slot under the pointer accepts the drop
    Move(Slot),
    Refuse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropRejection {
    /// No icon of the batch could be resolved
    EmptyBatch,
    /// The pointer is not over a slot
    NoSlot,
    /// The slot under the pointer is taken
    Occupied,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Rejected(DropRejection),
    /// Same-view drop, committed. Every icon carries its destination;
    /// `None` means it found no slot.
    Moved(Vec<DraggedIcon>),
    /// Icons from another view with their resolved destinations. The host
    /// moves the rows and writes the positions into this view's model.
    Transfer(Vec<DraggedIcon>),
}

/// Where every icon of `batch` lands when dropped on `destination` of
/// `grid`, owned by `view`. Works on a scratch copy; `grid` is untouched.
pub(crate) fn resolve_destinations(
    grid: &SlotGrid<ItemId>,
    gravity: Gravity,
    view: ViewId,
    batch: &DragBatch,
    destination: Slot,
) -> Vec<DraggedIcon> {
    let mut icons = batch.icons.clone();
    let Some(anchor) = batch.anchor() else {
        return icons;
    };
    let drow = destination.row as i64 - anchor.row as i64;
    let dcol = destination.col as i64 - anchor.col as i64;

    let mut scratch = grid.clone();
    if batch.source_view == view {
        for icon in &icons {
            scratch.vacate(icon.source_slot, icon.item);
        }
    }

    let mut deferred = Vec::new();
    for (index, icon) in icons.iter_mut().enumerate() {
        match icon.source_slot.offset(drow, dcol) {
            Some(target) if scratch.occupy(target, icon.item) => icon.destination = Some(target),
            _ => deferred.push(index),
        }
    }

    // overflow, in batch order
    for index in deferred {
        let icon = &mut icons[index];
        let seed = Slot::new(
            (icon.source_slot.row as i64 + drow).max(0) as u32,
            (icon.source_slot.col as i64 + dcol).max(0) as u32,
        );
        let found = scratch
            .find_next_free(Some(seed), gravity)
            .or_else(|| scratch.find_next_free(None, gravity));
        icon.destination = found.filter(|slot| scratch.occupy(*slot, icon.item));
        if icon.destination.is_none() {
            warn!("No slot left for dropped icon {:?}", icon.item);
        }
    }
    icons
}
