//! Drag source and drop target behaviour of the view

use tracing::{debug, warn};

use super::{IconView, ViewEvent};
use crate::dnd::{
    self, DragBatch, DragEncoding, DragPayload, DragStatus, DraggedIcon, DropOutcome,
    DropRejection,
};
use crate::error::Result;
use crate::grid::Slot;

impl IconView {
    /// The drag started in this view, if one is in flight
    pub fn drag_batch(&self) -> Option<&DragBatch> {
        self.drag.as_ref()
    }

    /// Hand the in-flight drag over to the host, for a drop on another view
    pub fn take_drag(&mut self) -> Option<DragBatch> {
        let batch = self.drag.take()?;
        self.pointer = Default::default();
        Some(batch)
    }

    /// Serialisable form of the in-flight drag
    pub fn drag_payload(&self) -> Option<DragPayload> {
        self.drag.clone().map(DragPayload::new)
    }

    /// Abandon the drag. Nothing moves.
    pub fn drag_cancel(&mut self) {
        if self.drag.take().is_some() {
            debug!("Drag cancelled");
        }
        self.pointer = Default::default();
        self.drag_leave();
    }

    /// A drag hovers the view at `(x, y)`
    pub fn drag_motion(&mut self, batch: &DragBatch, x: i32, y: i32) -> DragStatus {
        let target = self
            .widget_coords_to_slot(x, y)
            .filter(|slot| match self.grid.get(*slot) {
                None => true,
                Some(occupant) => batch.contains(self.id, occupant),
            });
        self.set_drop_highlight(target);
        match target {
            Some(slot) => DragStatus::Move(slot),
            None => DragStatus::Refuse,
        }
    }

    pub fn drag_leave(&mut self) {
        self.set_drop_highlight(None);
    }

    fn set_drop_highlight(&mut self, slot: Option<Slot>) {
        if self.drop_highlight == slot {
            return;
        }
        if let Some(old) = self.drop_highlight_rect() {
            self.redraw(old);
        }
        self.drop_highlight = slot;
        if let Some(new) = self.drop_highlight_rect() {
            self.redraw(new);
        }
    }

    /// Work out where every icon of `batch` would land when dropped on
    /// `destination`, without touching the live grid
    pub fn resolve_destinations(&self, batch: &DragBatch, destination: Slot) -> Vec<DraggedIcon> {
        dnd::resolve_destinations(&self.grid, self.gravity, self.id, batch, destination)
    }

    /// Drop `batch` at `(x, y)`. A drop from this view is committed here;
    /// a drop from another view is resolved and handed back.
    pub fn drop_batch(&mut self, mut batch: DragBatch, x: i32, y: i32) -> DropOutcome {
        self.drag_leave();
        let same_view = batch.source_view == self.id;

        if same_view {
            // icons deleted or moved by the model mid-drag
            batch.icons.retain(|icon| self.item_slot(icon.item) == Some(icon.source_slot));
        }
        if batch.icons.is_empty() {
            warn!("Rejecting drop without resolvable icons");
            return DropOutcome::Rejected(DropRejection::EmptyBatch);
        }
        let Some(destination) = self.widget_coords_to_slot(x, y) else {
            return DropOutcome::Rejected(DropRejection::NoSlot);
        };
        if let Some(occupant) = self.grid.get(destination) {
            if !batch.contains(self.id, occupant) {
                debug!("Drop target {:?} is taken", destination);
                return DropOutcome::Rejected(DropRejection::Occupied);
            }
        }

        let resolved = self.resolve_destinations(&batch, destination);
        if !same_view {
            return DropOutcome::Transfer(resolved);
        }

        let moving: Vec<&DraggedIcon> = resolved
            .iter()
            .filter(|icon| icon.destination != Some(icon.source_slot))
            .collect();
        for icon in &moving {
            self.unplace(icon.item, false);
        }
        for icon in &moving {
            match icon.destination {
                Some(slot) => {
                    self.place_at(icon.item, slot, true);
                }
                None => {
                    if !self.place_at(icon.item, icon.source_slot, false) {
                        self.forget_item_state(icon.item);
                        self.emit(ViewEvent::ItemUnplaced {
                            item: icon.item,
                            reference: icon.reference,
                        });
                    }
                }
            }
        }
        debug!("Dropped {} icons, {} moved", resolved.len(), moving.len());
        DropOutcome::Moved(resolved)
    }

    /// Decode a drag payload from another view and drop it
    pub fn drop_payload(
        &mut self,
        data: &[u8],
        encoding: DragEncoding,
        x: i32,
        y: i32,
    ) -> Result<DropOutcome> {
        let payload = DragPayload::decode(data, encoding)?;
        Ok(self.drop_batch(payload.batch, x, y))
    }
}
