//! Grid dimensions and the slot <-> pixel transforms

use super::Slot;
use crate::geometry::{Point, Rect};

/// Minimum outer margin around the grid, in pixels
pub const MIN_MARGIN: u32 = 8;

/// Grid dimensions and spacing resolved for one viewport size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridGeometry {
    pub slot_size: u32,
    pub nrows: u32,
    pub ncols: u32,
    pub xmargin: u32,
    pub ymargin: u32,
    pub xspacing: u32,
    pub yspacing: u32,
}

/// Split the pixels left over after `count` slots into an even inter-slot
/// spacing and an outer margin. Returns `(margin, spacing)`.
fn distribute(extent: u32, count: u32, slot_size: u32) -> (u32, u32) {
    if count == 0 {
        return (MIN_MARGIN, 0);
    }
    let rest = extent - 2 * MIN_MARGIN - count * slot_size;
    // count - 1 inner gaps plus one share for each margin
    let spacing = rest / (count + 1);
    let leftover = rest - spacing * (count + 1);
    (MIN_MARGIN + spacing + leftover / 2, spacing)
}

impl GridGeometry {
    pub fn compute(width: u32, height: u32, slot_size: u32) -> Self {
        if slot_size == 0 {
            return Self::default();
        }

        let nrows = height.saturating_sub(2 * MIN_MARGIN) / slot_size;
        let ncols = width.saturating_sub(2 * MIN_MARGIN) / slot_size;
        let (ymargin, yspacing) = distribute(height, nrows, slot_size);
        let (xmargin, xspacing) = distribute(width, ncols, slot_size);

        Self {
            slot_size,
            nrows,
            ncols,
            xmargin,
            ymargin,
            xspacing,
            yspacing,
        }
    }

    /// No slot fits: layout is deferred until the viewport grows
    pub fn is_degenerate(&self) -> bool {
        self.nrows == 0 || self.ncols == 0
    }

    pub fn slot_origin(&self, slot: Slot) -> Point {
        let s = self.slot_size as i32;
        Point::new(
            self.xmargin as i32 + slot.col as i32 * (s + self.xspacing as i32),
            self.ymargin as i32 + slot.row as i32 * (s + self.yspacing as i32),
        )
    }

    pub fn slot_rect(&self, slot: Slot) -> Rect {
        let origin = self.slot_origin(slot);
        let s = self.slot_size as i32;
        Rect::new(origin.x, origin.y, s, s)
    }

    /// Slot under a pixel, `None` in the margins, the gaps between slots,
    /// or past the last row/column.
    pub fn slot_at(&self, x: i32, y: i32) -> Option<Slot> {
        let col = Self::axis_index(x, self.xmargin, self.xspacing, self.slot_size)?;
        let row = Self::axis_index(y, self.ymargin, self.yspacing, self.slot_size)?;
        (row < self.nrows && col < self.ncols).then_some(Slot::new(row, col))
    }

    fn axis_index(pos: i32, margin: u32, spacing: u32, slot_size: u32) -> Option<u32> {
        if slot_size == 0 {
            return None;
        }
        let offset = pos - margin as i32;
        if offset < 0 {
            return None;
        }
        let step = (slot_size + spacing) as i32;
        if offset % step >= slot_size as i32 {
            return None;
        }
        Some((offset / step) as u32)
    }
}
