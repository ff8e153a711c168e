//! Slot grid
//!
//! A dense `nrows x ncols` array of optional occupants, flattened
//! column-major (`index = col * nrows + row`). The grid owns nothing; it
//! is a spatial index of item ids. Writes go through [`SlotGrid::occupy`]
//! and [`SlotGrid::vacate`], which only the layout engine in
//! [`crate::view`] and drop resolution on scratch copies call.

use serde::{Deserialize, Serialize};

mod gravity;
mod metrics;

pub use gravity::{Axis, Corner, Gravity};
pub use metrics::{GridGeometry, MIN_MARGIN};

/// Grid coordinates of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub row: u32,
    pub col: u32,
}

impl Slot {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Slot shifted by a signed offset, if the result has no negative component
    pub fn offset(self, drow: i64, dcol: i64) -> Option<Slot> {
        let row = self.row as i64 + drow;
        let col = self.col as i64 + dcol;
        if row < 0 || col < 0 || row > u32::MAX as i64 || col > u32::MAX as i64 {
            return None;
        }
        Some(Slot::new(row as u32, col as u32))
    }
}

/// Fixed reading-order walks used for keyboard navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Along a row, wrapping onto the next/previous row
    RowMajor,
    /// Down a column, wrapping onto the next/previous column
    ColumnMajor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid<T> {
    nrows: u32,
    ncols: u32,
    cells: Vec<Option<T>>,
}

impl<T: Copy + PartialEq> SlotGrid<T> {
    pub fn new(nrows: u32, ncols: u32) -> Self {
        Self {
            nrows,
            ncols,
            cells: vec![None; nrows as usize * ncols as usize],
        }
    }

    pub fn nrows(&self) -> u32 {
        self.nrows
    }

    pub fn ncols(&self) -> u32 {
        self.ncols
    }

    /// A grid with no rows or no columns holds nothing
    pub fn is_empty(&self) -> bool {
        self.nrows == 0 || self.ncols == 0
    }

    pub fn contains(&self, slot: Slot) -> bool {
        slot.row < self.nrows && slot.col < self.ncols
    }

    pub fn index_of(&self, slot: Slot) -> Option<usize> {
        self.contains(slot)
            .then(|| slot.col as usize * self.nrows as usize + slot.row as usize)
    }

    pub fn get(&self, slot: Slot) -> Option<T> {
        self.index_of(slot).and_then(|i| self.cells[i])
    }

    /// In bounds and unoccupied
    pub fn is_free(&self, slot: Slot) -> bool {
        self.index_of(slot).is_some_and(|i| self.cells[i].is_none())
    }

    /// Put `value` in `slot`. Fails when out of bounds or occupied.
    pub(crate) fn occupy(&mut self, slot: Slot, value: T) -> bool {
        match self.index_of(slot) {
            Some(i) if self.cells[i].is_none() => {
                self.cells[i] = Some(value);
                true
            }
            _ => false,
        }
    }

    /// Clear `slot` only if it currently holds `value`
    pub(crate) fn vacate(&mut self, slot: Slot, value: T) -> bool {
        match self.index_of(slot) {
            Some(i) if self.cells[i] == Some(value) => {
                self.cells[i] = None;
                true
            }
            _ => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Occupied slots in row-major (reading) order
    pub fn occupied(&self) -> impl Iterator<Item = (Slot, T)> + '_ {
        (0..self.nrows).flat_map(move |row| {
            (0..self.ncols).filter_map(move |col| {
                let slot = Slot::new(row, col);
                self.get(slot).map(|v| (slot, v))
            })
        })
    }

    /// Corner a gravity walk starts from
    pub fn gravity_origin(&self, gravity: Gravity) -> Option<Slot> {
        if self.is_empty() {
            return None;
        }
        let row = if gravity.contains(Gravity::BOTTOM) { self.nrows - 1 } else { 0 };
        let col = if gravity.contains(Gravity::RIGHT) { self.ncols - 1 } else { 0 };
        Some(Slot::new(row, col))
    }

    fn clamp(&self, slot: Slot) -> Slot {
        Slot::new(slot.row.min(self.nrows - 1), slot.col.min(self.ncols - 1))
    }

    /// Next slot of a gravity walk, `None` once the walk leaves the grid
    pub fn gravity_step(&self, slot: Slot, gravity: Gravity) -> Option<Slot> {
        let (nrows, ncols) = (self.nrows as i64, self.ncols as i64);
        let (mut row, mut col) = (slot.row as i64, slot.col as i64);
        let (drow, dcol) = (gravity.row_step(), gravity.col_step());

        if gravity.is_vertical() {
            row += drow;
            if row < 0 || row >= nrows {
                row = if drow > 0 { 0 } else { nrows - 1 };
                col += dcol;
                if col < 0 || col >= ncols {
                    return None;
                }
            }
        } else {
            col += dcol;
            if col < 0 || col >= ncols {
                col = if dcol > 0 { 0 } else { ncols - 1 };
                row += drow;
                if row < 0 || row >= nrows {
                    return None;
                }
            }
        }

        Some(Slot::new(row as u32, col as u32))
    }

    /// First free slot at or after `start` along the gravity walk. With no
    /// start the walk begins at the gravity corner; a start outside the
    /// grid is clamped onto its nearest edge first.
    pub fn find_next_free(&self, start: Option<Slot>, gravity: Gravity) -> Option<Slot> {
        if self.is_empty() {
            return None;
        }

        let mut cur = match start {
            Some(slot) => self.clamp(slot),
            None => self.gravity_origin(gravity)?,
        };

        loop {
            if self.is_free(cur) {
                return Some(cur);
            }
            cur = self.gravity_step(cur, gravity)?;
        }
    }

    /// Next slot of a reading-order walk, `None` past either end
    pub fn reading_step(&self, slot: Slot, walk: Walk, forward: bool) -> Option<Slot> {
        if self.is_empty() {
            return None;
        }
        let index = match walk {
            Walk::RowMajor => slot.row as i64 * self.ncols as i64 + slot.col as i64,
            Walk::ColumnMajor => slot.col as i64 * self.nrows as i64 + slot.row as i64,
        };
        let next = if forward { index + 1 } else { index - 1 };
        let total = self.nrows as i64 * self.ncols as i64;
        if next < 0 || next >= total {
            return None;
        }
        Some(match walk {
            Walk::RowMajor => Slot::new(
                (next / self.ncols as i64) as u32,
                (next % self.ncols as i64) as u32,
            ),
            Walk::ColumnMajor => Slot::new(
                (next % self.nrows as i64) as u32,
                (next / self.nrows as i64) as u32,
            ),
        })
    }

    /// First occupied slot strictly after `from` along a reading-order walk
    pub fn next_occupied(&self, from: Slot, walk: Walk, forward: bool) -> Option<(Slot, T)> {
        let mut cur = from;
        while let Some(next) = self.reading_step(cur, walk, forward) {
            if let Some(v) = self.get(next) {
                return Some((next, v));
            }
            cur = next;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(nrows: u32, ncols: u32, n: u32, gravity: Gravity) -> SlotGrid<u32> {
        let mut grid = SlotGrid::new(nrows, ncols);
        for i in 0..n {
            let slot = grid.find_next_free(None, gravity).unwrap();
            assert!(grid.occupy(slot, i));
        }
        grid
    }

    // ========================================================================
    // Storage
    // ========================================================================

    #[test]
    fn test_column_major_index() {
        let grid: SlotGrid<u32> = SlotGrid::new(3, 4);
        assert_eq!(grid.index_of(Slot::new(0, 0)), Some(0));
        assert_eq!(grid.index_of(Slot::new(2, 0)), Some(2));
        assert_eq!(grid.index_of(Slot::new(0, 1)), Some(3));
        assert_eq!(grid.index_of(Slot::new(2, 3)), Some(11));
        assert_eq!(grid.index_of(Slot::new(3, 0)), None);
        assert_eq!(grid.index_of(Slot::new(0, 4)), None);
    }

    #[test]
    fn test_occupy_rejects_conflicts_and_out_of_bounds() {
        let mut grid = SlotGrid::new(2, 2);
        assert!(grid.occupy(Slot::new(1, 1), 7));
        assert!(!grid.occupy(Slot::new(1, 1), 8));
        assert!(!grid.occupy(Slot::new(2, 0), 8));
        assert_eq!(grid.get(Slot::new(1, 1)), Some(7));
    }

    #[test]
    fn test_vacate_only_matching_occupant() {
        let mut grid = SlotGrid::new(2, 2);
        grid.occupy(Slot::new(0, 1), 1);
        assert!(!grid.vacate(Slot::new(0, 1), 2));
        assert_eq!(grid.get(Slot::new(0, 1)), Some(1));
        assert!(grid.vacate(Slot::new(0, 1), 1));
        assert!(grid.is_free(Slot::new(0, 1)));
    }

    #[test]
    fn test_zero_sized_grid() {
        let grid: SlotGrid<u32> = SlotGrid::new(0, 5);
        assert!(grid.is_empty());
        assert_eq!(grid.find_next_free(None, Gravity::TOP_LEFT), None);
        assert_eq!(grid.find_next_free(Some(Slot::new(3, 3)), Gravity::TOP_LEFT), None);
        assert!(!grid.is_free(Slot::new(0, 0)));
    }

    // ========================================================================
    // Gravity walk
    // ========================================================================

    #[test]
    fn test_top_left_horizontal_fills_rows_first() {
        let mut grid = SlotGrid::new(3, 3);
        let mut order = Vec::new();
        for i in 0..7 {
            let slot = grid.find_next_free(None, Gravity::TOP_LEFT).unwrap();
            grid.occupy(slot, i);
            order.push((slot.row, slot.col));
        }
        assert_eq!(
            order,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0)]
        );
    }

    #[test]
    fn test_top_left_vertical_fills_columns_first() {
        let grid = filled(2, 3, 3, Gravity::TOP_LEFT | Gravity::VERTICAL);
        assert_eq!(grid.get(Slot::new(0, 0)), Some(0));
        assert_eq!(grid.get(Slot::new(1, 0)), Some(1));
        assert_eq!(grid.get(Slot::new(0, 1)), Some(2));
    }

    #[test]
    fn test_bottom_right_starts_in_bottom_right_corner() {
        let grid = filled(3, 3, 4, Gravity::BOTTOM_RIGHT);
        assert_eq!(grid.get(Slot::new(2, 2)), Some(0));
        assert_eq!(grid.get(Slot::new(2, 1)), Some(1));
        assert_eq!(grid.get(Slot::new(2, 0)), Some(2));
        assert_eq!(grid.get(Slot::new(1, 2)), Some(3));
    }

    #[test]
    fn test_top_right_vertical() {
        let grid = filled(2, 2, 3, Gravity::TOP_RIGHT | Gravity::VERTICAL);
        assert_eq!(grid.get(Slot::new(0, 1)), Some(0));
        assert_eq!(grid.get(Slot::new(1, 1)), Some(1));
        assert_eq!(grid.get(Slot::new(0, 0)), Some(2));
    }

    #[test]
    fn test_find_next_free_fills_holes_first() {
        let mut grid = filled(3, 3, 7, Gravity::TOP_LEFT);
        assert!(grid.vacate(Slot::new(1, 1), 4));
        assert_eq!(
            grid.find_next_free(None, Gravity::TOP_LEFT),
            Some(Slot::new(1, 1))
        );
    }

    #[test]
    fn test_find_next_free_full_grid_fails() {
        let grid = filled(2, 3, 6, Gravity::TOP_LEFT);
        assert_eq!(grid.find_next_free(None, Gravity::TOP_LEFT), None);
        assert_eq!(grid.find_next_free(Some(Slot::new(1, 2)), Gravity::BOTTOM_RIGHT), None);
    }

    #[test]
    fn test_seeded_search_only_walks_forward() {
        let mut grid = SlotGrid::new(2, 2);
        grid.occupy(Slot::new(1, 0), 1);
        grid.occupy(Slot::new(1, 1), 2);
        assert_eq!(grid.find_next_free(Some(Slot::new(1, 0)), Gravity::TOP_LEFT), None);
        assert_eq!(
            grid.find_next_free(Some(Slot::new(0, 1)), Gravity::TOP_LEFT),
            Some(Slot::new(0, 1))
        );
    }

    #[test]
    fn test_seed_outside_grid_is_clamped() {
        let grid: SlotGrid<u32> = SlotGrid::new(2, 2);
        assert_eq!(
            grid.find_next_free(Some(Slot::new(9, 9)), Gravity::TOP_LEFT),
            Some(Slot::new(1, 1))
        );
    }

    // ========================================================================
    // Reading-order walks
    // ========================================================================

    #[test]
    fn test_row_major_step_wraps() {
        let grid: SlotGrid<u32> = SlotGrid::new(2, 3);
        assert_eq!(grid.reading_step(Slot::new(0, 2), Walk::RowMajor, true), Some(Slot::new(1, 0)));
        assert_eq!(grid.reading_step(Slot::new(1, 0), Walk::RowMajor, false), Some(Slot::new(0, 2)));
        assert_eq!(grid.reading_step(Slot::new(1, 2), Walk::RowMajor, true), None);
    }

    #[test]
    fn test_column_major_step_wraps() {
        let grid: SlotGrid<u32> = SlotGrid::new(2, 3);
        assert_eq!(grid.reading_step(Slot::new(1, 0), Walk::ColumnMajor, true), Some(Slot::new(0, 1)));
        assert_eq!(grid.reading_step(Slot::new(0, 0), Walk::ColumnMajor, false), None);
    }

    #[test]
    fn test_next_occupied_skips_holes() {
        let mut grid = SlotGrid::new(3, 3);
        grid.occupy(Slot::new(0, 0), 1);
        grid.occupy(Slot::new(2, 1), 2);
        assert_eq!(
            grid.next_occupied(Slot::new(0, 0), Walk::RowMajor, true),
            Some((Slot::new(2, 1), 2))
        );
        assert_eq!(grid.next_occupied(Slot::new(2, 1), Walk::RowMajor, true), None);
    }

    #[test]
    fn test_occupied_is_row_major() {
        let mut grid = SlotGrid::new(2, 2);
        grid.occupy(Slot::new(1, 0), 3);
        grid.occupy(Slot::new(0, 1), 2);
        let order: Vec<u32> = grid.occupied().map(|(_, v)| v).collect();
        assert_eq!(order, vec![2, 3]);
    }
}
