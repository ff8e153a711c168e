//! Placement gravity: which corner auto-placement starts from and which
//! axis it fills first.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Gravity bits. An absent bit means the opposite direction:
    /// no `RIGHT` is left, no `BOTTOM` is top, no `VERTICAL` is a
    /// horizontal (row-filling) primary axis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Gravity: u8 {
        const RIGHT    = 0b001;
        const BOTTOM   = 0b010;
        const VERTICAL = 0b100;
    }
}

impl Gravity {
    pub const TOP_LEFT: Self = Self::empty();
    pub const TOP_RIGHT: Self = Self::RIGHT;
    pub const BOTTOM_LEFT: Self = Self::BOTTOM;
    pub const BOTTOM_RIGHT: Self = Self::RIGHT.union(Self::BOTTOM);

    pub fn from_parts(corner: Corner, axis: Axis) -> Self {
        let mut gravity = match corner {
            Corner::TopLeft => Self::TOP_LEFT,
            Corner::TopRight => Self::TOP_RIGHT,
            Corner::BottomLeft => Self::BOTTOM_LEFT,
            Corner::BottomRight => Self::BOTTOM_RIGHT,
        };
        if axis == Axis::Vertical {
            gravity |= Self::VERTICAL;
        }
        gravity
    }

    /// Column step (+1 or -1) in the horizontal gravity direction
    pub fn col_step(self) -> i64 {
        if self.contains(Self::RIGHT) { -1 } else { 1 }
    }

    /// Row step (+1 or -1) in the vertical gravity direction
    pub fn row_step(self) -> i64 {
        if self.contains(Self::BOTTOM) { -1 } else { 1 }
    }

    pub fn is_vertical(self) -> bool {
        self.contains(Self::VERTICAL)
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::TOP_LEFT
    }
}

/// Starting corner, as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Primary fill axis, as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}
