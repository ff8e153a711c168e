//! xfdesktop-icons - desktop icon grid engine
//!
//! Lays icons out on a fixed grid of equally sized slots, keeps selection
//! and a keyboard cursor, turns pointer and key input into those changes,
//! and resolves drag-and-drop of icon groups within and between views.
//! The [`daemon`] module hosts a view over a desktop directory.

pub mod config;
pub mod daemon;
pub mod dnd;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod icons;
pub mod model;
pub mod positions;
pub mod renderer;
pub mod text;
pub mod view;

pub use config::{Config, SelectionMode, Style};
pub use dnd::{DragBatch, DragEncoding, DragPayload, DragStatus, DropOutcome, DropRejection};
pub use error::{IconViewError, Result};
pub use geometry::{Point, Rect};
pub use grid::{Axis, Corner, Gravity, GridGeometry, Slot, SlotGrid, Walk};
pub use model::{IconModel, ItemRef, ListModel, ModelEvent, RowData, RowKey};
pub use view::{Button, IconView, ItemId, Key, Modifiers, ViewEvent, ViewId};
