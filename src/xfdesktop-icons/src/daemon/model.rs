//! Directory-backed list model
//!
//! One row per non-hidden entry of the desktop directory, kept sorted with
//! folders first and then by label. Every mutator returns the events the
//! owner must forward to the view.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{IconViewError, Result};
use crate::grid::Slot;
use crate::icons::FileKind;
use crate::model::{IconModel, ListModel, ModelEvent, RowData, RowKey};
use crate::positions::PositionStore;
use crate::view::compare_labels;

/// File name as shown on the desktop and used as the position key
pub fn entry_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn is_hidden(path: &Path) -> bool {
    entry_name(path).map_or(true, |n| n.starts_with('.'))
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Build the row for a desktop entry. `None` for hidden or vanished entries.
pub fn row_for_path(path: &Path, positions: &PositionStore) -> Option<RowData> {
    if is_hidden(path) {
        return None;
    }
    let name = entry_name(path)?;
    let metadata = std::fs::symlink_metadata(path).ok()?;
    let kind = FileKind::detect(path, Some(&metadata));

    let tooltip = if metadata.is_dir() {
        kind.describe().to_string()
    } else {
        format!("{}, {}", kind.describe(), human_size(metadata.len()))
    };

    let mut row = RowData::new(name)
        .with_icon(kind.icon_name())
        .with_priority(kind.sort_priority())
        .with_tooltip(tooltip);
    row.position = positions.get(name);
    Some(row)
}

fn row_order(a: &RowData, b: &RowData) -> Ordering {
    a.sort_priority
        .unwrap_or(0)
        .cmp(&b.sort_priority.unwrap_or(0))
        .then_with(|| compare_labels(&a.label, &b.label))
}

pub struct DesktopModel {
    dir: PathBuf,
    list: ListModel,
    /// Entry path of each row, index-aligned with `list`
    paths: Vec<PathBuf>,
}

impl DesktopModel {
    /// A model with no rows yet
    pub fn empty(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            list: ListModel::new(),
            paths: Vec::new(),
        }
    }

    /// Read the directory once. A missing directory yields an empty model.
    pub fn scan(dir: impl Into<PathBuf>, positions: &PositionStore) -> Result<Self> {
        let mut model = Self::empty(dir);
        if !model.dir.exists() {
            warn!("Desktop directory does not exist: {}", model.dir.display());
            return Ok(model);
        }

        let entries = std::fs::read_dir(&model.dir).map_err(|source| IconViewError::Io {
            path: model.dir.clone(),
            source,
        })?;
        for entry in entries.filter_map(|e| e.ok()) {
            model.add(&entry.path(), positions);
        }
        debug!("Scanned {} desktop entries", model.len());
        Ok(model)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn path_at(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    pub fn index_of_path(&self, path: &Path) -> Option<usize> {
        self.paths.iter().position(|p| p == path)
    }

    pub fn get(&self, index: usize) -> Option<&RowData> {
        self.list.get(index)
    }

    /// Insert a row for `path` at its sorted position
    pub fn add(&mut self, path: &Path, positions: &PositionStore) -> Option<ModelEvent> {
        if self.index_of_path(path).is_some() {
            return None;
        }
        let row = row_for_path(path, positions)?;
        let index = (0..self.list.len())
            .find(|&i| {
                self.list
                    .get(i)
                    .is_some_and(|other| row_order(&row, other) == Ordering::Less)
            })
            .unwrap_or(self.list.len());

        debug!("Added desktop entry {}", path.display());
        self.paths.insert(index, path.to_path_buf());
        Some(self.list.insert(index, row))
    }

    pub fn remove(&mut self, path: &Path) -> Option<ModelEvent> {
        let index = self.index_of_path(path)?;
        self.paths.remove(index);
        debug!("Removed desktop entry {}", path.display());
        self.list.remove(index)
    }

    /// Re-read an entry's metadata. The stored position is kept.
    pub fn refresh(&mut self, path: &Path, positions: &PositionStore) -> Option<ModelEvent> {
        let index = self.index_of_path(path)?;
        let mut row = row_for_path(path, positions)?;
        row.position = self.list.get(index).and_then(|old| old.position);
        if self.list.get(index) == Some(&row) {
            return None;
        }
        self.list.update(index, row)
    }

    pub fn set_position(&mut self, index: usize, slot: Slot) -> Option<ModelEvent> {
        self.list.set_position(index, slot)
    }
}

impl IconModel for DesktopModel {
    fn n_rows(&self) -> usize {
        self.list.n_rows()
    }

    fn row(&self, index: usize) -> Option<RowData> {
        self.list.row(index)
    }

    fn iters_persist(&self) -> bool {
        self.list.iters_persist()
    }

    fn key_at(&self, index: usize) -> Option<RowKey> {
        self.list.key_at(index)
    }

    fn index_of(&self, key: RowKey) -> Option<usize> {
        self.list.index_of(key)
    }

    fn supports_positions(&self) -> bool {
        true
    }
}
