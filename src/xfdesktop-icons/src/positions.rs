//! Persisted icon positions
//!
//! Maps an item identity (the desktop entry's file name) to the slot it
//! last occupied, so the layout survives a restart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IconViewError, Result};
use crate::grid::Slot;

const POSITIONS_FILE: &str = "icon-positions.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PositionFile {
    #[serde(default)]
    positions: BTreeMap<String, Slot>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> IconViewError {
    let path = path.to_path_buf();
    move |source| IconViewError::Io { path, source }
}

#[derive(Debug)]
pub struct PositionStore {
    path: PathBuf,
    positions: BTreeMap<String, Slot>,
    dirty: bool,
}

impl PositionStore {
    /// `$XDG_DATA_HOME/xfdesktop-icons/icon-positions.toml`
    pub fn default_path() -> Option<PathBuf> {
        match xdg::BaseDirectories::with_prefix("xfdesktop-icons") {
            Ok(dirs) => Some(dirs.get_data_file(POSITIONS_FILE)),
            Err(e) => {
                warn!("No XDG data directory: {}", e);
                None
            }
        }
    }

    /// An empty store that will save to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            positions: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Load from `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            debug!("No position file at {}", path.display());
            return Ok(Self::empty(path));
        }
        let content = std::fs::read_to_string(&path).map_err(|source| IconViewError::Io {
            path: path.clone(),
            source,
        })?;
        let file: PositionFile = toml::from_str(&content).map_err(|source| IconViewError::Config {
            path: path.clone(),
            source,
        })?;
        debug!("Loaded {} icon positions", file.positions.len());
        Ok(Self {
            path,
            positions: file.positions,
            dirty: false,
        })
    }

    /// Load, falling back to an empty store on unreadable or malformed files
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(path.clone()) {
            Ok(store) => store,
            Err(e) => {
                warn!("Ignoring icon positions: {}", e);
                Self::empty(path)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, key: &str) -> Option<Slot> {
        self.positions.get(key).copied()
    }

    pub fn set(&mut self, key: &str, slot: Slot) {
        if self.positions.get(key) != Some(&slot) {
            self.positions.insert(key.to_string(), slot);
            self.dirty = true;
        }
    }

    pub fn remove(&mut self, key: &str) {
        if self.positions.remove(key).is_some() {
            self.dirty = true;
        }
    }

    /// Rename an entry, keeping its slot
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(slot) = self.positions.remove(from) {
            self.positions.insert(to.to_string(), slot);
            self.dirty = true;
        }
    }

    /// Drop entries for items that no longer exist
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        let before = self.positions.len();
        self.positions.retain(|key, _| keep(key));
        if self.positions.len() != before {
            self.dirty = true;
        }
    }

    /// Write the file if anything changed
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let file = PositionFile {
            positions: self.positions.clone(),
        };
        let content = toml::to_string_pretty(&file)?;

        // write then rename so a crash never leaves a truncated file
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, content).map_err(io_error(&tmp))?;
        std::fs::rename(&tmp, &self.path).map_err(io_error(&self.path))?;

        self.dirty = false;
        debug!("Saved {} icon positions to {}", self.positions.len(), self.path.display());
        Ok(())
    }
}
