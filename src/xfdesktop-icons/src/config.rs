//! Configuration for xfdesktop-icons

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{IconViewError, Result};
use crate::grid::{Axis, Corner, Gravity};

/// Lower bound for the context-menu popup delay
pub const MIN_CONTEXT_MENU_DELAY_MS: u64 = 225;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Icon size in pixels
    #[serde(default = "default_icon_size")]
    pub icon_size: u32,

    /// Icon label font size
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Font used to measure labels; a fixed advance is assumed without one
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    /// Corner that automatic placement starts from
    #[serde(default)]
    pub gravity: Corner,

    /// Axis filled first by automatic placement
    #[serde(default)]
    pub primary_axis: Axis,

    #[serde(default)]
    pub selection_mode: SelectionMode,

    /// Activate items on a single click instead of a double click
    #[serde(default)]
    pub single_click: bool,

    /// Pointer travel, in pixels, before a press turns into a drag
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: u32,

    #[serde(default = "default_context_menu_delay_ms")]
    pub context_menu_delay_ms: u64,

    /// Inactivity before the type-ahead buffer resets
    #[serde(default = "default_typeahead_timeout_ms")]
    pub typeahead_timeout_ms: u64,

    /// Icon theme
    #[serde(default = "default_icon_theme")]
    pub icon_theme: String,

    #[serde(default)]
    pub style: Style,

    /// Colors
    #[serde(default)]
    pub colors: Colors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    None,
    Single,
    #[default]
    Multiple,
}

/// Numeric style parameters feeding slot size and item extents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Padding inside a slot, around icon and label
    #[serde(default = "default_cell_padding")]
    pub cell_padding: u32,

    /// Gap between icon and label
    #[serde(default = "default_cell_spacing")]
    pub cell_spacing: u32,

    #[serde(default = "default_label_radius")]
    pub label_radius: f32,

    /// Label width as a multiple of the icon size
    #[serde(default = "default_text_width_ratio")]
    pub text_width_ratio: f32,

    /// Ellipsize unselected labels that exceed two lines
    #[serde(default = "default_true")]
    pub ellipsize_labels: bool,

    #[serde(default = "default_tooltip_icon_size")]
    pub tooltip_icon_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colors {
    #[serde(default = "default_label_fg")]
    pub label_fg: String,

    #[serde(default = "default_label_bg")]
    pub label_bg: String,

    #[serde(default = "default_label_shadow")]
    pub label_shadow: String,

    #[serde(default = "default_selection")]
    pub selection: String,

    #[serde(default = "default_focus")]
    pub focus: String,

    #[serde(default = "default_rubber_band")]
    pub rubber_band: String,

    #[serde(default = "default_drop_highlight")]
    pub drop_highlight: String,
}

// Default functions
fn default_icon_size() -> u32 { 48 }
fn default_font_size() -> f32 { 12.0 }
fn default_drag_threshold() -> u32 { 8 }
fn default_context_menu_delay_ms() -> u64 { MIN_CONTEXT_MENU_DELAY_MS }
fn default_typeahead_timeout_ms() -> u64 { 1500 }
fn default_true() -> bool { true }

fn default_icon_theme() -> String {
    "Adwaita".to_string()
}

fn default_cell_padding() -> u32 { 6 }
fn default_cell_spacing() -> u32 { 2 }
fn default_label_radius() -> f32 { 4.0 }
fn default_text_width_ratio() -> f32 { 1.75 }
fn default_tooltip_icon_size() -> u32 { 64 }

fn default_label_fg() -> String { "#ffffff".to_string() }
fn default_label_bg() -> String { "#00000080".to_string() }
fn default_label_shadow() -> String { "#000000".to_string() }
fn default_selection() -> String { "#3584e4a0".to_string() }
fn default_focus() -> String { "#ffffffc0".to_string() }
fn default_rubber_band() -> String { "#3584e440".to_string() }
fn default_drop_highlight() -> String { "#ffffff80".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            icon_size: default_icon_size(),
            font_size: default_font_size(),
            font_path: None,
            gravity: Corner::default(),
            primary_axis: Axis::default(),
            selection_mode: SelectionMode::default(),
            single_click: false,
            drag_threshold: default_drag_threshold(),
            context_menu_delay_ms: default_context_menu_delay_ms(),
            typeahead_timeout_ms: default_typeahead_timeout_ms(),
            icon_theme: default_icon_theme(),
            style: Style::default(),
            colors: Colors::default(),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            cell_padding: default_cell_padding(),
            cell_spacing: default_cell_spacing(),
            label_radius: default_label_radius(),
            text_width_ratio: default_text_width_ratio(),
            ellipsize_labels: true,
            tooltip_icon_size: default_tooltip_icon_size(),
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            label_fg: default_label_fg(),
            label_bg: default_label_bg(),
            label_shadow: default_label_shadow(),
            selection: default_selection(),
            focus: default_focus(),
            rubber_band: default_rubber_band(),
            drop_highlight: default_drop_highlight(),
        }
    }
}

impl Config {
    /// Load configuration from file or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Try explicit path first
        if let Some(p) = path {
            if p.exists() {
                return Self::from_file(p);
            }
        }

        // Try XDG config
        if let Some(config_dir) = dirs::config_dir() {
            let config_file = config_dir.join("xfdesktop-icons/config.toml");
            if config_file.exists() {
                return Self::from_file(&config_file);
            }
        }

        // Use defaults
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| IconViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| IconViewError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn gravity(&self) -> Gravity {
        Gravity::from_parts(self.gravity, self.primary_axis)
    }

    pub fn context_menu_delay(&self) -> Duration {
        Duration::from_millis(self.context_menu_delay_ms.max(MIN_CONTEXT_MENU_DELAY_MS))
    }

    pub fn typeahead_timeout(&self) -> Duration {
        Duration::from_millis(self.typeahead_timeout_ms)
    }
}
