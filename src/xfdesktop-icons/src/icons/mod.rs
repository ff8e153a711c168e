//! Icon image cache
//!
//! Icon names are resolved in the configured freedesktop theme, decoded
//! (PNG through `image`, SVG through `resvg`) and kept as pixmaps keyed by
//! name, size and scale. Theme or scale changes bump the cache generation;
//! views compare the generation of what they hold and reload lazily.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tiny_skia::{IntSize, Pixmap, Transform};
use tracing::{debug, warn};

use crate::error::{IconViewError, Result};

mod kind;

pub use kind::FileKind;

/// Fallback when a name resolves to nothing in the theme
pub const MISSING_ICON: &str = "image-missing";

type CacheKey = (String, u32, u32);

pub struct IconCache {
    theme: String,
    scale: u32,
    generation: u64,
    entries: HashMap<CacheKey, Option<Rc<Pixmap>>>,
}

impl IconCache {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            scale: 1,
            generation: 1,
            entries: HashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) {
        let theme = theme.into();
        if theme != self.theme {
            self.theme = theme;
            self.invalidate_all();
        }
    }

    pub fn set_scale(&mut self, scale: u32) {
        let scale = scale.max(1);
        if scale != self.scale {
            self.scale = scale;
            self.invalidate_all();
        }
    }

    /// Forget every cached image and start a new generation
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.generation += 1;
        debug!("Icon cache generation {}", self.generation);
    }

    /// Pixmap for an icon name or absolute image path at `size` logical
    /// pixels. Misses are cached too.
    pub fn get(&mut self, name: &str, size: u32) -> Option<Rc<Pixmap>> {
        let key = (name.to_string(), size, self.scale);
        if let Some(entry) = self.entries.get(&key) {
            return entry.clone();
        }

        let pixels = size * self.scale;
        let entry = self
            .find_file(name, size)
            .or_else(|| self.find_file(MISSING_ICON, size))
            .and_then(|path| match load_image(&path, pixels) {
                Ok(pixmap) => Some(Rc::new(pixmap)),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            });
        self.entries.insert(key, entry.clone());
        entry
    }

    /// Locate the image file for `name`
    pub fn find_file(&self, name: &str, size: u32) -> Option<PathBuf> {
        let path = Path::new(name);
        if path.is_absolute() {
            return path.exists().then(|| path.to_path_buf());
        }
        freedesktop_icons::lookup(name)
            .with_size(size.min(u16::MAX as u32) as u16)
            .with_scale(self.scale.min(u16::MAX as u32) as u16)
            .with_theme(&self.theme)
            .with_cache()
            .find()
    }
}

/// Decode an image file into a `size` x `size` (at most) pixmap
pub fn load_image(path: &Path, size: u32) -> Result<Pixmap> {
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        load_svg(path, size)
    } else {
        load_raster(path, size)
    }
}

fn decode_error(path: &Path, reason: impl ToString) -> IconViewError {
    IconViewError::IconDecode {
        name: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn load_svg(path: &Path, size: u32) -> Result<Pixmap> {
    let data = std::fs::read(path).map_err(|source| IconViewError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = resvg::usvg::Tree::from_data(&data, &resvg::usvg::Options::default())
        .map_err(|e| decode_error(path, e))?;

    let natural = tree.size();
    let scale = (size as f32 / natural.width()).min(size as f32 / natural.height());
    let mut pixmap = Pixmap::new(size, size).ok_or_else(|| decode_error(path, "zero size"))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    Ok(pixmap)
}

fn load_raster(path: &Path, size: u32) -> Result<Pixmap> {
    let img = image::open(path).map_err(|e| decode_error(path, e))?;
    let rgba = img
        .resize(size, size, image::imageops::FilterType::Triangle)
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    // tiny-skia stores premultiplied alpha
    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let alpha = px[3] as u16;
        for channel in &mut px[..3] {
            *channel = ((*channel as u16 * alpha + 127) / 255) as u8;
        }
    }
    let dims = IntSize::from_wh(width, height).ok_or_else(|| decode_error(path, "zero size"))?;
    Pixmap::from_vec(data, dims).ok_or_else(|| decode_error(path, "bad pixel buffer"))
}
