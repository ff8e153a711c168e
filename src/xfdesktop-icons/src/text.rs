//! Label measurement and wrapping

use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::error::{IconViewError, Result};

/// Horizontal ellipsis appended to truncated labels
const ELLIPSIS: char = '\u{2026}';

/// Measures label text in pixels
pub trait TextMeasurer {
    fn text_width(&self, text: &str) -> u32;
    fn line_height(&self) -> u32;
}

/// Constant advance per character. Deterministic; used when no font file
/// is configured and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedMeasurer {
    pub advance: u32,
    pub line_height: u32,
}

impl FixedMeasurer {
    pub fn for_font_size(font_size: f32) -> Self {
        let size = font_size.max(1.0);
        Self {
            advance: (size * 0.6).ceil() as u32,
            line_height: (size * 1.3).ceil() as u32,
        }
    }
}

impl Default for FixedMeasurer {
    fn default() -> Self {
        Self::for_font_size(12.0)
    }
}

impl TextMeasurer for FixedMeasurer {
    fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.advance
    }

    fn line_height(&self) -> u32 {
        self.line_height
    }
}

/// Glyph metrics from a real font via fontdue
pub struct FontMeasurer {
    font: Font,
    px: f32,
}

impl FontMeasurer {
    pub fn from_file(path: &Path, px: f32) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| IconViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| IconViewError::Font(format!("{}: {}", path.display(), e)))?;
        Ok(Self { font, px })
    }
}

impl TextMeasurer for FontMeasurer {
    fn text_width(&self, text: &str) -> u32 {
        let width: f32 = text
            .chars()
            .map(|c| self.font.metrics(c, self.px).advance_width)
            .sum();
        width.ceil() as u32
    }

    fn line_height(&self) -> u32 {
        self.font
            .horizontal_line_metrics(self.px)
            .map(|m| m.new_line_size.ceil() as u32)
            .unwrap_or((self.px * 1.3).ceil() as u32)
    }
}

/// A label broken into display lines
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelLayout {
    pub lines: Vec<String>,
    /// Widest line, in pixels
    pub width: u32,
    pub height: u32,
    pub truncated: bool,
}

/// Greedy word wrap at `max_width`. Words wider than a line are broken
/// between characters. With `max_lines` set, extra lines are dropped and
/// the last kept line is ellipsized when `ellipsize` is on.
pub fn layout_label(
    measurer: &dyn TextMeasurer,
    text: &str,
    max_width: u32,
    max_lines: Option<usize>,
    ellipsize: bool,
) -> LabelLayout {
    let max_width = max_width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if measurer.text_width(&candidate) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        // the word alone may still be too wide
        for c in word.chars() {
            current.push(c);
            if measurer.text_width(&current) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let mut truncated = false;
    if let Some(limit) = max_lines {
        if lines.len() > limit {
            truncated = true;
            lines.truncate(limit.max(1));
            if ellipsize {
                if let Some(last) = lines.last_mut() {
                    ellipsize_line(measurer, last, max_width);
                }
            }
        }
    }

    let width = lines
        .iter()
        .map(|l| measurer.text_width(l))
        .max()
        .unwrap_or(0)
        .min(max_width);
    let height = lines.len() as u32 * measurer.line_height();

    LabelLayout {
        lines,
        width,
        height,
        truncated,
    }
}

fn ellipsize_line(measurer: &dyn TextMeasurer, line: &mut String, max_width: u32) {
    line.push(ELLIPSIS);
    while measurer.text_width(line) > max_width && line.chars().count() > 1 {
        line.pop();
        line.pop();
        line.push(ELLIPSIS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurer() -> FixedMeasurer {
        FixedMeasurer {
            advance: 10,
            line_height: 14,
        }
    }

    #[test]
    fn test_short_label_is_one_line() {
        let l = layout_label(&measurer(), "Home", 100, None, true);
        assert_eq!(l.lines, vec!["Home"]);
        assert_eq!(l.width, 40);
        assert_eq!(l.height, 14);
        assert!(!l.truncated);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        // "my holiday" is exactly 100 wide and still fits
        let l = layout_label(&measurer(), "my holiday photos", 100, None, true);
        assert_eq!(l.lines, vec!["my holiday", "photos"]);
        assert_eq!(l.width, 100);

        let l = layout_label(&measurer(), "my holiday photos", 90, None, true);
        assert_eq!(l.lines, vec!["my", "holiday", "photos"]);
        assert_eq!(l.width, 70);
    }

    #[test]
    fn test_long_word_is_broken() {
        let l = layout_label(&measurer(), "abcdefghijkl", 50, None, false);
        assert_eq!(l.lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_line_limit_ellipsizes() {
        let l = layout_label(&measurer(), "one two three four", 50, Some(2), true);
        assert_eq!(l.lines.len(), 2);
        assert!(l.truncated);
        assert!(l.lines[1].ends_with(ELLIPSIS));
        assert!(measurer().text_width(&l.lines[1]) <= 50);
    }

    #[test]
    fn test_line_limit_without_ellipsis() {
        let l = layout_label(&measurer(), "one two three four", 50, Some(2), false);
        assert_eq!(l.lines, vec!["one", "two"]);
        assert!(l.truncated);
    }

    #[test]
    fn test_empty_label() {
        let l = layout_label(&measurer(), "", 50, Some(2), true);
        assert!(l.lines.is_empty());
        assert_eq!(l.height, 0);
    }
}
