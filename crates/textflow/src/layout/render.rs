//! Hand-off from laid out lines to a glyph renderer.

use crate::itemize::{Color, GlyphOrient, RunFlags, RunsInfo};
use crate::shaping::GlyphId;

use super::line::{GlyphRunFlags, LayoutLine};
use super::options::WritingMode;

/// Position of one glyph of a line, relative to the line origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphPos {
    pub glyph: GlyphId,
    pub x: i32,
    pub y: i32,
    pub x_off: i32,
    pub y_off: i32,
    pub advance: i32,
    pub orient: GlyphOrient,
    /// Buffer offset of the first character of the glyph's cluster.
    pub char_index: usize,
    pub ch: char,
    pub color: Color,
    pub background: Color,
    /// Nothing should be drawn for the glyph.
    pub suppressed: bool,
    /// A blank advance, drawn as background only.
    pub whitespace: bool,
    /// Part of an ellipsis.
    pub ellipsis: bool,
    /// Part of an emoji sequence; renderers may draw it from a color font.
    pub emoji: bool,
}

/// An axis-aligned rectangle in pixels; `right` and `bottom` are
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Smallest rectangle covering both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Walk the glyphs of `line` in visual order, handing each position to
/// `visitor` until it returns `false`. Returns the number of glyphs
/// visited.
pub(crate) fn traverse_line<F>(
    info: &RunsInfo<'_>,
    line: &LayoutLine,
    writing_mode: WritingMode,
    line_offset: i32,
    mut visitor: F,
) -> usize
where
    F: FnMut(&GlyphPos) -> bool,
{
    let text = info.text();
    let vertical = writing_mode.is_vertical();
    let mut advance = 0;
    let mut visited = 0;

    for run in line.runs() {
        let emoji = info.runs()[run.text_run].flags.contains(RunFlags::EMOJI);
        for (glyph, &cluster) in run.glyphs.glyphs.iter().zip(&run.glyphs.log_clusters) {
            let (mut x, mut y) = if vertical {
                (0, advance + line_offset)
            } else {
                (advance + line_offset, 0)
            };

            if run.flags.contains(GlyphRunFlags::CENTERED_BASELINE) {
                let shift = match run.orient {
                    GlyphOrient::UpsideDown => {
                        y += glyph.width;
                        match writing_mode {
                            WritingMode::VerticalRl => -(line.height - glyph.height) / 2,
                            WritingMode::VerticalLr => (line.height + glyph.height) / 2,
                            _ => 0,
                        }
                    }
                    GlyphOrient::Upright => match writing_mode {
                        WritingMode::VerticalRl => -(line.height - glyph.height) / 2,
                        WritingMode::VerticalLr => (line.height - glyph.height) / 2,
                        _ => 0,
                    },
                    _ => 0,
                };
                x += shift;
            }

            if run.orient == GlyphOrient::SidewaysLeft {
                y += glyph.width;
                match writing_mode {
                    WritingMode::VerticalRl => x -= line.height,
                    WritingMode::VerticalLr => x += line.height,
                    _ => {}
                }
            }

            let char_index = (run.start + cluster).min(text.len().saturating_sub(1));
            let no_shaping = run.flags.contains(GlyphRunFlags::NO_SHAPING);
            let pos = GlyphPos {
                glyph: glyph.glyph,
                x,
                y,
                x_off: glyph.x_off,
                y_off: glyph.y_off,
                advance: glyph.width,
                orient: run.orient,
                char_index,
                ch: text[char_index],
                color: info.text_color_at(char_index),
                background: info.background_color_at(char_index),
                suppressed: no_shaping && glyph.width <= 0,
                whitespace: no_shaping && glyph.width > 0,
                ellipsis: run.is_ellipsis(),
                emoji,
            };

            if !visitor(&pos) {
                return visited;
            }
            visited += 1;
            advance += glyph.width;
        }
    }
    visited
}
