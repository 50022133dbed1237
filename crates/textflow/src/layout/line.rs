use core::ops::Range;

use bitflags::bitflags;

use crate::bidi::Direction;
use crate::itemize::GlyphOrient;
use crate::shaping::GlyphString;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GlyphRunFlags: u8 {
        /// Control or format characters drawn as blank advances.
        const NO_SHAPING = 1 << 0;
        /// A single tab advancing to the next tab stop.
        const TAB = 1 << 1;
        /// The ellipsis standing in for elided text.
        const ELLIPSIS = 1 << 2;
        /// Upright glyphs centered on a vertical line.
        const CENTERED_BASELINE = 1 << 3;
    }
}

/// Shaped glyphs for a span of one text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRun {
    /// Index of the source run in [`RunsInfo::runs`](crate::RunsInfo::runs).
    pub text_run: usize,
    /// First character covered. For an ellipsis this is the first elided
    /// character.
    pub start: usize,
    /// Number of characters covered.
    pub len: usize,
    pub level: u8,
    pub orient: GlyphOrient,
    pub flags: GlyphRunFlags,
    pub glyphs: GlyphString,
}

impl GlyphRun {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_rtl(&self) -> bool {
        self.level % 2 == 1
    }

    pub fn is_tab(&self) -> bool {
        self.flags.contains(GlyphRunFlags::TAB)
    }

    pub fn is_ellipsis(&self) -> bool {
        self.flags.contains(GlyphRunFlags::ELLIPSIS)
    }

    pub fn width(&self) -> i32 {
        self.glyphs.width()
    }

    /// Split at character `at` (relative to `start`) without reshaping.
    /// `self` keeps the head.
    pub(crate) fn split_off(&mut self, at: usize) -> GlyphRun {
        debug_assert!(at > 0 && at < self.len);
        let glyphs = self.glyphs.split_off(self.is_rtl(), at);
        let tail = GlyphRun {
            text_run: self.text_run,
            start: self.start + at,
            len: self.len - at,
            level: self.level,
            orient: self.orient,
            flags: self.flags,
            glyphs,
        };
        self.len = at;
        tail
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LineFlags: u8 {
        /// The line ended at a break rather than at the end of the text.
        const WRAPPED = 1 << 0;
        const ELLIPSIZED = 1 << 1;
        /// Produced with the last-line hint.
        const LAST_LINE = 1 << 2;
        /// First line produced by the layout.
        const PARAGRAPH_START = 1 << 3;
    }
}

/// One laid out line. Runs are in visual order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutLine {
    pub(crate) runs: Vec<GlyphRun>,
    pub(crate) start: usize,
    pub(crate) len: usize,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) max_extent: i32,
    pub(crate) resolved_dir: Direction,
    pub(crate) flags: LineFlags,
}

impl LayoutLine {
    pub(crate) fn new(start: usize, resolved_dir: Direction) -> Self {
        Self {
            runs: Vec::new(),
            start,
            len: 0,
            width: -1,
            height: -1,
            max_extent: -1,
            resolved_dir,
            flags: LineFlags::empty(),
        }
    }

    pub fn runs(&self) -> &[GlyphRun] {
        &self.runs
    }

    /// First character of the line.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of characters consumed by the line.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn text_range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Sum of glyph advances.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Tallest glyph on the line.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Extent the line was fitted into; negative when unconstrained.
    pub fn max_extent(&self) -> i32 {
        self.max_extent
    }

    pub fn resolved_dir(&self) -> Direction {
        self.resolved_dir
    }

    pub fn flags(&self) -> LineFlags {
        self.flags
    }

    pub fn is_wrapped(&self) -> bool {
        self.flags.contains(LineFlags::WRAPPED)
    }

    pub fn is_ellipsized(&self) -> bool {
        self.flags.contains(LineFlags::ELLIPSIZED)
    }

    pub fn is_last_line(&self) -> bool {
        self.flags.contains(LineFlags::LAST_LINE)
    }

    pub fn is_paragraph_start(&self) -> bool {
        self.flags.contains(LineFlags::PARAGRAPH_START)
    }

    pub fn glyph_count(&self) -> usize {
        self.runs.iter().map(|run| run.glyphs.len()).sum()
    }

    pub(crate) fn glyph_width(&self) -> i32 {
        self.runs.iter().map(GlyphRun::width).sum()
    }

    pub(crate) fn glyph_height(&self) -> i32 {
        self.runs.iter().map(|run| run.glyphs.height()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaping::ShapedGlyph;

    fn run(start: usize, widths: &[i32], level: u8) -> GlyphRun {
        let mut glyphs = GlyphString::new();
        for (i, &w) in widths.iter().enumerate() {
            glyphs.push(ShapedGlyph::new(i as u32 + 1, w, 10), i);
        }
        if level % 2 == 1 {
            glyphs.reverse();
        }
        GlyphRun {
            text_run: 0,
            start,
            len: widths.len(),
            level,
            orient: GlyphOrient::Upright,
            flags: GlyphRunFlags::empty(),
            glyphs,
        }
    }

    #[test]
    fn split_keeps_head_and_offsets_tail() {
        let mut head = run(4, &[1, 2, 3], 0);
        let tail = head.split_off(1);
        assert_eq!((head.start, head.len, head.width()), (4, 1, 1));
        assert_eq!((tail.start, tail.len, tail.width()), (5, 2, 5));
    }

    #[test]
    fn rtl_split_takes_visual_start() {
        let mut head = run(0, &[1, 2, 3], 1);
        let tail = head.split_off(2);
        assert_eq!(head.width(), 3);
        assert_eq!(tail.width(), 3);
        assert_eq!(tail.glyphs.log_clusters, vec![0]);
    }
}
