use crate::font::FontDescriptor;
use crate::itemize::TextRun;

use super::GlyphString;

/// A span of one run handed to a [`Shaper`].
#[derive(Debug, Clone, Copy)]
pub struct ShapeRequest<'a> {
    /// The run whose attributes (script, language, level) apply.
    pub run: &'a TextRun,
    /// Font of the span; runs never mix fonts.
    pub font: &'a FontDescriptor,
    /// Characters to shape.
    pub chars: &'a [char],
    /// Buffer offset of `chars[0]`.
    pub offset: usize,
}

impl<'a> ShapeRequest<'a> {
    pub fn new(
        run: &'a TextRun,
        font: &'a FontDescriptor,
        chars: &'a [char],
        offset: usize,
    ) -> Self {
        Self {
            run,
            font,
            chars,
            offset,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_rtl(&self) -> bool {
        self.run.is_rtl()
    }
}

/// Font-wide measurements the layout engine needs besides glyph advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontExtents {
    /// Line height in pixels.
    pub height: i32,
    /// Advance used for glyphs produced by the fallback shaper.
    pub fallback_advance: i32,
    /// Advance of U+0020, used for default tab stops.
    pub space_advance: i32,
}

/// Turns character spans into glyphs.
///
/// Implementations must return glyphs in visual order with cluster
/// indices relative to the span start (see [`GlyphString`]). Returning
/// `None` makes the layout engine fall back to one placeholder glyph per
/// character.
pub trait Shaper {
    fn shape(&self, request: &ShapeRequest<'_>) -> Option<GlyphString>;

    fn extents(&self, run: &TextRun, font: &FontDescriptor) -> FontExtents;

    /// Per-character advances of `glyphs`, the shaped form of `request`.
    /// The break search measures trial widths with these instead of
    /// shaping again.
    ///
    /// The default splits each cluster's width evenly over its
    /// characters.
    fn logical_widths(&self, request: &ShapeRequest<'_>, glyphs: &GlyphString) -> Vec<i32> {
        glyphs.logical_widths(request.is_rtl(), request.len())
    }
}

impl<T: Shaper + ?Sized> Shaper for &T {
    fn shape(&self, request: &ShapeRequest<'_>) -> Option<GlyphString> {
        (**self).shape(request)
    }

    fn extents(&self, run: &TextRun, font: &FontDescriptor) -> FontExtents {
        (**self).extents(run, font)
    }

    fn logical_widths(&self, request: &ShapeRequest<'_>, glyphs: &GlyphString) -> Vec<i32> {
        (**self).logical_widths(request, glyphs)
    }
}

impl<T: Shaper + ?Sized> Shaper for Box<T> {
    fn shape(&self, request: &ShapeRequest<'_>) -> Option<GlyphString> {
        (**self).shape(request)
    }

    fn extents(&self, run: &TextRun, font: &FontDescriptor) -> FontExtents {
        (**self).extents(run, font)
    }

    fn logical_widths(&self, request: &ShapeRequest<'_>, glyphs: &GlyphString) -> Vec<i32> {
        (**self).logical_widths(request, glyphs)
    }
}
