use hashbrown::{HashMap, HashSet};

use crate::font::FontDescriptor;
use crate::itemize::TextRun;
use crate::unicode::properties::{is_wide, is_zero_width};

use super::{FontExtents, GlyphId, GlyphString, ShapeRequest, ShapedGlyph, Shaper};

/// Deterministic shaper with fixed per-character advances.
///
/// Every character becomes one glyph whose id is its code point. Wide
/// characters get twice the base advance and zero-width characters
/// (combining marks, joiners) attach to the preceding cluster. Ligature
/// pairs merge two characters into a single glyph. Fonts registered with
/// [`SimpleShaper::with_font_advance`] use their own base advance.
#[derive(Debug, Clone)]
pub struct SimpleShaper {
    advance: i32,
    height: i32,
    overrides: HashMap<char, i32>,
    font_advances: HashMap<String, i32>,
    ligatures: HashSet<(char, char)>,
    unsupported: HashSet<char>,
}

impl SimpleShaper {
    pub fn new(advance: i32, height: i32) -> Self {
        Self {
            advance,
            height,
            overrides: HashMap::new(),
            font_advances: HashMap::new(),
            ligatures: HashSet::new(),
            unsupported: HashSet::new(),
        }
    }

    /// Use `advance` for every occurrence of `ch`.
    pub fn with_advance(mut self, ch: char, advance: i32) -> Self {
        self.overrides.insert(ch, advance);
        self
    }

    /// Use `advance` as the base advance for text in the font named `font`.
    pub fn with_font_advance(mut self, font: impl Into<String>, advance: i32) -> Self {
        self.font_advances.insert(font.into(), advance);
        self
    }

    /// Render `first` followed by `second` as one ligature glyph.
    pub fn with_ligature(mut self, first: char, second: char) -> Self {
        self.ligatures.insert((first, second));
        self
    }

    /// Refuse to shape any span containing `ch`.
    pub fn with_unsupported(mut self, ch: char) -> Self {
        self.unsupported.insert(ch);
        self
    }

    /// Advance of `ch` in the default font.
    pub fn advance_of(&self, ch: char) -> i32 {
        self.advance_in(self.advance, ch)
    }

    fn base_advance(&self, font: &FontDescriptor) -> i32 {
        self.font_advances.get(&font.name).copied().unwrap_or(self.advance)
    }

    fn advance_in(&self, base: i32, ch: char) -> i32 {
        if let Some(&advance) = self.overrides.get(&ch) {
            advance
        } else if is_zero_width(ch) {
            0
        } else if is_wide(ch) {
            base * 2
        } else {
            base
        }
    }
}

impl Default for SimpleShaper {
    fn default() -> Self {
        Self::new(10, 16)
    }
}

impl Shaper for SimpleShaper {
    fn shape(&self, request: &ShapeRequest<'_>) -> Option<GlyphString> {
        let chars = request.chars;
        if chars.iter().any(|c| self.unsupported.contains(c)) {
            return None;
        }
        let base = self.base_advance(request.font);

        let mut glyphs = GlyphString::with_capacity(chars.len());
        let mut cluster = 0;
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            if i + 1 < chars.len() && self.ligatures.contains(&(ch, chars[i + 1])) {
                let width = self.advance_in(base, ch) + self.advance_in(base, chars[i + 1]);
                glyphs.push(ShapedGlyph::new(ch as GlyphId, width, self.height), i);
                cluster = i;
                i += 2;
                continue;
            }

            let mut glyph = ShapedGlyph::new(ch as GlyphId, self.advance_in(base, ch), self.height);
            if i > 0 && is_zero_width(ch) && !self.overrides.contains_key(&ch) {
                glyph.is_cluster_start = false;
            } else {
                cluster = i;
            }
            glyphs.push(glyph, cluster);
            i += 1;
        }

        if request.is_rtl() {
            glyphs.reverse();
            fix_cluster_starts(&mut glyphs);
        }
        Some(glyphs)
    }

    fn extents(&self, _run: &TextRun, font: &FontDescriptor) -> FontExtents {
        let base = self.base_advance(font);
        FontExtents {
            height: self.height,
            fallback_advance: base,
            space_advance: self.advance_in(base, ' '),
        }
    }
}

/// After reversal the first glyph of each cluster in visual order is the
/// one that starts it.
fn fix_cluster_starts(glyphs: &mut GlyphString) {
    let mut prev = None;
    for (glyph, &cluster) in glyphs.glyphs.iter_mut().zip(&glyphs.log_clusters) {
        glyph.is_cluster_start = prev != Some(cluster);
        prev = Some(cluster);
    }
}
