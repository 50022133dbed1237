use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use unicode_script::Script;

use crate::bidi::{Direction, ParagraphDir};
use crate::unicode::Language;

/// Orientation of glyphs relative to the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlyphOrient {
    /// Glyph tops point up (no rotation).
    #[default]
    Upright,
    /// Rotated 90 degrees clockwise.
    Sideways,
    /// Rotated 180 degrees.
    UpsideDown,
    /// Rotated 90 degrees counter-clockwise.
    SidewaysLeft,
    /// Use the font's own orientation.
    Auto,
}

impl GlyphOrient {
    /// Whether glyphs are drawn rotated at all.
    pub fn is_rotated(self) -> bool {
        matches!(
            self,
            GlyphOrient::Sideways | GlyphOrient::UpsideDown | GlyphOrient::SidewaysLeft
        )
    }

    /// Rotated by a quarter turn (vertical text flowing along the line).
    pub fn is_sideways(self) -> bool {
        matches!(self, GlyphOrient::Sideways | GlyphOrient::SidewaysLeft)
    }

    pub(crate) fn opposite(self) -> Self {
        match self {
            GlyphOrient::Sideways => GlyphOrient::SidewaysLeft,
            GlyphOrient::SidewaysLeft => GlyphOrient::Sideways,
            GlyphOrient::Upright => GlyphOrient::UpsideDown,
            GlyphOrient::UpsideDown => GlyphOrient::Upright,
            GlyphOrient::Auto => GlyphOrient::Auto,
        }
    }
}

/// How the resolved base orientation applies to individual scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrientPolicy {
    /// Scripts written vertically by nature, and wide characters, stay upright.
    #[default]
    Natural,
    /// Every run uses the base orientation.
    Strong,
    /// Like `Natural`, but right-to-left scripts rotate the opposite way.
    Line,
}

/// Direction glyphs advance in within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunDir {
    #[default]
    Ltr,
    Rtl,
    /// Top to bottom.
    Ttb,
    /// Bottom to top.
    Btt,
}

impl RunDir {
    pub fn is_vertical(self) -> bool {
        matches!(self, RunDir::Ttb | RunDir::Btt)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RunFlags: u8 {
        /// Control and format characters; rendered as zero-width no-ops.
        const NO_SHAPING = 1 << 0;
        /// The run holds wide characters.
        const UPRIGHT = 1 << 1;
        /// The run is part of an emoji sequence.
        const EMOJI = 1 << 2;
    }
}

/// A maximal span of characters sharing script, language, embedding
/// level, direction, orientation and shaping eligibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// First character of the run.
    pub start: usize,
    /// Number of characters.
    pub len: usize,
    pub lang: Language,
    pub script: Script,
    /// Bidi embedding level; odd levels are right-to-left.
    pub level: u8,
    pub dir: RunDir,
    pub orient: GlyphOrient,
    pub flags: RunFlags,
}

impl TextRun {
    /// A left-to-right run with default attributes, mostly for tests and
    /// synthetic runs.
    pub fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            len,
            lang: Language::default(),
            script: Script::Common,
            level: 0,
            dir: RunDir::Ltr,
            orient: GlyphOrient::Upright,
            flags: RunFlags::empty(),
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_rtl(&self) -> bool {
        self.level % 2 == 1
    }

    pub fn direction(&self) -> Direction {
        Direction::from_level(self.level)
    }

    pub fn needs_shaping(&self) -> bool {
        !self.flags.contains(RunFlags::NO_SHAPING)
    }
}

/// Paragraph-wide itemization parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemizeOptions {
    /// Requested language; runs in other scripts derive their own.
    pub language: Language,
    pub base_direction: ParagraphDir,
    pub run_direction: RunDir,
    pub orientation: GlyphOrient,
    pub orientation_policy: OrientPolicy,
}

impl Default for ItemizeOptions {
    fn default() -> Self {
        Self {
            language: Language::default(),
            base_direction: ParagraphDir::Auto,
            run_direction: RunDir::Ltr,
            orientation: GlyphOrient::Auto,
            orientation_policy: OrientPolicy::Natural,
        }
    }
}

/// A 0xAARRGGBB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const TRANSPARENT: Color = Color(0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }
}
