use serde::{Deserialize, Serialize};

/// Line wrapping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrapMode {
    /// Do not wrap; only line separators end a line.
    NoWrap,
    /// Wrap at UAX #14 line break opportunities only. Words longer than
    /// the line overflow.
    Normal,
    /// Wrap at line break opportunities, falling back to grapheme
    /// boundaries when a single word exceeds the line.
    #[default]
    BreakWord,
    /// Allow breaking between any two grapheme clusters.
    BreakAll,
}

/// Where an overflowing last line is elided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ellipsize {
    #[default]
    None,
    Start,
    Middle,
    End,
}

/// Horizontal alignment of lines within the available extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    /// Left for left-to-right lines, right for right-to-left lines.
    #[default]
    Start,
    /// Opposite of `Start`.
    End,
    Left,
    Right,
    Center,
    /// Start-aligned, with wrapped lines stretched to the full extent.
    Justify,
}

/// How justification distributes the extra space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextJustify {
    /// Between words, or between clusters when a line has no spaces.
    #[default]
    Auto,
    /// Between words only.
    InterWord,
    /// Between grapheme clusters only.
    InterCharacter,
}

/// Which lines the indent applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentMode {
    #[default]
    None,
    /// Only the first line of the paragraph.
    FirstLine,
    /// Every line except the first.
    Hanging,
}

/// Block flow direction and line progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritingMode {
    /// Horizontal lines stacked top to bottom.
    #[default]
    HorizontalTb,
    /// Horizontal lines stacked bottom to top.
    HorizontalBt,
    /// Vertical lines stacked right to left.
    VerticalRl,
    /// Vertical lines stacked left to right.
    VerticalLr,
}

impl WritingMode {
    pub fn is_vertical(self) -> bool {
        matches!(self, WritingMode::VerticalRl | WritingMode::VerticalLr)
    }
}

/// Glyph orientation for vertical writing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextOrientation {
    /// Vertical scripts and wide characters upright, the rest natural.
    #[default]
    Auto,
    /// Same as `Auto`.
    Mixed,
    /// Everything rotated sideways, right-to-left scripts the other way.
    Line,
    Upright,
    Sideways,
    UpsideDown,
    SidewaysLeft,
}

/// Parameters of a [`Layout`](super::Layout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub wrap: WrapMode,
    pub ellipsize: Ellipsize,
    pub align: Align,
    pub justify: TextJustify,
    /// Extra space between grapheme clusters, in pixels.
    pub letter_spacing: i32,
    /// Extra space added to every space separator, in pixels.
    pub word_spacing: i32,
    /// Distance between default tab stops. Zero or less means eight
    /// space widths.
    pub tab_size: i32,
    /// Explicit tab stop positions; the last gap repeats past the end.
    pub tabs: Vec<i32>,
    pub indent: i32,
    pub indent_mode: IndentMode,
    /// When set, every line uses this extent and the per-call width is
    /// ignored.
    pub fixed_extent: Option<i32>,
    pub writing_mode: WritingMode,
    pub text_orientation: TextOrientation,
    /// Keep every produced line in the layout.
    pub persist_lines: bool,
    /// Treat line separators as ordinary characters.
    pub single_paragraph: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            wrap: WrapMode::default(),
            ellipsize: Ellipsize::None,
            align: Align::Start,
            justify: TextJustify::Auto,
            letter_spacing: 0,
            word_spacing: 0,
            tab_size: 0,
            tabs: Vec::new(),
            indent: 0,
            indent_mode: IndentMode::None,
            fixed_extent: None,
            writing_mode: WritingMode::HorizontalTb,
            text_orientation: TextOrientation::Auto,
            persist_lines: true,
            single_paragraph: false,
        }
    }
}
