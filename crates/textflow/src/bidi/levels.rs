use serde::{Deserialize, Serialize};
use unicode_bidi::{BidiClass, BidiInfo, LTR_LEVEL, Level, RTL_LEVEL, bidi_class};

/// Requested paragraph direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParagraphDir {
    /// Force left-to-right.
    Ltr,
    /// Force right-to-left.
    Rtl,
    /// First strong character decides, left-to-right when there is none.
    WeakLtr,
    /// First strong character decides, right-to-left when there is none.
    WeakRtl,
    /// Same as `WeakLtr`.
    #[default]
    Auto,
}

/// Resolved direction of a paragraph or a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn from_level(level: u8) -> Self {
        if level % 2 == 1 {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Ltr => Direction::Rtl,
            Direction::Rtl => Direction::Ltr,
        }
    }
}

impl ParagraphDir {
    fn resolve(self, text: &[char]) -> Direction {
        match self {
            ParagraphDir::Ltr => Direction::Ltr,
            ParagraphDir::Rtl => Direction::Rtl,
            ParagraphDir::WeakLtr | ParagraphDir::Auto => {
                first_strong_direction(text).unwrap_or(Direction::Ltr)
            }
            ParagraphDir::WeakRtl => first_strong_direction(text).unwrap_or(Direction::Rtl),
        }
    }
}

/// Embedding levels for one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingLevels {
    /// Resolved paragraph direction.
    pub base_dir: Direction,
    /// One level per character.
    pub levels: Vec<u8>,
}

/// Source of bidi embedding levels.
///
/// The itemizer only consumes levels; implementations run the actual
/// bidirectional algorithm.
pub trait BidiResolver {
    fn embedding_levels(&self, text: &[char], dir: ParagraphDir) -> EmbeddingLevels;
}

/// `BidiResolver` backed by the `unicode-bidi` crate (UAX #9).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeBidi;

impl BidiResolver for UnicodeBidi {
    fn embedding_levels(&self, text: &[char], dir: ParagraphDir) -> EmbeddingLevels {
        let base_dir = dir.resolve(text);
        let para_level: Level = match base_dir {
            Direction::Ltr => LTR_LEVEL,
            Direction::Rtl => RTL_LEVEL,
        };

        let s: String = text.iter().collect();
        let info = BidiInfo::new(&s, Some(para_level));
        // BidiInfo reports levels per byte; take the level at each char start.
        let levels = s
            .char_indices()
            .map(|(byte_idx, _)| info.levels[byte_idx].number())
            .collect();

        EmbeddingLevels { base_dir, levels }
    }
}

/// Direction of the first strong character (rules P2/P3), if any.
pub fn first_strong_direction(text: &[char]) -> Option<Direction> {
    text.iter().find_map(|&c| match bidi_class(c) {
        BidiClass::L => Some(Direction::Ltr),
        BidiClass::R | BidiClass::AL => Some(Direction::Rtl),
        _ => None,
    })
}
