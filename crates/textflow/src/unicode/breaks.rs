use bitflags::bitflags;
use unicode_linebreak::{BreakOpportunity, linebreaks};
use unicode_segmentation::UnicodeSegmentation;

use super::graphemes::CharIndexMap;
use super::properties::is_expandable_space;

bitflags! {
    /// Break opportunities and character attributes at one position.
    ///
    /// Entry `i` of a break table describes the boundary *before*
    /// character `i` and the attributes *of* character `i`. The table has
    /// one extra entry for the end of the text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BreakOppo: u16 {
        /// UAX #14 allows a line break here.
        const LINE_ALLOWED = 1 << 0;
        /// UAX #14 requires a line break here.
        const LINE_MANDATORY = 1 << 1;
        /// UAX #29 word boundary.
        const WORD_BOUNDARY = 1 << 2;
        /// UAX #29 extended grapheme boundary (a cursor position).
        const GRAPHEME_BOUNDARY = 1 << 3;
        /// The character is white space.
        const WHITESPACE = 1 << 8;
        /// The character is a space that justification may stretch.
        const EXPANDABLE_SPACE = 1 << 9;
    }
}

impl BreakOppo {
    pub fn is_line_break(self) -> bool {
        self.intersects(BreakOppo::LINE_ALLOWED | BreakOppo::LINE_MANDATORY)
    }

    pub fn is_cursor_position(self) -> bool {
        self.contains(BreakOppo::GRAPHEME_BOUNDARY)
    }
}

/// Compute the break table for `text`; the result has `text.len() + 1`
/// entries.
pub fn compute_break_opportunities(text: &[char]) -> Vec<BreakOppo> {
    let map = CharIndexMap::new(text);
    let s = map.as_str();
    let mut table = vec![BreakOppo::empty(); text.len() + 1];

    for (byte_offset, opportunity) in linebreaks(s) {
        table[map.char_offset(byte_offset)] |= match opportunity {
            BreakOpportunity::Mandatory => BreakOppo::LINE_MANDATORY,
            BreakOpportunity::Allowed => BreakOppo::LINE_ALLOWED,
        };
    }

    for (byte_offset, _) in s.grapheme_indices(true) {
        table[map.char_offset(byte_offset)] |= BreakOppo::GRAPHEME_BOUNDARY;
    }
    for (byte_offset, _) in s.split_word_bound_indices() {
        table[map.char_offset(byte_offset)] |= BreakOppo::WORD_BOUNDARY;
    }
    table[text.len()] |= BreakOppo::GRAPHEME_BOUNDARY | BreakOppo::WORD_BOUNDARY;

    for (i, &c) in text.iter().enumerate() {
        if c.is_whitespace() {
            table[i] |= BreakOppo::WHITESPACE;
        }
        if is_expandable_space(c) {
            table[i] |= BreakOppo::EXPANDABLE_SPACE;
        }
    }

    table
}
