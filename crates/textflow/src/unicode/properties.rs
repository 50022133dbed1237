//! Character classification used by the itemizer and the layout engine.

use unicode_script::Script;
use unicode_width::UnicodeWidthChar;

pub const TAB: char = '\t';
pub const LINE_SEPARATOR: char = '\u{2028}';
pub const PARAGRAPH_SEPARATOR: char = '\u{2029}';

/// Characters that always start their own run and force the next
/// character into a new run.
pub fn is_forced_break(c: char) -> bool {
    matches!(c, TAB | LINE_SEPARATOR | PARAGRAPH_SEPARATOR)
}

/// Characters that close a line whenever they begin a run.
pub fn is_line_separator(c: char) -> bool {
    matches!(c, LINE_SEPARATOR | PARAGRAPH_SEPARATOR)
}

/// Characters rendered as zero-width no-ops instead of being shaped.
///
/// Covers controls (Cc), line/paragraph separators (Zl, Zp) and format
/// characters (Cf). The joiners and the emoji tag block are left to the
/// shaper since they change how their neighbours render.
pub fn is_no_shaping(c: char) -> bool {
    if c.is_control() || matches!(c, LINE_SEPARATOR | PARAGRAPH_SEPARATOR) {
        return true;
    }
    matches!(
        c as u32,
        0x00AD
            | 0x0600..=0x0605
            | 0x061C
            | 0x06DD
            | 0x070F
            | 0x0890..=0x0891
            | 0x08E2
            | 0x180E
            | 0x200B
            | 0x200E..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x2064
            | 0x2066..=0x206F
            | 0xFEFF
            | 0xFFF9..=0xFFFB
            | 0x110BD
            | 0x110CD
            | 0x13430..=0x1343F
            | 0x1BCA0..=0x1BCA3
            | 0x1D173..=0x1D17A
            | 0xE0001
    )
}

/// General category Zs.
pub fn is_space_separator(c: char) -> bool {
    matches!(
        c as u32,
        0x0020 | 0x00A0 | 0x1680 | 0x2000..=0x200A | 0x202F | 0x205F | 0x3000
    )
}

/// Spaces that justification may stretch.
pub fn is_expandable_space(c: char) -> bool {
    matches!(
        c as u32,
        0x0020 | 0x1680 | 0x2000..=0x2006 | 0x2008..=0x200A | 0x205F | 0x3000
    )
}

/// East Asian wide or fullwidth.
pub fn is_wide(c: char) -> bool {
    c.width() == Some(2)
}

/// Zero-width characters never change the width class of a segment.
pub(crate) fn is_zero_width(c: char) -> bool {
    !matches!(c.width(), Some(w) if w > 0)
}

/// Characters whose default presentation is emoji.
pub fn is_emoji_presentation(c: char) -> bool {
    matches!(
        c as u32,
        0x231A..=0x231B
            | 0x23E9..=0x23EC
            | 0x23F0
            | 0x23F3
            | 0x25FD..=0x25FE
            | 0x2614..=0x2615
            | 0x2648..=0x2653
            | 0x267F
            | 0x2693
            | 0x26A1
            | 0x26AA..=0x26AB
            | 0x26BD..=0x26BE
            | 0x26C4..=0x26C5
            | 0x26CE
            | 0x26D4
            | 0x26EA
            | 0x26F2..=0x26F3
            | 0x26F5
            | 0x26FA
            | 0x26FD
            | 0x2705
            | 0x270A..=0x270B
            | 0x2728
            | 0x274C
            | 0x274E
            | 0x2753..=0x2755
            | 0x2757
            | 0x2795..=0x2797
            | 0x27B0
            | 0x27BF
            | 0x2B1B..=0x2B1C
            | 0x2B50
            | 0x2B55
            | 0x1F004
            | 0x1F0CF
            | 0x1F18E
            | 0x1F191..=0x1F19A
            | 0x1F1E6..=0x1F1FF
            | 0x1F201
            | 0x1F21A
            | 0x1F22F
            | 0x1F232..=0x1F236
            | 0x1F238..=0x1F23A
            | 0x1F250..=0x1F251
            | 0x1F300..=0x1F320
            | 0x1F32D..=0x1F335
            | 0x1F337..=0x1F37C
            | 0x1F37E..=0x1F393
            | 0x1F3A0..=0x1F3CA
            | 0x1F3CF..=0x1F3D3
            | 0x1F3E0..=0x1F3F0
            | 0x1F3F4
            | 0x1F3F8..=0x1F43E
            | 0x1F440
            | 0x1F442..=0x1F4FC
            | 0x1F4FF..=0x1F53D
            | 0x1F54B..=0x1F54E
            | 0x1F550..=0x1F567
            | 0x1F57A
            | 0x1F595..=0x1F596
            | 0x1F5A4
            | 0x1F5FB..=0x1F64F
            | 0x1F680..=0x1F6C5
            | 0x1F6CC
            | 0x1F6D0..=0x1F6D2
            | 0x1F6D5..=0x1F6D7
            | 0x1F6DC..=0x1F6DF
            | 0x1F6EB..=0x1F6EC
            | 0x1F6F4..=0x1F6FC
            | 0x1F7E0..=0x1F7EB
            | 0x1F7F0
            | 0x1F90C..=0x1F93A
            | 0x1F93C..=0x1F945
            | 0x1F947..=0x1F9FF
            | 0x1FA70..=0x1FAFF
    )
}

/// Characters that extend an emoji sequence: ZWJ, VS16, keycap,
/// skin tone modifiers and tags.
pub fn is_emoji_continuation(c: char) -> bool {
    matches!(
        c as u32,
        0x200D | 0xFE0F | 0x20E3 | 0x1F3FB..=0x1F3FF | 0xE0020..=0xE007F
    )
}

/// Scripts that do not end a script run on their own.
pub fn is_weak_script(script: Script) -> bool {
    matches!(script, Script::Common | Script::Inherited | Script::Unknown)
}

/// Scripts whose glyphs stay upright in vertical text.
pub fn is_vertical_script(script: Script) -> bool {
    matches!(
        script,
        Script::Han
            | Script::Hiragana
            | Script::Katakana
            | Script::Hangul
            | Script::Bopomofo
            | Script::Yi
    )
}

pub fn is_rtl_script(script: Script) -> bool {
    matches!(
        script,
        Script::Arabic
            | Script::Hebrew
            | Script::Syriac
            | Script::Thaana
            | Script::Nko
            | Script::Samaritan
            | Script::Mandaic
    )
}

const BRACKET_PAIRS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('\u{00AB}', '\u{00BB}'),
    ('\u{2018}', '\u{2019}'),
    ('\u{201C}', '\u{201D}'),
    ('\u{2039}', '\u{203A}'),
    ('\u{3008}', '\u{3009}'),
    ('\u{300A}', '\u{300B}'),
    ('\u{300C}', '\u{300D}'),
    ('\u{300E}', '\u{300F}'),
    ('\u{3010}', '\u{3011}'),
    ('\u{FF08}', '\u{FF09}'),
    ('\u{FF3B}', '\u{FF3D}'),
    ('\u{FF5B}', '\u{FF5D}'),
];

/// Paired punctuation role of `c`, used to give closing brackets the
/// script of their opening bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Open(char),
    Close(char),
}

pub fn paired_bracket(c: char) -> Option<Bracket> {
    BRACKET_PAIRS.iter().find_map(|&(open, close)| {
        if c == open {
            Some(Bracket::Open(close))
        } else if c == close {
            Some(Bracket::Close(close))
        } else {
            None
        }
    })
}
