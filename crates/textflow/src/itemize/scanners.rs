//! Boundary scanners merged by the itemizer.
//!
//! Each scanner covers the buffer with segments of one property value and
//! exposes the current segment as `start..end`. `advance` moves to the
//! next segment and returns `false` once the buffer is exhausted.

use unicode_script::{Script, UnicodeScript};

use crate::unicode::properties::{
    Bracket, is_emoji_continuation, is_emoji_presentation, is_weak_script, is_wide, is_zero_width,
    paired_bracket,
};

const BRACKET_STACK_DEPTH: usize = 64;

pub(crate) trait Scanner {
    fn end(&self) -> usize;
    fn advance(&mut self) -> bool;
}

/// Runs of equal embedding level.
pub(crate) struct LevelScanner<'a> {
    levels: &'a [u8],
    pub start: usize,
    pub end: usize,
    pub level: u8,
}

impl<'a> LevelScanner<'a> {
    pub fn new(levels: &'a [u8]) -> Self {
        let mut scanner = Self {
            levels,
            start: 0,
            end: 0,
            level: 0,
        };
        scanner.advance();
        scanner
    }
}

impl Scanner for LevelScanner<'_> {
    fn end(&self) -> usize {
        self.end
    }

    fn advance(&mut self) -> bool {
        if self.end >= self.levels.len() {
            return false;
        }
        self.start = self.end;
        self.level = self.levels[self.start];
        self.end = self.start + 1;
        while self.end < self.levels.len() && self.levels[self.end] == self.level {
            self.end += 1;
        }
        true
    }
}

/// Runs of one script. Common and inherited characters join the
/// surrounding script and closing brackets take the script of their
/// opening bracket.
pub(crate) struct ScriptScanner<'a> {
    text: &'a [char],
    pub start: usize,
    pub end: usize,
    pub script: Script,
    brackets: Vec<(char, Script)>,
    /// Script of the character that ended the previous segment.
    pending: Option<Script>,
}

impl<'a> ScriptScanner<'a> {
    pub fn new(text: &'a [char]) -> Self {
        let mut scanner = Self {
            text,
            start: 0,
            end: 0,
            script: Script::Common,
            brackets: Vec::new(),
            pending: None,
        };
        scanner.advance();
        scanner
    }

    fn char_script(&mut self, c: char) -> Script {
        let script = c.script();
        match paired_bracket(c) {
            Some(Bracket::Open(close)) => {
                if self.brackets.len() == BRACKET_STACK_DEPTH {
                    self.brackets.remove(0);
                }
                self.brackets.push((close, self.script));
                script
            }
            Some(Bracket::Close(close)) => {
                match self.brackets.iter().rposition(|&(expected, _)| expected == close) {
                    Some(pos) => {
                        let (_, opened_with) = self.brackets[pos];
                        self.brackets.truncate(pos);
                        opened_with
                    }
                    None => script,
                }
            }
            None => script,
        }
    }
}

impl Scanner for ScriptScanner<'_> {
    fn end(&self) -> usize {
        self.end
    }

    fn advance(&mut self) -> bool {
        if self.end >= self.text.len() {
            return false;
        }
        self.start = self.end;
        self.script = Script::Common;

        let mut end = self.start;
        while end < self.text.len() {
            let c = self.text[end];
            let script = match self.pending.take() {
                Some(script) => script,
                None => self.char_script(c),
            };
            if is_weak_script(script) {
                end += 1;
                continue;
            }
            if is_weak_script(self.script) {
                self.script = script;
                for entry in &mut self.brackets {
                    if is_weak_script(entry.1) {
                        entry.1 = script;
                    }
                }
            } else if script != self.script {
                self.pending = Some(script);
                break;
            }
            end += 1;
        }
        self.end = end;
        true
    }
}

/// Runs of narrow vs. wide characters.
pub(crate) struct WidthScanner<'a> {
    text: &'a [char],
    pub start: usize,
    pub end: usize,
    pub upright: bool,
}

impl<'a> WidthScanner<'a> {
    pub fn new(text: &'a [char]) -> Self {
        let mut scanner = Self {
            text,
            start: 0,
            end: 0,
            upright: false,
        };
        scanner.advance();
        scanner
    }
}

impl Scanner for WidthScanner<'_> {
    fn end(&self) -> usize {
        self.end
    }

    fn advance(&mut self) -> bool {
        if self.end >= self.text.len() {
            return false;
        }
        self.start = self.end;
        self.upright = self.text[self.start..]
            .iter()
            .find(|&&c| !is_zero_width(c))
            .is_some_and(|&c| is_wide(c));

        let mut end = self.start + 1;
        while end < self.text.len() {
            let c = self.text[end];
            if !is_zero_width(c) && is_wide(c) != self.upright {
                break;
            }
            end += 1;
        }
        self.end = end;
        true
    }
}

/// Runs of emoji vs. text presentation.
pub(crate) struct EmojiScanner<'a> {
    text: &'a [char],
    pub start: usize,
    pub end: usize,
    pub is_emoji: bool,
}

impl<'a> EmojiScanner<'a> {
    pub fn new(text: &'a [char]) -> Self {
        let mut scanner = Self {
            text,
            start: 0,
            end: 0,
            is_emoji: false,
        };
        scanner.advance();
        scanner
    }

    fn starts_emoji(&self, idx: usize) -> bool {
        is_emoji_presentation(self.text[idx]) || self.text.get(idx + 1) == Some(&'\u{FE0F}')
    }
}

impl Scanner for EmojiScanner<'_> {
    fn end(&self) -> usize {
        self.end
    }

    fn advance(&mut self) -> bool {
        if self.end >= self.text.len() {
            return false;
        }
        self.start = self.end;
        self.is_emoji = self.starts_emoji(self.start);

        let mut end = self.start + 1;
        while end < self.text.len() {
            let continues = if self.is_emoji {
                is_emoji_continuation(self.text[end]) || self.starts_emoji(end)
            } else {
                !self.starts_emoji(end)
            };
            if !continues {
                break;
            }
            end += 1;
        }
        self.end = end;
        true
    }
}
