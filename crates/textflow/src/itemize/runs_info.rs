use tracing::debug;
use unicode_script::Script;

use crate::bidi::{BidiResolver, Direction, UnicodeBidi};
use crate::error::{Error, Result};
use crate::font::{FontDescriptor, FontResolver};
use crate::unicode::Language;
use crate::unicode::properties::{
    is_forced_break, is_no_shaping, is_rtl_script, is_vertical_script,
};

use super::attrs::AttrMap;
use super::run::{Color, GlyphOrient, ItemizeOptions, OrientPolicy, RunDir, RunFlags, TextRun};
use super::scanners::{EmojiScanner, LevelScanner, Scanner, ScriptScanner, WidthScanner};

/// Itemized paragraph: runs in logical order plus paragraph attributes.
///
/// Borrows the character buffer; the buffer must outlive every layout
/// built on top of this value.
#[derive(Debug, Clone)]
pub struct RunsInfo<'a> {
    text: &'a [char],
    runs: Vec<TextRun>,
    base_dir: Direction,
    lang: Language,
    run_dir: RunDir,
    /// Requested orientation, possibly `Auto`.
    orient_base: GlyphOrient,
    /// `orient_base` with `Auto` resolved against the font.
    orient_resolved: GlyphOrient,
    policy: OrientPolicy,
    fonts: AttrMap<FontDescriptor>,
    text_colors: AttrMap<Color>,
    background_colors: AttrMap<Color>,
}

impl<'a> RunsInfo<'a> {
    /// Itemize `text` with the bidi levels from `unicode-bidi`.
    pub fn build(
        text: &'a [char],
        options: &ItemizeOptions,
        font: FontDescriptor,
        color: Color,
    ) -> Result<Self> {
        Self::build_with_resolver(text, options, font, color, &UnicodeBidi)
    }

    /// Itemize `text` with the font registered as `font_name`.
    pub fn build_named(
        text: &'a [char],
        options: &ItemizeOptions,
        font_name: &str,
        fonts: &impl FontResolver,
        color: Color,
    ) -> Result<Self> {
        let font = fonts
            .resolve(font_name)
            .ok_or_else(|| Error::UnknownFont(font_name.to_string()))?;
        Self::build(text, options, font, color)
    }

    /// Itemize `text` with embedding levels from `bidi`.
    pub fn build_with_resolver(
        text: &'a [char],
        options: &ItemizeOptions,
        font: FontDescriptor,
        color: Color,
        bidi: &impl BidiResolver,
    ) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }
        let orient_resolved = resolve_auto(options.orientation, &font);
        font.check_orientation(orient_resolved)?;

        let levels = bidi.embedding_levels(text, options.base_direction);
        assert_eq!(levels.levels.len(), text.len(), "one embedding level per character");

        let lang = if options.language.as_str().is_empty() {
            Language::default()
        } else {
            options.language.clone()
        };

        let mut info = Self {
            text,
            runs: Vec::new(),
            base_dir: levels.base_dir,
            lang,
            run_dir: options.run_direction,
            orient_base: options.orientation,
            orient_resolved,
            policy: options.orientation_policy,
            fonts: AttrMap::new(text.len(), font),
            text_colors: AttrMap::new(text.len(), color),
            background_colors: AttrMap::new(text.len(), Color::TRANSPARENT),
        };
        info.runs = info.itemize(&levels.levels);

        debug!(
            chars = text.len(),
            runs = info.runs.len(),
            base_dir = ?info.base_dir,
            "itemized paragraph"
        );
        Ok(info)
    }

    fn itemize(&self, levels: &[u8]) -> Vec<TextRun> {
        let text = self.text;
        let mut levels = LevelScanner::new(levels);
        let mut scripts = ScriptScanner::new(text);
        let mut widths = WidthScanner::new(text);
        let mut emoji = EmojiScanner::new(text);

        let mut runs: Vec<TextRun> = Vec::new();
        let mut start = 0;
        loop {
            let end = levels.end().min(scripts.end()).min(widths.end()).min(emoji.end());
            debug_assert!(end > start);

            let mut flags = RunFlags::empty();
            if widths.upright {
                flags |= RunFlags::UPRIGHT;
            }
            if emoji.is_emoji {
                flags |= RunFlags::EMOJI;
            }
            let template = TextRun {
                start,
                len: 0,
                lang: derive_language(&self.lang, scripts.script),
                script: scripts.script,
                level: levels.level,
                dir: run_direction(self.run_dir, levels.level),
                orient: resolve_orientation(
                    self.orient_resolved,
                    self.policy,
                    scripts.script,
                    widths.upright,
                ),
                flags,
            };
            split_segment(text, start..end, &template, &mut runs);

            if end == text.len() {
                break;
            }
            start = end;
            if levels.end() == start {
                levels.advance();
            }
            if scripts.end() == start {
                scripts.advance();
            }
            if widths.end() == start {
                widths.advance();
            }
            if emoji.end() == start {
                emoji.advance();
            }
        }
        runs
    }

    pub fn text(&self) -> &'a [char] {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Always `false`; empty buffers are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn base_dir(&self) -> Direction {
        self.base_dir
    }

    pub fn language(&self) -> &Language {
        &self.lang
    }

    pub fn run_dir(&self) -> RunDir {
        self.run_dir
    }

    /// Paragraph orientation with `Auto` resolved.
    pub fn orientation(&self) -> GlyphOrient {
        self.orient_resolved
    }

    pub fn orientation_policy(&self) -> OrientPolicy {
        self.policy
    }

    /// The paragraph's default font.
    pub fn font(&self) -> &FontDescriptor {
        self.fonts.default_value()
    }

    /// Index of the run holding `offset` and the offset within that run.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not inside the buffer.
    pub fn run_at(&self, offset: usize) -> (usize, usize) {
        assert!(offset < self.text.len(), "offset {offset} outside the buffer");
        let idx = self.runs.partition_point(|run| run.end() <= offset);
        (idx, offset - self.runs[idx].start)
    }

    /// Override the text color of `len` characters from `start`; see
    /// [`AttrMap::set`] for the length rules.
    pub fn set_text_color(&mut self, start: usize, len: isize, color: Color) -> bool {
        self.text_colors.set(start, len, color)
    }

    pub fn text_color_at(&self, index: usize) -> Color {
        *self.text_colors.get(index)
    }

    /// Drop every text color override and use `color` everywhere.
    pub fn reset_text_color(&mut self, color: Color) {
        self.text_colors.reset(color);
    }

    pub fn set_background_color(&mut self, start: usize, len: isize, color: Color) -> bool {
        self.background_colors.set(start, len, color)
    }

    pub fn background_color_at(&self, index: usize) -> Color {
        *self.background_colors.get(index)
    }

    /// Use `font` for part of the paragraph; see [`AttrMap::set`] for the
    /// length rules. Runs are split at both ends of the range so no run
    /// mixes fonts. Fonts that cannot render the paragraph orientation
    /// are rejected.
    pub fn set_font(&mut self, start: usize, len: isize, font: FontDescriptor) -> bool {
        if font.check_orientation(self.orient_resolved).is_err() {
            return false;
        }
        let Some(range) = self.fonts.clamp(start, len) else {
            return false;
        };
        debug!(start = range.start, end = range.end, font = %font.name, "font override");
        self.fonts.set(start, len, font);
        self.split_run_at(range.start);
        self.split_run_at(range.end);
        true
    }

    /// Make `offset` a run boundary.
    fn split_run_at(&mut self, offset: usize) {
        if offset == 0 || offset >= self.text.len() {
            return;
        }
        let (idx, within) = self.run_at(offset);
        if within == 0 {
            return;
        }
        let head = &mut self.runs[idx];
        let mut tail = head.clone();
        tail.start = offset;
        tail.len = head.len - within;
        head.len = within;
        self.runs.insert(idx + 1, tail);
    }

    pub fn font_at(&self, index: usize) -> &FontDescriptor {
        self.fonts.get(index)
    }

    /// Replace the paragraph font, dropping partial font overrides.
    ///
    /// Runs split by earlier overrides stay split. With an `Auto`
    /// orientation the runs follow the new font's rotation.
    pub fn reset_font(&mut self, font: FontDescriptor) -> Result<()> {
        let orient_resolved = resolve_auto(self.orient_base, &font);
        font.check_orientation(orient_resolved)?;
        self.fonts.reset(font);
        self.orient_resolved = orient_resolved;
        self.reorient_runs();
        Ok(())
    }

    /// Change run direction and glyph orientation without re-itemizing.
    pub fn reset_direction(
        &mut self,
        run_dir: RunDir,
        orient: GlyphOrient,
        policy: OrientPolicy,
    ) -> Result<()> {
        let orient_resolved = resolve_auto(orient, self.font());
        self.font().check_orientation(orient_resolved)?;

        self.run_dir = run_dir;
        self.orient_base = orient;
        self.orient_resolved = orient_resolved;
        self.policy = policy;
        self.reorient_runs();
        debug!(?run_dir, orient = ?orient_resolved, ?policy, "reset run direction");
        Ok(())
    }

    fn reorient_runs(&mut self) {
        for run in &mut self.runs {
            run.dir = run_direction(self.run_dir, run.level);
            run.orient = resolve_orientation(
                self.orient_resolved,
                self.policy,
                run.script,
                run.flags.contains(RunFlags::UPRIGHT),
            );
        }
    }
}

fn resolve_auto(orient: GlyphOrient, font: &FontDescriptor) -> GlyphOrient {
    match orient {
        GlyphOrient::Auto => font.rotation,
        other => other,
    }
}

/// Append the runs of one merged segment, splitting at forced breaks and
/// at changes of shaping eligibility.
fn split_segment(
    text: &[char],
    segment: core::ops::Range<usize>,
    template: &TextRun,
    runs: &mut Vec<TextRun>,
) {
    let first_run = runs.len();
    let mut last_was_forced_break = false;
    for idx in segment {
        let c = text[idx];
        let forced_break = is_forced_break(c);
        let no_shaping = is_no_shaping(c);

        if runs.len() > first_run && !forced_break && !last_was_forced_break {
            if let Some(run) = runs.last_mut() {
                if run.flags.contains(RunFlags::NO_SHAPING) == no_shaping {
                    run.len += 1;
                    last_was_forced_break = false;
                    continue;
                }
            }
        }

        let mut run = template.clone();
        run.start = idx;
        run.len = 1;
        run.flags.set(RunFlags::NO_SHAPING, no_shaping);
        runs.push(run);
        last_was_forced_break = forced_break;
    }
}

/// The requested language if it covers `script`, else a sample language
/// for the script, else the requested language anyway.
pub(crate) fn derive_language(lang: &Language, script: Script) -> Language {
    if lang.includes_script(script) {
        return lang.clone();
    }
    Language::sample_for(script).unwrap_or_else(|| lang.clone())
}

/// Per-run orientation for a paragraph orientation and policy.
pub(crate) fn resolve_orientation(
    base: GlyphOrient,
    policy: OrientPolicy,
    script: Script,
    upright: bool,
) -> GlyphOrient {
    if !base.is_sideways() {
        return base;
    }
    match policy {
        OrientPolicy::Strong => base,
        OrientPolicy::Natural => {
            if upright || is_vertical_script(script) {
                GlyphOrient::Upright
            } else {
                base
            }
        }
        OrientPolicy::Line => {
            if upright {
                GlyphOrient::Upright
            } else if is_rtl_script(script) {
                base.opposite()
            } else {
                base
            }
        }
    }
}

fn run_direction(requested: RunDir, level: u8) -> RunDir {
    if requested.is_vertical() {
        requested
    } else if level % 2 == 1 {
        RunDir::Rtl
    } else {
        RunDir::Ltr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidi::{EmbeddingLevels, ParagraphDir};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn build(text: &[char]) -> RunsInfo<'_> {
        RunsInfo::build(text, &ItemizeOptions::default(), FontDescriptor::new("sans"), Color::BLACK)
            .unwrap()
    }

    fn spans(info: &RunsInfo<'_>) -> Vec<(usize, usize)> {
        info.runs().iter().map(|r| (r.start, r.len)).collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        let result =
            RunsInfo::build(&[], &ItemizeOptions::default(), FontDescriptor::new("sans"), Color::BLACK);
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn rotated_orientation_needs_rotatable_font() {
        let text = chars("abc");
        let options = ItemizeOptions {
            orientation: GlyphOrient::Sideways,
            ..ItemizeOptions::default()
        };
        let result = RunsInfo::build(&text, &options, FontDescriptor::fixed("fixed"), Color::BLACK);
        assert!(matches!(result, Err(Error::FontOrientationMismatch { .. })));
    }

    #[test]
    fn unknown_font_names_fail() {
        let text = chars("abc");
        let resolver = |_: &str| -> Option<FontDescriptor> { None };
        let result = RunsInfo::build_named(
            &text,
            &ItemizeOptions::default(),
            "nope",
            &resolver,
            Color::BLACK,
        );
        assert!(matches!(result, Err(Error::UnknownFont(name)) if name == "nope"));
    }

    #[test]
    fn uniform_text_is_one_run() {
        let text = chars("hello world");
        let info = build(&text);
        assert_eq!(spans(&info), vec![(0, 11)]);
        assert_eq!(info.runs()[0].script, Script::Latin);
        assert_eq!(info.runs()[0].lang.as_str(), "en");
    }

    #[test]
    fn forced_breaks_isolate_themselves() {
        let text = chars("ab\u{2028}cd");
        let info = build(&text);
        assert_eq!(spans(&info), vec![(0, 2), (2, 1), (3, 2)]);
        assert!(!info.runs()[1].needs_shaping());
    }

    #[test]
    fn consecutive_tabs_are_separate_runs() {
        let text = chars("a\t\tb");
        let info = build(&text);
        assert_eq!(spans(&info), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn format_characters_split_shaping_runs() {
        let text = chars("ab\u{200B}cd");
        let info = build(&text);
        assert_eq!(spans(&info), vec![(0, 2), (2, 1), (3, 2)]);
        assert!(info.runs()[1].flags.contains(RunFlags::NO_SHAPING));
    }

    #[test]
    fn hebrew_gets_a_derived_language() {
        let text = chars("abc \u{05E9}\u{05DC}\u{05D5}\u{05DD} xyz");
        let info = build(&text);
        let hebrew = &info.runs()[1];
        assert_eq!(hebrew.script, Script::Hebrew);
        assert_eq!(hebrew.lang.as_str(), "he");
        assert!(hebrew.is_rtl());
        assert_eq!(hebrew.dir, RunDir::Rtl);
    }

    #[test]
    fn custom_resolver_levels_are_used() {
        struct AllRtl;
        impl BidiResolver for AllRtl {
            fn embedding_levels(&self, text: &[char], _: ParagraphDir) -> EmbeddingLevels {
                EmbeddingLevels {
                    base_dir: Direction::Rtl,
                    levels: vec![1; text.len()],
                }
            }
        }
        let text = chars("abc");
        let info = RunsInfo::build_with_resolver(
            &text,
            &ItemizeOptions::default(),
            FontDescriptor::new("sans"),
            Color::BLACK,
            &AllRtl,
        )
        .unwrap();
        assert_eq!(info.base_dir(), Direction::Rtl);
        assert!(info.runs().iter().all(TextRun::is_rtl));
    }

    #[test]
    fn run_lookup_by_offset() {
        let text = chars("a\tb");
        let info = build(&text);
        assert_eq!(info.run_at(0), (0, 0));
        assert_eq!(info.run_at(1), (1, 0));
        assert_eq!(info.run_at(2), (2, 0));
    }

    #[test]
    #[should_panic]
    fn run_lookup_out_of_range_panics() {
        let text = chars("ab");
        build(&text).run_at(2);
    }

    #[test]
    fn colors_scan_newest_first() {
        let text = chars("0123456789");
        let mut info = build(&text);
        assert!(info.set_text_color(2, 4, Color::rgb(255, 0, 0)));
        assert!(info.set_text_color(3, 1, Color::rgb(0, 255, 0)));
        assert_eq!(info.text_color_at(0), Color::BLACK);
        assert_eq!(info.text_color_at(2), Color::rgb(255, 0, 0));
        assert_eq!(info.text_color_at(3), Color::rgb(0, 255, 0));
        assert!(!info.set_text_color(10, 1, Color::WHITE));
        assert!(info.set_background_color(5, 0, Color::WHITE));
        assert_eq!(info.background_color_at(9), Color::WHITE);
        assert_eq!(info.background_color_at(4), Color::TRANSPARENT);
    }

    #[test]
    fn vertical_text_keeps_cjk_upright() {
        let text = chars("ab\u{4E2D}\u{6587}");
        let options = ItemizeOptions {
            run_direction: RunDir::Ttb,
            orientation: GlyphOrient::Sideways,
            ..ItemizeOptions::default()
        };
        let info =
            RunsInfo::build(&text, &options, FontDescriptor::new("sans"), Color::BLACK).unwrap();
        assert_eq!(info.runs()[0].orient, GlyphOrient::Sideways);
        assert_eq!(info.runs()[1].orient, GlyphOrient::Upright);
        assert!(info.runs().iter().all(|r| r.dir == RunDir::Ttb));
    }

    #[test]
    fn reset_direction_reorients_runs() {
        let text = chars("ab\u{4E2D}");
        let mut info = build(&text);
        assert!(info.runs().iter().all(|r| r.orient == GlyphOrient::Upright));
        info.reset_direction(RunDir::Ttb, GlyphOrient::Sideways, OrientPolicy::Strong)
            .unwrap();
        assert!(info.runs().iter().all(|r| r.orient == GlyphOrient::Sideways));
        assert_eq!(info.orientation(), GlyphOrient::Sideways);
    }

    #[test]
    fn auto_orientation_follows_the_font() {
        let text = chars("abc");
        let mut info = build(&text);
        assert_eq!(info.orientation(), GlyphOrient::Upright);
        info.reset_font(FontDescriptor::new("rot").with_rotation(GlyphOrient::SidewaysLeft))
            .unwrap();
        assert_eq!(info.orientation(), GlyphOrient::SidewaysLeft);
        assert!(
            info.reset_font(FontDescriptor::fixed("fixed").with_rotation(GlyphOrient::Sideways))
                .is_err()
        );
    }

    #[test]
    fn line_policy_flips_rtl_scripts() {
        assert_eq!(
            resolve_orientation(GlyphOrient::Sideways, OrientPolicy::Line, Script::Hebrew, false),
            GlyphOrient::SidewaysLeft
        );
        assert_eq!(
            resolve_orientation(GlyphOrient::Sideways, OrientPolicy::Natural, Script::Han, false),
            GlyphOrient::Upright
        );
        assert_eq!(
            resolve_orientation(GlyphOrient::UpsideDown, OrientPolicy::Natural, Script::Han, true),
            GlyphOrient::UpsideDown
        );
    }

    #[test]
    fn partial_fonts_are_checked() {
        let text = chars("abcd");
        let options = ItemizeOptions {
            orientation: GlyphOrient::Sideways,
            ..ItemizeOptions::default()
        };
        let mut info =
            RunsInfo::build(&text, &options, FontDescriptor::new("sans"), Color::BLACK).unwrap();
        assert!(!info.set_font(1, 1, FontDescriptor::fixed("fixed")));
        assert_eq!(spans(&info), vec![(0, 4)]);
        assert!(info.set_font(1, 2, FontDescriptor::new("serif")));
        assert_eq!(info.font_at(2).name, "serif");
        assert_eq!(info.font_at(3).name, "sans");
    }

    #[test]
    fn font_overrides_split_runs() {
        let text = chars("abcdef");
        let mut info = build(&text);
        assert!(info.set_font(2, 2, FontDescriptor::new("serif")));
        assert_eq!(spans(&info), vec![(0, 2), (2, 2), (4, 2)]);
        assert!(info.runs().iter().all(|r| r.script == Script::Latin));

        // Overlapping and open-ended overrides only add boundaries.
        assert!(info.set_font(3, 0, FontDescriptor::new("mono")));
        assert_eq!(spans(&info), vec![(0, 2), (2, 1), (3, 1), (4, 2)]);
        assert_eq!(info.font_at(5).name, "mono");
        assert!(!info.set_font(6, 1, FontDescriptor::new("serif")));
    }

    #[test]
    fn font_overrides_split_around_tabs() {
        let text = chars("ab\tcd");
        let mut info = build(&text);
        assert!(info.set_font(1, 3, FontDescriptor::new("serif")));
        assert_eq!(spans(&info), vec![(0, 1), (1, 1), (2, 1), (3, 1), (4, 1)]);
    }
}
