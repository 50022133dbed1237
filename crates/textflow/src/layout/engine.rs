use tracing::{debug, trace, warn};

use crate::bidi::{Direction, visual_order};
use crate::itemize::runs_info::resolve_orientation;
use crate::itemize::{GlyphOrient, OrientPolicy, RunFlags, RunsInfo, TextRun};
use crate::shaping::glyph_string::split_spacing;
use crate::shaping::{GlyphString, ShapeRequest, ShapedGlyph, Shaper};
use crate::unicode::BreakOppo;
use crate::unicode::properties::{TAB, is_line_separator, is_space_separator};

use super::line::{GlyphRun, GlyphRunFlags, LayoutLine, LineFlags};
use super::options::{
    Align, Ellipsize, IndentMode, LayoutOptions, TextJustify, TextOrientation, WrapMode,
    WritingMode,
};
use super::postprocess;
use super::render::{GlyphPos, Rect, traverse_line};

/// Tab stop distance used when neither the options nor the font give one.
const FALLBACK_TAB_SIZE: i32 = 50;

/// Outcome of fitting one run onto the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakResult {
    /// Nothing fits; the line must end at an earlier run.
    NoneFit,
    /// The run was broken after this many characters.
    SomeFit(usize),
    AllFit,
    /// Nothing fits, but the line may end right before the run.
    EmptyFit,
    /// The run starts with a line separator.
    LineSeparator,
}

/// The unconsumed part of a text run.
#[derive(Debug, Clone, Copy)]
struct Span {
    run: usize,
    start: usize,
    len: usize,
}

/// Bookkeeping for the line under construction.
struct LineState {
    line: LayoutLine,
    line_width: i32,
    /// Width still available; negative when wrapping is off.
    remaining: i32,
    ellipsize: bool,
}

/// Where a produced line is stored.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Persisted(usize),
    Current,
}

/// Breaks an itemized paragraph into lines, one line per call.
///
/// The layout borrows the runs and the break table; both must describe
/// the same buffer.
pub struct Layout<'a, S> {
    pub(super) info: &'a RunsInfo<'a>,
    pub(super) breaks: &'a [BreakOppo],
    pub(super) shaper: S,
    pub(super) options: LayoutOptions,
    orient_base: GlyphOrient,
    orient_policy: OrientPolicy,
    tab_size: i32,
    /// Characters not yet laid out.
    left: usize,
    nr_lines: usize,
    lines: Vec<LayoutLine>,
    current: Option<LayoutLine>,
    /// Stored lines handed out since the last restart.
    replayed: usize,
}

impl<'a, S: Shaper> Layout<'a, S> {
    /// # Panics
    ///
    /// Panics unless `breaks` has one entry per character of `info` plus
    /// one for the end of the text.
    pub fn new(
        info: &'a RunsInfo<'a>,
        breaks: &'a [BreakOppo],
        shaper: S,
        options: LayoutOptions,
    ) -> Self {
        assert_eq!(
            breaks.len(),
            info.len() + 1,
            "break table does not match the character buffer"
        );

        let (orient_base, orient_policy) = base_orientation(info, &options);
        let tab_size = if options.tab_size > 0 {
            options.tab_size
        } else {
            let space = shaper.extents(&info.runs()[0], info.font_at(0)).space_advance * 8;
            if space > 0 { space } else { FALLBACK_TAB_SIZE }
        };

        Self {
            info,
            breaks,
            shaper,
            options,
            orient_base,
            orient_policy,
            tab_size,
            left: info.len(),
            nr_lines: 0,
            lines: Vec::new(),
            current: None,
            replayed: 0,
        }
    }

    pub fn info(&self) -> &'a RunsInfo<'a> {
        self.info
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn shaper(&self) -> &S {
        &self.shaper
    }

    /// Resolved distance between default tab stops.
    pub fn tab_size(&self) -> i32 {
        self.tab_size
    }

    /// Characters not yet placed on a line.
    pub fn remaining_chars(&self) -> usize {
        self.left
    }

    /// Number of lines produced so far.
    pub fn line_count(&self) -> usize {
        self.nr_lines
    }

    /// Lines kept by a persisting layout, in order.
    pub fn lines(&self) -> &[LayoutLine] {
        &self.lines
    }

    /// The most recently produced line.
    pub fn last_line(&self) -> Option<&LayoutLine> {
        if self.options.persist_lines {
            self.lines.last()
        } else {
            self.current.as_ref()
        }
    }

    /// Produce the next line fitting `max_extent` pixels (negative for
    /// unconstrained). `last_line` allows ellipsizing.
    ///
    /// Returns `None` once all text is laid out. A persisting layout
    /// replays its stored lines after [`restart`](Self::restart).
    pub fn next_line(&mut self, max_extent: i32, last_line: bool) -> Option<&LayoutLine> {
        let slot = self.advance(max_extent, last_line)?;
        Some(self.slot_line(slot))
    }

    /// Like [`next_line`](Self::next_line), then walk the new line's
    /// glyphs with `visitor`.
    pub fn next_line_with<F>(
        &mut self,
        max_extent: i32,
        last_line: bool,
        visitor: F,
    ) -> Option<&LayoutLine>
    where
        F: FnMut(&GlyphPos) -> bool,
    {
        let slot = self.advance(max_extent, last_line)?;
        let line = self.slot_line(slot);
        self.traverse(line, visitor);
        Some(line)
    }

    /// Start over from the first line. Persisting layouts replay the
    /// lines they hold; streaming layouts lay the text out again.
    pub fn restart(&mut self) {
        self.replayed = 0;
        if !self.options.persist_lines {
            self.left = self.info.len();
            self.nr_lines = 0;
            self.current = None;
        }
    }

    /// Walk the glyphs of `line` in visual order. Returns the number of
    /// glyphs the visitor accepted.
    pub fn traverse<F>(&self, line: &LayoutLine, visitor: F) -> usize
    where
        F: FnMut(&GlyphPos) -> bool,
    {
        traverse_line(
            self.info,
            line,
            self.options.writing_mode,
            self.line_offset(line),
            visitor,
        )
    }

    /// Offset of the line start from the layout edge: alignment plus
    /// indent.
    pub fn line_offset(&self, line: &LayoutLine) -> i32 {
        let extent = line.max_extent;
        if extent < 0 {
            return 0;
        }

        let align = resolve_alignment(self.options.align, line.resolved_dir);
        let mut offset = match align {
            Align::Right => extent - line.width,
            Align::Center => {
                let mut offset = (extent - line.width) / 2;
                if (extent | line.width) & 1 != 0 {
                    offset += 1;
                }
                offset
            }
            _ => 0,
        };

        let indented = match self.options.indent_mode {
            IndentMode::FirstLine => line.is_paragraph_start(),
            IndentMode::Hanging => !line.is_paragraph_start(),
            IndentMode::None => false,
        };
        if indented && (align == Align::Left || line.resolved_dir == Direction::Ltr) {
            offset += self.options.indent;
        }
        offset
    }

    /// Rectangle of `line` with its origin at `(x, y)`. Moves the origin
    /// to the next line position along the block direction.
    pub fn line_rect(&self, line: &LayoutLine, x: &mut i32, y: &mut i32, line_height: i32) -> Rect {
        let offset = self.line_offset(line);
        let line_height = line_height.max(line.height);

        match self.options.writing_mode {
            WritingMode::HorizontalTb => {
                let left = *x + offset;
                let rect = Rect::new(left, *y, left + line.width, *y + line.height);
                *y += line_height;
                rect
            }
            WritingMode::HorizontalBt => {
                let left = *x + offset;
                let rect = Rect::new(left, *y - line.height, left + line.width, *y);
                *y -= line_height;
                rect
            }
            WritingMode::VerticalLr => {
                let top = *y + offset;
                let rect = Rect::new(*x, top, *x + line.height, top + line.width);
                *x += line_height;
                rect
            }
            WritingMode::VerticalRl => {
                let top = *y + offset;
                let rect = Rect::new(*x - line.height, top, *x, top + line.width);
                *x -= line_height;
                rect
            }
        }
    }

    /// Lay out every line from the start and return the union of the
    /// line rectangles with the number of lines.
    ///
    /// A positive `max_height` marks the last line that fits as the last
    /// line, so it can be ellipsized. A non-positive `line_height` uses
    /// the font height.
    pub fn bounding_rect(
        &mut self,
        max_extent: i32,
        max_height: i32,
        line_height: i32,
        x: i32,
        y: i32,
    ) -> (Rect, usize) {
        self.restart();
        let line_height = if line_height > 0 {
            line_height
        } else {
            self.shaper.extents(&self.info.runs()[0], self.info.font_at(0)).height
        };

        let (mut x, mut y) = (x, y);
        let mut remaining_height = max_height;
        let mut last_line = false;
        let mut bounds = Rect::default();
        let mut count = 0;
        loop {
            if max_height > 0 {
                remaining_height -= line_height;
                if remaining_height - line_height < 0 {
                    last_line = true;
                }
            }

            let Some(slot) = self.advance(max_extent, last_line) else {
                break;
            };
            let rect = self.line_rect(self.slot_line(slot), &mut x, &mut y, line_height);
            bounds = bounds.union(&rect);
            count += 1;
        }
        (bounds, count)
    }

    fn slot_line(&self, slot: Slot) -> &LayoutLine {
        match slot {
            Slot::Persisted(idx) => &self.lines[idx],
            Slot::Current => self
                .current
                .as_ref()
                .unwrap_or_else(|| unreachable!("current line slot without a line")),
        }
    }

    fn advance(&mut self, max_extent: i32, last_line: bool) -> Option<Slot> {
        if self.options.persist_lines && self.replayed < self.lines.len() {
            self.replayed += 1;
            return Some(Slot::Persisted(self.replayed - 1));
        }
        if self.left == 0 {
            return None;
        }

        let first = self.nr_lines == 0;
        let mut extent = max_extent;
        if let Some(fixed) = self.options.fixed_extent {
            extent = fixed;
            match self.options.indent_mode {
                IndentMode::FirstLine if first => extent -= self.options.indent,
                IndentMode::Hanging if !first => extent -= self.options.indent,
                _ => {}
            }
        }

        let start = self.info.len() - self.left;
        let mut line = self.build_line(start, extent, last_line);
        line.max_extent = extent;
        line.width = line.glyph_width();
        line.height = line.glyph_height();
        line.flags.set(LineFlags::LAST_LINE, last_line);
        line.flags.set(LineFlags::PARAGRAPH_START, first);
        debug_assert!(line.len > 0, "a line must consume text");

        debug!(
            start = line.start,
            len = line.len,
            width = line.width,
            extent,
            wrapped = line.is_wrapped(),
            ellipsized = line.is_ellipsized(),
            "laid out line"
        );

        self.nr_lines += 1;
        if line.is_ellipsized() {
            self.left = 0;
        } else {
            self.left -= line.len;
        }

        if self.options.persist_lines {
            self.lines.push(line);
            self.replayed = self.lines.len();
            Some(Slot::Persisted(self.lines.len() - 1))
        } else {
            self.current = Some(line);
            Some(Slot::Current)
        }
    }

    fn should_ellipsize(&self, line_width: i32, last_line: bool) -> bool {
        self.options.ellipsize != Ellipsize::None && line_width >= 0 && last_line
    }

    fn build_line(&self, start: usize, line_width: i32, last_line: bool) -> LayoutLine {
        let ellipsize = self.should_ellipsize(line_width, last_line);
        let remaining = if ellipsize || self.options.wrap == WrapMode::NoWrap {
            -1
        } else {
            line_width
        };
        let mut state = LineState {
            line: LayoutLine::new(start, self.resolved_direction()),
            line_width,
            remaining,
            ellipsize,
        };

        let mut have_break = false;
        let mut break_remaining = 0;
        let mut break_start = 0;
        let mut break_runs = 0;
        let mut wrapped = false;
        let mut offset = start;

        while offset < self.info.len() {
            let span = self.span_at(offset);
            let old_remaining = state.remaining;
            let runs_before = state.line.runs.len();

            let result = self.process_run(&mut state, span, !have_break, false);
            trace!(offset, len = span.len, ?result, remaining = state.remaining, "fit run");

            match result {
                BreakResult::AllFit => {
                    if self.can_break_in(offset, span.len) {
                        have_break = true;
                        break_remaining = old_remaining;
                        break_start = offset;
                        break_runs = runs_before;
                    }
                    offset += span.len;
                }
                BreakResult::EmptyFit => {
                    wrapped = true;
                    break;
                }
                BreakResult::SomeFit(consumed) => {
                    offset += consumed;
                    wrapped = true;
                    break;
                }
                BreakResult::NoneFit => {
                    // Back up to the last run holding a break opportunity
                    // and end the line inside it.
                    state.line.runs.truncate(break_runs);
                    state.remaining = break_remaining;
                    offset = break_start;

                    let span = self.span_at(offset);
                    match self.process_run(&mut state, span, true, true) {
                        BreakResult::SomeFit(consumed) => offset += consumed,
                        BreakResult::AllFit => offset += span.len,
                        BreakResult::EmptyFit => {}
                        other => debug_assert!(false, "unexpected refit result {other:?}"),
                    }
                    wrapped = true;
                    break;
                }
                BreakResult::LineSeparator => {
                    offset += span.len;
                    wrapped = true;
                    break;
                }
            }
        }

        state.line.len = offset - start;
        self.postprocess(&mut state, wrapped);
        state.line
    }

    fn span_at(&self, offset: usize) -> Span {
        let (run, in_run) = self.info.run_at(offset);
        Span {
            run,
            start: offset,
            len: self.info.runs()[run].len - in_run,
        }
    }

    /// Fit as much of `span` as possible onto the line.
    ///
    /// With `force_fit` something is always placed, even if it overflows.
    /// With `no_break_at_end` the span is never placed whole.
    fn process_run(
        &self,
        state: &mut LineState,
        span: Span,
        force_fit: bool,
        no_break_at_end: bool,
    ) -> BreakResult {
        let text = self.info.text();
        let glyphs = self.shape_span(&state.line, span);

        if !self.options.single_paragraph
            && is_line_separator(text[span.start])
            && !state.ellipsize
        {
            self.insert_run(state, span, glyphs);
            return BreakResult::LineSeparator;
        }

        if state.remaining < 0 && !no_break_at_end {
            self.insert_run(state, span, glyphs);
            return BreakResult::AllFit;
        }

        let width = glyphs.width();
        if (width <= state.remaining || (span.len == 1 && state.line.runs.is_empty()))
            && !no_break_at_end
        {
            state.remaining = (state.remaining - width).max(0);
            self.insert_run(state, span, glyphs);
            return BreakResult::AllFit;
        }

        let run = &self.info.runs()[span.run];
        let request = ShapeRequest::new(
            run,
            self.info.font_at(span.start),
            &text[span.start..span.start + span.len],
            span.start,
        );
        let log_widths = self.shaper.logical_widths(&request, &glyphs);
        let line_empty = state.line.runs.is_empty();
        let mut retrying = false;

        let (break_chars, break_width) = loop {
            let mut break_chars = span.len;
            let mut break_width = width;
            let mut so_far = 0;
            for (n, &char_width) in log_widths.iter().enumerate() {
                if so_far > state.remaining && break_chars < span.len {
                    break;
                }
                // An empty line takes at least one character.
                if self.can_break_at(span.start + n, retrying) && (n > 0 || !line_empty) {
                    break_chars = n;
                    break_width = so_far;
                }
                so_far += char_width;
            }

            // Trailing white space is trimmed later; do not count it.
            if break_chars > 0
                && break_chars < span.len
                && self.breaks[span.start + break_chars - 1].contains(BreakOppo::WHITESPACE)
            {
                break_width -= log_widths[break_chars - 1];
            }

            if self.options.wrap == WrapMode::BreakWord
                && force_fit
                && break_width > state.remaining
                && !retrying
            {
                trace!(offset = span.start, "retrying with grapheme breaks");
                retrying = true;
                continue;
            }
            break (break_chars, break_width);
        };

        if !(force_fit || break_width <= state.remaining) {
            return BreakResult::NoneFit;
        }

        if state.remaining >= 0 {
            state.remaining = (state.remaining - break_width).max(0);
        }

        if break_chars == span.len {
            self.insert_run(state, span, glyphs);
            BreakResult::AllFit
        } else if break_chars == 0 {
            BreakResult::EmptyFit
        } else {
            // Shaping may differ once the run is cut, so shape the head
            // again and account for its real width.
            let head = Span {
                len: break_chars,
                ..span
            };
            state.remaining += break_width;
            let glyphs = self.shape_span(&state.line, head);
            state.remaining -= glyphs.width();
            self.insert_run(state, head, glyphs);
            BreakResult::SomeFit(break_chars)
        }
    }

    fn can_break_at(&self, offset: usize, grapheme_breaks: bool) -> bool {
        if offset == self.info.len() {
            return true;
        }
        if offset == 0 {
            return false;
        }
        let oppo = self.breaks[offset];
        if grapheme_breaks || self.options.wrap == WrapMode::BreakAll {
            oppo.is_cursor_position()
        } else {
            oppo.is_line_break()
        }
    }

    fn can_break_in(&self, start: usize, len: usize) -> bool {
        (0..len).any(|i| self.can_break_at(start + i, false))
    }

    fn insert_run(&self, state: &mut LineState, span: Span, glyphs: GlyphString) {
        let run = &self.info.runs()[span.run];
        let orient = self.run_orientation(run);

        let mut flags = GlyphRunFlags::empty();
        if !run.needs_shaping() {
            flags |= GlyphRunFlags::NO_SHAPING;
        }
        if self.info.text()[span.start] == TAB {
            flags |= GlyphRunFlags::TAB;
        }
        if self.options.writing_mode.is_vertical() && !orient.is_sideways() {
            flags |= GlyphRunFlags::CENTERED_BASELINE;
        }

        state.line.runs.push(GlyphRun {
            text_run: span.run,
            start: span.start,
            len: span.len,
            level: run.level,
            orient,
            flags,
            glyphs,
        });
    }

    /// Glyph orientation of `run` on this layout's lines. Vertical modes
    /// resolve it from the text orientation; horizontal modes keep the
    /// itemized orientation.
    pub(super) fn run_orientation(&self, run: &TextRun) -> GlyphOrient {
        if !self.options.writing_mode.is_vertical() {
            return run.orient;
        }
        resolve_orientation(
            self.orient_base,
            self.orient_policy,
            run.script,
            run.flags.contains(RunFlags::UPRIGHT),
        )
    }

    fn resolved_direction(&self) -> Direction {
        let dir = self.info.base_dir();
        match self.orient_base {
            GlyphOrient::UpsideDown => dir.opposite(),
            GlyphOrient::Sideways => Direction::Ltr,
            GlyphOrient::SidewaysLeft => Direction::Rtl,
            GlyphOrient::Upright | GlyphOrient::Auto => dir,
        }
    }

    fn shape_span(&self, line: &LayoutLine, span: Span) -> GlyphString {
        let run = &self.info.runs()[span.run];
        let chars = &self.info.text()[span.start..span.start + span.len];
        let font = self.info.font_at(span.start);
        let extents = self.shaper.extents(run, font);

        if chars[0] == TAB {
            return self.shape_tab(line.glyph_width(), extents.height);
        }
        if !run.needs_shaping() {
            return self.shape_blank(run, chars);
        }

        let request = ShapeRequest::new(run, font, chars, span.start);
        let mut glyphs = match self.shaper.shape(&request) {
            Some(glyphs) => glyphs,
            None => {
                warn!(offset = span.start, len = span.len, "shaper failed, using fallback glyphs");
                self.shape_fallback(run, span.len)
            }
        };
        if glyphs.is_empty() {
            return glyphs;
        }

        if self.options.word_spacing != 0 {
            let spaces: Vec<usize> = glyphs
                .clusters(run.is_rtl(), span.len)
                .filter(|cluster| is_space_separator(chars[cluster.chars.start]))
                .map(|cluster| cluster.glyphs.end - 1)
                .collect();
            for glyph in spaces {
                glyphs.glyphs[glyph].width += self.options.word_spacing;
            }
        }

        let spacing = self.options.letter_spacing;
        if spacing != 0 {
            let breaks = &self.breaks[span.start..=span.start + span.len];
            glyphs.letter_space(run.is_rtl(), breaks, spacing);

            let (space_left, space_right) = split_spacing(spacing);
            let last = glyphs.len() - 1;
            glyphs.glyphs[0].width += space_left;
            glyphs.glyphs[0].x_off += space_left;
            glyphs.glyphs[last].width += space_right;
        }
        glyphs
    }

    /// One blank glyph reaching the next tab stop.
    fn shape_tab(&self, current_width: i32, height: i32) -> GlyphString {
        let space_width = self.tab_size / 8;
        let mut index = 0;
        let width = loop {
            let (pos, is_default) = self.tab_pos(index);
            // Default stops keep at least a space between the tab and the
            // text before it; explicit stops are honored to the pixel.
            let gap = if is_default { space_width } else { 1 };
            if pos >= current_width + gap {
                break pos - current_width;
            }
            index += 1;
        };

        let mut glyphs = GlyphString::with_capacity(1);
        glyphs.push(ShapedGlyph::invalid(width, height), 0);
        glyphs
    }

    /// Position of tab stop `index` and whether it is a default stop.
    fn tab_pos(&self, index: i32) -> (i32, bool) {
        let tabs = &self.options.tabs;
        let count = tabs.len() as i32;
        if count == 0 {
            return (self.tab_size * index, true);
        }
        if index < count {
            return (tabs[index as usize], false);
        }

        let last = tabs[tabs.len() - 1];
        let before_last = if tabs.len() > 1 { tabs[tabs.len() - 2] } else { 0 };
        let gap = if last > before_last { last - before_last } else { self.tab_size };
        (last + gap * (index - count + 1), false)
    }

    /// Blank glyphs for characters that are not shaped. Space separators
    /// keep a space advance.
    fn shape_blank(&self, run: &TextRun, chars: &[char]) -> GlyphString {
        let extents = self.shaper.extents(run, self.info.font_at(run.start));
        let mut glyphs = GlyphString::with_capacity(chars.len());
        for (i, &c) in chars.iter().enumerate() {
            let width = if is_space_separator(c) {
                extents.space_advance + self.options.word_spacing
            } else {
                0
            };
            glyphs.push(ShapedGlyph::invalid(width, extents.height), i);
        }
        if run.is_rtl() {
            glyphs.reverse();
        }
        glyphs
    }

    /// Placeholder glyphs when the shaper gives up.
    pub(super) fn shape_fallback(&self, run: &TextRun, len: usize) -> GlyphString {
        let extents = self.shaper.extents(run, self.info.font_at(run.start));
        let (width, height) = if self.options.writing_mode.is_vertical()
            && !self.run_orientation(run).is_sideways()
        {
            (extents.height, extents.fallback_advance)
        } else {
            (extents.fallback_advance, extents.height)
        };

        let mut glyphs = GlyphString::with_capacity(len);
        for i in 0..len {
            glyphs.push(ShapedGlyph::new(0, width, height), i);
        }
        if run.is_rtl() {
            glyphs.reverse();
        }
        glyphs
    }

    fn postprocess(&self, state: &mut LineState, wrapped: bool) {
        let line = &mut state.line;

        if wrapped {
            postprocess::zero_final_space(line, self.breaks, &mut state.remaining);
        }

        let ellipsized = state.line_width >= 0
            && state.ellipsize
            && self.ellipsize_line(line, state.line_width);

        let levels: Vec<u8> = line.runs.iter().map(|run| run.level).collect();
        let order = visual_order(&levels);
        let mut runs: Vec<Option<GlyphRun>> = line.runs.drain(..).map(Some).collect();
        line.runs = order.into_iter().filter_map(|idx| runs[idx].take()).collect();

        if self.options.letter_spacing != 0 {
            postprocess::adjust_letter_spacing(
                line,
                self.options.letter_spacing,
                &mut state.remaining,
            );
        }

        if self.options.align == Align::Justify && (wrapped || ellipsized) {
            if state.remaining < 0 {
                state.remaining = state.line_width - line.glyph_width();
            }
            match self.options.justify {
                TextJustify::Auto => {
                    if !postprocess::justify_words(line, self.breaks, &mut state.remaining) {
                        postprocess::justify_clusters(line, self.breaks, &mut state.remaining);
                    }
                }
                TextJustify::InterWord => {
                    postprocess::justify_words(line, self.breaks, &mut state.remaining);
                }
                TextJustify::InterCharacter => {
                    postprocess::justify_clusters(line, self.breaks, &mut state.remaining);
                }
            }
        }

        line.flags.set(LineFlags::WRAPPED, wrapped);
        line.flags.set(LineFlags::ELLIPSIZED, ellipsized);
    }
}

/// Orientation and policy of the layout as a whole.
fn base_orientation(info: &RunsInfo<'_>, options: &LayoutOptions) -> (GlyphOrient, OrientPolicy) {
    if !options.writing_mode.is_vertical() || !info.font().rotatable {
        return (GlyphOrient::Upright, OrientPolicy::Strong);
    }
    match options.text_orientation {
        TextOrientation::Auto | TextOrientation::Mixed => {
            (GlyphOrient::Upright, OrientPolicy::Natural)
        }
        TextOrientation::Line => (GlyphOrient::Sideways, OrientPolicy::Line),
        TextOrientation::Upright => (GlyphOrient::Upright, OrientPolicy::Strong),
        TextOrientation::Sideways => (GlyphOrient::Sideways, OrientPolicy::Strong),
        TextOrientation::UpsideDown => (GlyphOrient::UpsideDown, OrientPolicy::Strong),
        TextOrientation::SidewaysLeft => (GlyphOrient::SidewaysLeft, OrientPolicy::Strong),
    }
}

/// Map logical alignments to `Left`, `Right` or `Center`.
fn resolve_alignment(align: Align, dir: Direction) -> Align {
    let rtl = dir == Direction::Rtl;
    match align {
        Align::Start | Align::Left | Align::Justify => {
            if rtl {
                Align::Right
            } else {
                Align::Left
            }
        }
        Align::End | Align::Right => {
            if rtl {
                Align::Left
            } else {
                Align::Right
            }
        }
        Align::Center => Align::Center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontDescriptor;
    use crate::itemize::{Color, ItemizeOptions};
    use crate::shaping::SimpleShaper;
    use crate::unicode::compute_break_opportunities;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn info(text: &[char]) -> RunsInfo<'_> {
        RunsInfo::build(text, &ItemizeOptions::default(), FontDescriptor::new("sans"), Color::BLACK)
            .unwrap()
    }

    fn widths(line: &LayoutLine) -> Vec<i32> {
        line.runs()
            .iter()
            .flat_map(|run| run.glyphs.glyphs.iter().map(|g| g.width))
            .collect()
    }

    #[test]
    fn default_tab_size_is_eight_spaces() {
        let text = chars("a\tb");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let layout = Layout::new(&info, &breaks, SimpleShaper::default(), LayoutOptions::default());
        assert_eq!(layout.tab_size(), 80);
    }

    #[test]
    fn tab_reaches_next_stop() {
        let text = chars("ab\tc");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            tab_size: 40,
            ..LayoutOptions::default()
        };
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        let line = layout.next_line(-1, false).unwrap();
        // "ab" ends at 20; the first default stop past 20 + 5 is 40.
        assert_eq!(widths(line), vec![10, 10, 20, 10]);
        assert!(line.runs()[1].is_tab());
    }

    #[test]
    fn explicit_tab_stops_extrapolate_the_last_gap() {
        let text = chars("a\tb");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            tabs: vec![5, 8],
            ..LayoutOptions::default()
        };
        let layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        assert_eq!(layout.tab_pos(1), (8, false));
        assert_eq!(layout.tab_pos(2), (11, false));
        assert_eq!(layout.tab_pos(4), (17, false));
    }

    #[test]
    fn unconstrained_width_keeps_one_line() {
        let text = chars("hello world again");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), LayoutOptions::default());
        let line = layout.next_line(-1, false).unwrap();
        assert_eq!(line.len(), text.len());
        assert!(!line.is_wrapped());
        assert!(layout.next_line(-1, false).is_none());
    }

    #[test]
    fn first_character_is_forced_onto_a_narrow_line() {
        let text = chars("ab");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            wrap: WrapMode::Normal,
            ..LayoutOptions::default()
        };
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        let line = layout.next_line(5, false).unwrap();
        // No break opportunity inside "ab": the word overflows whole.
        assert_eq!(line.len(), 2);
        assert_eq!(line.width(), 20);
    }

    #[test]
    fn shaper_failure_uses_fallback_glyphs() {
        let text = chars("xyz");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let shaper = SimpleShaper::new(7, 12).with_unsupported('y');
        let mut layout = Layout::new(&info, &breaks, shaper, LayoutOptions::default());
        let line = layout.next_line(-1, false).unwrap();
        assert_eq!(widths(line), vec![7, 7, 7]);
        assert!(line.runs()[0].glyphs.glyphs.iter().all(|g| g.glyph == 0));
    }

    #[test]
    fn word_spacing_widens_spaces() {
        let text = chars("a b");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            word_spacing: 4,
            ..LayoutOptions::default()
        };
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        let line = layout.next_line(-1, false).unwrap();
        assert_eq!(widths(line), vec![10, 14, 10]);
    }

    #[test]
    fn letter_spacing_stays_inside_the_line() {
        let text = chars("abc");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            letter_spacing: 4,
            ..LayoutOptions::default()
        };
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        let line = layout.next_line(-1, false).unwrap();
        assert_eq!(widths(line), vec![12, 14, 12]);
        assert_eq!(line.width(), 38);
    }

    #[test]
    fn alignment_offsets() {
        let text = chars("abc");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        for (align, expected) in [(Align::Start, 0), (Align::Right, 70), (Align::Center, 35)] {
            let options = LayoutOptions {
                align,
                ..LayoutOptions::default()
            };
            let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
            layout.next_line(100, false);
            let line = layout.last_line().unwrap();
            assert_eq!(layout.line_offset(line), expected, "{align:?}");
        }
    }

    #[test]
    fn center_alignment_hints_odd_extents() {
        let text = chars("abc");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            align: Align::Center,
            ..LayoutOptions::default()
        };
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        layout.next_line(101, false);
        let line = layout.last_line().unwrap();
        assert_eq!(layout.line_offset(line), 36);
    }

    #[test]
    fn unconstrained_lines_are_not_offset() {
        let text = chars("abc");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            align: Align::Right,
            indent: 8,
            indent_mode: IndentMode::FirstLine,
            ..LayoutOptions::default()
        };
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        layout.next_line(-1, false);
        let line = layout.last_line().unwrap();
        assert_eq!(layout.line_offset(line), 0);
    }

    #[test]
    fn rtl_start_alignment_is_right() {
        assert_eq!(resolve_alignment(Align::Start, Direction::Rtl), Align::Right);
        assert_eq!(resolve_alignment(Align::End, Direction::Rtl), Align::Left);
        assert_eq!(resolve_alignment(Align::Justify, Direction::Ltr), Align::Left);
    }

    #[test]
    fn fixed_extent_overrides_the_requested_width() {
        let text = chars("aaa bbb ccc");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            fixed_extent: Some(80),
            indent: 10,
            indent_mode: IndentMode::FirstLine,
            ..LayoutOptions::default()
        };
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        let first = layout.next_line(1000, false).unwrap();
        assert_eq!(first.max_extent(), 70);
        assert_eq!(first.len(), 4);
        let second = layout.next_line(1000, false).unwrap();
        assert_eq!(second.max_extent(), 80);
        assert_eq!(second.len(), 7);
    }

    #[test]
    fn streaming_layout_keeps_only_the_current_line() {
        let text = chars("aaa bbb");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            persist_lines: false,
            ..LayoutOptions::default()
        };
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        assert_eq!(layout.next_line(40, false).map(LayoutLine::start), Some(0));
        assert_eq!(layout.next_line(40, false).map(LayoutLine::start), Some(4));
        assert!(layout.lines().is_empty());
        assert_eq!(layout.last_line().map(LayoutLine::start), Some(4));

        layout.restart();
        assert_eq!(layout.remaining_chars(), text.len());
        assert_eq!(layout.next_line(40, false).map(LayoutLine::start), Some(0));
    }

    #[test]
    fn persisted_layout_replays_its_lines() {
        let text = chars("aaa bbb");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), LayoutOptions::default());
        while layout.next_line(40, false).is_some() {}
        assert_eq!(layout.lines().len(), 2);

        layout.restart();
        // Stored lines come back regardless of the requested width.
        assert_eq!(layout.next_line(1000, false).map(LayoutLine::len), Some(4));
        assert_eq!(layout.next_line(1000, false).map(LayoutLine::len), Some(3));
        assert!(layout.next_line(1000, false).is_none());
        assert_eq!(layout.line_count(), 2);
    }

    #[test]
    fn line_rects_follow_the_writing_mode() {
        let text = chars("ab");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let cases = [
            (WritingMode::HorizontalTb, Rect::new(0, 0, 20, 16), (0, 20)),
            (WritingMode::HorizontalBt, Rect::new(0, -16, 20, 0), (0, -20)),
            (WritingMode::VerticalLr, Rect::new(0, 0, 16, 20), (20, 0)),
            (WritingMode::VerticalRl, Rect::new(-16, 0, 0, 20), (-20, 0)),
        ];
        for (mode, expected, pen) in cases {
            let options = LayoutOptions {
                writing_mode: mode,
                ..LayoutOptions::default()
            };
            let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
            layout.next_line(-1, false);
            let line = layout.last_line().unwrap();
            let (mut x, mut y) = (0, 0);
            assert_eq!(layout.line_rect(line, &mut x, &mut y, 20), expected, "{mode:?}");
            assert_eq!((x, y), pen, "{mode:?}");
        }
    }

    #[test]
    fn sideways_layouts_resolve_ltr() {
        let text = chars("\u{05E9}\u{05DC}");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            writing_mode: WritingMode::VerticalRl,
            text_orientation: TextOrientation::Sideways,
            ..LayoutOptions::default()
        };
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        let line = layout.next_line(-1, false).unwrap();
        assert_eq!(line.resolved_dir(), Direction::Ltr);
        assert!(!line.runs()[0].flags.contains(GlyphRunFlags::CENTERED_BASELINE));
    }

    #[test]
    fn vertical_upright_runs_are_centered() {
        let text = chars("ab");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let options = LayoutOptions {
            writing_mode: WritingMode::VerticalLr,
            ..LayoutOptions::default()
        };
        let mut layout = Layout::new(&info, &breaks, SimpleShaper::default(), options);
        let line = layout.next_line(-1, false).unwrap();
        assert!(line.runs()[0].flags.contains(GlyphRunFlags::CENTERED_BASELINE));
        assert_eq!(line.runs()[0].orient, GlyphOrient::Upright);
    }

    #[test]
    fn non_rotatable_fonts_stay_upright_in_vertical_mode() {
        let text = chars("ab");
        let info = RunsInfo::build(
            &text,
            &ItemizeOptions::default(),
            FontDescriptor::fixed("bitmap"),
            Color::BLACK,
        )
        .unwrap();
        let options = LayoutOptions {
            writing_mode: WritingMode::VerticalRl,
            text_orientation: TextOrientation::Sideways,
            ..LayoutOptions::default()
        };
        assert_eq!(base_orientation(&info, &options), (GlyphOrient::Upright, OrientPolicy::Strong));
    }

    /// Counts how often the break search asks for per-character widths.
    struct Measuring {
        inner: SimpleShaper,
        calls: core::cell::Cell<usize>,
    }

    impl Shaper for Measuring {
        fn shape(&self, request: &ShapeRequest<'_>) -> Option<GlyphString> {
            self.inner.shape(request)
        }

        fn extents(&self, run: &TextRun, font: &FontDescriptor) -> crate::shaping::FontExtents {
            self.inner.extents(run, font)
        }

        fn logical_widths(&self, request: &ShapeRequest<'_>, glyphs: &GlyphString) -> Vec<i32> {
            self.calls.set(self.calls.get() + 1);
            self.inner.logical_widths(request, glyphs)
        }
    }

    #[test]
    fn break_search_measures_through_the_shaper() {
        let text = chars("aaaa bbbb");
        let info = info(&text);
        let breaks = compute_break_opportunities(&text);
        let shaper = Measuring {
            inner: SimpleShaper::default(),
            calls: core::cell::Cell::new(0),
        };

        let mut layout = Layout::new(&info, &breaks, &shaper, LayoutOptions::default());
        assert_eq!(layout.next_line(200, false).map(LayoutLine::len), Some(9));
        assert_eq!(shaper.calls.get(), 0);

        let mut layout = Layout::new(&info, &breaks, &shaper, LayoutOptions::default());
        assert_eq!(layout.next_line(60, false).map(LayoutLine::text_range), Some(0..5));
        assert_eq!(shaper.calls.get(), 1);
    }

    #[test]
    #[should_panic(expected = "break table")]
    fn mismatched_break_table_panics() {
        let text = chars("abc");
        let info = info(&text);
        let breaks = compute_break_opportunities(&chars("ab"));
        let _ = Layout::new(&info, &breaks, SimpleShaper::default(), LayoutOptions::default());
    }
}
