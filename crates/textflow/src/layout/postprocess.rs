//! Adjustments applied to a line once its runs are chosen.

use core::ops::Range;

use crate::bidi::Direction;
use crate::shaping::glyph_string::split_spacing;
use crate::unicode::BreakOppo;

use super::line::{GlyphRun, LayoutLine};

/// Zero the advance of the white space the line was wrapped at.
///
/// Runs must still be in logical order.
pub(super) fn zero_final_space(line: &mut LayoutLine, breaks: &[BreakOppo], remaining: &mut i32) {
    let end = line.start + line.len;
    if end == 0 || !breaks[end - 1].contains(BreakOppo::WHITESPACE) {
        return;
    }
    let Some(run) = line.runs.last_mut() else {
        return;
    };
    if run.end() != end || run.glyphs.is_empty() {
        return;
    }

    let rtl = run.is_rtl();
    let glyphs = &mut run.glyphs;
    let idx = if rtl { 0 } else { glyphs.len() - 1 };
    let cluster = glyphs.log_clusters[idx];
    if cluster + run.start != end - 1 {
        return;
    }
    // The space shares its cluster with another glyph.
    let neighbour = if rtl { idx + 1 } else { idx.wrapping_sub(1) };
    if glyphs.log_clusters.get(neighbour) == Some(&cluster) {
        return;
    }

    let glyph = &mut glyphs.glyphs[idx];
    if *remaining >= 0 {
        *remaining += glyph.width;
    }
    glyph.width = 0;
}

fn pad_left(run: &mut GlyphRun, adjustment: i32, remaining: &mut i32) {
    let Some(glyph) = run.glyphs.glyphs.iter_mut().find(|g| g.width != 0) else {
        return;
    };
    *remaining -= adjustment;
    glyph.width += adjustment;
    glyph.x_off += adjustment;
}

fn pad_right(run: &mut GlyphRun, adjustment: i32, remaining: &mut i32) {
    let Some(glyph) = run.glyphs.glyphs.iter_mut().rev().find(|g| g.width != 0) else {
        return;
    };
    *remaining -= adjustment;
    glyph.width += adjustment;
    if glyph.width < 0 {
        *remaining += glyph.width;
        glyph.width = 0;
    }
}

/// Trim letter spacing at the line edges and next to tabs, carrying the
/// trimmed amount over to the following tab stop.
///
/// Runs must be in visual order.
pub(super) fn adjust_letter_spacing(line: &mut LayoutLine, spacing: i32, remaining: &mut i32) {
    let (space_left, space_right) = split_spacing(spacing);
    let count = line.runs.len();
    // Right-to-left lines with tabs measure tab corrections from the
    // right edge.
    let reversed =
        line.resolved_dir == Direction::Rtl && line.runs.iter().any(GlyphRun::is_tab);
    let order: Vec<usize> = if reversed {
        (0..count).rev().collect()
    } else {
        (0..count).collect()
    };

    let mut tab_adjustment = 0;
    for idx in order {
        if line.runs[idx].is_tab() {
            pad_right(&mut line.runs[idx], tab_adjustment, remaining);
            tab_adjustment = 0;
            continue;
        }

        let prev_is_edge = idx == 0 || line.runs[idx - 1].is_tab();
        let next_is_edge = idx + 1 == count || line.runs[idx + 1].is_tab();
        let run = &mut line.runs[idx];
        if run.glyphs.is_empty() {
            continue;
        }

        if run.glyphs.glyphs[0].width == 0 {
            pad_left(run, -space_left, remaining);
        } else if prev_is_edge {
            pad_left(run, -space_left, remaining);
            tab_adjustment += space_left;
        }

        let last = run.glyphs.len() - 1;
        if run.glyphs.glyphs[last].width == 0 {
            pad_right(run, -space_right, remaining);
        } else if next_is_edge {
            pad_right(run, -space_right, remaining);
            tab_adjustment += space_right;
        }
    }
}

/// Stretch expandable spaces so the line fills its extent.
///
/// Returns `false` if the line has no space to stretch.
pub(super) fn justify_words(line: &mut LayoutLine, breaks: &[BreakOppo], remaining: &mut i32) -> bool {
    let total_remaining = *remaining;
    if total_remaining <= 0 {
        return true;
    }

    let mut spaces = Vec::new();
    for (run_idx, run) in line.runs.iter().enumerate() {
        for cluster in run.glyphs.clusters(run.is_rtl(), run.len) {
            if !breaks[run.start + cluster.chars.start].contains(BreakOppo::EXPANDABLE_SPACE) {
                continue;
            }
            spaces.extend(
                cluster
                    .glyphs
                    .filter(|&g| run.glyphs.glyphs[g].width > 0)
                    .map(|g| (run_idx, g)),
            );
        }
    }

    let total_space: i64 = spaces
        .iter()
        .map(|&(run, g)| i64::from(line.runs[run].glyphs.glyphs[g].width))
        .sum();
    if total_space == 0 {
        return false;
    }

    let mut so_far = 0i64;
    let mut added = 0i64;
    for (run, g) in spaces {
        let glyph = &mut line.runs[run].glyphs.glyphs[g];
        so_far += i64::from(glyph.width);
        let adjustment = so_far * i64::from(total_remaining) / total_space - added;
        glyph.width += adjustment as i32;
        added += adjustment;
    }

    *remaining -= added as i32;
    true
}

/// Spread the remaining space over the gaps between grapheme clusters.
pub(super) fn justify_clusters(line: &mut LayoutLine, breaks: &[BreakOppo], remaining: &mut i32) {
    let total_remaining = *remaining;
    if total_remaining <= 0 {
        return;
    }

    // Clusters in visual order.
    let mut clusters: Vec<(usize, Range<usize>)> = Vec::new();
    for (run_idx, run) in line.runs.iter().enumerate() {
        let mut run_clusters: Vec<Range<usize>> = run
            .glyphs
            .clusters(run.is_rtl(), run.len)
            .filter(|cluster| breaks[run.start + cluster.chars.start].is_cursor_position())
            .filter(|cluster| {
                run.glyphs.glyphs[cluster.glyphs.clone()].iter().map(|g| g.width).sum::<i32>() != 0
            })
            .map(|cluster| cluster.glyphs)
            .collect();
        if run.is_rtl() {
            run_clusters.reverse();
        }
        clusters.extend(run_clusters.into_iter().map(|glyphs| (run_idx, glyphs)));
    }

    let gaps = clusters.len().saturating_sub(1);
    if gaps == 0 {
        return;
    }

    let mut added = 0;
    for gap in 0..gaps {
        let adjustment = even_share(gap, total_remaining, gaps);
        let (space_left, space_right) = split_spacing(adjustment);

        let (run, glyphs) = &clusters[gap];
        line.runs[*run].glyphs.glyphs[glyphs.end - 1].width += space_right;

        let (run, glyphs) = &clusters[gap + 1];
        let glyph = &mut line.runs[*run].glyphs.glyphs[glyphs.start];
        glyph.width += space_left;
        glyph.x_off += space_left;

        added += adjustment;
    }

    *remaining -= added;
}

/// Share of `total` for part `index` of `parts`; the shares sum to
/// `total` exactly.
fn even_share(index: usize, total: i32, parts: usize) -> i32 {
    let (index, total, parts) = (index as i64, i64::from(total), parts as i64);
    ((index + 1) * total / parts - index * total / parts) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itemize::GlyphOrient;
    use crate::layout::line::GlyphRunFlags;
    use crate::shaping::{GlyphString, ShapedGlyph};
    use crate::unicode::compute_break_opportunities;

    fn run(start: usize, widths: &[i32], level: u8, flags: GlyphRunFlags) -> GlyphRun {
        let mut glyphs = GlyphString::new();
        for (i, &w) in widths.iter().enumerate() {
            glyphs.push(ShapedGlyph::new(i as u32 + 1, w, 10), i);
        }
        if level % 2 == 1 {
            glyphs.reverse();
        }
        GlyphRun {
            text_run: 0,
            start,
            len: widths.len(),
            level,
            orient: GlyphOrient::Upright,
            flags,
            glyphs,
        }
    }

    fn line(runs: Vec<GlyphRun>) -> LayoutLine {
        let start = runs.iter().map(|r| r.start).min().unwrap_or(0);
        let end = runs.iter().map(GlyphRun::end).max().unwrap_or(0);
        let mut line = LayoutLine::new(start, Direction::Ltr);
        line.len = end - start;
        line.runs = runs;
        line
    }

    fn widths(line: &LayoutLine) -> Vec<i32> {
        line.runs
            .iter()
            .flat_map(|r| r.glyphs.glyphs.iter().map(|g| g.width))
            .collect()
    }

    #[test]
    fn final_space_is_zeroed() {
        let text: Vec<char> = "ab ".chars().collect();
        let breaks = compute_break_opportunities(&text);
        let mut line = line(vec![run(0, &[10, 10, 10], 0, GlyphRunFlags::empty())]);
        let mut remaining = 5;
        zero_final_space(&mut line, &breaks, &mut remaining);
        assert_eq!(widths(&line), vec![10, 10, 0]);
        assert_eq!(remaining, 15);
    }

    #[test]
    fn final_letter_is_kept() {
        let text: Vec<char> = "abc".chars().collect();
        let breaks = compute_break_opportunities(&text);
        let mut line = line(vec![run(0, &[10, 10, 10], 0, GlyphRunFlags::empty())]);
        let mut remaining = 0;
        zero_final_space(&mut line, &breaks, &mut remaining);
        assert_eq!(widths(&line), vec![10, 10, 10]);
    }

    #[test]
    fn rtl_final_space_sits_at_the_visual_start() {
        let text: Vec<char> = "\u{05D0}\u{05D1} ".chars().collect();
        let breaks = compute_break_opportunities(&text);
        let mut line = line(vec![run(0, &[10, 10, 7], 1, GlyphRunFlags::empty())]);
        let mut remaining = 0;
        zero_final_space(&mut line, &breaks, &mut remaining);
        assert_eq!(widths(&line), vec![0, 10, 10]);
        assert_eq!(remaining, 7);
    }

    #[test]
    fn letter_spacing_trimmed_at_edges_and_carried_to_tabs() {
        // Shaped with spacing 4: edges got 2 on each side.
        let mut line = line(vec![
            run(0, &[14, 14], 0, GlyphRunFlags::empty()),
            run(2, &[30], 0, GlyphRunFlags::TAB | GlyphRunFlags::NO_SHAPING),
            run(3, &[14], 0, GlyphRunFlags::empty()),
        ]);
        let mut remaining = 0;
        adjust_letter_spacing(&mut line, 4, &mut remaining);
        // The trailing run loses spacing on both sides.
        assert_eq!(widths(&line), vec![12, 12, 34, 10]);
        assert_eq!(remaining, 4);
    }

    #[test]
    fn words_absorb_remaining_space_exactly() {
        let text: Vec<char> = "aa bb cc".chars().collect();
        let breaks = compute_break_opportunities(&text);
        let mut line = line(vec![run(0, &[10; 8], 0, GlyphRunFlags::empty())]);
        let mut remaining = 7;
        assert!(justify_words(&mut line, &breaks, &mut remaining));
        assert_eq!(remaining, 0);
        assert_eq!(widths(&line), vec![10, 10, 13, 10, 10, 14, 10, 10]);
    }

    #[test]
    fn words_without_spaces_report_failure() {
        let text: Vec<char> = "abcd".chars().collect();
        let breaks = compute_break_opportunities(&text);
        let mut line = line(vec![run(0, &[10; 4], 0, GlyphRunFlags::empty())]);
        let mut remaining = 9;
        assert!(!justify_words(&mut line, &breaks, &mut remaining));
        assert_eq!(remaining, 9);
    }

    #[test]
    fn clusters_share_remaining_space_between_gaps() {
        let text: Vec<char> = "abcd".chars().collect();
        let breaks = compute_break_opportunities(&text);
        let mut line = line(vec![run(0, &[10; 4], 0, GlyphRunFlags::empty())]);
        let mut remaining = 10;
        justify_clusters(&mut line, &breaks, &mut remaining);
        assert_eq!(remaining, 0);
        assert_eq!(line.glyph_width(), 50);
        // Gaps get 3, 3 and 4; the outer edges stay put.
        assert_eq!(widths(&line), vec![11, 13, 14, 12]);
        assert_eq!(line.runs[0].glyphs.glyphs[0].x_off, 0);
    }

    #[test]
    fn single_cluster_is_not_justified() {
        let text: Vec<char> = "a".chars().collect();
        let breaks = compute_break_opportunities(&text);
        let mut line = line(vec![run(0, &[10], 0, GlyphRunFlags::empty())]);
        let mut remaining = 10;
        justify_clusters(&mut line, &breaks, &mut remaining);
        assert_eq!(remaining, 10);
        assert_eq!(widths(&line), vec![10]);
    }

    #[test]
    fn even_shares_do_not_overflow() {
        let total = 2_000_000_000;
        let shares: Vec<i32> = (0..3).map(|gap| even_share(gap, total, 3)).collect();
        assert_eq!(shares, vec![666_666_666, 666_666_667, 666_666_667]);
        assert_eq!(shares.iter().map(|&s| i64::from(s)).sum::<i64>(), i64::from(total));
    }
}
