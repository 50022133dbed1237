use core::ops::Range;

use crate::unicode::BreakOppo;

/// Identifier of a glyph in the shaping font.
pub type GlyphId = u32;

/// Sentinel for glyphs that must not be drawn (tabs, control characters).
pub const INVALID_GLYPH: GlyphId = u32::MAX;

/// One shaped glyph. All metrics are in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    pub glyph: GlyphId,
    /// Horizontal placement offset from the pen position.
    pub x_off: i32,
    /// Vertical placement offset from the baseline.
    pub y_off: i32,
    /// Advance width.
    pub width: i32,
    pub height: i32,
    /// First glyph of a cluster in visual order.
    pub is_cluster_start: bool,
}

impl ShapedGlyph {
    pub fn new(glyph: GlyphId, width: i32, height: i32) -> Self {
        Self {
            glyph,
            x_off: 0,
            y_off: 0,
            width,
            height,
            is_cluster_start: true,
        }
    }

    pub fn invalid(width: i32, height: i32) -> Self {
        Self::new(INVALID_GLYPH, width, height)
    }
}

/// Glyphs of one shaped span, stored in visual order.
///
/// `log_clusters[i]` is the index (relative to the span start) of the
/// first character of the cluster glyph `i` belongs to. The values never
/// decrease for left-to-right spans and never increase for right-to-left
/// spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphString {
    pub glyphs: Vec<ShapedGlyph>,
    pub log_clusters: Vec<usize>,
}

/// A group of glyphs rendering an indivisible group of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Glyph indices, contiguous in visual order.
    pub glyphs: Range<usize>,
    /// Character indices relative to the span start.
    pub chars: Range<usize>,
}

impl GlyphString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            glyphs: Vec::with_capacity(capacity),
            log_clusters: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, glyph: ShapedGlyph, cluster: usize) {
        self.glyphs.push(glyph);
        self.log_clusters.push(cluster);
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Sum of advance widths.
    pub fn width(&self) -> i32 {
        self.glyphs.iter().map(|g| g.width).sum()
    }

    pub fn height(&self) -> i32 {
        self.glyphs.iter().map(|g| g.height).max().unwrap_or(0)
    }

    /// Reverse glyph order, turning a logically ordered right-to-left
    /// string into visual order.
    pub fn reverse(&mut self) {
        self.glyphs.reverse();
        self.log_clusters.reverse();
    }

    /// Whether any glyph is missing from the font (glyph id 0).
    pub fn has_unknown_glyphs(&self) -> bool {
        self.glyphs.iter().any(|g| g.glyph == 0)
    }

    /// Clusters in logical order.
    ///
    /// `n_chars` is the number of characters the string was shaped from.
    pub fn clusters(&self, rtl: bool, n_chars: usize) -> Clusters<'_> {
        Clusters {
            string: self,
            rtl,
            n_chars,
            consumed: 0,
        }
    }

    /// Per-character advance widths.
    ///
    /// A cluster's width is shared evenly among its characters; the
    /// remainder of the division goes to the first one.
    pub fn logical_widths(&self, rtl: bool, n_chars: usize) -> Vec<i32> {
        let mut widths = vec![0; n_chars];
        for cluster in self.clusters(rtl, n_chars) {
            let count = cluster.chars.len() as i32;
            if count == 0 {
                continue;
            }
            let width: i32 = self.glyphs[cluster.glyphs.clone()].iter().map(|g| g.width).sum();
            let share = width / count;
            for (k, idx) in cluster.chars.clone().enumerate() {
                widths[idx] = if k == 0 { width - share * (count - 1) } else { share };
            }
        }
        widths
    }

    /// Add `spacing` at every interior grapheme boundary of the string.
    ///
    /// `breaks` is the break table slice covering the span, one entry
    /// per character plus one for the end. Half of the spacing goes after
    /// the cluster before the boundary and half before the cluster after
    /// it; the left half gets the odd pixel.
    pub fn letter_space(&mut self, rtl: bool, breaks: &[BreakOppo], spacing: i32) {
        let n_chars = breaks.len().saturating_sub(1);
        let (space_left, space_right) = split_spacing(spacing);
        let clusters: Vec<Cluster> = self.clusters(rtl, n_chars).collect();

        for cluster in clusters {
            let at_start = cluster.chars.start > 0 && breaks[cluster.chars.start].is_cursor_position();
            let at_end =
                cluster.chars.end < n_chars && breaks[cluster.chars.end].is_cursor_position();
            let leftmost = cluster.glyphs.start;
            let rightmost = cluster.glyphs.end - 1;

            let (left_edge, right_edge) = if rtl { (at_end, at_start) } else { (at_start, at_end) };
            if left_edge {
                self.glyphs[leftmost].width += space_left;
                self.glyphs[leftmost].x_off += space_left;
            }
            if right_edge {
                self.glyphs[rightmost].width += space_right;
            }
        }
    }

    /// Split off the characters from `at` onwards into a new string.
    ///
    /// `at` must be a cluster boundary. `self` keeps the first `at`
    /// characters; the returned string's clusters are rebased to start
    /// at zero.
    pub fn split_off(&mut self, rtl: bool, at: usize) -> GlyphString {
        let mut tail = if rtl {
            // Later characters sit at the visual start.
            let idx = self.log_clusters.iter().position(|&c| c < at).unwrap_or(self.len());
            let head_glyphs = self.glyphs.split_off(idx);
            let head_clusters = self.log_clusters.split_off(idx);
            GlyphString {
                glyphs: core::mem::replace(&mut self.glyphs, head_glyphs),
                log_clusters: core::mem::replace(&mut self.log_clusters, head_clusters),
            }
        } else {
            let idx = self.log_clusters.iter().position(|&c| c >= at).unwrap_or(self.len());
            GlyphString {
                glyphs: self.glyphs.split_off(idx),
                log_clusters: self.log_clusters.split_off(idx),
            }
        };
        for cluster in &mut tail.log_clusters {
            *cluster -= at;
        }
        tail
    }
}

/// Split letter spacing into the parts placed before and after a glyph.
pub(crate) fn split_spacing(spacing: i32) -> (i32, i32) {
    let mut left = spacing / 2;
    if spacing & 1 != 0 {
        left += 1;
    }
    (left, spacing - left)
}

/// Iterator over the clusters of a [`GlyphString`] in logical order.
pub struct Clusters<'a> {
    string: &'a GlyphString,
    rtl: bool,
    n_chars: usize,
    consumed: usize,
}

impl Iterator for Clusters<'_> {
    type Item = Cluster;

    fn next(&mut self) -> Option<Cluster> {
        let clusters = &self.string.log_clusters;
        let len = clusters.len();
        if self.consumed >= len {
            return None;
        }

        if self.rtl {
            let end = len - self.consumed;
            let first_char = clusters[end - 1];
            let mut start = end - 1;
            while start > 0 && clusters[start - 1] == first_char {
                start -= 1;
            }
            let end_char = if start > 0 { clusters[start - 1] } else { self.n_chars };
            self.consumed += end - start;
            Some(Cluster {
                glyphs: start..end,
                chars: first_char..end_char.max(first_char),
            })
        } else {
            let start = self.consumed;
            let first_char = clusters[start];
            let mut end = start + 1;
            while end < len && clusters[end] == first_char {
                end += 1;
            }
            let end_char = if end < len { clusters[end] } else { self.n_chars };
            self.consumed = end;
            Some(Cluster {
                glyphs: start..end,
                chars: first_char..end_char.max(first_char),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(widths: &[i32], clusters: &[usize]) -> GlyphString {
        let mut gs = GlyphString::new();
        for (i, (&w, &c)) in widths.iter().zip(clusters).enumerate() {
            gs.push(ShapedGlyph::new(i as GlyphId + 1, w, 12), c);
        }
        gs
    }

    fn cursor_breaks(n: usize) -> Vec<BreakOppo> {
        vec![BreakOppo::GRAPHEME_BOUNDARY; n + 1]
    }

    #[test]
    fn ltr_clusters_follow_glyph_order() {
        // "ffi" ligature then "x": 2 glyphs for 4 chars.
        let gs = string(&[20, 10], &[0, 3]);
        let clusters: Vec<_> = gs.clusters(false, 4).collect();
        assert_eq!(clusters[0], Cluster { glyphs: 0..1, chars: 0..3 });
        assert_eq!(clusters[1], Cluster { glyphs: 1..2, chars: 3..4 });
    }

    #[test]
    fn rtl_clusters_walk_backwards() {
        // Visual order: char 2, chars 0-1 (one cluster of two glyphs).
        let gs = string(&[10, 6, 4], &[2, 0, 0]);
        let clusters: Vec<_> = gs.clusters(true, 3).collect();
        assert_eq!(clusters[0], Cluster { glyphs: 1..3, chars: 0..2 });
        assert_eq!(clusters[1], Cluster { glyphs: 0..1, chars: 2..3 });
    }

    #[test]
    fn logical_widths_share_cluster_width() {
        let gs = string(&[20, 10], &[0, 3]);
        assert_eq!(gs.logical_widths(false, 4), vec![8, 6, 6, 10]);
        let total: i32 = gs.logical_widths(false, 4).iter().sum();
        assert_eq!(total, gs.width());
    }

    #[test]
    fn letter_spacing_only_between_clusters() {
        let mut gs = string(&[10, 10, 10], &[0, 1, 2]);
        gs.letter_space(false, &cursor_breaks(3), 4);
        let widths: Vec<i32> = gs.glyphs.iter().map(|g| g.width).collect();
        assert_eq!(widths, vec![12, 14, 12]);
        assert_eq!(gs.glyphs[0].x_off, 0);
        assert_eq!(gs.glyphs[1].x_off, 2);
    }

    #[test]
    fn letter_spacing_skips_grapheme_interiors() {
        let mut gs = string(&[10, 0, 10], &[0, 1, 2]);
        let mut breaks = cursor_breaks(3);
        breaks[1] = BreakOppo::empty();
        gs.letter_space(false, &breaks, 4);
        assert_eq!(gs.width(), 24);
        assert_eq!(gs.glyphs[1].width, 0);
    }

    #[test]
    fn rtl_letter_spacing_mirrors() {
        // Visual: char 1, char 0
        let mut gs = string(&[10, 10], &[1, 0]);
        gs.letter_space(true, &cursor_breaks(2), 3);
        // Left of logical-first cluster gets the left half (2) with offset,
        // right of logical-second cluster gets the right half (1).
        assert_eq!(gs.glyphs[1].width, 12);
        assert_eq!(gs.glyphs[1].x_off, 2);
        assert_eq!(gs.glyphs[0].width, 11);
    }

    #[test]
    fn split_ltr_rebases_tail() {
        let mut gs = string(&[10, 10, 10], &[0, 1, 2]);
        let tail = gs.split_off(false, 1);
        assert_eq!(gs.log_clusters, vec![0]);
        assert_eq!(tail.log_clusters, vec![0, 1]);
    }

    #[test]
    fn split_rtl_keeps_visual_order() {
        let mut gs = string(&[1, 2, 3], &[2, 1, 0]);
        let tail = gs.split_off(true, 2);
        assert_eq!(gs.log_clusters, vec![1, 0]);
        assert_eq!(gs.glyphs[0].width, 2);
        assert_eq!(tail.log_clusters, vec![0]);
        assert_eq!(tail.glyphs[0].width, 1);
    }

    #[test]
    fn spacing_split_favours_the_left() {
        assert_eq!(split_spacing(5), (3, 2));
        assert_eq!(split_spacing(4), (2, 2));
        assert_eq!(split_spacing(0), (0, 0));
    }
}
