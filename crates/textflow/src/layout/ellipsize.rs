use core::ops::Range;

use tracing::{debug, warn};

use crate::shaping::{GlyphString, ShapeRequest, Shaper};
use crate::unicode::properties::is_wide;

use super::engine::Layout;
use super::line::{GlyphRun, GlyphRunFlags, LayoutLine};
use super::options::Ellipsize;

const HORIZONTAL_ELLIPSIS: char = '\u{2026}';
const MIDLINE_ELLIPSIS: char = '\u{22EF}';

/// A cluster of the line in logical order.
struct LineCluster {
    run: usize,
    /// Absolute character range.
    chars: Range<usize>,
    width: i32,
}

/// What the ellipsis is shaped with: the run it replaces text in and
/// whether that text is wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EllipsisKey {
    text_run: usize,
    wide: bool,
}

/// Removed clusters `start..=end`, spanning `start_x..end_x` pixels.
#[derive(Debug, Clone, Copy)]
struct Gap {
    start: usize,
    end: usize,
    start_x: i32,
    end_x: i32,
}

impl Gap {
    fn width(&self) -> i32 {
        self.end_x - self.start_x
    }
}

impl<S: Shaper> Layout<'_, S> {
    /// Replace the clusters around the ellipsize position with an
    /// ellipsis until the line fits `goal` pixels.
    ///
    /// Runs must be in logical order. Returns whether anything was
    /// elided.
    pub(super) fn ellipsize_line(&self, line: &mut LayoutLine, goal: i32) -> bool {
        let clusters = line_clusters(line);
        let total = line.glyph_width();
        if clusters.is_empty() || total <= goal {
            return false;
        }

        let center = match self.options.ellipsize {
            Ellipsize::None | Ellipsize::Start => 0,
            Ellipsize::Middle => total / 2,
            Ellipsize::End => total,
        };

        let mut gap = self.initial_gap(&clusters, center);
        let mut key = self.ellipsis_key(line, &clusters, gap.start);
        let mut ellipsis = self.shape_ellipsis(key);

        while total - gap.width() + ellipsis.width() > goal {
            let Some(next) = self.widen_gap(&clusters, gap, center) else {
                break;
            };
            if next.start != gap.start {
                let new_key = self.ellipsis_key(line, &clusters, next.start);
                if new_key != key {
                    key = new_key;
                    ellipsis = self.shape_ellipsis(key);
                }
            }
            gap = next;
        }

        let elided = clusters[gap.start].chars.start..clusters[gap.end].chars.end;
        debug!(
            start = elided.start,
            end = elided.end,
            width = total - gap.width() + ellipsis.width(),
            goal,
            "ellipsized line"
        );
        splice_ellipsis(
            line,
            clusters[gap.start].run,
            clusters[gap.end].run,
            elided,
            ellipsis,
        );
        true
    }

    fn starts_span(&self, clusters: &[LineCluster], k: usize) -> bool {
        k == 0 || self.breaks[clusters[k].chars.start].is_cursor_position()
    }

    fn ends_span(&self, clusters: &[LineCluster], k: usize) -> bool {
        k + 1 == clusters.len() || self.breaks[clusters[k].chars.end].is_cursor_position()
    }

    /// The grapheme span containing the ellipsize position.
    fn initial_gap(&self, clusters: &[LineCluster], center: i32) -> Gap {
        let mut x = 0;
        let mut k = 0;
        while k < clusters.len() && x + clusters[k].width <= center {
            x += clusters[k].width;
            k += 1;
        }
        if k == clusters.len() {
            k -= 1;
            x -= clusters[k].width;
        }

        let mut gap = Gap {
            start: k,
            end: k,
            start_x: x,
            end_x: x + clusters[k].width,
        };
        while !self.starts_span(clusters, gap.start) {
            gap.start -= 1;
            gap.start_x -= clusters[gap.start].width;
        }
        while !self.ends_span(clusters, gap.end) {
            gap.end += 1;
            gap.end_x += clusters[gap.end].width;
        }
        gap
    }

    /// Grow the gap by one non-empty span on the side that keeps it
    /// closest to `center`. `None` when the gap covers the whole line.
    fn widen_gap(&self, clusters: &[LineCluster], gap: Gap, center: i32) -> Option<Gap> {
        let mut start = gap.start;
        let mut start_x = gap.start_x;
        while start > 0 {
            start -= 1;
            start_x -= clusters[start].width;
            if self.starts_span(clusters, start) && clusters[start].width != 0 {
                break;
            }
        }

        let mut end = gap.end;
        let mut end_x = gap.end_x;
        while end + 1 < clusters.len() {
            end += 1;
            end_x += clusters[end].width;
            if self.ends_span(clusters, end) && clusters[end].width != 0 {
                break;
            }
        }

        if start_x == gap.start_x && end_x == gap.end_x {
            return None;
        }

        if end_x == gap.end_x || (start_x != gap.start_x && center - start_x < end_x - center) {
            Some(Gap {
                start,
                start_x,
                ..gap
            })
        } else {
            Some(Gap { end, end_x, ..gap })
        }
    }

    fn ellipsis_key(&self, line: &LayoutLine, clusters: &[LineCluster], start: usize) -> EllipsisKey {
        let cluster = &clusters[start];
        EllipsisKey {
            text_run: line.runs[cluster.run].text_run,
            wide: is_wide(self.info.text()[cluster.chars.start]),
        }
    }

    /// Shape U+2026, or U+22EF next to wide text. Falls back to three
    /// periods, then to placeholder glyphs.
    fn shape_ellipsis(&self, key: EllipsisKey) -> GlyphString {
        let run = &self.info.runs()[key.text_run];
        let font = self.info.font_at(run.start);
        let ellipsis = [if key.wide { MIDLINE_ELLIPSIS } else { HORIZONTAL_ELLIPSIS }];
        let periods = ['.'; 3];

        let usable = |glyphs: &GlyphString| !glyphs.is_empty() && !glyphs.has_unknown_glyphs();
        let mut glyphs = self
            .shaper
            .shape(&ShapeRequest::new(run, font, &ellipsis, run.start))
            .filter(usable)
            .or_else(|| {
                self.shaper
                    .shape(&ShapeRequest::new(run, font, &periods, run.start))
                    .filter(usable)
            })
            .unwrap_or_else(|| {
                warn!(run = key.text_run, "no glyphs for the ellipsis, using fallback glyphs");
                self.shape_fallback(run, periods.len())
            });

        // The ellipsis is one cluster.
        for (i, (glyph, cluster)) in glyphs
            .glyphs
            .iter_mut()
            .zip(glyphs.log_clusters.iter_mut())
            .enumerate()
        {
            *cluster = 0;
            glyph.is_cluster_start = i == 0;
        }
        glyphs
    }
}

fn line_clusters(line: &LayoutLine) -> Vec<LineCluster> {
    let mut clusters = Vec::new();
    for (run_idx, run) in line.runs.iter().enumerate() {
        for cluster in run.glyphs.clusters(run.is_rtl(), run.len) {
            clusters.push(LineCluster {
                run: run_idx,
                chars: run.start + cluster.chars.start..run.start + cluster.chars.end,
                width: run.glyphs.glyphs[cluster.glyphs].iter().map(|g| g.width).sum(),
            });
        }
    }
    clusters
}

/// Replace `elided` (spanning runs `first..=last`) with one ellipsis run.
fn splice_ellipsis(
    line: &mut LayoutLine,
    first: usize,
    last: usize,
    elided: Range<usize>,
    glyphs: GlyphString,
) {
    let template = &line.runs[first];
    let mut ellipsis = GlyphRun {
        text_run: template.text_run,
        start: elided.start,
        len: elided.len(),
        level: template.level,
        orient: template.orient,
        flags: GlyphRunFlags::ELLIPSIS | (template.flags & GlyphRunFlags::CENTERED_BASELINE),
        glyphs,
    };

    let mut runs = Vec::with_capacity(line.runs.len() + 2);
    let mut head = None;
    let mut tail = None;
    let mut after = Vec::new();
    for (idx, mut run) in line.runs.drain(..).enumerate() {
        if idx < first {
            runs.push(run);
            continue;
        }
        if idx > last {
            after.push(run);
            continue;
        }

        ellipsis.level = ellipsis.level.min(run.level);
        if idx == last && elided.end < run.end() {
            tail = Some(run.split_off(elided.end - run.start));
        }
        if idx == first && elided.start > run.start {
            run.split_off(elided.start - run.start);
            head = Some(run);
        }
    }

    runs.extend(head);
    runs.push(ellipsis);
    runs.extend(tail);
    runs.extend(after);
    line.runs = runs;
}
