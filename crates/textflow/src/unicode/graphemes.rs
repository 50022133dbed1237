use core::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

/// Maps byte offsets of a UTF-8 copy back to character offsets.
///
/// Segmentation crates work on `&str`; the layout core works on
/// character offsets, so every boundary goes through this table.
pub(crate) struct CharIndexMap {
    text: String,
    byte_to_char: Vec<usize>,
}

impl CharIndexMap {
    pub(crate) fn new(chars: &[char]) -> Self {
        let text: String = chars.iter().collect();
        let mut byte_to_char = vec![0; text.len() + 1];
        for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
            byte_to_char[byte_idx] = char_idx;
        }
        byte_to_char[text.len()] = chars.len();
        Self { text, byte_to_char }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    /// Character offset for a byte offset that lies on a char boundary.
    pub(crate) fn char_offset(&self, byte_offset: usize) -> usize {
        self.byte_to_char[byte_offset]
    }
}

/// Extended grapheme clusters of `text`, as character ranges in scan order.
pub fn grapheme_clusters(text: &[char]) -> Vec<Range<usize>> {
    let map = CharIndexMap::new(text);
    let mut clusters = Vec::new();
    for (byte_idx, g) in map.as_str().grapheme_indices(true) {
        let start = map.char_offset(byte_idx);
        let end = map.char_offset(byte_idx + g.len());
        clusters.push(start..end);
    }
    clusters
}

/// Character offsets that start a grapheme cluster, plus `text.len()`.
pub fn grapheme_boundaries(text: &[char]) -> Vec<usize> {
    let mut bounds: Vec<usize> = grapheme_clusters(text).into_iter().map(|r| r.start).collect();
    bounds.push(text.len());
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn basic_ascii_graphemes() {
        let clusters = grapheme_clusters(&chars("abc"));
        assert_eq!(clusters, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn combining_mark_stays_with_base() {
        let text = chars("a\u{0301}b"); // a + COMBINING ACUTE, b
        let clusters = grapheme_clusters(&text);
        assert_eq!(clusters, vec![0..2, 2..3]);
        assert_eq!(grapheme_boundaries(&text), vec![0, 2, 3]);
    }

    #[test]
    fn emoji_zwj_sequence_is_single_cluster() {
        // Family: man, woman, girl, boy
        let text = chars("\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{200D}\u{1F466}");
        let clusters = grapheme_clusters(&text);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0], 0..text.len());
    }

    #[test]
    fn multibyte_text_maps_to_char_offsets() {
        let text = chars("\u{05E9}\u{05DC}x");
        assert_eq!(grapheme_boundaries(&text), vec![0, 1, 2, 3]);
    }
}
