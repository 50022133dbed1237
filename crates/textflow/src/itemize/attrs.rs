use core::ops::Range;

/// Sparse per-character attribute: a default value plus override
/// intervals. Later overrides win, so lookups scan newest first.
#[derive(Debug, Clone)]
pub struct AttrMap<T> {
    len: usize,
    default: T,
    overrides: Vec<(Range<usize>, T)>,
}

impl<T> AttrMap<T> {
    pub fn new(len: usize, default: T) -> Self {
        Self {
            len,
            default,
            overrides: Vec::new(),
        }
    }

    /// Override `[start, start + len)`. A `len` of zero or less extends
    /// to the end; a range covering everything replaces the default and
    /// drops all overrides. Returns `false` when `start` is out of range.
    pub fn set(&mut self, start: usize, len: isize, value: T) -> bool {
        let Some(range) = self.clamp(start, len) else {
            return false;
        };
        if range.len() == self.len {
            self.reset(value);
        } else {
            self.overrides.push((range, value));
        }
        true
    }

    /// The range [`AttrMap::set`] would cover for `start` and `len`.
    pub fn clamp(&self, start: usize, len: isize) -> Option<Range<usize>> {
        if start >= self.len {
            return None;
        }
        let remaining = self.len - start;
        let len = if len <= 0 { remaining } else { (len as usize).min(remaining) };
        Some(start..start + len)
    }

    pub fn reset(&mut self, value: T) {
        self.default = value;
        self.overrides.clear();
    }

    pub fn get(&self, index: usize) -> &T {
        self.overrides
            .iter()
            .rev()
            .find(|(range, _)| range.contains(&index))
            .map(|(_, value)| value)
            .unwrap_or(&self.default)
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn overrides(&self) -> usize {
        self.overrides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_overrides_win() {
        let mut map = AttrMap::new(10, 0u32);
        assert!(map.set(2, 5, 1));
        assert!(map.set(4, 2, 2));
        assert_eq!(*map.get(1), 0);
        assert_eq!(*map.get(3), 1);
        assert_eq!(*map.get(4), 2);
        assert_eq!(*map.get(6), 1);
        assert_eq!(*map.get(7), 0);
    }

    #[test]
    fn non_positive_length_runs_to_the_end() {
        let mut map = AttrMap::new(10, 0u32);
        assert!(map.set(8, 0, 5));
        assert_eq!(*map.get(9), 5);
        assert!(map.set(6, 100, 6));
        assert_eq!(*map.get(9), 6);
    }

    #[test]
    fn full_range_replaces_default() {
        let mut map = AttrMap::new(4, 0u32);
        map.set(1, 1, 9);
        assert!(map.set(0, -1, 3));
        assert_eq!(map.overrides(), 0);
        assert_eq!(*map.get(1), 3);
    }

    #[test]
    fn start_out_of_range_is_rejected() {
        let mut map = AttrMap::new(4, 0u32);
        assert!(!map.set(4, 1, 1));
        assert_eq!(map.clamp(4, 1), None);
    }

    #[test]
    fn clamp_matches_set() {
        let map = AttrMap::new(10, 0u32);
        assert_eq!(map.clamp(2, 3), Some(2..5));
        assert_eq!(map.clamp(8, 0), Some(8..10));
        assert_eq!(map.clamp(8, 50), Some(8..10));
    }
}
