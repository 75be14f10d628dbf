use crate::signal::Signal;

/// Case-sensitive substring filter applied to arriving signals.
///
/// An empty pattern admits everything and highlights nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstringFilter {
    pattern: String,
}

impl SubstringFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn push(&mut self, c: char) {
        self.pattern.push(c);
    }

    /// Remove the last character; `false` when there was nothing to remove.
    pub fn pop(&mut self) -> bool {
        self.pattern.pop().is_some()
    }

    pub fn matches_text(&self, text: &str) -> bool {
        self.pattern.is_empty() || text.contains(&self.pattern)
    }

    pub fn matches(&self, signal: &Signal) -> bool {
        self.matches_text(signal.summary()) || self.matches_text(signal.description())
    }

    /// Per-column highlight mask for `text` clipped to `width` columns.
    ///
    /// Every non-overlapping occurrence is marked. A match that runs past the
    /// right edge marks the last visible column instead.
    pub fn highlight(&self, text: &str, width: usize) -> Vec<bool> {
        let mut mask = vec![false; width];
        if self.pattern.is_empty() || width == 0 {
            return mask;
        }

        let pattern_cols = self.pattern.chars().count();
        let (mut scanned_bytes, mut scanned_cols) = (0, 0);
        for (byte_idx, _) in text.match_indices(&self.pattern) {
            scanned_cols += text[scanned_bytes..byte_idx].chars().count();
            scanned_bytes = byte_idx;
            for col in scanned_cols..scanned_cols + pattern_cols {
                if col >= width {
                    mask[width - 1] = true;
                    return mask;
                }
                mask[col] = true;
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{SignalKind, Timestamp};

    fn marked(mask: &[bool]) -> Vec<usize> {
        mask.iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_highlight_columns() {
        let filter = SubstringFilter::with_pattern("beta");
        assert_eq!(marked(&filter.highlight("alpha-beta", 20)), vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_empty_filter_highlights_nothing() {
        let filter = SubstringFilter::new();
        assert!(marked(&filter.highlight("alpha-beta", 20)).is_empty());
    }

    #[test]
    fn test_highlight_every_occurrence_case_sensitive() {
        let filter = SubstringFilter::with_pattern("ab");
        assert_eq!(marked(&filter.highlight("abxABab", 10)), vec![0, 1, 5, 6]);
    }

    #[test]
    fn test_match_past_right_edge_marks_last_column() {
        let filter = SubstringFilter::with_pattern("beta");
        assert_eq!(marked(&filter.highlight("alpha-beta", 8)), vec![6, 7]);
        assert_eq!(marked(&filter.highlight("alpha-beta", 5)), vec![4]);
    }

    #[test]
    fn test_highlight_counts_columns_not_bytes() {
        let filter = SubstringFilter::with_pattern("x");
        assert_eq!(marked(&filter.highlight("ééx", 5)), vec![2]);
    }

    #[test]
    fn test_admission() {
        let signal = Signal::new(SignalKind::Log, Timestamp::UNKNOWN, "X", vec![]);
        assert!(SubstringFilter::new().matches(&signal));
        assert!(SubstringFilter::with_pattern("X").matches(&signal));
        assert!(!SubstringFilter::with_pattern("Y").matches(&signal));
    }

    #[test]
    fn test_push_pop() {
        let mut filter = SubstringFilter::new();
        assert!(!filter.pop());
        filter.push('a');
        filter.push('b');
        assert_eq!(filter.as_str(), "ab");
        assert!(filter.pop());
        assert_eq!(filter.as_str(), "a");
    }
}
