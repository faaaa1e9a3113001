use super::query::fold_char;

/// Case-folded document text, indexed by char.
pub(crate) struct FoldedText {
    chars: Vec<char>,
}

impl FoldedText {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().map(fold_char).collect(),
        }
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Every start offset of `term`, overlapping matches included, ascending.
    pub fn offsets(&self, term: &[char]) -> Vec<usize> {
        if term.is_empty() || term.len() > self.chars.len() {
            return Vec::new();
        }

        self.chars
            .windows(term.len())
            .enumerate()
            .filter(|(_, window)| *window == term)
            .map(|(offset, _)| offset)
            .collect()
    }

    pub fn contains(&self, needle: &[char]) -> bool {
        !needle.is_empty()
            && needle.len() <= self.chars.len()
            && self.chars.windows(needle.len()).any(|w| w == needle)
    }
}

/// Counts matches the way a global literal search would: a match consumes its
/// characters, so "aaaa" holds two "aa", not three.
pub(crate) fn count_non_overlapping(offsets: &[usize], term_len: usize) -> usize {
    let mut count = 0;
    let mut next_free = 0;
    for &offset in offsets {
        if offset >= next_free {
            count += 1;
            next_free = offset + term_len;
        }
    }
    count
}

/// Smallest distance between consecutive offsets; `None` with fewer than two.
pub(crate) fn min_gap(offsets: &[usize]) -> Option<usize> {
    offsets.windows(2).map(|pair| pair[1] - pair[0]).min()
}

/// Scores feed straight into sorting, so NaN and infinities become 0.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
