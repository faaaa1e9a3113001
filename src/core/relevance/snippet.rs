use std::collections::BTreeMap;

use super::query::Query;
use super::text::FoldedText;

/// Chars kept on each side of the best match.
pub const SNIPPET_RADIUS: usize = 100;

/// Chars shown when no term matches anywhere.
pub const FALLBACK_SNIPPET_CHARS: usize = 200;

pub const ELLIPSIS: &str = "...";

/// Extracts the excerpt of `text` where the most query terms start.
///
/// The best offset is the one at which the largest number of distinct terms
/// begin (literal, case-insensitive, not word-bounded); the earliest offset
/// wins ties. The excerpt spans 100 chars either side of it. When nothing
/// matches, the first 200 chars are used. An ellipsis is always appended.
///
/// Returns `None` for absent or blank text.
pub fn extract_snippet(text: Option<&str>, query: &Query) -> Option<String> {
    let text = text.filter(|t| !t.trim().is_empty())?;
    let original: Vec<char> = text.chars().collect();
    let folded = FoldedText::new(text);

    // offset -> number of terms starting there
    let mut hits: BTreeMap<usize, usize> = BTreeMap::new();
    for term in query.folded_terms() {
        for offset in folded.offsets(&term) {
            *hits.entry(offset).or_insert(0) += 1;
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (&offset, &count) in &hits {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((offset, count));
        }
    }

    let window = match best {
        Some((offset, _)) => {
            let start = offset.saturating_sub(SNIPPET_RADIUS);
            let end = (offset + SNIPPET_RADIUS).min(original.len());
            &original[start..end]
        }
        None => &original[..original.len().min(FALLBACK_SNIPPET_CHARS)],
    };

    let mut snippet: String = window.iter().collect();
    snippet.push_str(ELLIPSIS);
    Some(snippet)
}
