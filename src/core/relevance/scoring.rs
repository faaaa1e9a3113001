// Scoring functions for the relevance engine.
//
// All of these are pure and total: absent or empty input scores 0 and
// nothing here can panic on user-supplied text. Callers chain the results
// without checking them.

use chrono::{DateTime, Utc};

use super::query::{fold_str, Query};
use super::text::{count_non_overlapping, finite_or_zero, min_gap, FoldedText};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Days over which the recency prior decays by a factor of e.
const RECENCY_DECAY_DAYS: f64 = 365.0;

/// Gap (in chars) that maps to a proximity factor of 1/e.
const PROXIMITY_SCALE: f64 = 100.0;

/// Consecutive occurrences closer than this earn the aggregate proximity bonus.
const AGGREGATE_PROXIMITY_WINDOW: usize = 50;

/// Scores how well a file name matches the query.
///
/// A strict ladder, highest tier wins:
/// - 1.0 exact match (a trailing file extension on the name is ignored)
/// - 0.9 the name contains the whole query
/// - 0.8 the name contains every term
/// - otherwise 0.7 × the fraction of terms found
pub fn name_match(name: &str, query: &Query) -> f64 {
    let terms = query.terms();
    let name = fold_str(&name.split_whitespace().collect::<Vec<_>>().join(" "));
    if terms.is_empty() || name.is_empty() {
        return 0.0;
    }

    let phrase = query.normalized();
    if name == phrase || strip_extension(&name) == phrase {
        return 1.0;
    }

    if name.contains(phrase) {
        return 0.9;
    }

    let found = terms.iter().filter(|t| name.contains(t.as_str())).count();
    if found == terms.len() {
        return 0.8;
    }

    found as f64 / terms.len() as f64 * 0.7
}

/// Scores the folder chain a file lives in (root first).
///
/// 1.0 when one folder is named exactly like the query, 0.8 when the joined
/// path contains every term, otherwise 0.5 × the fraction of terms found.
pub fn folder_path_relevance(path: &[String], query: &Query) -> f64 {
    let terms = query.terms();
    if path.is_empty() || terms.is_empty() {
        return 0.0;
    }

    let phrase = query.normalized();
    if path.iter().any(|folder| fold_str(folder.trim()) == phrase) {
        return 1.0;
    }

    let joined = fold_str(&path.join("/"));
    let found = terms.iter().filter(|t| joined.contains(t.as_str())).count();
    if found == terms.len() {
        return 0.8;
    }

    found as f64 / terms.len() as f64 * 0.5
}

/// Exponential decay over the document's age, measured against the wall clock
/// at call time. A document modified now scores 1.0, one a year old ≈ 0.37.
pub fn recency_score(modified: DateTime<Utc>) -> f64 {
    recency_score_at(modified, Utc::now())
}

/// [`recency_score`] against an explicit "now". Future timestamps count as age 0.
pub fn recency_score_at(modified: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_ms = (now - modified).num_milliseconds().max(0);
    let age_days = age_ms as f64 / MS_PER_DAY;
    finite_or_zero((-age_days / RECENCY_DECAY_DAYS).exp())
}

/// Frequency/proximity score of the query terms inside `text`.
///
/// `0.6 × average term frequency + 0.4 × average proximity`, where a term's
/// proximity is `exp(-minGap / 100)` over its consecutive occurrences (0 when
/// it occurs fewer than twice).
pub fn content_relevance(text: Option<&str>, query: &Query) -> f64 {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return 0.0,
    };
    let terms = query.folded_terms();
    if terms.is_empty() {
        return 0.0;
    }

    let folded = FoldedText::new(text);
    let mut frequency = 0usize;
    let mut proximity = 0.0;

    for term in &terms {
        let offsets = folded.offsets(term);
        frequency += count_non_overlapping(&offsets, term.len());
        if let Some(gap) = min_gap(&offsets) {
            proximity += (-(gap as f64) / PROXIMITY_SCALE).exp();
        }
    }

    let term_count = terms.len() as f64;
    finite_or_zero(0.6 * (frequency as f64 / term_count) + 0.4 * (proximity / term_count))
}

/// Length-normalized match score used to rank answer sources.
///
/// Raw score is `0.5 × word matches + 0.3 × phrase bonus (2 when the whole
/// query appears) + 0.2 × proximity bonus (1 when any term repeats within 50
/// chars)`, divided by `length × 0.001` so long documents cannot win on
/// volume alone.
pub fn aggregate_relevance(text: Option<&str>, query: &Query) -> f64 {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return 0.0,
    };
    let terms = query.folded_terms();
    if terms.is_empty() {
        return 0.0;
    }

    let folded = FoldedText::new(text);
    let mut word_matches = 0usize;
    let mut close_repeat = false;

    for term in &terms {
        let offsets = folded.offsets(term);
        word_matches += count_non_overlapping(&offsets, term.len());
        if min_gap(&offsets).is_some_and(|gap| gap < AGGREGATE_PROXIMITY_WINDOW) {
            close_repeat = true;
        }
    }

    let phrase: Vec<char> = query.normalized().chars().collect();
    let phrase_bonus = if folded.contains(&phrase) { 2.0 } else { 0.0 };
    let proximity_bonus = if close_repeat { 1.0 } else { 0.0 };

    let raw = word_matches as f64 * 0.5 + phrase_bonus * 0.3 + proximity_bonus * 0.2;
    finite_or_zero(raw / (folded.len() as f64 * 0.001))
}

/// Drops a short alphanumeric extension ("notes.md" -> "notes").
fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => name,
    }
}
