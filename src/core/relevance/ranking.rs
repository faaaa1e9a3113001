// Combines the individual signals into one ranking score.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::document::{Document, ScoreBreakdown, ScoredResult};
use super::query::Query;
use super::scoring::{
    aggregate_relevance, content_relevance, folder_path_relevance, name_match, recency_score,
};
use super::snippet::extract_snippet;
use super::text::finite_or_zero;

/// Which content formula feeds the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSignal {
    /// Frequency/proximity score, used for file lists.
    Frequency,
    /// Length-normalized score, used when ranking sources for an answer.
    Aggregate,
}

/// Weight of each signal in the final score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingWeights {
    pub content: f64,
    pub name: f64,
    pub folder: f64,
    pub recency: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            content: 1.0,
            name: 1.0,
            folder: 0.5,
            recency: 0.25,
        }
    }
}

impl ScoreBreakdown {
    pub fn combine(&self, weights: &RankingWeights) -> f64 {
        finite_or_zero(
            self.content * weights.content
                + self.name * weights.name
                + self.folder * weights.folder
                + self.recency * weights.recency,
        )
    }
}

/// Scores documents against a query and orders them.
#[derive(Debug, Clone, Default)]
pub struct RelevanceEngine {
    weights: RankingWeights,
}

impl RelevanceEngine {
    pub fn new(weights: RankingWeights) -> Self {
        Self { weights }
    }

    /// Scores one document using the current wall clock for recency.
    pub fn score(&self, document: Document, query: &Query, signal: ContentSignal) -> ScoredResult {
        self.score_with(document, query, signal, recency_score)
    }

    #[cfg(test)]
    pub fn score_at(
        &self,
        document: Document,
        query: &Query,
        signal: ContentSignal,
        now: DateTime<Utc>,
    ) -> ScoredResult {
        self.score_with(document, query, signal, |modified| {
            super::scoring::recency_score_at(modified, now)
        })
    }

    fn score_with(
        &self,
        mut document: Document,
        query: &Query,
        signal: ContentSignal,
        recency: impl Fn(DateTime<Utc>) -> f64,
    ) -> ScoredResult {
        let text = document.content.as_deref();
        let content = match signal {
            ContentSignal::Frequency => content_relevance(text, query),
            ContentSignal::Aggregate => aggregate_relevance(text, query),
        };

        let breakdown = ScoreBreakdown {
            content,
            name: name_match(&document.name, query),
            folder: folder_path_relevance(&document.path, query),
            recency: document.modified_time.map(recency).unwrap_or(0.0),
        };

        document.snippet = extract_snippet(text, query);

        ScoredResult {
            score: breakdown.combine(&self.weights),
            document,
            breakdown,
        }
    }

    /// Sorts by score, highest first. Equal scores keep their arrival order.
    pub fn rank(results: &mut [ScoredResult]) {
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn document(id: &str, name: &str, content: Option<&str>, age_days: i64, now: DateTime<Utc>) -> Document {
        Document {
            id: id.to_string(),
            name: name.to_string(),
            size: None,
            modified_time: Some(now - Duration::days(age_days)),
            owner: "Test User".to_string(),
            mime_type: "text/plain".to_string(),
            path: Vec::new(),
            content: content.map(str::to_string),
            snippet: None,
        }
    }

    #[test]
    fn recent_document_wins_when_content_ties() {
        let now = Utc::now();
        let engine = RelevanceEngine::default();
        let query = Query::new("budget allocation");
        let text = "Budget allocation across phases: development, testing, marketing.";

        let mut results = vec![
            engine.score_at(document("old", "notes.txt", Some(text), 400, now), &query, ContentSignal::Frequency, now),
            engine.score_at(document("new", "notes.txt", Some(text), 2, now), &query, ContentSignal::Frequency, now),
        ];
        assert_eq!(results[0].breakdown.content, results[1].breakdown.content);

        RelevanceEngine::rank(&mut results);
        assert_eq!(results[0].document.id, "new");
        assert_eq!(results[1].document.id, "old");
    }

    #[test]
    fn ranking_is_stable_for_equal_scores() {
        let now = Utc::now();
        let engine = RelevanceEngine::default();
        let query = Query::new("roadmap");

        let mut results: Vec<ScoredResult> = ["a", "b", "c"]
            .iter()
            .map(|id| engine.score_at(document(id, "x", None, 10, now), &query, ContentSignal::Frequency, now))
            .collect();
        RelevanceEngine::rank(&mut results);

        let order: Vec<&str> = results.iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn document_without_content_still_scores_on_metadata() {
        let now = Utc::now();
        let engine = RelevanceEngine::default();
        let query = Query::new("Q2 milestones");

        let result = engine.score_at(
            document("id", "Q2 milestones.md", None, 0, now),
            &query,
            ContentSignal::Aggregate,
            now,
        );

        assert_eq!(result.breakdown.content, 0.0);
        assert_eq!(result.breakdown.name, 1.0);
        assert_eq!(result.snippet(), None);
        assert!((result.score - (1.0 + 0.25)).abs() < 1e-9);
    }

    #[test]
    fn scoring_fills_in_the_snippet() {
        let now = Utc::now();
        let engine = RelevanceEngine::default();
        let query = Query::new("beta");
        let result = engine.score_at(
            document("id", "plan.md", Some("Phase two covers beta testing."), 1, now),
            &query,
            ContentSignal::Frequency,
            now,
        );
        assert!(result.snippet().unwrap().contains("beta testing"));
    }

    #[test]
    fn score_uses_the_wall_clock_for_recency() {
        let engine = RelevanceEngine::default();
        let result = engine.score(
            document("id", "x", None, 0, Utc::now()),
            &Query::new("zzz"),
            ContentSignal::Frequency,
        );
        assert!(result.breakdown.recency > 0.999);
    }

    #[test]
    fn missing_modified_time_gives_no_recency() {
        let now = Utc::now();
        let engine = RelevanceEngine::default();
        let mut doc = document("id", "x", None, 0, now);
        doc.modified_time = None;
        let result = engine.score_at(doc, &Query::new("zzz"), ContentSignal::Frequency, now);
        assert_eq!(result.breakdown.recency, 0.0);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn weights_scale_each_signal() {
        let breakdown = ScoreBreakdown {
            content: 2.0,
            name: 1.0,
            folder: 1.0,
            recency: 1.0,
        };
        let weights = RankingWeights {
            content: 0.5,
            name: 0.0,
            folder: 2.0,
            recency: 1.0,
        };
        assert!((breakdown.combine(&weights) - 4.0).abs() < 1e-9);
    }
}
