// Relevance & snippet engine.
//
// Pure functions over text that is already in memory: no I/O, no shared
// state. The search service calls into this once per fetched document.

pub mod document;
pub mod query;
pub mod ranking;
pub mod scoring;
pub mod snippet;
mod text;

pub use document::{Document, ScoreBreakdown, ScoredResult};
pub use query::Query;
pub use ranking::{ContentSignal, RankingWeights, RelevanceEngine};
