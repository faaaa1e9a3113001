use chrono::{DateTime, Utc};

/// A Drive file with its fetched text, built once per search request.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub name: String,
    /// Size in bytes; Google-native files report none.
    pub size: Option<u64>,
    pub modified_time: Option<DateTime<Utc>>,
    pub owner: String,
    pub mime_type: String,
    /// Folder names from the root down to the file's parent.
    pub path: Vec<String>,
    /// `None` when the type is unsupported or the fetch came back empty.
    pub content: Option<String>,
    /// Filled in by the relevance engine.
    pub snippet: Option<String>,
}

/// Per-signal scores that went into a [`ScoredResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub content: f64,
    pub name: f64,
    pub folder: f64,
    pub recency: f64,
}

/// A document paired with its combined relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
    pub document: Document,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

impl ScoredResult {
    pub fn snippet(&self) -> Option<&str> {
        self.document.snippet.as_deref()
    }
}
