use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::relevance::{ContentSignal, ScoredResult};

const GOOGLE_DOC: &str = "application/vnd.google-apps.document";
const GOOGLE_SHEET: &str = "application/vnd.google-apps.spreadsheet";
const GOOGLE_SLIDES: &str = "application/vnd.google-apps.presentation";
const PDF: &str = "application/pdf";
const PLAIN_TEXT: &str = "text/plain";

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Find files by name or content; returns a file list.
    #[default]
    Document,
    /// Find specific content; returns a file list.
    Content,
    /// Ask a question; returns an LLM answer grounded in the best snippets.
    Question,
    /// Question mode against the local test documents.
    Test,
}

impl SearchMode {
    pub fn wants_answer(self) -> bool {
        matches!(self, SearchMode::Question | SearchMode::Test)
    }

    pub fn content_signal(self) -> ContentSignal {
        if self.wants_answer() {
            ContentSignal::Aggregate
        } else {
            ContentSignal::Frequency
        }
    }
}

/// Restricts the Drive listing to one kind of file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileTypeFilter {
    #[default]
    All,
    Document,
    Spreadsheet,
    Presentation,
    Pdf,
}

impl FileTypeFilter {
    /// MIME type to filter on, `None` for no filter.
    pub fn mime_type(self) -> Option<&'static str> {
        match self {
            FileTypeFilter::All => None,
            FileTypeFilter::Document => Some(GOOGLE_DOC),
            FileTypeFilter::Spreadsheet => Some(GOOGLE_SHEET),
            FileTypeFilter::Presentation => Some(GOOGLE_SLIDES),
            FileTypeFilter::Pdf => Some(PDF),
        }
    }
}

/// Inclusive bounds on the modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchContext {
    pub mode: SearchMode,
    pub file_type: FileTypeFilter,
    pub date_range: Option<DateRange>,
}

/// Coarse classification of a MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    GoogleDoc,
    GoogleSheet,
    GoogleSlides,
    Pdf,
    Text,
    Image,
    Video,
    Audio,
    Other,
}

impl FileKind {
    pub fn from_mime(mime_type: &str) -> Self {
        match mime_type {
            GOOGLE_DOC => FileKind::GoogleDoc,
            GOOGLE_SHEET => FileKind::GoogleSheet,
            GOOGLE_SLIDES => FileKind::GoogleSlides,
            PDF => FileKind::Pdf,
            PLAIN_TEXT => FileKind::Text,
            m if m.starts_with("image/") => FileKind::Image,
            m if m.starts_with("video/") => FileKind::Video,
            m if m.starts_with("audio/") => FileKind::Audio,
            _ => FileKind::Other,
        }
    }

    /// Category used to group sources ("documents", "pdfs", ...).
    pub fn category(self) -> &'static str {
        match self {
            FileKind::GoogleDoc => "documents",
            FileKind::GoogleSheet => "spreadsheets",
            FileKind::GoogleSlides => "presentations",
            FileKind::Pdf => "pdfs",
            FileKind::Text => "text",
            FileKind::Image | FileKind::Video | FileKind::Audio => "media",
            FileKind::Other => "other",
        }
    }

    /// Human readable label ("Google Doc", "PDF", ...).
    pub fn label(self) -> &'static str {
        match self {
            FileKind::GoogleDoc => "Google Doc",
            FileKind::GoogleSheet => "Google Sheet",
            FileKind::GoogleSlides => "Google Slides",
            FileKind::Pdf => "PDF",
            FileKind::Text => "Text File",
            FileKind::Image => "Image",
            FileKind::Video => "Video",
            FileKind::Audio => "Audio",
            FileKind::Other => "File",
        }
    }
}

/// Listing metadata for one Drive file, before its content is fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub modified_time: Option<DateTime<Utc>>,
    pub owner: String,
    /// Parent folder ids.
    pub parents: Vec<String>,
}

impl DriveFile {
    pub fn kind(&self) -> FileKind {
        FileKind::from_mime(&self.mime_type)
    }
}

pub fn drive_link(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", file_id)
}

/// File metadata shown alongside a file-list entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDetails {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
    pub owner: String,
}

/// One file cited by a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FileDetails>,
}

impl Source {
    /// Source entry for a file list, with snippet and metadata.
    pub fn listed(result: &ScoredResult) -> Self {
        let document = &result.document;
        let kind = FileKind::from_mime(&document.mime_type);
        Self {
            name: document.name.clone(),
            file_type: kind.category().to_string(),
            link: drive_link(&document.id),
            snippet: document.snippet.clone(),
            details: Some(FileDetails {
                label: kind.label().to_string(),
                size: document.size,
                modified_time: document.modified_time,
                owner: document.owner.clone(),
            }),
        }
    }

    /// Bare citation for an answer.
    pub fn cited(result: &ScoredResult) -> Self {
        let document = &result.document;
        Self {
            name: document.name.clone(),
            file_type: FileKind::from_mime(&document.mime_type).category().to_string(),
            link: drive_link(&document.id),
            snippet: None,
            details: None,
        }
    }
}

/// Excerpt the answer was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevantSnippet {
    pub content: String,
    pub source: String,
    /// File category of the source.
    pub context: String,
    pub link: String,
}

/// Everything a search can return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchResponse {
    FileList {
        summary: String,
        sources: Vec<Source>,
    },
    Answer {
        summary: String,
        sources: Vec<Source>,
        relevant_snippets: Vec<RelevantSnippet>,
    },
}

impl SearchResponse {
    pub fn summary(&self) -> &str {
        match self {
            SearchResponse::FileList { summary, .. } | SearchResponse::Answer { summary, .. } => {
                summary
            }
        }
    }

    pub fn sources(&self) -> &[Source] {
        match self {
            SearchResponse::FileList { sources, .. } | SearchResponse::Answer { sources, .. } => {
                sources
            }
        }
    }

    pub fn relevant_snippets(&self) -> &[RelevantSnippet] {
        match self {
            SearchResponse::FileList { .. } => &[],
            SearchResponse::Answer {
                relevant_snippets, ..
            } => relevant_snippets,
        }
    }

    /// File list for document and content searches.
    pub fn file_list(results: &[ScoredResult]) -> Self {
        SearchResponse::FileList {
            summary: format!("Found {} relevant document(s):", results.len()),
            sources: results.iter().map(Source::listed).collect(),
        }
    }
}
