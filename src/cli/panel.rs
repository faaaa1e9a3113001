use serde::Serialize;

use crate::core::search::{RelevantSnippet, SearchMode, SearchResponse, Source};

/// One page of the current response, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView<'a> {
    pub kind: &'static str,
    pub summary: &'a str,
    pub page: usize,
    pub page_count: usize,
    pub sources: &'a [Source],
    #[serde(skip_serializing_if = "no_snippets")]
    pub relevant_snippets: &'a [RelevantSnippet],
}

fn no_snippets(snippets: &&[RelevantSnippet]) -> bool {
    snippets.is_empty()
}

/// Per-session display state: the selected mode, the response on screen and
/// which page of its sources is visible.
#[derive(Debug)]
pub struct PanelController {
    mode: SearchMode,
    response: Option<SearchResponse>,
    /// Zero-based.
    page: usize,
    page_size: usize,
    backend_ready: bool,
}

impl PanelController {
    pub fn new(page_size: usize) -> Self {
        Self {
            mode: SearchMode::default(),
            response: None,
            page: 0,
            page_size: page_size.max(1),
            backend_ready: false,
        }
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn set_backend_ready(&mut self, ready: bool) {
        self.backend_ready = ready;
    }

    pub fn is_backend_ready(&self) -> bool {
        self.backend_ready
    }

    /// Replaces the current response and goes back to the first page.
    pub fn show(&mut self, response: SearchResponse) {
        self.response = Some(response);
        self.page = 0;
    }

    pub fn page_count(&self) -> usize {
        let total = self.response.as_ref().map_or(0, |r| r.sources().len());
        total.div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to a one-based page number, clamped to the valid range.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count()) - 1;
    }

    pub fn page_info(&self) -> String {
        format!("Page {} of {}", self.page + 1, self.page_count())
    }

    pub fn visible_sources(&self) -> &[Source] {
        let Some(response) = &self.response else {
            return &[];
        };
        let sources = response.sources();
        let start = (self.page * self.page_size).min(sources.len());
        let end = (start + self.page_size).min(sources.len());
        &sources[start..end]
    }

    pub fn view(&self) -> Option<PanelView<'_>> {
        let response = self.response.as_ref()?;
        Some(PanelView {
            kind: match response {
                SearchResponse::FileList { .. } => "file_list",
                SearchResponse::Answer { .. } => "answer",
            },
            summary: response.summary(),
            page: self.page + 1,
            page_count: self.page_count(),
            sources: self.visible_sources(),
            relevant_snippets: response.relevant_snippets(),
        })
    }
}
