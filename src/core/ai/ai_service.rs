use async_trait::async_trait;

use super::models::{AiConfig, AiError, AiMessage, AiProviderResponse};
use crate::core::relevance::ScoredResult;
use crate::core::retry::{retry, RetryPolicy};
use crate::core::search::{drive_link, FileKind, RelevantSnippet, SearchResponse, Source};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that provides clear, accurate answers based on the given context. Only answer based on the provided context. If the context doesn't contain enough information to answer the question, explicitly state that you don't have enough information from the provided documents.";

pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any relevant information in your Google Drive documents to answer this question.";

const DEFAULT_MAX_CONTEXT_ITEMS: usize = 5;
const FALLBACK_SOURCES: usize = 3;

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Sends a chat completion request to the AI provider.
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, AiError>;
}

// Lets the service hold whichever provider the configuration picked.
#[async_trait]
impl AiProvider for Box<dyn AiProvider> {
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, AiError> {
        (**self).chat_complete(messages, config).await
    }
}

/// One snippet the answer is grounded on.
struct ContextItem<'a> {
    content: &'a str,
    source: &'a str,
    category: &'static str,
    link: String,
}

/// Turns ranked results into a grounded answer.
pub struct AiService<P: AiProvider> {
    provider: P,
    system_prompt: String,
    config: AiConfig,
    retry: RetryPolicy,
    max_context_items: usize,
}

impl<P: AiProvider> AiService<P> {
    pub fn new(provider: P, system_prompt: String, config: AiConfig) -> Self {
        Self {
            provider,
            system_prompt,
            config,
            retry: RetryPolicy::default(),
            max_context_items: DEFAULT_MAX_CONTEXT_ITEMS,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_context_items(mut self, max_context_items: usize) -> Self {
        self.max_context_items = max_context_items.max(1);
        self
    }

    /// Answers `query` from the snippets of `ranked` (best first).
    ///
    /// Never fails: without snippets the provider is not called, and a
    /// provider failure degrades to a summary naming the top files.
    pub async fn answer(&self, query: &str, ranked: &[ScoredResult]) -> SearchResponse {
        let context: Vec<ContextItem<'_>> = ranked
            .iter()
            .filter_map(|result| {
                let content = result.snippet()?;
                Some(ContextItem {
                    content,
                    source: &result.document.name,
                    category: FileKind::from_mime(&result.document.mime_type).category(),
                    link: drive_link(&result.document.id),
                })
            })
            .take(self.max_context_items)
            .collect();

        if context.is_empty() {
            tracing::info!("No snippets to ground an answer on");
            return SearchResponse::Answer {
                summary: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
                relevant_snippets: Vec::new(),
            };
        }

        let messages = vec![
            AiMessage::system(self.system_prompt.clone()),
            AiMessage::user(build_prompt(query, &context)),
        ];

        let provider = &self.provider;
        let config = &self.config;
        let messages = &messages;
        match retry(&self.retry, "chat_complete", move || {
            provider.chat_complete(messages, config)
        })
        .await
        {
            Ok(response) => SearchResponse::Answer {
                summary: response.content,
                sources: context
                    .iter()
                    .map(|item| Source {
                        name: item.source.to_string(),
                        file_type: item.category.to_string(),
                        link: item.link.clone(),
                        snippet: None,
                        details: None,
                    })
                    .collect(),
                relevant_snippets: context
                    .iter()
                    .map(|item| RelevantSnippet {
                        content: item.content.to_string(),
                        source: item.source.to_string(),
                        context: item.category.to_string(),
                        link: item.link.clone(),
                    })
                    .collect(),
            },
            Err(e) => {
                tracing::error!("Answer generation failed, using summary fallback: {}", e);
                fallback_answer(ranked)
            }
        }
    }
}

fn build_prompt(query: &str, context: &[ContextItem<'_>]) -> String {
    let blocks: Vec<String> = context
        .iter()
        .map(|item| format!("From {} ({}):\n{}", item.source, item.category, item.content))
        .collect();

    format!(
        "Based on the following context from the user's Google Drive documents, provide a concise answer to: \"{}\"\n\nContext:\n{}\n\nProvide a clear, direct answer with supporting evidence. If the context doesn't contain enough information to answer the question, say so.",
        query,
        blocks.join("\n\n")
    )
}

fn fallback_answer(ranked: &[ScoredResult]) -> SearchResponse {
    let top = &ranked[..ranked.len().min(FALLBACK_SOURCES)];
    let names: Vec<&str> = top.iter().map(|r| r.document.name.as_str()).collect();

    SearchResponse::Answer {
        summary: format!(
            "Found {} relevant documents. The most relevant content appears to be from: {}",
            ranked.len(),
            names.join(", ")
        ),
        sources: top.iter().map(Source::cited).collect(),
        relevant_snippets: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::relevance::{Document, ScoreBreakdown};
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockProvider {
        reply: Result<String, u16>,
        seen: Mutex<Vec<Vec<AiMessage>>>,
    }

    impl MockProvider {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AiProvider for MockProvider {
        async fn chat_complete(
            &self,
            messages: &[AiMessage],
            _config: &AiConfig,
        ) -> Result<AiProviderResponse, AiError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(text) => Ok(AiProviderResponse {
                    content: text.clone(),
                }),
                Err(status) => Err(AiError::Http {
                    status: *status,
                    message: "boom".to_string(),
                }),
            }
        }
    }

    fn result(id: &str, name: &str, snippet: Option<&str>) -> ScoredResult {
        ScoredResult {
            document: Document {
                id: id.to_string(),
                name: name.to_string(),
                size: None,
                modified_time: None,
                owner: "Test User".to_string(),
                mime_type: "application/vnd.google-apps.document".to_string(),
                path: Vec::new(),
                content: None,
                snippet: snippet.map(str::to_string),
            },
            score: 1.0,
            breakdown: ScoreBreakdown::default(),
        }
    }

    fn service(provider: MockProvider) -> AiService<MockProvider> {
        AiService::new(provider, DEFAULT_SYSTEM_PROMPT.to_string(), AiConfig::default()).with_retry(
            RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
            },
        )
    }

    #[tokio::test]
    async fn answer_is_grounded_on_snippets() {
        let svc = service(MockProvider::replying("The budget is $500,000."));
        let ranked = vec![
            result("a", "Plan", Some("Budget: $500,000")),
            result("b", "Empty", None),
            result("c", "Notes", Some("budget notes")),
        ];

        let response = svc.answer("what is the budget?", &ranked).await;

        assert_eq!(response.summary(), "The budget is $500,000.");
        assert_eq!(response.sources().len(), 2);
        assert_eq!(response.sources()[1].name, "Notes");
        assert_eq!(response.relevant_snippets()[0].content, "Budget: $500,000");
        assert_eq!(response.relevant_snippets()[0].context, "documents");

        let seen = svc.provider.seen.lock().unwrap();
        let prompt = &seen[0][1].content;
        assert_eq!(seen[0][0].role, "system");
        assert!(prompt.contains("provide a concise answer to: \"what is the budget?\""));
        assert!(prompt.contains("From Plan (documents):\nBudget: $500,000"));
        assert!(!prompt.contains("Empty"));
    }

    #[tokio::test]
    async fn context_is_limited_to_the_top_items() {
        let svc = service(MockProvider::replying("ok")).with_max_context_items(2);
        let ranked: Vec<ScoredResult> = (0..4)
            .map(|i| result(&i.to_string(), &format!("Doc {}", i), Some("text")))
            .collect();

        let response = svc.answer("q", &ranked).await;
        assert_eq!(response.relevant_snippets().len(), 2);
        assert_eq!(response.sources()[1].name, "Doc 1");
    }

    #[tokio::test]
    async fn no_snippets_skips_the_provider() {
        let svc = service(MockProvider::replying("unused"));
        let response = svc.answer("anything", &[result("a", "A", None)]).await;

        assert_eq!(response.summary(), NO_CONTEXT_ANSWER);
        assert!(response.sources().is_empty());
        assert_eq!(svc.provider.calls(), 0);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_a_summary() {
        let svc = service(MockProvider::failing(500));
        let ranked = vec![
            result("a", "One", Some("x")),
            result("b", "Two", Some("x")),
            result("c", "Three", None),
            result("d", "Four", Some("x")),
        ];

        let response = svc.answer("q", &ranked).await;

        assert_eq!(
            response.summary(),
            "Found 4 relevant documents. The most relevant content appears to be from: One, Two, Three"
        );
        assert_eq!(response.sources().len(), 3);
        assert!(response.relevant_snippets().is_empty());
        assert_eq!(svc.provider.calls(), 2);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let svc = service(MockProvider::failing(401));
        svc.answer("q", &[result("a", "One", Some("x"))]).await;
        assert_eq!(svc.provider.calls(), 1);
    }
}
