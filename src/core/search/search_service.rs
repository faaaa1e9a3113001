use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;

use super::drive_source::{DriveError, DriveSource};
use super::search_models::{DriveFile, SearchContext, SearchResponse};
use crate::core::ai::{AiProvider, AiService};
use crate::core::relevance::{Document, Query, RelevanceEngine, ScoredResult};

const DEFAULT_CONCURRENCY: usize = 5;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Please enter a search query")]
    EmptyQuery,

    #[error(transparent)]
    Drive(#[from] DriveError),

    #[error("search was superseded by a newer request")]
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Files fetched in parallel per chunk.
    pub concurrency: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Lists, fetches, scores and ranks documents, then shapes the response for
/// the requested mode.
pub struct SearchService<D: DriveSource, P: AiProvider> {
    drive: Arc<D>,
    ai: AiService<P>,
    engine: RelevanceEngine,
    concurrency: usize,
    generation: AtomicU64,
}

impl<D, P> SearchService<D, P>
where
    D: DriveSource + 'static,
    P: AiProvider,
{
    pub fn new(drive: D, ai: AiService<P>, engine: RelevanceEngine, settings: SearchSettings) -> Self {
        Self {
            drive: Arc::new(drive),
            ai,
            engine,
            concurrency: settings.concurrency.max(1),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn search(
        &self,
        raw_query: &str,
        context: &SearchContext,
    ) -> Result<SearchResponse, SearchError> {
        let query = Query::new(raw_query);
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            generation,
            mode = ?context.mode,
            "Searching for {:?}",
            query.normalized()
        );

        let files = self.drive.list_files(&query, context).await?;
        tracing::info!(generation, "Drive returned {} candidate file(s)", files.len());

        let mut results = self.score_files(files, &query, context, generation).await?;
        RelevanceEngine::rank(&mut results);

        if context.mode.wants_answer() {
            Ok(self.ai.answer(query.raw(), &results).await)
        } else {
            Ok(SearchResponse::file_list(&results))
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn score_files(
        &self,
        files: Vec<DriveFile>,
        query: &Query,
        context: &SearchContext,
        generation: u64,
    ) -> Result<Vec<ScoredResult>, SearchError> {
        let signal = context.mode.content_signal();
        let mut results = Vec::with_capacity(files.len());

        for chunk in files.chunks(self.concurrency) {
            let mut set = JoinSet::new();
            for (index, file) in chunk.iter().cloned().enumerate() {
                let drive = Arc::clone(&self.drive);
                set.spawn(async move { (index, load_document(drive.as_ref(), file).await) });
            }

            let mut loaded = Vec::with_capacity(chunk.len());
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((index, document)) => loaded.push((index, document)),
                    Err(e) => tracing::warn!("Document fetch task failed: {}", e),
                }
            }
            // Keep listing order so equal scores rank the way Drive returned them.
            loaded.sort_by_key(|(index, _)| *index);
            results.extend(
                loaded
                    .into_iter()
                    .map(|(_, document)| self.engine.score(document, query, signal)),
            );

            if !self.is_current(generation) {
                tracing::info!(generation, "Abandoning search, a newer one has started");
                return Err(SearchError::Superseded);
            }
        }

        Ok(results)
    }
}

/// Fetches everything needed to score one file. Lookup failures are not
/// fatal: the file keeps scoring on whatever signals are left.
async fn load_document<D: DriveSource + ?Sized>(drive: &D, file: DriveFile) -> Document {
    let path = match drive.folder_path(&file).await {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(file_id = %file.id, "Could not resolve folder path: {}", e);
            Vec::new()
        }
    };

    let content = match drive.fetch_content(&file).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                file_id = %file.id,
                mime_type = %file.mime_type,
                "Content fetch failed, scoring on metadata only: {}",
                e
            );
            None
        }
    };
    tracing::debug!(file_id = %file.id, has_content = content.is_some(), "Fetched document");

    Document {
        id: file.id,
        name: file.name,
        size: file.size,
        modified_time: file.modified_time,
        owner: file.owner,
        mime_type: file.mime_type,
        path,
        content,
        snippet: None,
    }
}
