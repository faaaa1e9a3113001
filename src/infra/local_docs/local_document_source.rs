use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::relevance::Query;
use crate::core::search::{DateRange, DriveError, DriveFile, DriveSource, SearchContext};

const OWNER: &str = "Test User";

/// Serves `.md` and `.txt` files from a local directory as if they were
/// Drive files. Used by test mode and the evaluation harness.
pub struct LocalDocumentSource {
    dir: PathBuf,
}

impl LocalDocumentSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn mime_type(path: &Path) -> Option<&'static str> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some("text/markdown"),
            "txt" => Some("text/plain"),
            _ => None,
        }
    }

    /// Resolves an id from our own listing back to a path inside `dir`.
    fn path_for(&self, id: &str) -> Result<PathBuf, DriveError> {
        if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') || id == ".." {
            return Err(DriveError::Http {
                status: 404,
                message: format!("no local document named {:?}", id),
            });
        }
        Ok(self.dir.join(id))
    }
}

fn in_range(modified: Option<DateTime<Utc>>, range: Option<&DateRange>) -> bool {
    let (Some(range), Some(modified)) = (range, modified) else {
        return true;
    };
    range.start.map_or(true, |start| modified >= start)
        && range.end.map_or(true, |end| modified <= end)
}

#[async_trait]
impl DriveSource for LocalDocumentSource {
    /// Every readable document is returned; ranking decides what is relevant.
    async fn list_files(
        &self,
        _query: &Query,
        context: &SearchContext,
    ) -> Result<Vec<DriveFile>, DriveError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(mime_type) = Self::mime_type(&path) else {
                continue;
            };
            if let Some(wanted) = context.file_type.mime_type() {
                if wanted != mime_type {
                    continue;
                }
            }

            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified_time = metadata.modified().ok().map(DateTime::<Utc>::from);
            if !in_range(modified_time, context.date_range.as_ref()) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            files.push(DriveFile {
                id: name.clone(),
                name,
                mime_type: mime_type.to_string(),
                size: Some(metadata.len()),
                modified_time,
                owner: OWNER.to_string(),
                parents: Vec::new(),
            });
        }

        // read_dir order is platform dependent.
        files.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(dir = %self.dir.display(), "Found {} local document(s)", files.len());
        Ok(files)
    }

    async fn fetch_content(&self, file: &DriveFile) -> Result<Option<String>, DriveError> {
        let text = tokio::fs::read_to_string(self.path_for(&file.id)?).await?;
        let trimmed = text.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    async fn folder_path(&self, _file: &DriveFile) -> Result<Vec<String>, DriveError> {
        Ok(Vec::new())
    }
}
