use async_trait::async_trait;
use thiserror::Error;

use super::search_models::{DriveFile, SearchContext};
use crate::core::relevance::Query;
use crate::core::retry::Retryable;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("Drive API returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request to Drive failed: {0}")]
    Network(String),

    #[error("could not decode Drive response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Retryable for DriveError {
    fn is_retryable(&self) -> bool {
        match self {
            DriveError::Http { status, .. } => *status == 429 || *status >= 500,
            DriveError::Network(_) => true,
            _ => false,
        }
    }
}

/// Where candidate documents come from: Google Drive, or a local folder in
/// test mode.
#[async_trait]
pub trait DriveSource: Send + Sync {
    /// Lists files matching the query and the context's filters.
    async fn list_files(
        &self,
        query: &Query,
        context: &SearchContext,
    ) -> Result<Vec<DriveFile>, DriveError>;

    /// Plain text of a file, `None` when its type has no text to extract.
    async fn fetch_content(&self, file: &DriveFile) -> Result<Option<String>, DriveError>;

    /// Folder names from the root down to the file's parent.
    async fn folder_path(&self, file: &DriveFile) -> Result<Vec<String>, DriveError>;
}

#[async_trait]
impl DriveSource for Box<dyn DriveSource> {
    async fn list_files(
        &self,
        query: &Query,
        context: &SearchContext,
    ) -> Result<Vec<DriveFile>, DriveError> {
        (**self).list_files(query, context).await
    }

    async fn fetch_content(&self, file: &DriveFile) -> Result<Option<String>, DriveError> {
        (**self).fetch_content(file).await
    }

    async fn folder_path(&self, file: &DriveFile) -> Result<Vec<String>, DriveError> {
        (**self).folder_path(file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_failures_are_retryable() {
        let http = |status| DriveError::Http {
            status,
            message: String::new(),
        };
        assert!(http(429).is_retryable());
        assert!(http(500).is_retryable());
        assert!(!http(404).is_retryable());
        assert!(!http(403).is_retryable());
        assert!(DriveError::Network("timeout".into()).is_retryable());
        assert!(!DriveError::Auth("bad key".into()).is_retryable());
    }
}
