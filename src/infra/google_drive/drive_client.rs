// =============================================================================
// GOOGLE DRIVE CLIENT
// =============================================================================
//
// Lists files with the Drive v3 API and pulls their text:
//
// - Google Docs   -> Docs API body (paragraphs and tables)
// - Google Sheets -> Drive export as CSV
// - Google Slides -> Drive export as plain text
// - text/plain    -> raw download (`alt=media`)
// - PDFs and everything else have no extractable text.
//
// Folder names are cached for the lifetime of the client, since most results
// of one search share a handful of parent folders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use reqwest::{Client, Response};
use serde::Deserialize;

use super::auth::AccessTokenProvider;
use super::docs_body::DocsDocument;
use super::http::{check_status, network_error, non_empty};
use super::query_builder::build_drive_query;
use crate::core::relevance::Query;
use crate::core::retry::{retry, RetryPolicy};
use crate::core::search::{DriveError, DriveFile, DriveSource, FileKind, SearchContext};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DOCS_URL: &str = "https://docs.googleapis.com/v1/documents";
const LIST_FIELDS: &str = "files(id,name,mimeType,size,modifiedTime,owners,parents),nextPageToken";
const FOLDER_FIELDS: &str = "id,name,parents";
const MAX_FOLDER_DEPTH: usize = 16;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<ApiFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
    /// Drive encodes int64 fields as strings.
    size: Option<String>,
    modified_time: Option<DateTime<Utc>>,
    #[serde(default)]
    owners: Vec<ApiOwner>,
    #[serde(default)]
    parents: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiOwner {
    display_name: Option<String>,
}

impl From<ApiFile> for DriveFile {
    fn from(file: ApiFile) -> Self {
        let owner = file
            .owners
            .into_iter()
            .find_map(|o| o.display_name)
            .unwrap_or_else(|| "Unknown".to_string());

        DriveFile {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            size: file.size.and_then(|s| s.parse().ok()),
            modified_time: file.modified_time,
            owner,
            parents: file.parents,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FolderEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    parents: Vec<String>,
}

pub struct GoogleDriveClient<A: AccessTokenProvider> {
    client: Client,
    auth: A,
    page_size: u32,
    retry: RetryPolicy,
    folders: DashMap<String, FolderEntry>,
}

impl<A: AccessTokenProvider> GoogleDriveClient<A> {
    pub fn new(client: Client, auth: A) -> Self {
        Self {
            client,
            auth,
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
            folders: DashMap::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 1000);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Authenticated GET, retried on transient failures.
    async fn get(
        &self,
        label: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Response, DriveError> {
        retry(&self.retry, label, || async move {
            let token = self.auth.access_token().await?;
            let response = self
                .client
                .get(url)
                .query(params)
                .bearer_auth(token)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(network_error)?;
            check_status(response).await
        })
        .await
    }

    async fn get_text(
        &self,
        label: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Option<String>, DriveError> {
        let response = self.get(label, url, params).await?;
        let text = response.text().await.map_err(network_error)?;
        Ok(non_empty(text))
    }

    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Option<String>, DriveError> {
        let url = format!("{}/{}/export", DRIVE_FILES_URL, file_id);
        self.get_text("drive_export", &url, &[("mimeType", mime_type.to_string())])
            .await
    }

    async fn folder(&self, folder_id: &str) -> Result<FolderEntry, DriveError> {
        if let Some(entry) = self.folders.get(folder_id) {
            return Ok(entry.clone());
        }

        let url = format!("{}/{}", DRIVE_FILES_URL, folder_id);
        let response = self
            .get("drive_folder", &url, &[("fields", FOLDER_FIELDS.to_string())])
            .await?;
        let entry: FolderEntry = response.json().await.map_err(network_error)?;
        self.folders.insert(folder_id.to_string(), entry.clone());
        Ok(entry)
    }
}

#[async_trait]
impl<A: AccessTokenProvider> DriveSource for GoogleDriveClient<A> {
    async fn list_files(
        &self,
        query: &Query,
        context: &SearchContext,
    ) -> Result<Vec<DriveFile>, DriveError> {
        let q = build_drive_query(query.raw(), context);
        tracing::debug!(q = %q, "Listing Drive files");

        let params = [
            ("q", q),
            ("fields", LIST_FIELDS.to_string()),
            ("pageSize", self.page_size.to_string()),
            ("orderBy", "modifiedTime desc".to_string()),
        ];
        let response = self.get("drive_list", DRIVE_FILES_URL, &params).await?;
        let list: FileListResponse = response.json().await.map_err(network_error)?;

        Ok(list.files.into_iter().map(DriveFile::from).collect())
    }

    async fn fetch_content(&self, file: &DriveFile) -> Result<Option<String>, DriveError> {
        match file.kind() {
            FileKind::GoogleDoc => {
                let url = format!("{}/{}", DOCS_URL, file.id);
                let response = self.get("docs_get", &url, &[]).await?;
                let document: DocsDocument = response.json().await.map_err(network_error)?;
                Ok(document.plain_text())
            }
            FileKind::GoogleSheet => self.export(&file.id, "text/csv").await,
            FileKind::GoogleSlides => self.export(&file.id, "text/plain").await,
            FileKind::Text => {
                let url = format!("{}/{}", DRIVE_FILES_URL, file.id);
                self.get_text("drive_download", &url, &[("alt", "media".to_string())])
                    .await
            }
            kind => {
                tracing::debug!(file_id = %file.id, mime_type = %file.mime_type, "No text extraction for {}", kind.label());
                Ok(None)
            }
        }
    }

    async fn folder_path(&self, file: &DriveFile) -> Result<Vec<String>, DriveError> {
        let mut path = Vec::new();
        let mut next = file.parents.first().cloned();

        while let Some(folder_id) = next {
            if path.len() >= MAX_FOLDER_DEPTH {
                tracing::warn!(file_id = %file.id, "Folder path deeper than {}, truncating", MAX_FOLDER_DEPTH);
                break;
            }
            let entry = self.folder(&folder_id).await?;
            path.push(entry.name);
            next = entry.parents.first().cloned();
        }

        path.reverse();
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::google_drive::StaticTokenAuth;
    use serde_json::json;

    #[test]
    fn api_files_convert_to_drive_files() {
        let list: FileListResponse = serde_json::from_value(json!({
            "files": [
                {
                    "id": "1abc",
                    "name": "Budget.xlsx",
                    "mimeType": "application/vnd.google-apps.spreadsheet",
                    "size": "2048",
                    "modifiedTime": "2024-03-01T12:00:00.000Z",
                    "owners": [ { "displayName": "Sarah Johnson" } ],
                    "parents": [ "folder1" ]
                },
                { "id": "2def", "name": "Notes", "mimeType": "text/plain" }
            ]
        }))
        .unwrap();

        let files: Vec<DriveFile> = list.files.into_iter().map(DriveFile::from).collect();

        assert_eq!(files[0].size, Some(2048));
        assert_eq!(files[0].owner, "Sarah Johnson");
        assert_eq!(files[0].parents, vec!["folder1"]);
        assert_eq!(files[0].kind(), FileKind::GoogleSheet);
        assert!(files[0].modified_time.is_some());

        assert_eq!(files[1].size, None);
        assert_eq!(files[1].owner, "Unknown");
        assert!(files[1].parents.is_empty());
    }

    fn client() -> GoogleDriveClient<StaticTokenAuth> {
        GoogleDriveClient::new(Client::new(), StaticTokenAuth::new("token".to_string()))
            .with_retry(RetryPolicy::none())
    }

    fn cache_folder(client: &GoogleDriveClient<StaticTokenAuth>, id: &str, name: &str, parent: Option<&str>) {
        client.folders.insert(
            id.to_string(),
            FolderEntry {
                name: name.to_string(),
                parents: parent.map(|p| vec![p.to_string()]).unwrap_or_default(),
            },
        );
    }

    fn file_in(parent: Option<&str>, mime_type: &str) -> DriveFile {
        DriveFile {
            id: "f".to_string(),
            name: "file".to_string(),
            mime_type: mime_type.to_string(),
            size: None,
            modified_time: None,
            owner: "Unknown".to_string(),
            parents: parent.map(|p| vec![p.to_string()]).unwrap_or_default(),
        }
    }

    #[tokio::test]
    async fn folder_path_walks_cached_parents_root_first() {
        let client = client();
        cache_folder(&client, "root", "My Drive", None);
        cache_folder(&client, "projects", "Projects", Some("root"));
        cache_folder(&client, "q2", "Q2 Planning", Some("projects"));

        let path = client.folder_path(&file_in(Some("q2"), "text/plain")).await.unwrap();
        assert_eq!(path, vec!["My Drive", "Projects", "Q2 Planning"]);
    }

    #[tokio::test]
    async fn folder_path_stops_at_the_depth_cap() {
        let client = client();
        // A cycle would otherwise loop forever.
        cache_folder(&client, "a", "A", Some("b"));
        cache_folder(&client, "b", "B", Some("a"));

        let path = client.folder_path(&file_in(Some("a"), "text/plain")).await.unwrap();
        assert_eq!(path.len(), MAX_FOLDER_DEPTH);
    }

    #[tokio::test]
    async fn files_without_parents_have_an_empty_path() {
        let path = client().folder_path(&file_in(None, "text/plain")).await.unwrap();
        assert!(path.is_empty());
    }

    #[tokio::test]
    async fn pdfs_and_media_have_no_content() {
        let client = client();
        assert_eq!(client.fetch_content(&file_in(None, "application/pdf")).await.unwrap(), None);
        assert_eq!(client.fetch_content(&file_in(None, "image/png")).await.unwrap(), None);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(client().with_page_size(0).page_size, 1);
        assert_eq!(client().with_page_size(5000).page_size, 1000);
        assert_eq!(client().page_size, DEFAULT_PAGE_SIZE);
    }
}
