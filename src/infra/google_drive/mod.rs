// Google Drive adapter: OAuth tokens, the Drive/Docs REST client, and the
// helpers that turn API payloads into plain text.

pub mod auth;
pub mod docs_body;
pub mod drive_client;
mod http;
pub mod query_builder;

pub use auth::{AccessTokenProvider, RefreshTokenAuth, ServiceAccountAuth, StaticTokenAuth};
pub use drive_client::GoogleDriveClient;
