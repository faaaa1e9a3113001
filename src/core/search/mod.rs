pub mod drive_source;
pub mod search_models;
pub mod search_service;

pub use drive_source::{DriveError, DriveSource};
pub use search_models::{
    drive_link, DateRange, DriveFile, FileDetails, FileKind, FileTypeFilter, RelevantSnippet,
    SearchContext, SearchMode, SearchResponse, Source,
};
pub use search_service::{SearchError, SearchService, SearchSettings};
