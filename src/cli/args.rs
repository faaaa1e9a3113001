// clap value parsers for the `search` flags.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::core::search::{FileTypeFilter, SearchMode};

pub fn parse_mode(value: &str) -> Result<SearchMode, String> {
    match value.to_ascii_lowercase().as_str() {
        "document" | "documents" => Ok(SearchMode::Document),
        "content" => Ok(SearchMode::Content),
        "question" => Ok(SearchMode::Question),
        "test" => Ok(SearchMode::Test),
        other => Err(format!(
            "unknown mode '{}' (expected document, content, question or test)",
            other
        )),
    }
}

pub fn parse_file_type(value: &str) -> Result<FileTypeFilter, String> {
    match value.to_ascii_lowercase().as_str() {
        "all" => Ok(FileTypeFilter::All),
        "document" => Ok(FileTypeFilter::Document),
        "spreadsheet" => Ok(FileTypeFilter::Spreadsheet),
        "presentation" => Ok(FileTypeFilter::Presentation),
        "pdf" => Ok(FileTypeFilter::Pdf),
        other => Err(format!(
            "unknown file type '{}' (expected all, document, spreadsheet, presentation or pdf)",
            other
        )),
    }
}

/// `YYYY-MM-DD` as the first instant of that day (UTC), or a full RFC 3339 time.
pub fn parse_from_date(value: &str) -> Result<DateTime<Utc>, String> {
    parse_date(value, NaiveTime::MIN)
}

/// `YYYY-MM-DD` as the last second of that day (UTC), or a full RFC 3339 time.
pub fn parse_to_date(value: &str) -> Result<DateTime<Utc>, String> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    parse_date(value, end_of_day)
}

fn parse_date(value: &str, time: NaiveTime) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(time).and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD)", value))
}
