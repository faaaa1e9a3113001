// Drive v3 `q` expressions.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::core::search::SearchContext;

/// Escapes a value for use inside a single-quoted Drive query string.
pub fn escape_query_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Builds the full `q` parameter: name or full-text match, not trashed, plus
/// the optional file type and date range filters.
pub fn build_drive_query(query: &str, context: &SearchContext) -> String {
    let value = escape_query_value(query.trim());
    let mut clauses = vec![
        format!("(name contains '{0}' or fullText contains '{0}')", value),
        "trashed = false".to_string(),
    ];

    if let Some(mime_type) = context.file_type.mime_type() {
        clauses.push(format!("mimeType = '{}'", mime_type));
    }

    if let Some(range) = &context.date_range {
        if let Some(start) = range.start {
            clauses.push(format!("modifiedTime >= '{}'", timestamp(start)));
        }
        if let Some(end) = range.end {
            clauses.push(format!("modifiedTime <= '{}'", timestamp(end)));
        }
    }

    clauses.join(" and ")
}
