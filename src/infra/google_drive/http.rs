// Mapping of reqwest outcomes onto `DriveError`.

use reqwest::Response;

use crate::core::search::DriveError;

pub(super) fn network_error(e: reqwest::Error) -> DriveError {
    if e.is_decode() {
        DriveError::Decode(e.to_string())
    } else {
        DriveError::Network(e.to_string())
    }
}

/// Passes successful responses through and turns everything else into an
/// error carrying the status and body.
pub(super) async fn check_status(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
    Err(DriveError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Text with surrounding whitespace removed, or `None` if nothing is left.
pub(super) fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_none() {
        assert_eq!(non_empty("  \n\t ".to_string()), None);
        assert_eq!(non_empty(" hello \n".to_string()), Some("hello".to_string()));
    }
}
