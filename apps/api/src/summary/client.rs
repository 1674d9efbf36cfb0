use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::error;

use crate::summary::builder::SummaryRequest;

/// The summarization call is cold on every invocation: one attempt, bounded,
/// no caching. Expiry maps to a transport error.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Failure categories surfaced to the user. All are non-fatal; the caller
/// presents the message and allows retry. Messages never carry internal
/// detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
}

/// Error body of the summarization function is a flat `{"error": "..."}`;
/// tolerate a nested `{"error": {"message": "..."}}` shape as well.
fn parse_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Flat {
        error: String,
    }
    #[derive(Deserialize)]
    struct Nested {
        error: NestedBody,
    }
    #[derive(Deserialize)]
    struct NestedBody {
        message: String,
    }

    if let Ok(flat) = serde_json::from_str::<Flat>(body) {
        return Some(flat.error);
    }
    serde_json::from_str::<Nested>(body)
        .ok()
        .map(|n| n.error.message)
}

/// Client for the external summarization function.
#[derive(Clone)]
pub struct SummaryClient {
    client: Client,
    endpoint: String,
}

impl SummaryClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
        }
    }

    /// Posts the request and returns the sanitized HTML summary.
    pub async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummaryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                SummaryError::Transport(if e.is_timeout() {
                    "The summary request timed out. Please try again.".to_string()
                } else {
                    "The summary service could not be reached. Please try again.".to_string()
                })
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::BAD_REQUEST {
                let message = parse_error_message(&body)
                    .unwrap_or_else(|| "The summary request was rejected.".to_string());
                return Err(SummaryError::BadRequest(message));
            }
            error!("Summary service returned {status}: {body}");
            return Err(SummaryError::Upstream(
                "The summary service failed to generate a summary. Please try again.".to_string(),
            ));
        }

        let body: SummaryResponse = response.json().await.map_err(|e| {
            error!("Malformed summary response: {e}");
            SummaryError::Upstream(
                "The summary service returned an unexpected response. Please try again."
                    .to_string(),
            )
        })?;

        Ok(strip_code_fence(&body.summary).to_string())
    }
}

/// Strips a markdown code-fence wrapper (with optional language tag) from a
/// response the model wrapped despite instructions.
///
/// Fires only when the whole response is wrapped exactly in that pattern; a
/// partial or unmatched fence is returned unmodified.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };
    // The opening fence line may carry only a language tag.
    let rest = match rest.find('\n') {
        Some(idx) if rest[..idx].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[idx + 1..],
        _ => return text,
    };
    match rest.strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fence_with_language_tag() {
        let input = "```html\n<div><h2>Daily Summary</h2></div>\n```";
        assert_eq!(strip_code_fence(input), "<div><h2>Daily Summary</h2></div>");
    }

    #[test]
    fn test_strip_fence_without_language_tag() {
        let input = "```\n<div>ok</div>\n```";
        assert_eq!(strip_code_fence(input), "<div>ok</div>");
    }

    #[test]
    fn test_strip_fence_tolerates_surrounding_whitespace() {
        let input = "\n```html\n<div>ok</div>\n```\n";
        assert_eq!(strip_code_fence(input), "<div>ok</div>");
    }

    #[test]
    fn test_unwrapped_response_unchanged() {
        let input = "<div>ok</div>";
        assert_eq!(strip_code_fence(input), input);
    }

    #[test]
    fn test_unmatched_opening_fence_unchanged() {
        let input = "```html\n<div>no closing fence";
        assert_eq!(strip_code_fence(input), input);
    }

    #[test]
    fn test_trailing_fence_only_unchanged() {
        let input = "<div>no opening fence</div>\n```";
        assert_eq!(strip_code_fence(input), input);
    }

    #[test]
    fn test_interior_fence_unchanged() {
        let input = "<div>uses ``` inside prose</div>";
        assert_eq!(strip_code_fence(input), input);
    }

    #[test]
    fn test_fence_with_non_tag_first_line_unchanged() {
        let input = "``` not a language tag\n<div>x</div>\n```";
        assert_eq!(strip_code_fence(input), input);
    }

    #[test]
    fn test_parse_error_message_flat() {
        assert_eq!(
            parse_error_message("{\"error\": \"No notes provided to summarize.\"}"),
            Some("No notes provided to summarize.".to_string())
        );
    }

    #[test]
    fn test_parse_error_message_nested() {
        assert_eq!(
            parse_error_message("{\"error\": {\"code\": \"X\", \"message\": \"boom\"}}"),
            Some("boom".to_string())
        );
    }

    #[test]
    fn test_parse_error_message_garbage() {
        assert_eq!(parse_error_message("<html>gateway error</html>"), None);
    }
}
