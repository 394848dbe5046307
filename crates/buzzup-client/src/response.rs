//! Service response parsing.

use serde::Deserialize;

/// Success body for a stored file: `{"data": {"id": "..."}}`, with a
/// top-level `{"id": "..."}` fallback accepted from older deployments.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<FileData>,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileData {
    id: String,
}

/// Extract the file identifier from a success body. Returns `None` when the
/// body is not JSON or carries no usable identifier.
pub fn parse_file_id(body: &str) -> Option<String> {
    let parsed: UploadResponse = serde_json::from_str(body).ok()?;
    parsed
        .data
        .map(|d| d.id)
        .or(parsed.id)
        .filter(|id| !id.is_empty())
}

const SNIPPET_MAX_CHARS: usize = 120;

/// Collapse a response body into a single-line snippet suitable for an
/// error message.
pub fn body_snippet(body: &str) -> String {
    let line: String = body
        .trim()
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if line.chars().count() <= SNIPPET_MAX_CHARS {
        line
    } else {
        let mut snippet: String = line.chars().take(SNIPPET_MAX_CHARS).collect();
        snippet.push_str("...");
        snippet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_id() {
        assert_eq!(
            parse_file_id(r#"{"data":{"id":"abc123"}}"#).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_parse_top_level_id() {
        assert_eq!(parse_file_id(r#"{"id":"xyz"}"#).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_nested_id_wins_over_top_level() {
        assert_eq!(
            parse_file_id(r#"{"data":{"id":"nested"},"id":"top"}"#).as_deref(),
            Some("nested")
        );
    }

    #[test]
    fn test_non_json_body_is_rejected() {
        assert!(parse_file_id("not json").is_none());
        assert!(parse_file_id("<html>oops</html>").is_none());
    }

    #[test]
    fn test_missing_or_empty_id_is_rejected() {
        assert!(parse_file_id(r#"{"status": 200}"#).is_none());
        assert!(parse_file_id(r#"{"id":""}"#).is_none());
        assert!(parse_file_id(r#"{"data":{"id":""}}"#).is_none());
    }

    #[test]
    fn test_snippet_collapses_newlines() {
        assert_eq!(body_snippet("line one\nline two\n"), "line one line two");
    }

    #[test]
    fn test_snippet_truncates_long_bodies() {
        let body = "x".repeat(500);
        let snippet = body_snippet(&body);
        assert_eq!(snippet.chars().count(), 123);
        assert!(snippet.ends_with("..."));
    }
}
