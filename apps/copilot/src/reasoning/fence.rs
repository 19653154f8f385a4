//! Markdown fence handling for model output that should be bare JSON.

use serde::de::DeserializeOwned;

use super::ReasoningError;

const FENCE: &str = "```";

/// Strips one surrounding ```` ``` ```` fence, with or without a language tag.
/// Unfenced input comes back trimmed, so the function is idempotent.
pub fn strip_json_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };

    // drop an info string such as `json` up to the first newline
    let body = match rest.find('\n') {
        Some(idx) if is_language_tag(&rest[..idx]) => &rest[idx + 1..],
        _ => rest,
    };

    body.trim_end()
        .strip_suffix(FENCE)
        .unwrap_or(body)
        .trim()
}

fn is_language_tag(candidate: &str) -> bool {
    candidate
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+')
}

/// Fence-strips then deserializes. Blank input is reported as an empty response
/// rather than a JSON syntax error.
pub fn parse_fenced_json<T: DeserializeOwned>(text: &str) -> Result<T, ReasoningError> {
    let payload = strip_json_fence(text);
    if payload.is_empty() {
        return Err(ReasoningError::EmptyResponse);
    }
    serde_json::from_str(payload).map_err(ReasoningError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::summary::JobSummary;

    #[test]
    fn test_strip_json_fence_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fence(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fence_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fence(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fence_single_line() {
        assert_eq!(strip_json_fence("```{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_json_fence_other_language_tag() {
        let input = "```JSON5\n{\"a\":1}\n```\n";
        assert_eq!(strip_json_fence(input), "{\"a\":1}");
    }

    #[test]
    fn test_strip_json_fence_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_json_fence(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fence_is_idempotent() {
        for input in [
            "{\"a\":1}",
            "```json\n{\"a\":1}\n```",
            "```\n[1, 2]\n```",
            "  plain  ",
        ] {
            let once = strip_json_fence(input);
            assert_eq!(strip_json_fence(once), once);
        }
    }

    #[test]
    fn test_strip_json_fence_unterminated() {
        assert_eq!(strip_json_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_fenced_summary_equals_embedded_object() {
        let text = "```json\n{\"roleOverview\":\"A\",\"responsibilities\":[],\"requirements\":[],\"techAndTools\":[]}\n```";
        let summary: JobSummary = parse_fenced_json(text).unwrap();
        assert_eq!(
            summary,
            JobSummary {
                role_overview: "A".to_string(),
                responsibilities: vec![],
                requirements: vec![],
                tech_and_tools: vec![],
            }
        );
    }

    #[test]
    fn test_parse_fenced_json_blank_is_empty_response() {
        let err = parse_fenced_json::<JobSummary>("```json\n```").unwrap_err();
        assert!(matches!(err, ReasoningError::EmptyResponse));
    }

    #[test]
    fn test_parse_fenced_json_invalid_is_parse_error() {
        let err = parse_fenced_json::<JobSummary>("```json\n{not json}\n```").unwrap_err();
        assert!(matches!(err, ReasoningError::Parse(_)));
    }
}
