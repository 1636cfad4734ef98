//! Request and response types for the `generateContent` endpoint.

use serde::{Deserialize, Serialize};

/// Request body: a single user turn holding the whole prompt.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub contents: [Content<'a>; 1],
}

impl<'a> GenerateRequest<'a> {
    #[must_use]
    pub const fn from_prompt(text: &'a str) -> Self {
        Self {
            contents: [Content {
                parts: [Part { text }],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct Part<'a> {
    pub text: &'a str,
}

/// Response body. Every level is optional; a blocked prompt returns no
/// candidates at all.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, if non-empty.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.trim().is_empty())
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub status: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let json = serde_json::to_value(GenerateRequest::from_prompt("hello")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn test_extracts_first_candidate_text() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "Take with food."}, {"text": "ignored"}], "role": "model"}},
                    {"content": {"parts": [{"text": "second candidate"}]}}
                ],
                "usageMetadata": {"totalTokenCount": 12}
            }"#,
        )
        .unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Take with food."));
    }

    #[test]
    fn test_missing_text_is_none() {
        for body in [
            r"{}",
            r#"{"candidates": []}"#,
            r#"{"candidates": [{"finishReason": "SAFETY"}]}"#,
            r#"{"candidates": [{"content": {"parts": []}}]}"#,
            r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#,
        ] {
            let response: GenerateResponse = serde_json::from_str(body).unwrap();
            assert_eq!(response.into_text(), None, "body: {body}");
        }
    }

    #[test]
    fn test_error_body() {
        let err: ErrorResponse = serde_json::from_str(
            r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#,
        )
        .unwrap();
        assert_eq!(err.error.status, "INVALID_ARGUMENT");
        assert_eq!(err.error.message, "API key not valid.");
    }
}
