//! Wire types for the MediCart API server, and validation at the boundary.
//!
//! Every response body is decoded into an explicit schema first. Anything
//! that does not fit (missing fields, unknown sender tags, an `error` body)
//! becomes an [`ApiError`] so callers have a single failure path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medicart_core::{ChatMessage, ChatRole, Email, UserProfile};

use super::ApiError;

/// `POST /chat` request body.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub email: &'a Email,
    pub message: &'a str,
}

/// `POST /chat/history` request body.
#[derive(Debug, Serialize)]
pub struct HistoryRequest<'a> {
    pub email: &'a Email,
}

/// `POST /login` request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a Email,
    pub password: &'a str,
}

/// `POST /register` request body.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a Email,
    pub password: &'a str,
}

/// A stored message as the server sends it.
#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub sender: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// `POST /chat` response body.
#[derive(Debug, Deserialize)]
pub struct ChatResponseBody {
    pub response: Option<String>,
    pub history: Option<Vec<WireMessage>>,
    pub error: Option<String>,
}

/// `POST /chat/history` response body.
#[derive(Debug, Deserialize)]
pub struct HistoryResponseBody {
    pub history: Option<Vec<WireMessage>>,
    pub error: Option<String>,
}

/// `POST /login` and `POST /register` response body.
#[derive(Debug, Deserialize)]
pub struct AuthResponseBody {
    pub user: Option<UserProfile>,
    pub error: Option<String>,
}

/// Body of a non-success response, when it carries a message.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A validated `/chat` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// The assistant's reply text.
    pub response: String,
    /// Server-confirmed transcript, when the server sent one.
    pub history: Option<Vec<ChatMessage>>,
}

/// Map a sender tag to a transcript role.
///
/// Case-insensitive. `user` is the user; `ai`, `assistant`, `bot` and `model`
/// are the assistant. Anything else is rejected.
#[must_use]
pub fn normalize_sender(tag: &str) -> Option<ChatRole> {
    match tag.trim().to_ascii_lowercase().as_str() {
        "user" => Some(ChatRole::User),
        "ai" | "assistant" | "bot" | "model" => Some(ChatRole::Assistant),
        _ => None,
    }
}

/// Convert wire messages into transcript messages, failing closed.
///
/// # Errors
///
/// Returns `ApiError::UnexpectedShape` if any sender tag is unknown.
pub fn normalize_history(history: Vec<WireMessage>) -> Result<Vec<ChatMessage>, ApiError> {
    history
        .into_iter()
        .map(|msg| {
            let role = normalize_sender(&msg.sender).ok_or_else(|| {
                ApiError::UnexpectedShape(format!("unknown sender tag: {}", msg.sender))
            })?;
            Ok(ChatMessage {
                role,
                content: msg.content,
                timestamp: msg.timestamp,
            })
        })
        .collect()
}

impl ChatResponseBody {
    /// Validate into a [`ChatReply`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` for an `error` body and
    /// `ApiError::UnexpectedShape` if `response` is missing or the history
    /// cannot be normalized.
    pub fn into_reply(self) -> Result<ChatReply, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::Server(error));
        }
        let response = self
            .response
            .ok_or_else(|| ApiError::UnexpectedShape("missing `response` field".to_string()))?;
        let history = self.history.map(normalize_history).transpose()?;
        Ok(ChatReply { response, history })
    }
}

impl HistoryResponseBody {
    /// Validate into a transcript.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` for an `error` body and
    /// `ApiError::UnexpectedShape` if `history` is missing or invalid.
    pub fn into_messages(self) -> Result<Vec<ChatMessage>, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::Server(error));
        }
        let history = self
            .history
            .ok_or_else(|| ApiError::UnexpectedShape("missing `history` field".to_string()))?;
        normalize_history(history)
    }
}

impl AuthResponseBody {
    /// Validate into a user profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` for an `error` body and
    /// `ApiError::UnexpectedShape` if `user` is missing.
    pub fn into_user(self) -> Result<UserProfile, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::Server(error));
        }
        self.user
            .ok_or_else(|| ApiError::UnexpectedShape("missing `user` field".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).expect("valid test json")
    }

    #[test]
    fn test_normalize_sender() {
        assert_eq!(normalize_sender("user"), Some(ChatRole::User));
        assert_eq!(normalize_sender("ai"), Some(ChatRole::Assistant));
        assert_eq!(normalize_sender(" AI "), Some(ChatRole::Assistant));
        assert_eq!(normalize_sender("assistant"), Some(ChatRole::Assistant));
        assert_eq!(normalize_sender("system"), None);
    }

    #[test]
    fn test_chat_reply_with_history() {
        let body: ChatResponseBody = parse(
            r#"{
                "response": "Drink water.",
                "history": [
                    {"sender": "user", "content": "Headache?", "timestamp": "2025-03-01T10:00:00Z"},
                    {"sender": "ai", "content": "Drink water.", "timestamp": "2025-03-01T10:00:02.123Z"}
                ]
            }"#,
        );
        let reply = body.into_reply().expect("valid reply");
        assert_eq!(reply.response, "Drink water.");
        let history = reply.history.expect("history present");
        assert_eq!(history.len(), 2);
        assert_eq!(history.first().map(|m| m.role), Some(ChatRole::User));
        assert_eq!(history.get(1).map(|m| m.role), Some(ChatRole::Assistant));
        assert!(history.iter().all(|m| m.timestamp.is_some()));
    }

    #[test]
    fn test_chat_reply_without_history() {
        let body: ChatResponseBody = parse(r#"{"response": "Hi!"}"#);
        let reply = body.into_reply().expect("valid reply");
        assert!(reply.history.is_none());
    }

    #[test]
    fn test_chat_reply_error_body() {
        let body: ChatResponseBody = parse(r#"{"error": "User not found"}"#);
        assert!(matches!(body.into_reply(), Err(ApiError::Server(msg)) if msg == "User not found"));
    }

    #[test]
    fn test_chat_reply_missing_response_fails_closed() {
        let body: ChatResponseBody = parse(r#"{"reply": "wrong field"}"#);
        assert!(matches!(body.into_reply(), Err(ApiError::UnexpectedShape(_))));
    }

    #[test]
    fn test_history_unknown_sender_fails_closed() {
        let body: HistoryResponseBody =
            parse(r#"{"history": [{"sender": "robot", "content": "beep"}]}"#);
        assert!(matches!(body.into_messages(), Err(ApiError::UnexpectedShape(_))));
    }

    #[test]
    fn test_history_legacy_entries_without_timestamp() {
        let body: HistoryResponseBody =
            parse(r#"{"history": [{"sender": "ai", "content": "Welcome back"}]}"#);
        let messages = body.into_messages().expect("valid history");
        assert_eq!(messages.len(), 1);
        assert!(messages.first().is_some_and(|m| m.timestamp.is_none()));
    }

    #[test]
    fn test_auth_body() {
        let body: AuthResponseBody = parse(
            r#"{"message": "Success", "user": {"id": 3, "name": "Abdi", "email": "abdi@gmail.com"}}"#,
        );
        let user = body.into_user().expect("valid user");
        assert_eq!(user.name, "Abdi");
        assert_eq!(user.email.as_str(), "abdi@gmail.com");

        let body: AuthResponseBody = parse(r#"{"error": "The Password is not correct!"}"#);
        assert!(matches!(body.into_user(), Err(ApiError::Server(_))));
    }
}
