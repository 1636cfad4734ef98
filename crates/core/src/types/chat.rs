//! Chat transcript message type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::ChatRole;

/// One message in a transcript.
///
/// Messages are never edited after creation. Entries recorded before
/// timestamps were kept have `timestamp: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
    /// When the message was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// A message stamped with the current instant.
    #[must_use]
    pub fn now(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Some(Utc::now()),
        }
    }

    /// A user-authored message stamped now.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::now(ChatRole::User, content)
    }

    /// An assistant-authored message stamped now.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(ChatRole::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_entry_without_timestamp() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"Hello"}"#).expect("parse");
        assert_eq!(msg.role, ChatRole::Assistant);
        assert!(msg.timestamp.is_none());

        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(!json.contains("timestamp"));
    }

    #[test]
    fn test_constructors_stamp_now() {
        let msg = ChatMessage::user("hi");
        assert_eq!(msg.role, ChatRole::User);
        assert!(msg.timestamp.is_some());
    }
}
