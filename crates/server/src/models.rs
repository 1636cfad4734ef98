//! Stored records and their wire forms.

use chrono::{DateTime, Utc};
use serde::Serialize;

use medicart_core::{ChatMessageId, ChatSender, Email, UserId, UserProfile};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The public part of the account.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// One persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: ChatMessageId,
    pub user_id: UserId,
    pub sender: ChatSender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A history entry as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub sender: ChatSender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<StoredMessage> for HistoryEntry {
    fn from(msg: StoredMessage) -> Self {
        Self {
            sender: msg.sender,
            content: msg.content,
            timestamp: msg.created_at,
        }
    }
}

/// A history entry as given to the model: no timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptEntry<'a> {
    pub sender: ChatSender,
    pub content: &'a str,
}

impl<'a> From<&'a StoredMessage> for PromptEntry<'a> {
    fn from(msg: &'a StoredMessage) -> Self {
        Self {
            sender: msg.sender,
            content: &msg.content,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn stored(sender: ChatSender, content: &str) -> StoredMessage {
        StoredMessage {
            id: ChatMessageId::new(7),
            user_id: UserId::new(1),
            sender,
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_history_entry_wire_format() {
        let entry = HistoryEntry::from(stored(ChatSender::Ai, "Rest well."));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["sender"], "ai");
        assert_eq!(json["content"], "Rest well.");
        assert_eq!(json["timestamp"], "2025-03-01T10:00:00Z");
    }

    #[test]
    fn test_prompt_entry_omits_timestamp() {
        let msg = stored(ChatSender::User, "Headache");
        let json = serde_json::to_string(&PromptEntry::from(&msg)).unwrap();
        assert_eq!(json, r#"{"sender":"user","content":"Headache"}"#);
    }

    #[test]
    fn test_profile_has_no_secrets() {
        let user = User {
            id: UserId::new(3),
            name: "Abdi".to_string(),
            email: Email::parse("abdi@gmail.com").unwrap(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json, serde_json::json!({"id": 3, "name": "Abdi", "email": "abdi@gmail.com"}));
    }
}
