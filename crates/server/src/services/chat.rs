//! MediBot conversation flow.
//!
//! One exchange:
//! 1. Load the stored messages that, with the new one, fill [`CONTEXT_WINDOW`]
//! 2. Render the prompt and call Gemini
//! 3. Store the user message and the reply (or a fixed apology if the model
//!    failed) in one transaction
//!
//! A model failure never fails the request. Nothing is stored until the model
//! has answered, so a failed request leaves no unanswered message behind.

use sqlx::PgPool;
use tracing::{error, info, instrument, warn};

use crate::db::{ChatRepository, RepositoryError};
use crate::gemini::{GeminiClient, GeminiError, render_prompt};
use crate::models::{HistoryEntry, User};

/// Messages given to the model as context, and returned after a send.
pub const CONTEXT_WINDOW: i64 = 10;

/// Messages returned by a history request.
pub const HISTORY_LIMIT: i64 = 50;

/// Stored and returned when the model call fails.
pub const AI_UNAVAILABLE_REPLY: &str =
    "Error: Unable to get a response from the AI. Please try again later.";

/// Stored and returned when the model answers without text.
pub const EMPTY_REPLY: &str = "Sorry, I couldn't generate a response.";

/// Result of one exchange.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub response: String,
    /// The last [`CONTEXT_WINDOW`] messages, oldest first, ending with the reply.
    pub history: Vec<HistoryEntry>,
}

/// Chat service.
pub struct ChatService<'a> {
    chats: ChatRepository<'a>,
    gemini: &'a GeminiClient,
}

impl<'a> ChatService<'a> {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, gemini: &'a GeminiClient) -> Self {
        Self {
            chats: ChatRepository::new(pool),
            gemini,
        }
    }

    /// Run one exchange for `user`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a message cannot be stored or loaded.
    #[instrument(skip(self, user, message), fields(user_id = %user.id, len = message.len()))]
    pub async fn send(&self, user: &User, message: &str) -> Result<ChatExchange, RepositoryError> {
        let earlier = self.chats.recent(user.id, CONTEXT_WINDOW - 1).await?;
        let outcome = match render_prompt(&earlier, message) {
            Ok(prompt) => self.gemini.generate(&prompt).await,
            Err(e) => Err(GeminiError::Prompt(e)),
        };
        let response = reply_text(outcome);

        let (_, reply) = self
            .chats
            .append_exchange(user.id, message, &response)
            .await?;
        let history = self.chats.recent(user.id, CONTEXT_WINDOW).await?;

        info!(reply_id = %reply.id, history_len = history.len(), "chat exchange stored");
        Ok(ChatExchange {
            response,
            history: history.into_iter().map(HistoryEntry::from).collect(),
        })
    }

    /// The last [`HISTORY_LIMIT`] messages of `user`'s transcript, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn history(&self, user: &User) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let messages = self.chats.recent(user.id, HISTORY_LIMIT).await?;
        Ok(messages.into_iter().map(HistoryEntry::from).collect())
    }
}

/// The text to store for a model outcome.
fn reply_text(outcome: Result<Option<String>, GeminiError>) -> String {
    match outcome {
        Ok(Some(text)) => text,
        Ok(None) => {
            warn!("model returned no text");
            EMPTY_REPLY.to_string()
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            error!(error = %e, sentry_event_id = %event_id, "model call failed");
            AI_UNAVAILABLE_REPLY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_text_passes_model_text() {
        assert_eq!(
            reply_text(Ok(Some("Drink plenty of water.".to_string()))),
            "Drink plenty of water."
        );
    }

    #[test]
    fn test_reply_text_fallbacks() {
        assert_eq!(reply_text(Ok(None)), EMPTY_REPLY);
        assert_eq!(reply_text(Err(GeminiError::Timeout)), AI_UNAVAILABLE_REPLY);
        assert_eq!(
            reply_text(Err(GeminiError::Api {
                status: 429,
                message: "RESOURCE_EXHAUSTED".to_string(),
            })),
            AI_UNAVAILABLE_REPLY
        );
    }
}
