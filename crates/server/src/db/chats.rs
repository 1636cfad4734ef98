//! Chat transcript repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use medicart_core::{ChatMessageId, ChatSender, UserId};

use super::RepositoryError;
use crate::models::StoredMessage;

const INSERT_MESSAGE: &str = r"
    INSERT INTO medicart.chat_message (user_id, sender, content)
    VALUES ($1, $2, $3)
    RETURNING id, user_id, sender, content, created_at
";

#[derive(Debug, sqlx::FromRow)]
struct ChatMessageRow {
    id: i32,
    user_id: i32,
    sender: ChatSender,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<ChatMessageRow> for StoredMessage {
    fn from(row: ChatMessageRow) -> Self {
        Self {
            id: ChatMessageId::new(row.id),
            user_id: UserId::new(row.user_id),
            sender: row.sender,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// Repository for chat database operations.
pub struct ChatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatRepository<'a> {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append a user message and the reply to it in one transaction.
    ///
    /// Either both rows are stored or neither is. The user message always
    /// gets the lower id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either insert or the commit fails.
    pub async fn append_exchange(
        &self,
        user_id: UserId,
        message: &str,
        reply: &str,
    ) -> Result<(StoredMessage, StoredMessage), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let question = sqlx::query_as::<_, ChatMessageRow>(INSERT_MESSAGE)
            .bind(user_id)
            .bind(ChatSender::User)
            .bind(message)
            .fetch_one(&mut *tx)
            .await?;

        let answer = sqlx::query_as::<_, ChatMessageRow>(INSERT_MESSAGE)
            .bind(user_id)
            .bind(ChatSender::Ai)
            .bind(reply)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((question.into(), answer.into()))
    }

    /// The last `limit` messages of a user's transcript, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ChatMessageRow>(
            r"
            SELECT id, user_id, sender, content, created_at
            FROM (
                SELECT id, user_id, sender, content, created_at
                FROM medicart.chat_message
                WHERE user_id = $1
                ORDER BY id DESC
                LIMIT $2
            ) AS latest
            ORDER BY id ASC
            ",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredMessage::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;

    use medicart_core::Email;

    use super::*;
    use crate::db::{UserRepository, run_migrations};

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn fresh_user(pool: &PgPool) -> UserId {
        let stamp = Utc::now().timestamp_nanos_opt().unwrap();
        let email = Email::parse(&format!("chat-{stamp}@example.com")).unwrap();
        UserRepository::new(pool)
            .create("Chat Test", &email, "not-a-real-hash")
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    #[ignore = "Requires a running PostgreSQL database (DATABASE_URL)"]
    async fn test_exchange_is_stored_in_order() {
        let pool = pool().await;
        let user = fresh_user(&pool).await;
        let chats = ChatRepository::new(&pool);

        let (question, answer) = chats
            .append_exchange(user, "I have a headache", "Rest and drink water.")
            .await
            .unwrap();
        assert!(question.id.as_i32() < answer.id.as_i32());

        let stored = chats.recent(user, 10).await.unwrap();
        let senders: Vec<_> = stored.iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![ChatSender::User, ChatSender::Ai]);
        let contents: Vec<_> = stored.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["I have a headache", "Rest and drink water."]);
    }

    #[tokio::test]
    #[ignore = "Requires a running PostgreSQL database (DATABASE_URL)"]
    async fn test_failed_reply_insert_stores_nothing() {
        let pool = pool().await;
        let user = fresh_user(&pool).await;
        let chats = ChatRepository::new(&pool);

        // PostgreSQL rejects NUL bytes in TEXT, so the second insert fails
        let result = chats.append_exchange(user, "hello", "broken\0reply").await;
        assert!(matches!(result, Err(RepositoryError::Database(_))));

        assert!(chats.recent(user, 10).await.unwrap().is_empty());
    }
}
