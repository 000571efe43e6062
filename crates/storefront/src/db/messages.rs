//! Direct message repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use brandshop_core::{Message, MessageContent, MessageDirection, MessageId, UserId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: MessageId,
    user_id: UserId,
    direction: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let direction: MessageDirection = row
            .direction
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("message {}: {e}", row.id)))?;

        Ok(Self::new(
            row.id,
            row.user_id,
            direction,
            row.content,
            row.created_at,
        ))
    }
}

/// Repository for message database operations.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a message in `customer`'s conversation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        customer: UserId,
        direction: MessageDirection,
        content: &MessageContent,
    ) -> Result<Message, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r"
            INSERT INTO storefront.message (user_id, direction, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, direction, content, created_at
            ",
        )
        .bind(customer)
        .bind(direction.as_str())
        .bind(content.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Every message in `customer`'s conversation.
    ///
    /// The database orders rows by `(created_at, id)`; callers still pass the
    /// result through [`brandshop_core::messaging::conversation`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_conversation(&self, customer: UserId) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r"
            SELECT id, user_id, direction, content, created_at
            FROM storefront.message
            WHERE user_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(customer)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
