//! Notification repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use brandshop_core::{Audience, MessageContent, Notification, NotificationId, UserId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: NotificationId,
    user_id: Option<UserId>,
    is_global: bool,
    content: String,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    /// Resolve the audience; rows addressed to nobody yield `None`.
    fn into_notification(self) -> Option<Notification> {
        let audience = Audience::from_columns(self.user_id, self.is_global)?;
        Some(Notification {
            id: self.id,
            content: self.content,
            audience,
            created_at: self.created_at,
        })
    }
}

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a targeted user doesn't exist.
    /// Returns `RepositoryError::DataCorruption` if the stored row has no audience.
    pub async fn create(
        &self,
        content: &MessageContent,
        audience: Audience,
    ) -> Result<Notification, RepositoryError> {
        let (user_id, is_global) = audience.to_columns();
        let row = sqlx::query_as::<_, NotificationRow>(
            r"
            INSERT INTO storefront.notification (user_id, is_global, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, is_global, content, created_at
            ",
        )
        .bind(user_id)
        .bind(is_global)
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

        let id = row.id;
        row.into_notification().ok_or_else(|| {
            RepositoryError::DataCorruption(format!("notification {id} has no audience"))
        })
    }

    /// Candidate notifications for a user: their own plus every global one.
    ///
    /// Malformed rows (not global, no user) are dropped. Ordering is applied
    /// by [`brandshop_core::messaging::visible_notifications`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r"
            SELECT id, user_id, is_global, content, created_at
            FROM storefront.notification
            WHERE is_global OR user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        let total = rows.len();
        let notifications: Vec<Notification> = rows
            .into_iter()
            .filter_map(NotificationRow::into_notification)
            .collect();
        if notifications.len() != total {
            tracing::warn!(
                user_id = %user,
                dropped = total - notifications.len(),
                "Skipped notifications with no audience"
            );
        }

        Ok(notifications)
    }
}
