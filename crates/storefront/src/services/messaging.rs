//! Customer/admin messaging and notifications.

use brandshop_core::messaging::{conversation, visible_notifications};
use brandshop_core::{
    Audience, Message, MessageContent, MessageDirection, MessagingError, Notification, UserId,
};
use sqlx::PgPool;
use thiserror::Error;

use crate::db::{MessageRepository, NotificationRepository, RepositoryError, UserRepository};

/// Errors from messaging operations.
#[derive(Debug, Error)]
pub enum MessagingServiceError {
    #[error(transparent)]
    Content(#[from] MessagingError),

    /// A targeted notification names no user.
    #[error("a target user is required for a non-global notification")]
    MissingTarget,

    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for MessagingServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::UserNotFound,
            other => Self::Repository(other),
        }
    }
}

/// Messaging service.
pub struct MessagingService<'a> {
    messages: MessageRepository<'a>,
    notifications: NotificationRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> MessagingService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            messages: MessageRepository::new(pool),
            notifications: NotificationRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// Send a message in `customer`'s conversation.
    ///
    /// # Errors
    ///
    /// Returns `MessagingServiceError::Content` if the text is blank.
    /// Returns `MessagingServiceError::UserNotFound` if the customer doesn't exist.
    #[tracing::instrument(skip(self, text), fields(user_id = %customer))]
    pub async fn send(
        &self,
        customer: UserId,
        direction: MessageDirection,
        text: &str,
    ) -> Result<Message, MessagingServiceError> {
        let content = MessageContent::parse(text)?;
        if direction == MessageDirection::ToUser && !self.users.exists(customer).await? {
            return Err(MessagingServiceError::UserNotFound);
        }

        let message = self.messages.create(customer, direction, &content).await?;
        tracing::info!(message_id = %message.id(), direction = direction.as_str(), "Message sent");
        Ok(message)
    }

    /// `customer`'s conversation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `MessagingServiceError::UserNotFound` if the customer doesn't exist.
    pub async fn conversation(&self, customer: UserId) -> Result<Vec<Message>, MessagingServiceError> {
        if !self.users.exists(customer).await? {
            return Err(MessagingServiceError::UserNotFound);
        }

        let messages = self.messages.list_conversation(customer).await?;
        Ok(conversation(messages, customer))
    }

    /// Post a notification.
    ///
    /// `is_global` wins over `target`; a non-global notice needs an existing
    /// target user.
    ///
    /// # Errors
    ///
    /// Returns `MessagingServiceError::MissingTarget` for a non-global notice
    /// with no target and `MessagingServiceError::UserNotFound` if the target
    /// doesn't exist.
    #[tracing::instrument(skip(self, text))]
    pub async fn notify(
        &self,
        text: &str,
        target: Option<UserId>,
        is_global: bool,
    ) -> Result<Notification, MessagingServiceError> {
        let content = MessageContent::parse(text)?;
        let audience =
            Audience::from_columns(target, is_global).ok_or(MessagingServiceError::MissingTarget)?;

        if let Audience::User(user) = audience
            && !self.users.exists(user).await?
        {
            return Err(MessagingServiceError::UserNotFound);
        }

        let notification = self.notifications.create(&content, audience).await?;
        tracing::info!(notification_id = %notification.id, "Notification posted");
        Ok(notification)
    }

    /// Notices visible to `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `MessagingServiceError::Repository` if the query fails.
    pub async fn notifications_for(
        &self,
        user: UserId,
    ) -> Result<Vec<Notification>, MessagingServiceError> {
        let candidates = self.notifications.list_for_user(user).await?;
        Ok(visible_notifications(candidates, user))
    }
}
