//! API views of messages and notifications.

use brandshop_core::{Message, MessageId, Notification, NotificationId, Party, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A message as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub id: MessageId,
    pub sender: Party,
    pub receiver: Party,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self {
            id: message.id(),
            sender: message.sender(),
            receiver: message.receiver(),
            created_at: message.created_at(),
            content: message.content().to_owned(),
        }
    }
}

/// A notification as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub id: NotificationId,
    pub content: String,
    pub is_global: bool,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationView {
    fn from(notification: Notification) -> Self {
        let (user_id, is_global) = notification.audience.to_columns();
        Self {
            id: notification.id,
            content: notification.content,
            is_global,
            user_id,
            created_at: notification.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brandshop_core::MessageDirection;

    use super::*;

    #[test]
    fn test_message_view_serializes_tagged_parties() {
        let message = Message::new(
            MessageId::new(1),
            UserId::new(4),
            MessageDirection::ToAdmin,
            "Is the Fallon Dress available in XS?".to_string(),
            Utc::now(),
        );
        let json = serde_json::to_value(MessageView::from(message)).unwrap();

        assert_eq!(json["sender"]["kind"], "user");
        assert_eq!(json["sender"]["id"], 4);
        assert_eq!(json["receiver"]["kind"], "admin");
    }
}
