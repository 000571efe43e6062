//! Direct messages between customers and the store, and broadcast notices.
//!
//! There is a single admin inbox, so every message belongs to exactly one
//! customer's conversation and flows in one of two directions. Notifications
//! are addressed either to everyone or to one user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MessageId, NotificationId, UserId};

/// Errors raised when composing a message or notification.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    #[error("message content cannot be empty")]
    EmptyContent,
}

/// One end of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Party {
    User(UserId),
    Admin,
}

/// Which way a message travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    ToAdmin,
    ToUser,
}

impl MessageDirection {
    /// The stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ToAdmin => "to_admin",
            Self::ToUser => "to_user",
        }
    }
}

impl core::str::FromStr for MessageDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to_admin" => Ok(Self::ToAdmin),
            "to_user" => Ok(Self::ToUser),
            _ => Err(format!("invalid message direction: {s}")),
        }
    }
}

/// Non-empty, trimmed message or notification text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    /// # Errors
    ///
    /// Returns `MessagingError::EmptyContent` if `text` is blank.
    pub fn parse(text: &str) -> Result<Self, MessagingError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(MessagingError::EmptyContent);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A stored direct message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    customer: UserId,
    direction: MessageDirection,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    #[must_use]
    pub const fn new(
        id: MessageId,
        customer: UserId,
        direction: MessageDirection,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer,
            direction,
            content,
            created_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// The customer whose conversation this message belongs to.
    #[must_use]
    pub const fn customer(&self) -> UserId {
        self.customer
    }

    #[must_use]
    pub const fn direction(&self) -> MessageDirection {
        self.direction
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn sender(&self) -> Party {
        match self.direction {
            MessageDirection::ToAdmin => Party::User(self.customer),
            MessageDirection::ToUser => Party::Admin,
        }
    }

    #[must_use]
    pub const fn receiver(&self) -> Party {
        match self.direction {
            MessageDirection::ToAdmin => Party::Admin,
            MessageDirection::ToUser => Party::User(self.customer),
        }
    }

    /// True iff `user` is the sender or the receiver.
    #[must_use]
    pub fn in_conversation(&self, user: UserId) -> bool {
        self.customer == user
    }
}

/// One customer's conversation, oldest first with ties broken by id.
pub fn conversation(messages: impl IntoIterator<Item = Message>, user: UserId) -> Vec<Message> {
    let mut thread: Vec<Message> = messages
        .into_iter()
        .filter(|message| message.in_conversation(user))
        .collect();
    thread.sort_by_key(|message| (message.created_at, message.id));
    thread
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "lowercase")]
pub enum Audience {
    Global,
    User(UserId),
}

impl Audience {
    /// Interpret the stored `(user_id, is_global)` pair.
    ///
    /// `is_global` wins over a stray user id. A non-global row with no user is
    /// addressed to nobody and yields `None`.
    #[must_use]
    pub const fn from_columns(user_id: Option<UserId>, is_global: bool) -> Option<Self> {
        match (is_global, user_id) {
            (true, _) => Some(Self::Global),
            (false, Some(user)) => Some(Self::User(user)),
            (false, None) => None,
        }
    }

    /// The `(user_id, is_global)` pair to store.
    #[must_use]
    pub const fn to_columns(self) -> (Option<UserId>, bool) {
        match self {
            Self::Global => (None, true),
            Self::User(user) => (Some(user), false),
        }
    }

    #[must_use]
    pub fn includes(self, user: UserId) -> bool {
        match self {
            Self::Global => true,
            Self::User(target) => target == user,
        }
    }
}

/// A stored notification with its audience resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub content: String,
    pub audience: Audience,
    pub created_at: DateTime<Utc>,
}

/// The notices `user` sees, newest first with ties broken by id descending.
pub fn visible_notifications(
    notifications: impl IntoIterator<Item = Notification>,
    user: UserId,
) -> Vec<Notification> {
    let mut visible: Vec<Notification> = notifications
        .into_iter()
        .filter(|notification| notification.audience.includes(user))
        .collect();
    visible.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    visible
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap()
    }

    fn message(id: i32, customer: i32, direction: MessageDirection, minute: u32) -> Message {
        Message::new(
            MessageId::new(id),
            UserId::new(customer),
            direction,
            format!("message {id}"),
            at(minute),
        )
    }

    #[test]
    fn test_sender_and_receiver_follow_direction() {
        let inbound = message(1, 7, MessageDirection::ToAdmin, 0);
        assert_eq!(inbound.sender(), Party::User(UserId::new(7)));
        assert_eq!(inbound.receiver(), Party::Admin);

        let outbound = message(2, 7, MessageDirection::ToUser, 1);
        assert_eq!(outbound.sender(), Party::Admin);
        assert_eq!(outbound.receiver(), Party::User(UserId::new(7)));
    }

    #[test]
    fn test_conversation_excludes_other_customers_and_is_ordered() {
        let messages = vec![
            message(5, 1, MessageDirection::ToUser, 3),
            message(2, 2, MessageDirection::ToAdmin, 1),
            message(4, 1, MessageDirection::ToAdmin, 2),
            message(3, 1, MessageDirection::ToAdmin, 2),
            message(1, 1, MessageDirection::ToAdmin, 0),
        ];

        let thread = conversation(messages, UserId::new(1));
        let ids: Vec<i32> = thread.iter().map(|m| m.id().as_i32()).collect();
        assert_eq!(ids, vec![1, 3, 4, 5]);
        assert!(thread.iter().all(|m| {
            m.sender() == Party::User(UserId::new(1)) || m.receiver() == Party::User(UserId::new(1))
        }));
        assert!(thread.windows(2).all(|pair| pair[0].created_at() <= pair[1].created_at()));
    }

    #[test]
    fn test_content_must_not_be_blank() {
        assert_eq!(
            MessageContent::parse(" \n "),
            Err(MessagingError::EmptyContent)
        );
        assert_eq!(MessageContent::parse(" hi ").unwrap().as_str(), "hi");
    }

    #[test]
    fn test_audience_columns() {
        let user = UserId::new(9);
        assert_eq!(Audience::from_columns(None, true), Some(Audience::Global));
        assert_eq!(Audience::from_columns(Some(user), true), Some(Audience::Global));
        assert_eq!(Audience::from_columns(Some(user), false), Some(Audience::User(user)));
        assert_eq!(Audience::from_columns(None, false), None);
        assert_eq!(Audience::User(user).to_columns(), (Some(user), false));
    }

    #[test]
    fn test_visible_notifications_include_global_and_own_only() {
        let me = UserId::new(1);
        let notice = |id: i32, audience: Audience, minute: u32| Notification {
            id: NotificationId::new(id),
            content: format!("notice {id}"),
            audience,
            created_at: at(minute),
        };
        let notifications = vec![
            notice(1, Audience::Global, 0),
            notice(2, Audience::User(me), 1),
            notice(3, Audience::User(UserId::new(2)), 2),
            notice(4, Audience::Global, 1),
        ];

        let ids: Vec<i32> = visible_notifications(notifications, me)
            .iter()
            .map(|n| n.id.as_i32())
            .collect();
        assert_eq!(ids, vec![4, 2, 1]);
    }
}
