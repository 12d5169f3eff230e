//! Domain model structs owned by the conversation store.
//!
//! Every struct derives `Serialize` and `Deserialize` so snapshots can be
//! handed directly to a renderer as JSON.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use palaver_shared::{
    AttachmentKind, CallId, CallMedium, CallStatus, CommunityId, ConversationId, DeliveryStatus,
    MessageId, UserId,
};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A person known to the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Avatar image location.
    pub avatar: String,
    /// Free-form status line ("At work").
    pub status: Option<String>,
    /// Preformatted last-seen text ("Today at 10:30 AM").
    pub last_seen: Option<String>,
    pub is_online: Option<bool>,
    pub phone_number: Option<String>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub url: String,
    pub name: Option<String>,
    /// Display label such as "1.5 MB".
    pub size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub user_id: UserId,
    pub emoji: String,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub status: DeliveryStatus,
    pub is_deleted: bool,
    pub media: Vec<Attachment>,
    /// At most one entry per reacting user.
    pub reactions: Vec<Reaction>,
}

impl Message {
    pub fn text(
        id: MessageId,
        sender_id: UserId,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
        status: DeliveryStatus,
    ) -> Self {
        Self {
            id,
            sender_id,
            text: text.into(),
            timestamp,
            status,
            is_deleted: false,
            media: Vec::new(),
            reactions: Vec::new(),
        }
    }

    /// Insert or replace `user`'s reaction. Returns `true` if a new entry
    /// was appended rather than an existing one replaced.
    pub fn upsert_reaction(&mut self, user: &UserId, emoji: &str) -> bool {
        match self.reactions.iter_mut().find(|r| &r.user_id == user) {
            Some(existing) => {
                existing.emoji = emoji.to_string();
                false
            }
            None => {
                self.reactions.push(Reaction {
                    user_id: user.clone(),
                    emoji: emoji.to_string(),
                });
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Call
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub id: CallId,
    pub participants: Vec<User>,
    pub timestamp: DateTime<Utc>,
    /// Whole seconds. Zero until the call ends.
    pub duration_secs: u64,
    pub medium: CallMedium,
    pub status: CallStatus,
    /// Virtual time at which the call was placed.
    #[serde(skip)]
    pub(crate) placed_at: Duration,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A direct chat with one counterparty, or a named group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: Vec<User>,
    pub messages: Vec<Message>,
    pub unread_count: u32,
    pub last_message_timestamp: DateTime<Utc>,
    pub is_group: bool,
    pub group_name: Option<String>,
    pub group_avatar: Option<String>,
    /// Ids of participants currently typing, in the order they started.
    pub typing_users: Vec<UserId>,
    pub is_archived: bool,
    pub is_favorite: bool,
    pub calls: Vec<CallRecord>,
}

impl Conversation {
    pub fn direct(
        id: ConversationId,
        participants: Vec<User>,
        last_message_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            participants,
            messages: Vec::new(),
            unread_count: 0,
            last_message_timestamp,
            is_group: false,
            group_name: None,
            group_avatar: None,
            typing_users: Vec::new(),
            is_archived: false,
            is_favorite: false,
            calls: Vec::new(),
        }
    }

    pub fn group(
        id: ConversationId,
        name: impl Into<String>,
        avatar: impl Into<String>,
        participants: Vec<User>,
        last_message_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            is_group: true,
            group_name: Some(name.into()),
            group_avatar: Some(avatar.into()),
            ..Self::direct(id, participants, last_message_timestamp)
        }
    }

    pub fn has_participant(&self, user: &UserId) -> bool {
        self.participants.iter().any(|p| &p.id == user)
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub(crate) fn message_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| &m.id == id)
    }

    pub fn is_typing(&self, user: &UserId) -> bool {
        self.typing_users.contains(user)
    }

    /// Returns `true` if `user` was not already in the typing-set.
    pub(crate) fn add_typing(&mut self, user: &UserId) -> bool {
        if self.is_typing(user) {
            return false;
        }
        self.typing_users.push(user.clone());
        true
    }

    /// Returns `true` if `user` was in the typing-set.
    pub(crate) fn remove_typing(&mut self, user: &UserId) -> bool {
        let before = self.typing_users.len();
        self.typing_users.retain(|u| u != user);
        before != self.typing_users.len()
    }

    /// Name to show for this conversation: the group name, or the first
    /// participant who is not `me`.
    pub fn display_name(&self, me: &UserId) -> Option<&str> {
        if self.is_group {
            return self.group_name.as_deref();
        }
        self.participants
            .iter()
            .find(|p| &p.id != me)
            .map(|p| p.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Community
// ---------------------------------------------------------------------------

/// A named container grouping several group conversations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub avatar: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub admins: Vec<UserId>,
    /// Ids of the member group conversations, resolved against the store.
    pub groups: Vec<ConversationId>,
    pub announcements: Vec<Message>,
    pub created_at: DateTime<Utc>,
}
