use thiserror::Error;

use palaver_shared::{CommunityId, ConversationId, MessageId, UserId};

/// Errors produced by store operations.
///
/// Every variant is a rejected precondition; the store is left exactly as it
/// was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The operation targets the active conversation but none is selected.
    #[error("No active conversation")]
    NoActiveConversation,

    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Community not found: {0}")]
    CommunityNotFound(CommunityId),

    /// Text was empty or whitespace and there was nothing else to send.
    #[error("Message is empty")]
    EmptyMessage,

    /// Only the author may delete a message.
    #[error("Message {0} was not sent by the current user")]
    NotAuthor(MessageId),

    #[error("Conversation {0} is not a group")]
    NotAGroup(ConversationId),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
