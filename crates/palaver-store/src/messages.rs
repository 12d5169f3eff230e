use serde::{Deserialize, Serialize};
use tracing::debug;

use palaver_shared::format::format_size;
use palaver_shared::{AttachmentKind, DeliveryStatus, MessageId};

use crate::error::{Result, StoreError};
use crate::models::{Attachment, Message};
use crate::scheduler::Task;
use crate::store::ConversationStore;

/// A file picked for upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    /// Where the renderer can load the file from.
    pub url: String,
    pub size_bytes: u64,
}

impl From<&MediaFile> for Attachment {
    fn from(file: &MediaFile) -> Self {
        Self {
            kind: AttachmentKind::from_content_type(&file.content_type),
            url: file.url.clone(),
            name: Some(file.name.clone()),
            size: Some(format_size(file.size_bytes)),
        }
    }
}

impl ConversationStore {
    /// Send a text message to the active conversation.
    ///
    /// The message starts as `sent` and is marked `delivered` once the
    /// configured delivery delay elapses.
    pub fn send_text(&mut self, text: &str) -> Result<MessageId> {
        self.require_active()?;
        if text.trim().is_empty() {
            return Err(StoreError::EmptyMessage);
        }
        self.push_outgoing(text.to_string(), Vec::new())
    }

    /// Send one message carrying every file in `files`, with an optional
    /// caption. Kinds are inferred from each file's content type.
    pub fn send_media(&mut self, files: &[MediaFile], caption: Option<&str>) -> Result<MessageId> {
        self.require_active()?;
        if files.is_empty() {
            return Err(StoreError::EmptyMessage);
        }
        let media = files.iter().map(Attachment::from).collect();
        let text = caption
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or_default()
            .to_string();
        self.push_outgoing(text, media)
    }

    fn push_outgoing(&mut self, text: String, media: Vec<Attachment>) -> Result<MessageId> {
        let conversation = self.require_active()?;
        let now = self.now();
        let me = self.me.id.clone();

        let mut message = Message::text(MessageId::new(), me.clone(), text, now, DeliveryStatus::Sent);
        message.media = media;
        let id = message.id.clone();
        let attachments = message.media.len();

        self.cancel_typing_timer();
        let chat = self.conversation_mut(&conversation)?;
        chat.messages.push(message);
        chat.last_message_timestamp = now;
        chat.remove_typing(&me);

        let delay = self.config.delivery_delay;
        self.scheduler.schedule(
            delay,
            Task::DeliverMessage {
                conversation: conversation.clone(),
                message: id.clone(),
            },
        );

        debug!(conversation = %conversation, message = %id, attachments, "Message sent");
        self.publish();
        Ok(id)
    }

    /// Set the current user's reaction on a message in the active
    /// conversation, replacing any earlier one. Returns `true` when a new
    /// reaction entry was added.
    pub fn add_reaction(&mut self, message: &MessageId, emoji: &str) -> Result<bool> {
        let conversation = self.require_active()?;
        if emoji.trim().is_empty() {
            return Err(StoreError::InvalidState("empty reaction".to_string()));
        }
        let me = self.me.id.clone();

        let target = self
            .conversation_mut(&conversation)?
            .message_mut(message)
            .ok_or_else(|| StoreError::MessageNotFound(message.clone()))?;
        let added = target.upsert_reaction(&me, emoji);

        debug!(conversation = %conversation, message = %message, emoji, added, "Reaction set");
        self.publish();
        Ok(added)
    }

    /// Soft-delete one of the current user's messages in the active
    /// conversation. The message keeps its slot; its text becomes the
    /// configured placeholder. Returns `false` if it was already deleted.
    pub fn delete_message(&mut self, message: &MessageId) -> Result<bool> {
        let conversation = self.require_active()?;
        let me = self.me.id.clone();
        let placeholder = self.config.deleted_placeholder.clone();

        let target = self
            .conversation_mut(&conversation)?
            .message_mut(message)
            .ok_or_else(|| StoreError::MessageNotFound(message.clone()))?;
        if target.sender_id != me {
            return Err(StoreError::NotAuthor(message.clone()));
        }
        if target.is_deleted {
            return Ok(false);
        }
        target.is_deleted = true;
        target.text = placeholder;

        debug!(conversation = %conversation, message = %message, "Message deleted");
        self.publish();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::Conversation;
    use crate::store::tests::{demo_store, family, sarah};

    fn active(store: &ConversationStore) -> &Conversation {
        store.active().unwrap()
    }

    fn photo(name: &str) -> MediaFile {
        MediaFile {
            name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            url: format!("blob:{name}"),
            size_bytes: 2 * 1024 * 1024,
        }
    }

    #[test]
    fn test_send_requires_active_conversation() {
        let mut store = demo_store();
        assert_eq!(store.send_text("hi"), Err(StoreError::NoActiveConversation));
        assert_eq!(store.pending_tasks(), 0);
    }

    #[test]
    fn test_whitespace_is_never_sent() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        let before = active(&store).messages.len();

        for text in ["", "   ", "\n\t "] {
            assert_eq!(store.send_text(text), Err(StoreError::EmptyMessage));
        }
        assert_eq!(active(&store).messages.len(), before);
        assert_eq!(store.pending_tasks(), 0);
    }

    #[test]
    fn test_send_then_deliver() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        let before: Vec<Message> = active(&store).messages.clone();

        let id = store.send_text("hi").unwrap();
        let chat = active(&store);
        assert_eq!(chat.messages.len(), before.len() + 1);
        let sent = chat.messages.last().unwrap();
        assert_eq!(sent.id, id);
        assert_eq!(sent.text, "hi");
        assert_eq!(sent.status, DeliveryStatus::Sent);
        assert_eq!(chat.last_message_timestamp, sent.timestamp);

        store.advance(Duration::from_millis(999));
        assert_eq!(active(&store).message(&id).unwrap().status, DeliveryStatus::Sent);

        store.advance(Duration::from_millis(1));
        let chat = active(&store);
        assert_eq!(chat.message(&id).unwrap().status, DeliveryStatus::Delivered);
        assert_eq!(&chat.messages[..before.len()], &before[..]);

        // Delivery happens exactly once.
        assert_eq!(store.run_until_idle(), 0);
    }

    #[test]
    fn test_delivery_lands_in_original_conversation() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        let id = store.send_text("hi").unwrap();

        store.select_conversation(Some(&family())).unwrap();
        store.run_until_idle();

        let chat = store.conversation(&sarah()).unwrap();
        assert_eq!(chat.message(&id).unwrap().status, DeliveryStatus::Delivered);
        assert!(store.conversation(&family()).unwrap().message(&id).is_none());
    }

    #[test]
    fn test_send_clears_self_typing() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        store.keystroke().unwrap();

        store.send_text("hello").unwrap();
        assert!(!active(&store).is_typing(&store.me().id));
        // Only the delivery task remains; the typing timeout was cancelled.
        assert_eq!(store.pending_tasks(), 1);
    }

    #[test]
    fn test_send_media_builds_attachments() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();

        let files = vec![
            photo("beach.jpg"),
            MediaFile {
                name: "notes.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                url: "blob:notes".to_string(),
                size_bytes: 512,
            },
        ];
        let id = store.send_media(&files, Some("  holiday  ")).unwrap();

        let msg = active(&store).message(&id).unwrap();
        assert_eq!(msg.text, "holiday");
        assert_eq!(msg.status, DeliveryStatus::Sent);
        assert_eq!(msg.media.len(), 2);
        assert_eq!(msg.media[0].kind, AttachmentKind::Image);
        assert_eq!(msg.media[0].size.as_deref(), Some("2.0 MB"));
        assert_eq!(msg.media[1].kind, AttachmentKind::Document);
        assert_eq!(msg.media[1].name.as_deref(), Some("notes.pdf"));

        store.run_until_idle();
        let msg = active(&store).message(&id).unwrap();
        assert_eq!(msg.status, DeliveryStatus::Delivered);
    }

    #[test]
    fn test_send_media_without_files_is_rejected() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        assert_eq!(store.send_media(&[], Some("hi")), Err(StoreError::EmptyMessage));

        let id = store.send_media(&[photo("a.jpg")], None).unwrap();
        assert_eq!(active(&store).message(&id).unwrap().text, "");
    }

    #[test]
    fn test_reaction_twice_keeps_one_entry() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        let id = store.send_text("hi").unwrap();

        assert_eq!(store.add_reaction(&id, "👍"), Ok(true));
        assert_eq!(store.add_reaction(&id, "👍"), Ok(false));

        let msg = active(&store).message(&id).unwrap();
        assert_eq!(msg.reactions.len(), 1);
        assert_eq!(msg.reactions[0].emoji, "👍");
        assert_eq!(msg.reactions[0].user_id, store.me().id);
    }

    #[test]
    fn test_reaction_latest_wins() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        let theirs = MessageId::from("msg-user-2-user-1-1");

        store.add_reaction(&theirs, "👍").unwrap();
        store.add_reaction(&theirs, "😂").unwrap();
        let msg = active(&store).message(&theirs).unwrap();
        assert_eq!(msg.reactions.len(), 1);
        assert_eq!(msg.reactions[0].emoji, "😂");
    }

    #[test]
    fn test_reaction_on_unknown_message() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        let missing = MessageId::from("msg-nope");
        assert_eq!(
            store.add_reaction(&missing, "👍"),
            Err(StoreError::MessageNotFound(missing))
        );
    }

    #[test]
    fn test_delete_is_soft_and_idempotent() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        let id = store.send_text("oops").unwrap();
        let count = active(&store).messages.len();

        assert_eq!(store.delete_message(&id), Ok(true));
        assert_eq!(store.delete_message(&id), Ok(false));

        let chat = active(&store);
        assert_eq!(chat.messages.len(), count);
        let deleted: Vec<&Message> = chat.messages.iter().filter(|m| m.is_deleted).collect();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].id, id);
        assert_eq!(deleted[0].text, "This message was deleted");
        assert_eq!(chat.messages.last().unwrap().id, id);
    }

    #[test]
    fn test_delete_from_any_status() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        let id = store.send_text("soon gone").unwrap();
        store.delete_message(&id).unwrap();

        store.run_until_idle();
        let msg = active(&store).message(&id).unwrap();
        assert!(msg.is_deleted);
        assert_eq!(msg.status, DeliveryStatus::Delivered);
    }

    #[test]
    fn test_delete_others_message_is_rejected() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        let theirs = MessageId::from("msg-user-2-user-1-1");

        assert_eq!(
            store.delete_message(&theirs),
            Err(StoreError::NotAuthor(theirs.clone()))
        );
        assert!(!active(&store).message(&theirs).unwrap().is_deleted);
    }
}
