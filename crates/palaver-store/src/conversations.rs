//! Conversation flags, group membership and list queries.

use tracing::debug;

use palaver_shared::{ConversationId, UserId};

use crate::error::{Result, StoreError};
use crate::models::{Conversation, User};
use crate::store::ConversationStore;

fn matches_query(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(&query.trim().to_lowercase())
}

impl ConversationStore {
    // ------------------------------------------------------------------
    // Flags
    // ------------------------------------------------------------------

    /// Flip the archived flag. Returns the new value.
    pub fn toggle_archive(&mut self, id: &ConversationId) -> Result<bool> {
        let chat = self.conversation_mut(id)?;
        chat.is_archived = !chat.is_archived;
        let archived = chat.is_archived;

        debug!(conversation = %id, archived, "Archive toggled");
        self.publish();
        Ok(archived)
    }

    /// Flip the favorite flag. Returns the new value.
    pub fn toggle_favorite(&mut self, id: &ConversationId) -> Result<bool> {
        let chat = self.conversation_mut(id)?;
        chat.is_favorite = !chat.is_favorite;
        let favorite = chat.is_favorite;

        debug!(conversation = %id, favorite, "Favorite toggled");
        self.publish();
        Ok(favorite)
    }

    // ------------------------------------------------------------------
    // Group membership
    // ------------------------------------------------------------------

    /// Add a known user to a group. Returns `false` if they are already in it.
    pub fn add_member(&mut self, id: &ConversationId, user: &UserId) -> Result<bool> {
        let member = self
            .user(user)
            .cloned()
            .ok_or_else(|| StoreError::UserNotFound(user.clone()))?;

        let chat = self.conversation_mut(id)?;
        if !chat.is_group {
            return Err(StoreError::NotAGroup(id.clone()));
        }
        if chat.has_participant(user) {
            return Ok(false);
        }
        chat.participants.push(member);

        debug!(conversation = %id, user = %user, "Member added");
        self.publish();
        Ok(true)
    }

    /// Leave a group. If it was active, the selection is cleared. Returns
    /// `false` if self had already left.
    pub fn exit_group(&mut self, id: &ConversationId) -> Result<bool> {
        let me = self.me.id.clone();
        let chat = self.conversation_mut(id)?;
        if !chat.is_group {
            return Err(StoreError::NotAGroup(id.clone()));
        }
        if !chat.has_participant(&me) {
            return Ok(false);
        }
        chat.participants.retain(|p| p.id != me);
        chat.remove_typing(&me);

        if self.active.as_ref() == Some(id) {
            self.cancel_typing_timer();
            self.active = None;
        }

        debug!(conversation = %id, "Left group");
        self.publish();
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Name shown for a conversation in lists and headers.
    pub fn display_name<'a>(&'a self, chat: &'a Conversation) -> Option<&'a str> {
        chat.display_name(&self.me.id)
    }

    /// Conversations whose display name contains `query`, ignoring case.
    /// An empty query matches everything.
    pub fn search_conversations(&self, query: &str) -> Vec<&Conversation> {
        self.conversations
            .iter()
            .filter(|c| {
                self.display_name(c)
                    .map(|name| matches_query(name, query))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Contacts who could be added to a group: not yet members, and with a
    /// name containing `query`.
    pub fn available_contacts(&self, id: &ConversationId, query: &str) -> Result<Vec<&User>> {
        let chat = self
            .conversation(id)
            .ok_or_else(|| StoreError::ConversationNotFound(id.clone()))?;
        Ok(self
            .contacts
            .iter()
            .filter(|u| !chat.has_participant(&u.id) && matches_query(&u.name, query))
            .collect())
    }
}
