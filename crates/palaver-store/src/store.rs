//! The conversation store: sole owner and mutator of session state.
//!
//! Operations live in topic modules (`messages`, `typing`, `conversations`,
//! `calls`, `communities`) as further `impl ConversationStore` blocks. This
//! module holds the state itself, the clock, and timer dispatch.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use palaver_shared::{CommunityId, ConversationId, DeliveryStatus, UserId};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::events::{SnapshotPublisher, StoreSnapshot};
use crate::models::{CallRecord, Community, Conversation, User};
use crate::scheduler::{Scheduler, Task, TaskId};
use crate::seed::Seed;

/// In-memory state for one chat session.
///
/// The active conversation is tracked by id and always resolved against the
/// conversation list, so the two can never disagree.
#[derive(Debug)]
pub struct ConversationStore {
    pub(crate) config: StoreConfig,
    /// Wall-clock anchor for virtual time zero.
    pub(crate) epoch: DateTime<Utc>,
    pub(crate) scheduler: Scheduler,
    pub(crate) me: User,
    pub(crate) contacts: Vec<User>,
    pub(crate) conversations: Vec<Conversation>,
    pub(crate) communities: Vec<Community>,
    pub(crate) recent_calls: Vec<CallRecord>,
    pub(crate) active: Option<ConversationId>,
    pub(crate) active_community: Option<CommunityId>,
    /// Pending debounce task for the self typing indicator.
    pub(crate) typing_timer: Option<TaskId>,
    publisher: SnapshotPublisher,
}

impl ConversationStore {
    /// Build a store from seed data. `epoch` is the wall-clock time that
    /// virtual time zero maps to.
    ///
    /// Rejects seeds with duplicate conversation ids, duplicate participants,
    /// seeded self typing, or communities referring to unknown conversations.
    pub fn new(seed: Seed, config: StoreConfig, epoch: DateTime<Utc>) -> Result<Self> {
        validate_seed(&seed)?;

        info!(
            conversations = seed.conversations.len(),
            contacts = seed.contacts.len(),
            communities = seed.communities.len(),
            "Conversation store seeded"
        );

        let store = Self {
            config,
            epoch,
            scheduler: Scheduler::new(),
            me: seed.me,
            contacts: seed.contacts,
            conversations: seed.conversations,
            communities: seed.communities,
            recent_calls: Vec::new(),
            active: None,
            active_community: None,
            typing_timer: None,
            publisher: SnapshotPublisher::new(StoreSnapshot::default()),
        };
        store.publisher.publish(store.snapshot());
        Ok(store)
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn me(&self) -> &User {
        &self.me
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn contacts(&self) -> &[User] {
        &self.contacts
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn conversation(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active.as_ref().and_then(|id| self.conversation(id))
    }

    pub fn active_id(&self) -> Option<&ConversationId> {
        self.active.as_ref()
    }

    pub fn recent_calls(&self) -> &[CallRecord] {
        &self.recent_calls
    }

    /// Look up a user by id, self included.
    pub fn user(&self, id: &UserId) -> Option<&User> {
        if id == &self.me.id {
            return Some(&self.me);
        }
        self.contacts.iter().find(|u| &u.id == id)
    }

    /// Virtual time elapsed since the session started.
    pub fn elapsed(&self) -> Duration {
        self.scheduler.now()
    }

    /// Session wall-clock time: `epoch` plus elapsed virtual time.
    pub fn now(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.scheduler.now())
            .ok()
            .and_then(|d| self.epoch.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Number of timer tasks still waiting to fire.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            now: self.now(),
            conversations: self.conversations.clone(),
            active: self.active().cloned(),
            active_community: self.active_community().cloned(),
            recent_calls: self.recent_calls.clone(),
        }
    }

    /// Subscribe to snapshots. The receiver starts at the current state and
    /// sees a new value after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.publisher.publish(self.snapshot());
        self.publisher.subscribe()
    }

    pub(crate) fn publish(&self) {
        if self.publisher.has_subscribers() {
            self.publisher.publish(self.snapshot());
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Make `id` the active conversation, or clear the selection with `None`.
    ///
    /// Leaving a conversation drops the self typing indicator there. Fails
    /// if the conversation is unknown or self is no longer a participant.
    pub fn select_conversation(&mut self, id: Option<&ConversationId>) -> Result<()> {
        if let Some(id) = id {
            let chat = self
                .conversation(id)
                .ok_or_else(|| StoreError::ConversationNotFound(id.clone()))?;
            if !chat.has_participant(&self.me.id) {
                return Err(StoreError::InvalidState(format!(
                    "not a participant of {id}"
                )));
            }
        }

        self.clear_self_typing();
        self.active = id.cloned();

        debug!(conversation = ?self.active, "Active conversation changed");
        self.publish();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internal lookups
    // ------------------------------------------------------------------

    pub(crate) fn require_active(&self) -> Result<ConversationId> {
        self.active.clone().ok_or(StoreError::NoActiveConversation)
    }

    pub(crate) fn conversation_mut(&mut self, id: &ConversationId) -> Result<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| StoreError::ConversationNotFound(id.clone()))
    }

    // ------------------------------------------------------------------
    // Virtual time
    // ------------------------------------------------------------------

    /// Advance virtual time by `by`, applying every task that falls due in
    /// the window in due-time order. Returns the number of tasks applied.
    pub fn advance(&mut self, by: Duration) -> usize {
        let until = self.scheduler.now().saturating_add(by);
        let mut applied = 0;
        while let Some((id, task)) = self.scheduler.pop_due(until) {
            self.apply(id, task);
            applied += 1;
        }
        self.scheduler.advance_clock_to(until);
        applied
    }

    /// Apply every pending task, however far in the future.
    pub fn run_until_idle(&mut self) -> usize {
        let mut applied = 0;
        while let Some((id, task)) = self.scheduler.pop_due(Duration::MAX) {
            self.apply(id, task);
            applied += 1;
        }
        applied
    }

    /// Run a fired task. Targets that no longer exist are skipped.
    fn apply(&mut self, id: TaskId, task: Task) {
        let changed = match task {
            Task::DeliverMessage {
                conversation,
                message,
            } => {
                let delivered = self
                    .conversations
                    .iter_mut()
                    .find(|c| c.id == conversation)
                    .and_then(|c| c.message_mut(&message))
                    .map(|m| m.status.advance_to(DeliveryStatus::Delivered));
                match delivered {
                    Some(changed) => {
                        debug!(conversation = %conversation, message = %message, "Message delivered");
                        changed
                    }
                    None => {
                        debug!(conversation = %conversation, message = %message, "Delivery target gone, dropping");
                        false
                    }
                }
            }
            Task::EndCall { conversation, call } => self.finish_call(&conversation, &call),
            Task::TypingTimeout { conversation } => {
                if self.typing_timer != Some(id) {
                    debug!(conversation = %conversation, "Stale typing timeout, dropping");
                    false
                } else {
                    self.typing_timer = None;
                    let me = self.me.id.clone();
                    match self.conversation_mut(&conversation) {
                        Ok(chat) => chat.remove_typing(&me),
                        Err(_) => false,
                    }
                }
            }
        };

        if changed {
            self.publish();
        }
    }
}

fn validate_seed(seed: &Seed) -> Result<()> {
    let mut ids = HashSet::new();
    for chat in &seed.conversations {
        if !ids.insert(&chat.id) {
            return Err(StoreError::InvalidState(format!(
                "duplicate conversation {}",
                chat.id
            )));
        }

        let mut members = HashSet::new();
        if let Some(dup) = chat.participants.iter().find(|p| !members.insert(&p.id)) {
            return Err(StoreError::InvalidState(format!(
                "{} listed twice in {}",
                dup.id, chat.id
            )));
        }

        if chat.is_typing(&seed.me.id) {
            return Err(StoreError::InvalidState(format!(
                "self seeded as typing in {}",
                chat.id
            )));
        }
    }

    for community in &seed.communities {
        if let Some(missing) = community.groups.iter().find(|g| !ids.contains(g)) {
            return Err(StoreError::ConversationNotFound(missing.clone()));
        }
    }

    Ok(())
}
