//! Typing presence.
//!
//! Self typing is only ever recorded in the active conversation. The
//! debounce timer is a single slot: each keystroke replaces the pending
//! timeout, and a fire is honoured only if it is still the pending one.

use tracing::debug;

use palaver_shared::{ConversationId, UserId};

use crate::error::{Result, StoreError};
use crate::scheduler::Task;
use crate::store::ConversationStore;

impl ConversationStore {
    /// Mark self as typing in the active conversation. Returns `false` if
    /// already marked.
    pub fn start_typing(&mut self) -> Result<bool> {
        let id = self.require_active()?;
        let me = self.me.id.clone();
        let added = self.conversation_mut(&id)?.add_typing(&me);
        if added {
            debug!(conversation = %id, "Typing started");
            self.publish();
        }
        Ok(added)
    }

    /// Clear self typing in the active conversation and cancel any pending
    /// timeout. Returns `false` if self was not marked.
    pub fn stop_typing(&mut self) -> Result<bool> {
        let id = self.require_active()?;
        self.cancel_typing_timer();
        let me = self.me.id.clone();
        let removed = self.conversation_mut(&id)?.remove_typing(&me);
        if removed {
            debug!(conversation = %id, "Typing stopped");
            self.publish();
        }
        Ok(removed)
    }

    /// Register a keystroke: mark self typing and restart the idle timeout.
    pub fn keystroke(&mut self) -> Result<()> {
        let id = self.require_active()?;
        self.start_typing()?;

        self.cancel_typing_timer();
        let timeout = self.config.typing_timeout;
        let task = self
            .scheduler
            .schedule(timeout, Task::TypingTimeout { conversation: id });
        self.typing_timer = Some(task);
        Ok(())
    }

    /// The input box was emptied without sending.
    pub fn clear_input(&mut self) -> Result<bool> {
        self.stop_typing()
    }

    /// Record a counterparty starting or stopping typing.
    ///
    /// Self presence goes through [`start_typing`](Self::start_typing) and
    /// [`stop_typing`](Self::stop_typing) instead.
    pub fn set_remote_typing(
        &mut self,
        conversation: &ConversationId,
        user: &UserId,
        typing: bool,
    ) -> Result<bool> {
        if user == &self.me.id {
            return Err(StoreError::InvalidState(
                "self typing is tracked through start_typing/stop_typing".to_string(),
            ));
        }

        let chat = self.conversation_mut(conversation)?;
        if !chat.has_participant(user) {
            return Err(StoreError::UserNotFound(user.clone()));
        }
        let changed = if typing {
            chat.add_typing(user)
        } else {
            chat.remove_typing(user)
        };

        if changed {
            debug!(conversation = %conversation, user = %user, typing, "Remote typing changed");
            self.publish();
        }
        Ok(changed)
    }

    pub(crate) fn cancel_typing_timer(&mut self) {
        if let Some(task) = self.typing_timer.take() {
            self.scheduler.cancel(task);
        }
    }

    /// Drop self typing from the active conversation, if any, and cancel the
    /// timer. Used when the selection changes or a message goes out.
    pub(crate) fn clear_self_typing(&mut self) {
        self.cancel_typing_timer();
        if let Some(id) = self.active.clone() {
            let me = self.me.id.clone();
            if let Ok(chat) = self.conversation_mut(&id) {
                chat.remove_typing(&me);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::tests::{demo_store, family, sarah};

    fn self_typing(store: &ConversationStore, id: &ConversationId) -> bool {
        store.conversation(id).unwrap().is_typing(&store.me().id)
    }

    #[test]
    fn test_typing_requires_active_conversation() {
        let mut store = demo_store();
        assert_eq!(store.start_typing(), Err(StoreError::NoActiveConversation));
        assert_eq!(store.stop_typing(), Err(StoreError::NoActiveConversation));
        assert_eq!(store.keystroke(), Err(StoreError::NoActiveConversation));
    }

    #[test]
    fn test_start_stop_is_idempotent() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();

        assert_eq!(store.start_typing(), Ok(true));
        assert_eq!(store.start_typing(), Ok(false));
        assert_eq!(store.start_typing(), Ok(false));
        assert_eq!(store.conversation(&sarah()).unwrap().typing_users.len(), 1);

        assert_eq!(store.stop_typing(), Ok(true));
        assert!(!self_typing(&store, &sarah()));
        assert_eq!(store.stop_typing(), Ok(false));
    }

    #[test]
    fn test_keystroke_debounce_last_write_wins() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();

        store.keystroke().unwrap();
        store.advance(Duration::from_millis(1_500));
        store.keystroke().unwrap();
        assert_eq!(store.pending_tasks(), 1);

        // First timeout would have fired at 2000 ms; it was replaced.
        store.advance(Duration::from_millis(1_000));
        assert!(self_typing(&store, &sarah()));

        store.advance(Duration::from_millis(1_000));
        assert!(!self_typing(&store, &sarah()));
        assert_eq!(store.pending_tasks(), 0);
    }

    #[test]
    fn test_stop_cancels_pending_timeout() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();

        store.keystroke().unwrap();
        store.stop_typing().unwrap();
        assert_eq!(store.pending_tasks(), 0);

        // A later start must not be undone by the old timer.
        store.start_typing().unwrap();
        store.advance(Duration::from_secs(10));
        assert!(self_typing(&store, &sarah()));
    }

    #[test]
    fn test_clear_input_cancels_pending_timeout() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();

        store.keystroke().unwrap();
        assert_eq!(store.pending_tasks(), 1);

        assert_eq!(store.clear_input(), Ok(true));
        assert!(!self_typing(&store, &sarah()));
        assert_eq!(store.pending_tasks(), 0);
        assert_eq!(store.clear_input(), Ok(false));

        store.start_typing().unwrap();
        store.advance(Duration::from_secs(10));
        assert!(self_typing(&store, &sarah()));
    }

    #[test]
    fn test_switching_conversation_clears_self_typing() {
        let mut store = demo_store();
        store.select_conversation(Some(&sarah())).unwrap();
        store.keystroke().unwrap();

        store.select_conversation(Some(&family())).unwrap();
        assert!(!self_typing(&store, &sarah()));
        assert_eq!(store.pending_tasks(), 0);
    }

    #[test]
    fn test_remote_typing() {
        let mut store = demo_store();
        let sarah_id = UserId::from("user-2");

        assert_eq!(store.set_remote_typing(&sarah(), &sarah_id, true), Ok(true));
        assert_eq!(store.set_remote_typing(&sarah(), &sarah_id, true), Ok(false));
        assert!(store.conversation(&sarah()).unwrap().is_typing(&sarah_id));
        assert_eq!(store.set_remote_typing(&sarah(), &sarah_id, false), Ok(true));

        let me = store.me().id.clone();
        assert!(matches!(
            store.set_remote_typing(&sarah(), &me, true),
            Err(StoreError::InvalidState(_))
        ));
        assert_eq!(
            store.set_remote_typing(&sarah(), &UserId::from("user-7"), true),
            Err(StoreError::UserNotFound(UserId::from("user-7")))
        );
    }
}
