//! # palaver-store
//!
//! In-memory conversation state for the Palaver chat client.
//!
//! A single [`ConversationStore`] owns every conversation, the active
//! selection, typing presence and call history for one session. Deferred
//! effects (delivery receipts, call completion, typing timeouts) run on a
//! virtual clock that the owner advances explicitly, so the whole store is
//! deterministic under test. Renderers observe it through
//! [`ConversationStore::subscribe`].

pub mod calls;
pub mod communities;
pub mod config;
pub mod conversations;
pub mod events;
pub mod messages;
pub mod models;
pub mod scheduler;
pub mod seed;
pub mod store;
pub mod typing;

mod error;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use events::StoreSnapshot;
pub use messages::MediaFile;
pub use models::*;
pub use seed::Seed;
pub use store::ConversationStore;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use palaver_shared::{CallMedium, DeliveryStatus};

    use super::*;
    use crate::store::tests::{demo_store, sarah};

    #[tokio::test]
    async fn test_subscriber_sees_every_mutation() {
        let mut store = demo_store();
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().active.is_none());

        store.select_conversation(Some(&sarah())).unwrap();
        assert!(rx.has_changed().unwrap());
        let active = rx.borrow_and_update().active.clone().unwrap();
        assert_eq!(active.id, sarah());

        let id = store.send_text("hi").unwrap();
        let sent = rx.borrow_and_update().active.clone().unwrap();
        assert_eq!(sent.message(&id).unwrap().status, DeliveryStatus::Sent);

        store.advance(Duration::from_secs(1));
        assert!(rx.has_changed().unwrap());
        let snap = rx.borrow_and_update().clone();
        let active = snap.active.unwrap();
        assert_eq!(active.message(&id).unwrap().status, DeliveryStatus::Delivered);
        assert_eq!(Some(&active), snap.conversations.iter().find(|c| c.id == sarah()));
    }

    #[tokio::test]
    async fn test_subscriber_wakes_on_call_end() {
        let mut store = demo_store();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        let call = store.place_call(&sarah(), CallMedium::Video).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().recent_calls[0].duration_secs, 0);

        store.run_until_idle();
        rx.changed().await.unwrap();
        let snap = rx.borrow_and_update().clone();
        assert_eq!(snap.recent_calls[0].id, call);
        assert_eq!(snap.recent_calls[0].duration_secs, 3);
    }

    #[test]
    fn test_snapshot_serializes() {
        let epoch = Utc::now();
        let store = ConversationStore::new(Seed::demo(epoch), StoreConfig::default(), epoch).unwrap();
        let json = store.snapshot().to_json().unwrap();
        assert!(json.contains("\"recentCalls\":[]"));
        assert!(json.contains("\"status\":\"delivered\""));
    }
}
