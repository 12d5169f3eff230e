//! Read-only snapshots published to renderers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::models::{CallRecord, Community, Conversation};

/// Everything a renderer needs to draw the current state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Session wall-clock time at which the snapshot was taken.
    pub now: DateTime<Utc>,
    pub conversations: Vec<Conversation>,
    /// Copy of the active entry in `conversations`.
    pub active: Option<Conversation>,
    pub active_community: Option<Community>,
    /// Most recent first.
    pub recent_calls: Vec<CallRecord>,
}

impl StoreSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Fan-out of snapshots to any number of subscribers.
#[derive(Debug)]
pub(crate) struct SnapshotPublisher {
    tx: watch::Sender<StoreSnapshot>,
}

impl SnapshotPublisher {
    pub(crate) fn new(initial: StoreSnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub(crate) fn has_subscribers(&self) -> bool {
        self.tx.receiver_count() > 0
    }

    pub(crate) fn publish(&self, snapshot: StoreSnapshot) {
        self.tx.send_replace(snapshot);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }
}
