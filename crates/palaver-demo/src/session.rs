//! Drives a [`ConversationStore`] against wall-clock time.

use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

use palaver_store::ConversationStore;

/// Owns the store and maps elapsed real time onto its virtual clock.
pub struct Session {
    store: ConversationStore,
    tick: Duration,
}

impl Session {
    pub fn new(store: ConversationStore, tick: Duration) -> Self {
        Self { store, tick }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConversationStore {
        &mut self.store
    }

    /// Let `duration` of real time pass, advancing the store each tick.
    pub async fn wait(&mut self, duration: Duration) {
        let start = Instant::now();
        let mut last = start;
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while last.duration_since(start) < duration {
            ticker.tick().await;
            let now = Instant::now();
            let step = now.duration_since(last).min(duration - last.duration_since(start));
            let applied = self.store.advance(step);
            if applied > 0 {
                debug!(applied, elapsed = ?self.store.elapsed(), "Timers fired");
            }
            last = now;
        }
    }

    /// Flush outstanding timers and hand the store back.
    pub fn finish(mut self) -> ConversationStore {
        self.store.run_until_idle();
        self.store
    }
}
