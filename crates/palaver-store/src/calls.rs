use tracing::debug;

use palaver_shared::format::day_label;
use palaver_shared::{CallId, CallMedium, CallStatus, ConversationId};

use crate::error::{Result, StoreError};
use crate::models::CallRecord;
use crate::scheduler::Task;
use crate::store::ConversationStore;

impl ConversationStore {
    /// Start an outgoing call in a conversation.
    ///
    /// The record is prepended to the recent-calls list and appended to the
    /// conversation's own call list. Its duration is filled in when the
    /// simulated call ends.
    pub fn place_call(&mut self, id: &ConversationId, medium: CallMedium) -> Result<CallId> {
        let now = self.now();
        let placed_at = self.scheduler.now();

        let chat = self
            .conversations
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| StoreError::ConversationNotFound(id.clone()))?;

        let record = CallRecord {
            id: CallId::new(),
            participants: chat.participants.clone(),
            timestamp: now,
            duration_secs: 0,
            medium,
            status: CallStatus::Outgoing,
            placed_at,
        };
        let call = record.id.clone();
        chat.calls.push(record.clone());
        self.recent_calls.insert(0, record);

        let delay = self.config.call_end_delay;
        self.scheduler.schedule(
            delay,
            Task::EndCall {
                conversation: id.clone(),
                call: call.clone(),
            },
        );

        debug!(conversation = %id, call = %call, %medium, "Call placed");
        self.publish();
        Ok(call)
    }

    /// Stamp the elapsed duration onto both copies of a call record.
    /// Returns `false` if neither copy still exists.
    pub(crate) fn finish_call(&mut self, conversation: &ConversationId, call: &CallId) -> bool {
        let now = self.scheduler.now();
        let mut found = false;

        let stamp = |record: &mut CallRecord| {
            let elapsed = now.saturating_sub(record.placed_at).as_secs();
            record.duration_secs = elapsed.max(1);
        };

        if let Some(record) = self.recent_calls.iter_mut().find(|r| &r.id == call) {
            stamp(record);
            found = true;
        }

        if let Some(record) = self
            .conversations
            .iter_mut()
            .find(|c| &c.id == conversation)
            .and_then(|c| c.calls.iter_mut().find(|r| &r.id == call))
        {
            stamp(record);
            found = true;
        }

        if found {
            debug!(conversation = %conversation, call = %call, "Call ended");
        } else {
            debug!(conversation = %conversation, call = %call, "Call record gone, dropping");
        }
        found
    }

    /// Recent calls grouped under day headings ("Today", "Yesterday",
    /// weekday), most recent group first.
    pub fn calls_by_day(&self) -> Vec<(String, Vec<&CallRecord>)> {
        let now = self.now();
        let mut groups: Vec<(String, Vec<&CallRecord>)> = Vec::new();

        for call in &self.recent_calls {
            let label = day_label(call.timestamp, now);
            match groups.iter_mut().find(|(l, _)| *l == label) {
                Some((_, calls)) => calls.push(call),
                None => groups.push((label, vec![call])),
            }
        }
        groups
    }
}
