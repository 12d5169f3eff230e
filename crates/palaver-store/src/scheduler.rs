//! Virtual-time task queue.
//!
//! Nothing here sleeps. Time only moves when the owner pops due tasks, so
//! tests can step the clock deterministically.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

use palaver_shared::{CallId, ConversationId, MessageId};

/// Deferred store updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Advance a message from `sent` to `delivered`.
    DeliverMessage {
        conversation: ConversationId,
        message: MessageId,
    },

    /// Stamp the final duration onto a call record.
    EndCall {
        conversation: ConversationId,
        call: CallId,
    },

    /// Clear the self typing indicator after the debounce window.
    TypingTimeout { conversation: ConversationId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Task scheduled to run at a specific virtual time
#[derive(Debug, Clone)]
struct ScheduledTask {
    due: Duration,
    id: TaskId,
    task: Task,
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; equal due times run in scheduling order.
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Priority queue of pending tasks plus the virtual clock.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    heap: BinaryHeap<ScheduledTask>,
    cancelled: HashSet<TaskId>,
    counter: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since the session started.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to run `delay` after the current virtual time.
    pub fn schedule(&mut self, delay: Duration, task: Task) -> TaskId {
        let id = TaskId(self.counter);
        self.counter += 1;

        self.heap.push(ScheduledTask {
            due: self.now.saturating_add(delay),
            id,
            task,
        });
        id
    }

    /// Cancel a pending task. Returns `false` if it already ran, was already
    /// cancelled, or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if !self.heap.iter().any(|t| t.id == id) {
            return false;
        }
        self.cancelled.insert(id)
    }

    /// Remove and return the earliest live task due at or before `until`,
    /// moving the clock forward to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskId, Task)> {
        while let Some(next) = self.heap.peek() {
            if next.due > until {
                return None;
            }
            let scheduled = self.heap.pop()?;
            if self.cancelled.remove(&scheduled.id) {
                continue;
            }
            self.now = self.now.max(scheduled.due);
            return Some((scheduled.id, scheduled.task));
        }
        None
    }

    /// Move the clock forward without running anything. Never moves it back.
    pub fn advance_clock_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    /// Due time of the next live task.
    pub fn next_due(&self) -> Option<Duration> {
        self.heap
            .iter()
            .filter(|t| !self.cancelled.contains(&t.id))
            .map(|t| t.due)
            .min()
    }

    /// Number of live (not cancelled) tasks.
    pub fn pending(&self) -> usize {
        self.heap.len() - self.cancelled.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}
