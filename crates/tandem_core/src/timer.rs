//! Revocable timer queue
//!
//! Every scheduled task gets its own [`TimerId`] handle and can be revoked
//! individually. [`TimerQueue::cancel_all`] revokes every outstanding task in
//! one step, so nothing scheduled before the call can fire after it.
//!
//! The queue never looks at a clock itself: callers pass the current reading
//! to [`TimerQueue::pop_due`] from their cooperative loop.

use crate::clock::Millis;
use slotmap::{new_key_type, SlotMap};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

new_key_type! {
    /// Handle for one scheduled task
    pub struct TimerId;
}

struct Entry<T> {
    due: Millis,
    payload: T,
}

/// Deadline-ordered queue of revocable tasks.
///
/// Tasks with equal deadlines fire in scheduling order.
pub struct TimerQueue<T> {
    entries: SlotMap<TimerId, Entry<T>>,
    /// Firing order. Entries for revoked tasks are skipped lazily.
    order: BinaryHeap<Reverse<(Millis, u64, TimerId)>>,
    next_seq: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` to become due at the absolute reading `due`.
    pub fn schedule(&mut self, due: Millis, payload: T) -> TimerId {
        let id = self.entries.insert(Entry { due, payload });
        self.order.push(Reverse((due, self.next_seq, id)));
        self.next_seq += 1;
        id
    }

    /// Schedule `payload` to become due `delay` milliseconds after `now`.
    pub fn schedule_after(&mut self, now: Millis, delay: Millis, payload: T) -> TimerId {
        self.schedule(now.saturating_add(delay), payload)
    }

    /// Revoke a single task. Returns its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.entries.remove(id).map(|entry| entry.payload)
    }

    /// Revoke every outstanding task. Returns how many were revoked.
    pub fn cancel_all(&mut self) -> usize {
        let revoked = self.entries.len();
        self.entries.clear();
        self.order.clear();
        revoked
    }

    /// Whether the task behind `id` is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.contains_key(id)
    }

    /// Deadline of a pending task.
    pub fn due_at(&self, id: TimerId) -> Option<Millis> {
        self.entries.get(id).map(|entry| entry.due)
    }

    /// Number of outstanding tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest deadline among outstanding tasks.
    pub fn next_due(&mut self) -> Option<Millis> {
        self.discard_revoked_head();
        self.order.peek().map(|Reverse((due, _, _))| *due)
    }

    /// Remove and return the earliest task whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(TimerId, T)> {
        self.discard_revoked_head();
        let Reverse((due, _, id)) = *self.order.peek()?;
        if due > now {
            return None;
        }
        self.order.pop();
        self.entries.remove(id).map(|entry| (id, entry.payload))
    }

    /// Remove and return every task due at or before `now`, in firing order.
    pub fn drain_due(&mut self, now: Millis) -> Vec<T> {
        let mut fired = Vec::new();
        while let Some((_, payload)) = self.pop_due(now) {
            fired.push(payload);
        }
        fired
    }

    fn discard_revoked_head(&mut self) {
        while let Some(Reverse((_, _, id))) = self.order.peek() {
            if self.entries.contains_key(*id) {
                break;
            }
            self.order.pop();
        }
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TimerQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.entries.len())
            .finish()
    }
}
