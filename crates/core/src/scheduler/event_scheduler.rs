use std::time::{Duration, Instant};

use anyhow::Result;

/// Opaque handle returned by `schedule`, usable to cancel a pending event.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EventHandle(u64);

struct ScheduledEvent<A> {
    handle: EventHandle,
    deadline: Instant,
    action: A,
}

/// Cooperative one-shot timer multiplexer.
///
/// Holds a small unordered set of pending (deadline, action) pairs and fires
/// every due action when the host loop calls `poll` or `take_due`. Each event
/// fires at most once and is removed afterwards. Due events fire earliest
/// deadline first; ties fire in registration order (the handle sequence
/// doubles as the tiebreaker).
pub struct EventScheduler<A> {
    events: Vec<ScheduledEvent<A>>,
    next_id: u64,
}

impl<A> EventScheduler<A> {
    pub fn new() -> Self {
        EventScheduler {
            events: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers `action` to fire once, no sooner than `now + delay`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, action: A) -> EventHandle {
        let handle = EventHandle(self.next_id);
        self.next_id += 1;
        self.events.push(ScheduledEvent {
            handle,
            deadline: now + delay,
            action,
        });
        handle
    }

    /// Removes a pending event. Returns false for an already-fired or unknown
    /// handle.
    pub fn cancel(&mut self, handle: EventHandle) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.handle != handle);
        self.events.len() != before
    }

    /// Removes and returns every action whose deadline has elapsed, sorted by
    /// deadline then registration order. Extracting before executing keeps the
    /// pending set free for actions to schedule new events mid-pass.
    pub fn take_due(&mut self, now: Instant) -> Vec<A> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.events.len() {
            if self.events[i].deadline <= now {
                due.push(self.events.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| {
            a.deadline
                .cmp(&b.deadline)
                .then(a.handle.0.cmp(&b.handle.0))
        });
        due.into_iter().map(|event| event.action).collect()
    }

    /// Fires every due action through `handler`. A handler error is logged
    /// and does not stop later due actions in the same pass.
    pub fn poll<F>(&mut self, now: Instant, mut handler: F)
    where
        F: FnMut(A) -> Result<()>,
    {
        for action in self.take_due(now) {
            if let Err(err) = handler(action) {
                log::warn!("scheduled action failed: {:#}", err);
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<A> Default for EventScheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}
