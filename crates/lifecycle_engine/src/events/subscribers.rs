//! Mutation-safe subscriber list backing a single event name

use crate::engine::EngineError;
use crate::events::Listener;
use crate::foundation::{CursorList, ObjectId};

#[derive(Clone)]
struct Subscription {
    subscriber: ObjectId,
    listener: Listener,
}

impl Subscription {
    fn matches(&self, subscriber: ObjectId, listener: &Listener) -> bool {
        self.subscriber == subscriber && self.listener == *listener
    }
}

/// Ordered (subscriber, listener) pairs for one event.
///
/// Listeners may unsubscribe themselves or anyone else while the list is being
/// dispatched; see [`CursorList`] for the cursor correction that keeps the
/// dispatch from skipping or repeating entries.
pub struct SubscriberList {
    owner: &'static str,
    event: &'static str,
    entries: CursorList<Subscription>,
}

impl SubscriberList {
    /// Create an empty list for `event` on an object of kind `owner`
    pub fn new(owner: &'static str, event: &'static str) -> Self {
        Self {
            owner,
            event,
            entries: CursorList::new(),
        }
    }

    /// Event this list belongs to
    pub fn event(&self) -> &'static str {
        self.event
    }

    /// Number of registered pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is subscribed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the exact pair is registered
    pub fn contains(&self, subscriber: ObjectId, listener: &Listener) -> bool {
        self.entries.any(|entry| entry.matches(subscriber, listener))
    }

    /// Append a pair, rejecting exact duplicates
    pub fn push(&self, subscriber: ObjectId, listener: Listener) -> Result<(), EngineError> {
        if self.contains(subscriber, &listener) {
            return Err(EngineError::DuplicateSubscription {
                target: self.owner,
                event: self.event,
                subscriber,
            });
        }
        self.entries.push(Subscription { subscriber, listener });
        Ok(())
    }

    /// Remove a pair; returns false if it was not registered
    pub fn remove(&self, subscriber: ObjectId, listener: &Listener) -> bool {
        self.entries
            .remove_first(|entry| entry.matches(subscriber, listener))
            .is_some()
    }

    /// Remove every pair registered by `subscriber`
    pub fn purge(&self, subscriber: ObjectId) -> usize {
        self.entries.remove_all(|entry| entry.subscriber == subscriber)
    }

    /// Invoke `visit` for every live pair in subscription order, stopping at the first error
    pub fn for_each(
        &self,
        mut visit: impl FnMut(ObjectId, &Listener) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        self.entries
            .try_for_each(|entry| visit(entry.subscriber, &entry.listener))
    }
}

impl std::fmt::Debug for SubscriberList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberList")
            .field("event", &self.event)
            .field("len", &self.len())
            .finish()
    }
}
