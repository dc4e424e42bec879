//! Event system for the object lifecycle
//!
//! Key principles:
//! - Named events, declared per object before use
//! - Listeners are registered as (subscriber, callback) pairs
//! - Immediate, synchronous delivery in subscription order
//! - Listeners may subscribe, unsubscribe or destroy objects mid-dispatch
//!
//! ## Architecture
//!
//! ```text
//! EventEmitter ──owns──► SubscriberList (per event name)
//!      ▲                        │
//!      │                        └── CursorList<(ObjectId, Listener)>
//!      │
//! Loadable / Destructible (traits with provided state machines)
//! ```

pub mod emitter;
pub mod mixins;
pub mod subscribers;

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::engine::EngineError;
use crate::foundation::ObjectId;

pub use emitter::{EventCapable, EventEmitter};
pub use mixins::{Destructible, LifecycleFlags, LifecycleState, Loadable};
pub use subscribers::SubscriberList;

/// Fired once, immediately before the first `onload`
pub const ON_INIT: &str = "oninit";
/// Fired when an object becomes loaded
pub const ON_LOAD: &str = "onload";
/// Fired when an object stops being loaded
pub const ON_UNLOAD: &str = "onunload";
/// Fired when an object is destroyed, before it is unloaded
pub const ON_DESTROY: &str = "ondestroy";
/// Fired by a repository after a member is stored
pub const ON_STORE: &str = "onstore";
/// Fired by a repository after a member is released
pub const ON_RELEASE: &str = "onrelease";

/// An event being delivered to a listener
#[derive(Clone, Copy)]
pub struct Event<'a> {
    name: &'static str,
    source: ObjectId,
    payload: &'a dyn Any,
}

impl<'a> Event<'a> {
    /// Create an event fired by `source`
    pub fn new(name: &'static str, source: ObjectId, payload: &'a dyn Any) -> Self {
        Self { name, source, payload }
    }

    /// Event name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Identity of the emitting object
    pub fn source(&self) -> ObjectId {
        self.source
    }

    /// Typed view of the payload, if it has type `T`
    pub fn payload<T: Any>(&self) -> Option<&'a T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

type Callback = dyn Fn(&Event<'_>) -> Result<(), EngineError>;

/// Shared event callback
///
/// Two listeners are equal when they are clones of the same callback, which is
/// what makes a (subscriber, listener) pair removable after registration.
#[derive(Clone)]
pub struct Listener(Rc<Callback>);

impl Listener {
    /// Wrap a callback
    pub fn new(callback: impl Fn(&Event<'_>) -> Result<(), EngineError> + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Callback that runs `handler` on `target` while it is still alive
    ///
    /// Once `target` has been dropped the listener does nothing.
    pub fn bind<T: 'static>(
        target: Weak<T>,
        handler: impl Fn(&T, &Event<'_>) -> Result<(), EngineError> + 'static,
    ) -> Self {
        Self::new(move |event| match target.upgrade() {
            Some(target) => handler(&target, event),
            None => Ok(()),
        })
    }

    /// Invoke the callback
    pub fn call(&self, event: &Event<'_>) -> Result<(), EngineError> {
        (self.0)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_listener_identity() {
        let first = Listener::new(|_| Ok(()));
        let second = Listener::new(|_| Ok(()));

        assert_eq!(first, first.clone());
        assert_ne!(first, second);
    }

    #[test]
    fn test_payload_downcast() {
        let value = 42_u32;
        let event = Event::new(ON_STORE, ObjectId::default(), &value);

        assert_eq!(event.payload::<u32>(), Some(&42));
        assert_eq!(event.payload::<String>(), None);
        assert_eq!(event.name(), "onstore");
    }

    #[test]
    fn test_bound_listener_stops_after_drop() {
        let counter = Rc::new(Cell::new(0));
        let listener = Listener::bind(Rc::downgrade(&counter), |counter, _| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        let event = Event::new(ON_LOAD, ObjectId::default(), &());

        listener.call(&event).unwrap();
        assert_eq!(counter.get(), 1);

        drop(counter);
        assert!(listener.call(&event).is_ok());
    }
}
