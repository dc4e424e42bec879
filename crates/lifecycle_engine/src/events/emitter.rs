//! Per-object named-event registry

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::engine::{Engine, EngineError};
use crate::events::{Event, Listener, SubscriberList};
use crate::foundation::collections::Key;
use crate::foundation::ObjectId;

/// Named-event registry owned by every event-capable object.
///
/// Events must be declared with [`implement_events`](Self::implement_events)
/// before anything can fire or subscribe to them. Subscriber lists are created
/// lazily on first subscription, so firing a declared event nobody listens to
/// is free.
pub struct EventEmitter {
    id: ObjectId,
    kind: &'static str,
    engine: Weak<Engine>,
    declared: RefCell<Vec<&'static str>>,
    subscribers: RefCell<HashMap<&'static str, Rc<SubscriberList>>>,
}

impl EventEmitter {
    /// Create an emitter for object `id` of kind `kind`.
    ///
    /// Use [`Engine::create_emitter`] for emitters that must be tracked by the
    /// engine's emitter repository.
    pub fn new(id: ObjectId, kind: &'static str, engine: Weak<Engine>) -> Self {
        Self {
            id,
            kind,
            engine,
            declared: RefCell::new(Vec::new()),
            subscribers: RefCell::new(HashMap::new()),
        }
    }

    /// Identity of the owning object
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Kind label of the owning object, used in diagnostics
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Engine context this emitter belongs to, if it is still alive
    pub fn engine(&self) -> Option<Rc<Engine>> {
        self.engine.upgrade()
    }

    /// Declare supported event names.
    ///
    /// Fails without declaring anything if a name is already declared or
    /// repeated in `names`.
    pub fn implement_events(&self, names: &[&'static str]) -> Result<(), EngineError> {
        let mut declared = self.declared.borrow_mut();
        for (index, &name) in names.iter().enumerate() {
            if declared.contains(&name) || names[..index].contains(&name) {
                return Err(EngineError::DuplicateEventDeclaration {
                    target: self.kind,
                    event: name,
                });
            }
        }
        declared.extend_from_slice(names);
        Ok(())
    }

    /// Whether `event` has been declared
    pub fn has_event(&self, event: &str) -> bool {
        self.declared_name(event).is_some()
    }

    /// Declared event names in declaration order
    pub fn events(&self) -> Vec<&'static str> {
        self.declared.borrow().clone()
    }

    /// Number of pairs subscribed to `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.subscribers
            .borrow()
            .get(event)
            .map_or(0, |list| list.len())
    }

    /// Subscribe `listener` on behalf of `subscriber`
    pub fn add_event_listener(
        &self,
        event: &str,
        subscriber: ObjectId,
        listener: &Listener,
    ) -> Result<(), EngineError> {
        let name = self.require_declared(event)?;
        self.validate_subscriber(name, subscriber)?;

        let list = Rc::clone(
            self.subscribers
                .borrow_mut()
                .entry(name)
                .or_insert_with(|| Rc::new(SubscriberList::new(self.kind, name))),
        );
        list.push(subscriber, listener.clone())
    }

    /// Unsubscribe a pair.
    ///
    /// Returns false if the pair (or the event) is unknown; cleanup paths may
    /// call this for pairs that are already gone.
    pub fn remove_event_listener(&self, event: &str, subscriber: ObjectId, listener: &Listener) -> bool {
        let list = self.subscribers.borrow().get(event).cloned();
        list.is_some_and(|list| list.remove(subscriber, listener))
    }

    /// Remove every subscription `subscriber` holds on this emitter
    pub fn purge_listeners_of(&self, subscriber: ObjectId) -> usize {
        let lists: Vec<_> = self.subscribers.borrow().values().cloned().collect();
        lists.iter().map(|list| list.purge(subscriber)).sum()
    }

    /// Deliver `event` with `payload` to every live listener in subscription order.
    ///
    /// The first listener error aborts the dispatch and is returned.
    pub fn fire(&self, event: &str, payload: &dyn Any) -> Result<(), EngineError> {
        let name = self.require_declared(event)?;
        let list = self.subscribers.borrow().get(name).cloned();
        let Some(list) = list else {
            return Ok(());
        };

        log::trace!("{} {:?} fires {} ({} listeners)", self.kind, self.id, name, list.len());
        let event = Event::new(name, self.id, payload);
        list.for_each(|_, listener| listener.call(&event))
    }

    fn declared_name(&self, event: &str) -> Option<&'static str> {
        self.declared
            .borrow()
            .iter()
            .copied()
            .find(|name| *name == event)
    }

    fn require_declared(&self, event: &str) -> Result<&'static str, EngineError> {
        self.declared_name(event).ok_or_else(|| EngineError::UnknownEvent {
            target: self.kind,
            event: event.to_string(),
        })
    }

    fn validate_subscriber(&self, event: &'static str, subscriber: ObjectId) -> Result<(), EngineError> {
        let invalid = || EngineError::InvalidSubscriber {
            target: self.kind,
            event,
        };
        if subscriber.is_null() {
            return Err(invalid());
        }
        if let Some(engine) = self.engine() {
            if engine.config().events.strict_subscribers && !engine.is_live(subscriber) {
                return Err(invalid());
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("events", &self.declared.borrow())
            .finish_non_exhaustive()
    }
}

/// Capability of owning an [`EventEmitter`].
///
/// Implementors get the subscription surface for free.
pub trait EventCapable {
    /// The object's emitter
    fn emitter(&self) -> &Rc<EventEmitter>;

    /// Identity of the object
    fn id(&self) -> ObjectId {
        self.emitter().id()
    }

    /// Whether the object supports `event`
    fn has_event(&self, event: &str) -> bool {
        self.emitter().has_event(event)
    }

    /// Subscribe `listener` to one of this object's events on behalf of `subscriber`
    fn add_event_listener(&self, event: &str, subscriber: ObjectId, listener: &Listener) -> Result<(), EngineError> {
        self.emitter().add_event_listener(event, subscriber, listener)
    }

    /// Remove a subscription made with [`add_event_listener`](Self::add_event_listener)
    fn remove_event_listener(&self, event: &str, subscriber: ObjectId, listener: &Listener) -> bool {
        self.emitter().remove_event_listener(event, subscriber, listener)
    }
}
