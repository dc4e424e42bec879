//! Registry of live instances of one kind

use std::any::{type_name, Any};
use std::rc::{Rc, Weak};

use crate::engine::{Engine, EngineError};
use crate::events::{EventEmitter, Listener, ON_RELEASE, ON_STORE};
use crate::foundation::{CursorList, ObjectId};

/// Ordered registry of live `Rc<T>` instances.
///
/// Fires `onstore` / `onrelease` with the member (`&Rc<T>`) as payload.
/// Releasing members while the repository is being enumerated is safe: the
/// enumeration neither skips nor repeats the remaining members.
pub struct Repository<T: ?Sized> {
    emitter: Rc<EventEmitter>,
    members: CursorList<Rc<T>>,
}

impl<T: ?Sized + 'static> Repository<T> {
    /// Create an empty repository whose emitter is identified by `id`.
    ///
    /// The repository's own emitter is not tracked by the engine's emitter
    /// repository.
    pub fn new(id: ObjectId, engine: Weak<Engine>, capacity: usize) -> Self {
        let emitter = EventEmitter::new(id, "Repository", engine);
        // A fresh emitter has nothing declared, so this cannot collide
        let _ = emitter.implement_events(&[ON_STORE, ON_RELEASE]);
        Self {
            emitter: Rc::new(emitter),
            members: CursorList::with_capacity(capacity),
        }
    }

    /// The repository's emitter (`onstore`, `onrelease`)
    pub fn emitter(&self) -> &Rc<EventEmitter> {
        &self.emitter
    }

    /// Subscribe to `onstore` / `onrelease`
    pub fn add_event_listener(&self, event: &str, subscriber: ObjectId, listener: &Listener) -> Result<(), EngineError> {
        self.emitter.add_event_listener(event, subscriber, listener)
    }

    /// Remove a subscription made with [`add_event_listener`](Self::add_event_listener)
    pub fn remove_event_listener(&self, event: &str, subscriber: ObjectId, listener: &Listener) -> bool {
        self.emitter.remove_event_listener(event, subscriber, listener)
    }

    /// Number of stored members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the repository is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `member` (by identity) is stored
    pub fn contains(&self, member: &Rc<T>) -> bool {
        self.members.any(|stored| Rc::ptr_eq(stored, member))
    }

    /// Append `member` and fire `onstore`
    pub fn store(&self, member: Rc<T>) -> Result<(), EngineError> {
        self.members.push(Rc::clone(&member));
        self.emitter.fire(ON_STORE, &member)
    }

    /// Remove `member` if stored and fire `onrelease`.
    ///
    /// Returns false (firing nothing) if it was not stored.
    pub fn release(&self, member: &Rc<T>) -> Result<bool, EngineError> {
        let Some(released) = self.members.remove_first(|stored| Rc::ptr_eq(stored, member)) else {
            return Ok(false);
        };
        self.emitter.fire(ON_RELEASE, &released)?;
        Ok(true)
    }

    /// Visit every member in storage order
    pub fn for_each(&self, visit: impl FnMut(Rc<T>)) {
        self.members.for_each(visit);
    }

    /// Visit every member in storage order, stopping at the first error
    pub fn try_for_each(&self, visit: impl FnMut(Rc<T>) -> Result<(), EngineError>) -> Result<(), EngineError> {
        self.members.try_for_each(visit)
    }

    /// First member matching `predicate`
    pub fn find(&self, predicate: impl FnMut(&Rc<T>) -> bool) -> Option<Rc<T>> {
        self.members.find(predicate)
    }

    /// Snapshot of the members in storage order
    pub fn members(&self) -> Vec<Rc<T>> {
        self.members.snapshot()
    }
}

impl<T: Any> Repository<T> {
    /// Store a type-erased member, checking that it is a `T`
    pub fn store_dyn(&self, member: Rc<dyn Any>) -> Result<(), EngineError> {
        let member = member.downcast::<T>().map_err(|_| EngineError::TypeMismatch {
            container: "Repository",
            expected: type_name::<T>(),
        })?;
        self.store(member)
    }
}

impl<T: ?Sized> std::fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("id", &self.emitter.id())
            .field("len", &self.members.len())
            .finish()
    }
}
