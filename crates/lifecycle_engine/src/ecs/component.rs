//! Component trait and shared component state
//!
//! A concrete component embeds a [`ComponentCore`] and implements
//! [`Component`] with a single accessor; the event surface, the load/unload
//! state machine and destruction come from blanket impls. Components wire
//! themselves to siblings from their own `oninit`/`onload`/`onunload`
//! handlers, looking the siblings up through [`ComponentCore::entity`].

use std::any::{type_name, Any, TypeId};
use std::cell::OnceCell;
use std::rc::{Rc, Weak};

use crate::ecs::Entity;
use crate::engine::{Engine, EngineError};
use crate::events::mixins::{DESTRUCTIBLE_EVENTS, LOADABLE_EVENTS};
use crate::events::{Destructible, EventCapable, EventEmitter, LifecycleState, Loadable};

/// State every component embeds: emitter, lifecycle flags and the owning entity
pub struct ComponentCore {
    emitter: Rc<EventEmitter>,
    lifecycle: LifecycleState,
    entity: OnceCell<Weak<Entity>>,
}

impl ComponentCore {
    /// Create the core of a component of kind `kind`.
    ///
    /// Declares `oninit`, `onload`, `onunload` and `ondestroy`; concrete
    /// components declare their own events on [`emitter`](Self::emitter).
    pub fn new(engine: &Rc<Engine>, kind: &'static str) -> Result<Self, EngineError> {
        let emitter = engine.create_emitter(kind)?;
        emitter.implement_events(&LOADABLE_EVENTS)?;
        emitter.implement_events(&DESTRUCTIBLE_EVENTS)?;
        Ok(Self {
            emitter,
            lifecycle: LifecycleState::new(),
            entity: OnceCell::new(),
        })
    }

    /// The component's emitter
    pub fn emitter(&self) -> &Rc<EventEmitter> {
        &self.emitter
    }

    /// Bind the owning entity. Returns false if already bound.
    pub fn inject_entity(&self, entity: &Rc<Entity>) -> bool {
        self.entity.set(Rc::downgrade(entity)).is_ok()
    }

    /// Whether an entity has been bound
    pub fn is_bound(&self) -> bool {
        self.entity.get().is_some()
    }

    /// Owning entity, if bound and still alive
    pub fn entity(&self) -> Option<Rc<Entity>> {
        self.entity.get().and_then(Weak::upgrade)
    }
}

impl std::fmt::Debug for ComponentCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCore")
            .field("id", &self.emitter.id())
            .field("kind", &self.emitter.kind())
            .field("flags", &self.lifecycle.flags())
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Upcasts used to look components up by concrete type
pub trait AsAny: Any {
    /// `&self` as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// `Rc<Self>` as `Rc<dyn Any>`
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A single-responsibility unit owned by exactly one [`Entity`].
///
/// The concrete Rust type is the component's kind: an entity holds at most
/// one component of each type.
pub trait Component: AsAny {
    /// Embedded component state
    fn core(&self) -> &ComponentCore;

    /// Kind label used in diagnostics
    fn kind_name(&self) -> &'static str {
        short_type_name(type_name::<Self>())
    }
}

/// Kind of a component behind a trait object
pub(crate) fn kind_of(component: &dyn Component) -> TypeId {
    component.as_any().type_id()
}

/// Downcast a shared component to its concrete type
pub(crate) fn downcast<T: Component>(component: &Rc<dyn Component>) -> Option<Rc<T>> {
    Rc::clone(component).into_any_rc().downcast::<T>().ok()
}

/// `crate::module::Type<Args>` -> `Type<Args>`
pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    let path_end = name.find('<').unwrap_or(name.len());
    name[..path_end].rfind("::").map_or(name, |index| &name[index + 2..])
}

impl<C: Component + ?Sized> EventCapable for C {
    fn emitter(&self) -> &Rc<EventEmitter> {
        &self.core().emitter
    }
}

impl<C: Component + ?Sized> Loadable for C {
    fn lifecycle(&self) -> &LifecycleState {
        &self.core().lifecycle
    }
}

impl<C: Component + ?Sized> Destructible for C {}
