//! Entity implementation
//!
//! An entity is a composite of uniquely-kinded components and child entities.
//! It drives their lifecycles from handlers on its own events:
//!
//! - `onload`: components first, then children
//! - `onunload`: children first, then components
//! - `ondestroy`: children, then components, then release from the entity repository

use std::any::{type_name, TypeId};
use std::rc::{Rc, Weak};

use crate::ecs::component::{downcast, kind_of, short_type_name};
use crate::ecs::Component;
use crate::engine::{Engine, EngineError};
use crate::events::mixins::{DESTRUCTIBLE_EVENTS, LOADABLE_EVENTS};
use crate::events::{
    Destructible, Event, EventCapable, EventEmitter, LifecycleState, Listener, Loadable, ON_DESTROY, ON_LOAD,
    ON_UNLOAD,
};
use crate::foundation::{CursorList, ObjectId};

/// Composite runtime object, the unit of scene composition
pub struct Entity {
    this: Weak<Entity>,
    emitter: Rc<EventEmitter>,
    lifecycle: LifecycleState,
    components: CursorList<Rc<dyn Component>>,
    children: CursorList<Rc<Entity>>,

    /// Subscribed to each child's `ondestroy`; detaches the child
    child_listener: Listener,
}

impl Entity {
    /// Create a plain entity and store it in the engine's entity repository
    pub fn new(engine: &Rc<Engine>) -> Result<Rc<Self>, EngineError> {
        Self::named(engine, "Entity")
    }

    /// Create an entity labelled `kind` (e.g. `"AndGate"`) for diagnostics
    pub fn named(engine: &Rc<Engine>, kind: &'static str) -> Result<Rc<Self>, EngineError> {
        let emitter = engine.create_emitter(kind)?;
        emitter.implement_events(&LOADABLE_EVENTS)?;
        emitter.implement_events(&DESTRUCTIBLE_EVENTS)?;

        let entity = Rc::new_cyclic(|this: &Weak<Self>| Self {
            this: this.clone(),
            emitter,
            lifecycle: LifecycleState::new(),
            components: CursorList::new(),
            children: CursorList::new(),
            child_listener: Listener::bind(this.clone(), |entity: &Self, event| {
                entity.detach_destroyed_child(event.source());
                Ok(())
            }),
        });

        // Cascades run before any outside observer of the same event
        let id = entity.id();
        let this = Rc::downgrade(&entity);
        entity.add_event_listener(ON_LOAD, id, &Listener::bind(this.clone(), Self::cascade_load))?;
        entity.add_event_listener(ON_UNLOAD, id, &Listener::bind(this.clone(), Self::cascade_unload))?;
        entity.add_event_listener(ON_DESTROY, id, &Listener::bind(this, Self::cascade_destroy))?;

        engine.entities().store(Rc::clone(&entity))?;
        log::debug!("Created {} {:?}", kind, id);
        Ok(entity)
    }

    /// Kind label
    pub fn kind(&self) -> &'static str {
        self.emitter.kind()
    }

    /// Attach `component`.
    ///
    /// Fails if this entity is destroyed, if a component of the same type is
    /// present or if the component already belongs to another entity; the
    /// entity is unchanged on failure.
    /// A loaded entity is reloaded so the new component receives its lifecycle
    /// hooks in order with its siblings.
    pub fn add_component(&self, component: Rc<dyn Component>) -> Result<(), EngineError> {
        self.ensure_alive()?;
        let kind = kind_of(&*component);
        if self.components.any(|existing| kind_of(&**existing) == kind) {
            return Err(EngineError::DuplicateComponent {
                entity: self.kind(),
                component: component.kind_name(),
            });
        }

        let bound = self
            .this
            .upgrade()
            .is_some_and(|this| component.core().inject_entity(&this));
        if !bound {
            return Err(EngineError::ComponentBinding {
                entity: self.kind(),
                component: component.kind_name(),
            });
        }

        log::debug!("{} {:?} adds {}", self.kind(), self.id(), component.kind_name());
        self.components.push(component);
        if self.is_loaded() {
            self.reload()?;
        }
        Ok(())
    }

    /// Detach and destroy `component` if attached. Returns whether it was.
    pub fn remove_component<C: Component + ?Sized>(&self, component: &Rc<C>) -> Result<bool, EngineError> {
        let target = Rc::as_ptr(component).cast::<()>();
        let Some(removed) = self
            .components
            .remove_first(|existing| Rc::as_ptr(existing).cast::<()>() == target)
        else {
            return Ok(false);
        };

        log::debug!("{} {:?} removes {}", self.kind(), self.id(), removed.kind_name());
        removed.destroy()?;
        Ok(true)
    }

    /// Component of type `C`, if attached
    pub fn get_component<C: Component>(&self) -> Option<Rc<C>> {
        self.components
            .find(|component| kind_of(&**component) == TypeId::of::<C>())
            .and_then(|component| downcast(&component))
    }

    /// Whether a component of type `C` is attached
    pub fn has_component<C: Component>(&self) -> bool {
        self.components.any(|component| kind_of(&**component) == TypeId::of::<C>())
    }

    /// Component of type `C`, or [`EngineError::MissingComponent`]
    pub fn require_component<C: Component>(&self) -> Result<Rc<C>, EngineError> {
        self.get_component().ok_or_else(|| EngineError::MissingComponent {
            entity: self.kind(),
            component: short_type_name(type_name::<C>()),
        })
    }

    /// Attached components in insertion order
    pub fn components(&self) -> Vec<Rc<dyn Component>> {
        self.components.snapshot()
    }

    /// Attach `child`; it is loaded right away if this entity is loaded.
    ///
    /// A child that gets destroyed detaches itself.
    pub fn add_child(&self, child: &Rc<Entity>) -> Result<(), EngineError> {
        self.ensure_alive()?;
        if std::ptr::eq(Rc::as_ptr(child), self) || child.is_destroyed() {
            return Err(EngineError::InvalidMember {
                container: self.kind(),
                expected: "a live entity other than itself",
            });
        }
        if self.has_child(child) {
            return Err(EngineError::DuplicateMember { container: self.kind() });
        }

        child.add_event_listener(ON_DESTROY, self.id(), &self.child_listener)?;
        self.children.push(Rc::clone(child));
        log::debug!("{} {:?} adopts {} {:?}", self.kind(), self.id(), child.kind(), child.id());
        if self.is_loaded() {
            child.load()?;
        }
        Ok(())
    }

    /// Detach `child` without unloading it. Returns whether it was attached.
    pub fn remove_child(&self, child: &Rc<Entity>) -> bool {
        if self.children.remove_first(|existing| Rc::ptr_eq(existing, child)).is_none() {
            return false;
        }
        child.remove_event_listener(ON_DESTROY, self.id(), &self.child_listener);
        true
    }

    /// Whether `child` is attached
    pub fn has_child(&self, child: &Rc<Entity>) -> bool {
        self.children.any(|existing| Rc::ptr_eq(existing, child))
    }

    /// Child entities in insertion order
    pub fn children(&self) -> Vec<Rc<Entity>> {
        self.children.snapshot()
    }

    fn ensure_alive(&self) -> Result<(), EngineError> {
        if self.is_destroyed() {
            return Err(EngineError::InvalidMember {
                container: self.kind(),
                expected: "a live container",
            });
        }
        Ok(())
    }

    fn detach_destroyed_child(&self, child: ObjectId) {
        if let Some(child) = self.children.remove_first(|existing| existing.id() == child) {
            child.remove_event_listener(ON_DESTROY, self.id(), &self.child_listener);
        }
    }

    fn cascade_load(&self, _: &Event<'_>) -> Result<(), EngineError> {
        self.components.try_for_each(|component| component.load())?;
        self.children.try_for_each(|child| child.load())
    }

    fn cascade_unload(&self, _: &Event<'_>) -> Result<(), EngineError> {
        self.children.try_for_each(|child| child.unload())?;
        self.components.try_for_each(|component| component.unload())
    }

    fn cascade_destroy(&self, _: &Event<'_>) -> Result<(), EngineError> {
        let children = destroy_all(&self.children);
        // Destroyed components stay attached so sibling lookups keep working
        // while their own unload handlers run
        let components = destroy_all(&self.components);

        let released = match (self.emitter.engine(), self.this.upgrade()) {
            (Some(engine), Some(this)) => engine.entities().release(&this).map(drop),
            _ => Ok(()),
        };
        children.and(components).and(released)
    }
}

/// Destroy every member, keeping the first error
fn destroy_all<T: Destructible + ?Sized>(members: &CursorList<Rc<T>>) -> Result<(), EngineError> {
    let mut outcome = Ok(());
    members.for_each(|member| {
        let destroyed = member.destroy();
        if outcome.is_ok() {
            outcome = destroyed;
        }
    });
    outcome
}

impl EventCapable for Entity {
    fn emitter(&self) -> &Rc<EventEmitter> {
        &self.emitter
    }
}

impl Loadable for Entity {
    fn lifecycle(&self) -> &LifecycleState {
        &self.lifecycle
    }
}

impl Destructible for Entity {}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.emitter.id())
            .field("kind", &self.kind())
            .field("flags", &self.lifecycle.flags())
            .field("components", &self.components.len())
            .field("children", &self.children.len())
            .finish()
    }
}
