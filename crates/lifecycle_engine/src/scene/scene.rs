//! Scene: ordered set of top-level entities loaded and unloaded together

use std::any::Any;
use std::rc::{Rc, Weak};

use crate::ecs::Entity;
use crate::engine::{Engine, EngineError};
use crate::events::mixins::LOADABLE_EVENTS;
use crate::events::{
    Destructible, Event, EventCapable, EventEmitter, LifecycleState, Listener, Loadable, ON_DESTROY, ON_LOAD,
    ON_UNLOAD,
};
use crate::foundation::{CursorList, ObjectId};

/// Ordered collection of top-level entities.
///
/// Holds entities by reference: destroying a member removes it from the scene
/// without an explicit [`remove`](Self::remove). A scene is loadable but not
/// destructible; it lives as long as its engine context.
pub struct Scene {
    name: String,
    emitter: Rc<EventEmitter>,
    lifecycle: LifecycleState,
    contents: CursorList<Rc<Entity>>,
    member_listener: Listener,
}

impl Scene {
    /// Create an empty, unloaded scene
    pub fn new(engine: &Rc<Engine>, name: impl Into<String>) -> Result<Rc<Self>, EngineError> {
        let emitter = engine.create_emitter("Scene")?;
        emitter.implement_events(&LOADABLE_EVENTS)?;

        let scene = Rc::new_cyclic(|this: &Weak<Self>| Self {
            name: name.into(),
            emitter,
            lifecycle: LifecycleState::new(),
            contents: CursorList::new(),
            member_listener: Listener::bind(this.clone(), |scene: &Self, event| {
                scene.detach_destroyed(event.source());
                Ok(())
            }),
        });

        let id = scene.id();
        let this = Rc::downgrade(&scene);
        scene.add_event_listener(ON_LOAD, id, &Listener::bind(this.clone(), Self::cascade_load))?;
        scene.add_event_listener(ON_UNLOAD, id, &Listener::bind(this, Self::cascade_unload))?;

        log::debug!("Created scene '{}' {:?}", scene.name, id);
        Ok(scene)
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append `entities` in order.
    ///
    /// Each one is watched for destruction and loaded right away if the scene
    /// is loaded. Every entity is validated before anything is added: a
    /// destroyed entity is an [`EngineError::InvalidMember`], one already in
    /// the scene (or listed twice) an [`EngineError::DuplicateMember`].
    pub fn add(&self, entities: &[Rc<Entity>]) -> Result<(), EngineError> {
        for (index, entity) in entities.iter().enumerate() {
            if entity.is_destroyed() {
                return Err(EngineError::InvalidMember {
                    container: "Scene",
                    expected: "a live entity",
                });
            }
            let repeated = entities[..index].iter().any(|earlier| Rc::ptr_eq(earlier, entity));
            if repeated || self.contains(entity) {
                return Err(EngineError::DuplicateMember { container: "Scene" });
            }
        }

        for entity in entities {
            entity.add_event_listener(ON_DESTROY, self.id(), &self.member_listener)?;
            self.contents.push(Rc::clone(entity));
            log::debug!("Scene '{}' adds {} {:?}", self.name, entity.kind(), entity.id());
            if self.is_loaded() {
                entity.load()?;
            }
        }
        Ok(())
    }

    /// Type-erased [`add`](Self::add): fails with
    /// [`EngineError::InvalidMember`] if any object is not an [`Entity`],
    /// before anything is added.
    pub fn add_objects(&self, objects: &[Rc<dyn Any>]) -> Result<(), EngineError> {
        let entities = objects
            .iter()
            .map(|object| {
                Rc::clone(object).downcast::<Entity>().map_err(|_| EngineError::InvalidMember {
                    container: "Scene",
                    expected: "Entity",
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.add(&entities)
    }

    /// Detach `entities` without unloading them; absent ones are ignored.
    ///
    /// Returns the number detached.
    pub fn remove(&self, entities: &[Rc<Entity>]) -> usize {
        let mut removed = 0;
        for entity in entities {
            if self.contents.remove_first(|member| Rc::ptr_eq(member, entity)).is_some() {
                entity.remove_event_listener(ON_DESTROY, self.id(), &self.member_listener);
                removed += 1;
            }
        }
        removed
    }

    /// Whether `entity` is in the scene
    pub fn contains(&self, entity: &Rc<Entity>) -> bool {
        self.contents.any(|member| Rc::ptr_eq(member, entity))
    }

    /// Number of entities in the scene
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether the scene is empty
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Entities in insertion order
    pub fn entities(&self) -> Vec<Rc<Entity>> {
        self.contents.snapshot()
    }

    fn detach_destroyed(&self, entity: ObjectId) {
        if let Some(entity) = self.contents.remove_first(|member| member.id() == entity) {
            entity.remove_event_listener(ON_DESTROY, self.id(), &self.member_listener);
            log::debug!("Scene '{}' dropped destroyed {} {:?}", self.name, entity.kind(), entity.id());
        }
    }

    fn cascade_load(&self, _: &Event<'_>) -> Result<(), EngineError> {
        self.contents.try_for_each(|entity| entity.load())
    }

    fn cascade_unload(&self, _: &Event<'_>) -> Result<(), EngineError> {
        self.contents.try_for_each(|entity| entity.unload())
    }
}

impl EventCapable for Scene {
    fn emitter(&self) -> &Rc<EventEmitter> {
        &self.emitter
    }
}

impl Loadable for Scene {
    fn lifecycle(&self) -> &LifecycleState {
        &self.lifecycle
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("id", &self.emitter.id())
            .field("flags", &self.lifecycle.flags())
            .field("len", &self.contents.len())
            .finish()
    }
}
