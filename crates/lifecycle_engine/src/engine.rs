//! Engine context
//!
//! The [`Engine`] owns everything that is process-wide in spirit: the identity
//! table, the event-emitter repository and the entity repository. It is
//! constructed explicitly and handed to every constructor, so there is exactly
//! one repository per tracked kind for the lifetime of the context without any
//! hidden global.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::core::config::EngineConfig;
use crate::ecs::{Entity, Repository};
use crate::events::EventEmitter;
use crate::foundation::collections::SlotMap;
use crate::foundation::ObjectId;

/// Main engine context
///
/// Shared as `Rc<Engine>`; objects keep a weak reference back to it.
pub struct Engine {
    config: EngineConfig,

    /// Every live object id, labelled with its kind
    identities: RefCell<SlotMap<ObjectId, &'static str>>,

    /// Emitters of every live event-capable object (repositories excluded)
    emitters: Repository<EventEmitter>,

    /// Every live entity
    entities: Repository<Entity>,
}

impl Engine {
    /// Create a new engine context
    pub fn new(config: EngineConfig) -> Rc<Self> {
        let mut identities = SlotMap::with_capacity_and_key(config.repositories.emitter_capacity);
        let emitters_id = identities.insert("Repository<EventEmitter>");
        let entities_id = identities.insert("Repository<Entity>");

        let emitter_capacity = config.repositories.emitter_capacity;
        let entity_capacity = config.repositories.entity_capacity;

        log::info!(
            "Initializing engine (strict subscribers: {})",
            config.events.strict_subscribers
        );

        Rc::new_cyclic(|engine| Self {
            config,
            identities: RefCell::new(identities),
            emitters: Repository::new(emitters_id, engine.clone(), emitter_capacity),
            entities: Repository::new(entities_id, engine.clone(), entity_capacity),
        })
    }

    /// Create an engine context from a `.toml` or `.ron` configuration file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Rc<Self>, EngineError> {
        let config = EngineConfig::load_from_file(path)?;
        Ok(Self::new(config))
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Repository of every live event emitter
    pub fn emitters(&self) -> &Repository<EventEmitter> {
        &self.emitters
    }

    /// Repository of every live entity
    pub fn entities(&self) -> &Repository<Entity> {
        &self.entities
    }

    /// Mint an id for a subscriber that is not itself an event-capable object
    pub fn register_subscriber(&self, kind: &'static str) -> ObjectId {
        self.identities.borrow_mut().insert(kind)
    }

    /// Purge every subscription held by `subscriber` and retire its id.
    ///
    /// Returns false if the id was not live.
    pub fn retire_subscriber(&self, subscriber: ObjectId) -> bool {
        self.purge_listeners_of(subscriber);
        self.identities.borrow_mut().remove(subscriber).is_some()
    }

    /// Whether `id` belongs to a live object or registered subscriber
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.identities.borrow().contains_key(id)
    }

    /// Kind label of a live id
    pub fn kind_of(&self, id: ObjectId) -> Option<&'static str> {
        self.identities.borrow().get(id).copied()
    }

    /// Number of live ids
    pub fn live_count(&self) -> usize {
        self.identities.borrow().len()
    }

    /// Create an emitter for a new object of kind `kind` and track it
    pub fn create_emitter(self: &Rc<Self>, kind: &'static str) -> Result<Rc<EventEmitter>, EngineError> {
        let id = self.identities.borrow_mut().insert(kind);
        let emitter = Rc::new(EventEmitter::new(id, kind, Rc::downgrade(self)));
        self.emitters.store(Rc::clone(&emitter))?;
        Ok(emitter)
    }

    /// Remove every subscription `subscriber` holds on any tracked emitter
    pub fn purge_listeners_of(&self, subscriber: ObjectId) -> usize {
        let mut purged = self.emitters.emitter().purge_listeners_of(subscriber)
            + self.entities.emitter().purge_listeners_of(subscriber);
        self.emitters.for_each(|emitter| purged += emitter.purge_listeners_of(subscriber));
        if purged > 0 {
            log::trace!("Purged {} subscriptions of {:?}", purged, subscriber);
        }
        purged
    }

    /// Final teardown of a destroyed object's emitter: stop tracking it, purge
    /// its subscriptions everywhere and retire its id.
    pub(crate) fn release_emitter(&self, emitter: &Rc<EventEmitter>) -> Result<(), EngineError> {
        let id = emitter.id();
        self.emitters.release(emitter)?;
        // Released emitters are no longer reached by the repository-wide purge
        emitter.purge_listeners_of(id);
        self.purge_listeners_of(id);
        self.identities.borrow_mut().remove(id);
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("live", &self.live_count())
            .field("emitters", &self.emitters.len())
            .field("entities", &self.entities.len())
            .finish()
    }
}

/// Engine errors
///
/// Every variant reports a caller defect; none is retried.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Fired or subscribed to an event the object never declared
    #[error("{target}: {event} event is not implemented")]
    UnknownEvent {
        /// Kind of the emitting object
        target: &'static str,
        /// Requested event name
        event: String,
    },

    /// Declared the same event name twice on one object
    #[error("{target}: {event} has already been implemented")]
    DuplicateEventDeclaration {
        /// Kind of the emitting object
        target: &'static str,
        /// Event name
        event: &'static str,
    },

    /// Registered the same (subscriber, listener) pair twice
    #[error("{target}: duplicate subscription to {event} for subscriber {subscriber:?}")]
    DuplicateSubscription {
        /// Kind of the emitting object
        target: &'static str,
        /// Event name
        event: &'static str,
        /// Offending subscriber
        subscriber: ObjectId,
    },

    /// Subscriber id is null or not live
    #[error("{target}: {event} subscriber must be a live object")]
    InvalidSubscriber {
        /// Kind of the emitting object
        target: &'static str,
        /// Event name
        event: &'static str,
    },

    /// Entity already holds a component of this kind
    #[error("{entity}: this entity already contains a {component}")]
    DuplicateComponent {
        /// Entity kind
        entity: &'static str,
        /// Component kind
        component: &'static str,
    },

    /// Component instance is already bound to another entity
    #[error("{entity}: component configuration error, {component} has been configured for another entity")]
    ComponentBinding {
        /// Entity kind
        entity: &'static str,
        /// Component kind
        component: &'static str,
    },

    /// Object of the wrong kind handed to a container
    #[error("{container}: objects to be added must be instances of {expected}")]
    InvalidMember {
        /// Container kind
        container: &'static str,
        /// Accepted member type
        expected: &'static str,
    },

    /// Member of the wrong kind handed to a typed repository
    #[error("{container}: member must be an instance of {expected}")]
    TypeMismatch {
        /// Container kind
        container: &'static str,
        /// Declared member type
        expected: &'static str,
    },

    /// Object already belongs to the container
    #[error("{container}: object is already a member")]
    DuplicateMember {
        /// Container kind
        container: &'static str,
    },

    /// A required sibling component is absent
    #[error("{entity} does not contain a {component}")]
    MissingComponent {
        /// Entity kind
        entity: &'static str,
        /// Component kind
        component: &'static str,
    },

    /// Scene name not registered with the scene manager
    #[error("Unknown scene: {0}")]
    UnknownScene(String),

    /// Failure reported by a listener
    #[error("Handler error: {0}")]
    Handler(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Listener;

    #[test]
    fn test_repositories_exist_once() {
        let engine = Engine::new(EngineConfig::default());
        assert!(engine.emitters().is_empty());
        assert!(engine.entities().is_empty());
        // The two repositories own the first ids
        assert_eq!(engine.live_count(), 2);
        assert_ne!(engine.emitters().emitter().id(), engine.entities().emitter().id());
    }

    #[test]
    fn test_create_emitter_is_tracked() {
        let engine = Engine::new(EngineConfig::default());
        let emitter = engine.create_emitter("Widget").unwrap();

        assert!(engine.emitters().contains(&emitter));
        assert_eq!(engine.kind_of(emitter.id()), Some("Widget"));
        assert!(engine.emitters().find(|tracked| tracked.id() == emitter.id()).is_some());
    }

    #[test]
    fn test_retire_subscriber_purges_everywhere() {
        let engine = Engine::new(EngineConfig::default());
        let first = engine.create_emitter("First").unwrap();
        let second = engine.create_emitter("Second").unwrap();
        first.implement_events(&["x"]).unwrap();
        second.implement_events(&["x"]).unwrap();

        let subscriber = engine.register_subscriber("Hud");
        let listener = Listener::new(|_| Ok(()));
        first.add_event_listener("x", subscriber, &listener).unwrap();
        second.add_event_listener("x", subscriber, &listener).unwrap();
        engine
            .entities()
            .add_event_listener(crate::events::ON_STORE, subscriber, &listener)
            .unwrap();

        assert!(engine.retire_subscriber(subscriber));
        assert_eq!(first.listener_count("x"), 0);
        assert_eq!(second.listener_count("x"), 0);
        assert_eq!(engine.entities().emitter().listener_count(crate::events::ON_STORE), 0);
        assert!(!engine.retire_subscriber(subscriber));
    }

    #[test]
    fn test_from_config_file() {
        let path = std::env::temp_dir().join(format!("lifecycle_engine_engine_{}.ron", std::process::id()));
        EngineConfig::default()
            .with_strict_subscribers(false)
            .save_to_file(&path)
            .unwrap();

        let engine = Engine::from_config_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(!engine.config().events.strict_subscribers);

        let missing = Engine::from_config_file("does/not/exist.toml");
        assert!(matches!(missing, Err(EngineError::Config(ConfigError::Io(_)))));
    }

    #[test]
    fn test_error_messages() {
        let error = EngineError::DuplicateComponent {
            entity: "AndGate",
            component: "Pose",
        };
        assert_eq!(error.to_string(), "AndGate: this entity already contains a Pose");
    }
}
