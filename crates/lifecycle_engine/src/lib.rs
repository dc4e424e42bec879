//! # Lifecycle Engine
//!
//! Runtime object model for games built from entities, components and scenes.
//!
//! ## Features
//!
//! - **Named events**: per-object declared events with mutation-safe dispatch
//! - **Lifecycle capabilities**: `Loadable` and `Destructible` state machines
//! - **Composition**: entities own uniquely-kinded components and child entities
//! - **Scenes**: loadable sets of entities with automatic removal on destroy
//! - **Repositories**: one registry per tracked kind, owned by the engine context
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use lifecycle_engine::prelude::*;
//!
//! struct Pose {
//!     core: ComponentCore,
//! }
//!
//! impl Component for Pose {
//!     fn core(&self) -> &ComponentCore {
//!         &self.core
//!     }
//! }
//!
//! fn main() -> Result<(), EngineError> {
//!     let engine = Engine::new(EngineConfig::default());
//!     let scene = Scene::new(&engine, "lab")?;
//!
//!     let gate = Entity::named(&engine, "AndGate")?;
//!     gate.add_component(Rc::new(Pose {
//!         core: ComponentCore::new(&engine, "Pose")?,
//!     }))?;
//!
//!     scene.add(&[Rc::clone(&gate)])?;
//!     scene.load()?;
//!     assert!(gate.require_component::<Pose>()?.is_loaded());
//!
//!     gate.destroy()?;
//!     assert!(scene.is_empty());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate, clippy::missing_errors_doc)]

// Core engine modules
pub mod core;
pub mod config;

pub mod foundation;
pub mod events;
pub mod ecs;
pub mod scene;

mod engine;

pub use core::config::EngineConfig;
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::{Config, EngineConfig},
        ecs::{Component, ComponentCore, Entity, Repository},
        events::{
            Destructible, Event, EventCapable, EventEmitter, Listener, Loadable, ON_DESTROY, ON_INIT, ON_LOAD,
            ON_RELEASE, ON_STORE, ON_UNLOAD,
        },
        foundation::ObjectId,
        scene::{Scene, SceneManager},
        Engine, EngineError,
    };
}
