//! # Core Engine Module
//!
//! Shared configuration types and convenience re-exports of the subsystems
//! every consumer touches.
//!
//! ## Organization
//!
//! - **Config**: engine configuration loaded through the [`Config`] trait
//! - **Foundation**: identities, mutation-safe collections, logging
//! - **Events**: emitters and lifecycle capabilities
//! - **ECS**: entities, components and repositories

pub mod config;

pub use crate::ecs;
pub use crate::events;
pub use crate::foundation;

pub use config::{Config, ConfigError, ConfigFormat, EngineConfig, EventConfig, LoggingConfig, RepositoryConfig};
