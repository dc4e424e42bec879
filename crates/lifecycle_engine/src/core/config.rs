//! # Engine Configuration
//!
//! Settings consumed when an [`Engine`](crate::Engine) context is constructed.
//!
//! ## Configuration Categories
//!
//! - **Logging**: default log filter handed to `env_logger`
//! - **Repositories**: initial capacities of the entity and emitter repositories
//! - **Events**: subscriber validation policy
//!
//! Every section has defaults, so a configuration file only needs the keys it
//! changes:
//!
//! ```toml
//! [events]
//! strict_subscribers = false
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives, `env_logger` syntax (for example `"lifecycle_engine=debug"`)
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Repository sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Initial capacity of the entity repository
    pub entity_capacity: usize,
    /// Initial capacity of the event-emitter repository and identity table
    pub emitter_capacity: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 256,
            emitter_capacity: 1024,
        }
    }
}

/// Event dispatch policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Reject subscribers whose id is not live in the engine (destroyed or never registered).
    ///
    /// Null ids are rejected regardless of this setting.
    pub strict_subscribers: bool,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            strict_subscribers: true,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Repository sizing
    pub repositories: RepositoryConfig,
    /// Event dispatch policy
    pub events: EventConfig,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Builder-style override of the subscriber validation policy
    pub fn with_strict_subscribers(mut self, strict: bool) -> Self {
        self.events.strict_subscribers = strict;
        self
    }

    /// Builder-style override of the log filter
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.logging.filter = filter.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.logging.filter, "info");
        assert!(config.events.strict_subscribers);
        assert_eq!(config.repositories.entity_capacity, 256);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let text = "[events]\nstrict_subscribers = false\n";
        let config = EngineConfig::parse(text, ConfigFormat::Toml).unwrap();
        assert!(!config.events.strict_subscribers);
        assert_eq!(config.repositories, RepositoryConfig::default());
    }

    #[test]
    fn test_ron_round_trip() {
        let config = EngineConfig::default()
            .with_log_filter("lifecycle_engine=trace")
            .with_strict_subscribers(false);
        let text = config.render(ConfigFormat::Ron).unwrap();
        assert_eq!(EngineConfig::parse(&text, ConfigFormat::Ron).unwrap(), config);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("lifecycle_engine_{}.toml", std::process::id()));
        let config = EngineConfig::default().with_log_filter("warn");
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::load_from_file("engine.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
