//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

use crate::core::config::LoggingConfig;

/// Initialize the logging system from `RUST_LOG` (defaults to `info`)
///
/// Returns false if a logger was already installed.
pub fn init() -> bool {
    init_with_config(&LoggingConfig::default())
}

/// Initialize the logging system with the configured filter
///
/// `RUST_LOG` still takes precedence over `config.filter` when set.
pub fn init_with_config(config: &LoggingConfig) -> bool {
    let env = env_logger::Env::default().default_filter_or(config.filter.as_str());
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
