//! Configuration management for the raffle engine.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::types::Capacity;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Capacity used when a raffle is created without one (matches the
/// original system's 100-number grid)
pub const DEFAULT_CAPACITY: u32 = 100;

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number range size for raffles created without an explicit capacity
    pub default_capacity: Capacity,
    /// Log level for the tracing subscriber (trace, debug, info, warn, error)
    pub log_level: String,
}

impl EngineConfig {
    /// Loads configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    ///
    /// Recognized variables:
    /// - `RAFFLE_DEFAULT_CAPACITY` (default: 100)
    /// - `RAFFLE_LOG_LEVEL` (default: "info")
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            default_capacity: Capacity::new(env_or("RAFFLE_DEFAULT_CAPACITY", DEFAULT_CAPACITY)),
            log_level: env_or("RAFFLE_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Installs a global tracing subscriber honoring `RUST_LOG` when set,
    /// otherwise this config's log level.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_capacity: Capacity::new(DEFAULT_CAPACITY),
            log_level: "info".to_string(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(env::var(key).ok(), default)
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|value| value.parse().ok()).unwrap_or(default)
}
