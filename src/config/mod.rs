//! Engine Configuration Module
//!
//! Provides the analytics policy constants (window length, thresholds,
//! breakpoints, weights) loaded from TOML, replacing hardcoded values with
//! operator-tunable ones.
//!
//! ## Loading Order
//!
//! 1. `URBANSENSE_CONFIG` environment variable (path to TOML file)
//! 2. `urbansense.toml` in the current working directory
//! 3. Built-in defaults (see [`defaults`])
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(EngineConfig::load());
//!
//! // Anywhere in the codebase:
//! let window = config::get().forecast.window_len;
//! ```
//!
//! Components also accept their config section explicitly, so library users
//! and tests never need the global.

mod engine_config;
pub mod defaults;

pub use engine_config::*;

use std::sync::OnceLock;

/// Global engine configuration, initialized once at startup.
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Initialize the global engine configuration.
///
/// Later calls are ignored with a warning; policy is not runtime-mutable.
pub fn init(config: EngineConfig) {
    if ENGINE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global engine configuration.
///
/// If `init()` was never called the built-in defaults are installed.
pub fn get() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(|| {
        tracing::debug!("config::get() before config::init(), installing defaults");
        EngineConfig::default()
    })
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    ENGINE_CONFIG.get().is_some()
}
