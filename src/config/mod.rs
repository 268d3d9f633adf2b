//! Planner Configuration Module
//!
//! Provides engine configuration loaded from TOML files, replacing hardcoded
//! planning constants with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `PLANNER_CONFIG` environment variable (path to TOML file)
//! 2. `planner_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Either hand an explicit config to an engine:
//!
//! ```ignore
//! let engine = PlanningEngine::new(Arc::new(PlannerConfig::load()));
//! ```
//!
//! or install it process-wide once at startup and read it anywhere:
//!
//! ```ignore
//! config::init(PlannerConfig::load());
//! let block = config::get().expansion.oil_block_bpd;
//! ```

mod planner_config;
pub mod defaults;
pub mod validation;

pub use planner_config::*;

use std::sync::OnceLock;

/// Global planner configuration, initialized once at startup.
static PLANNER_CONFIG: OnceLock<PlannerConfig> = OnceLock::new();

/// Initialize the global planner configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: PlannerConfig) {
    if PLANNER_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global planner configuration.
///
/// Panics if `init()` has not been called: a missing config is a startup bug.
#[allow(clippy::expect_used)]
pub fn get() -> &'static PlannerConfig {
    PLANNER_CONFIG
        .get()
        .expect("config::get() called before config::init(), this is a startup bug")
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    PLANNER_CONFIG.get().is_some()
}
