//! Built-in plugins for hudkit
//!
//! Each plugin owns its overlay widgets and only reaches the DOM and the game
//! through the [`hudkit_host::PluginContext`] it is handed.

use std::collections::BTreeMap;

use hudkit_host::{OverlayFeature, Plugin, PluginSettings};

pub mod current_status;
pub mod idle_alert;
pub mod treasure_solver;

pub use current_status::CurrentStatus;
pub use idle_alert::{IdleAlert, IdleOverlay, IdleState};
pub use treasure_solver::{TreasureMap, TreasureSolver};

/// Create one instance of every built-in plugin
pub fn builtin_plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(TreasureSolver::default()),
        Box::new(CurrentStatus::default()),
        Box::new(IdleAlert::default()),
    ]
}

/// Settings written by `hudkit init-config`
pub fn default_plugin_settings() -> BTreeMap<String, PluginSettings> {
    let mut plugins = BTreeMap::new();
    plugins.insert(TreasureMap::ID.to_string(), PluginSettings::default());
    plugins.insert("current_status".to_string(), PluginSettings::default());

    let mut idle = PluginSettings::default();
    idle.set_u64(
        idle_alert::IDLE_TIMEOUT_KEY,
        idle_alert::DEFAULT_IDLE_TIMEOUT_SECS,
    );
    plugins.insert("idle_alert".to_string(), idle);

    plugins
}
