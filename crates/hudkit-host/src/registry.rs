use std::time::Instant;

use tracing::debug;

use crate::Plugin;
use crate::config::{HudkitConfig, SettingsStore};
use crate::dom::Dom;
use crate::game_state::GameState;
use crate::plugin_host::PluginHost;

/// Create a plugin host from config, register `plugins` and start them
pub fn create_host_from_config<D, G>(
    config: &HudkitConfig,
    dom: D,
    game: G,
    plugins: impl IntoIterator<Item = Box<dyn Plugin>>,
) -> PluginHost<D, G>
where
    D: Dom,
    G: GameState,
{
    debug!(target: "host", "Creating plugin host");
    let mut host = PluginHost::new(dom, game)
        .with_tick_interval(config.host.tick_interval())
        .with_settings(SettingsStore::from_config(&config.plugins));

    for plugin in plugins {
        host.register(plugin);
    }
    debug!(target: "host", "Registered plugins: {:?}", host.plugin_ids());

    host.start_all(Instant::now());
    host
}
