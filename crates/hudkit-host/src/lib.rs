//! Host runtime for hudkit overlay plugins
//!
//! The host owns the DOM, the game-state accessors, plugin settings and
//! timers. Plugins implement [`Plugin`] and only ever see those through a
//! [`PluginContext`] built for the duration of one callback.

use std::any::Any;
use std::time::Duration;

use hudkit_events::{HostEvent, ProtocolEvent};

pub mod config;
pub mod context;
pub mod controller;
pub mod dom;
pub mod game_state;
pub mod logging;
pub mod overlay;
pub mod plugin_host;
pub mod registry;
pub mod timer;

pub use config::{HudkitConfig, PluginSettings, SettingsStore};
pub use context::PluginContext;
pub use controller::{OverlayController, OverlayFeature};
pub use dom::{Dom, HeadlessDom, ListenerId, ListenerOptions, NodeId, UiScope};
pub use game_state::{GameSnapshot, GameState, PlayerSnapshot};
pub use overlay::{OverlayError, OverlayState, Widget};
pub use plugin_host::PluginHost;
pub use registry::create_host_from_config;
pub use timer::{TimerId, TimerManager};

/// Trait that all plugins must implement
///
/// Every method is a host callback and must be total: plugins log and move on
/// rather than panic. The host still guards each call, so a panic only costs
/// that one callback.
pub trait Plugin: Send + 'static {
    /// Unique identifier, also the key of the plugin's settings table
    fn id(&self) -> &'static str;

    /// Human-readable name for this plugin
    fn name(&self) -> &'static str;

    fn author(&self) -> &'static str;

    /// Called once when the plugin is registered
    fn init(&mut self, ctx: &mut PluginContext<'_>);

    /// Called when the host starts the plugin; may be called while already
    /// started
    fn start(&mut self, ctx: &mut PluginContext<'_>);

    /// Called when the host stops the plugin; must release every widget the
    /// plugin owns, and may be called without a prior `start`
    fn stop(&mut self, ctx: &mut PluginContext<'_>);

    /// Return the list of events this plugin wants to receive
    fn subscribed_events(&self) -> &[EventFilter];

    /// Handle an event that matches one of the subscribed filters
    fn on_event(&mut self, event: &HostEvent, ctx: &mut PluginContext<'_>);

    /// Called once per host frame, at most every tick interval
    ///
    /// # Arguments
    /// * `ctx` - Plugin context for the DOM, game state and settings
    /// * `delta` - Time elapsed since the last tick
    fn on_tick(&mut self, ctx: &mut PluginContext<'_>, delta: Duration);

    /// The plugin's `enable` setting was switched on
    fn on_enable(&mut self, _ctx: &mut PluginContext<'_>) {}

    /// The plugin's `enable` setting was switched off
    fn on_disable(&mut self, _ctx: &mut PluginContext<'_>) {}

    /// Allow downcasting to the concrete plugin type for state access
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Filter for subscribing to specific events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Subscribe to all events
    All,
    /// Every protocol packet, including ones no plugin decodes
    AnyProtocol,
    /// An inventory item action was invoked
    InventoryItemAction,
    /// The loot menu was shown
    LootMenu,
    /// Raw user interaction with the client window
    Interaction,
}

impl EventFilter {
    /// Check if this filter matches the given event
    pub fn matches(&self, event: &HostEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::AnyProtocol => matches!(event, HostEvent::Protocol(_)),
            EventFilter::InventoryItemAction => matches!(
                event,
                HostEvent::Protocol(ProtocolEvent::InvokedInventoryItemAction(_))
            ),
            EventFilter::LootMenu => {
                matches!(event, HostEvent::Protocol(ProtocolEvent::ShowLootMenu(_)))
            }
            EventFilter::Interaction => matches!(event, HostEvent::Interaction(_)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hudkit_events::{InteractionEvent, InteractionKind, LootMenu};
    use serde_json::Value;

    fn loot_menu() -> HostEvent {
        HostEvent::Protocol(ProtocolEvent::ShowLootMenu(LootMenu {
            items: Value::Null,
            menu_type: Value::Null,
        }))
    }

    #[test]
    fn test_protocol_filters() {
        let event = loot_menu();
        assert!(EventFilter::All.matches(&event));
        assert!(EventFilter::AnyProtocol.matches(&event));
        assert!(EventFilter::LootMenu.matches(&event));
        assert!(!EventFilter::InventoryItemAction.matches(&event));
        assert!(!EventFilter::Interaction.matches(&event));
    }

    #[test]
    fn test_interaction_filter() {
        let event = HostEvent::Interaction(InteractionEvent::new(InteractionKind::Click));
        assert!(EventFilter::Interaction.matches(&event));
        assert!(!EventFilter::AnyProtocol.matches(&event));
    }
}
