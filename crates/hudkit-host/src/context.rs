use std::time::{Duration, Instant};

use tracing::info;

use crate::config::PluginSettings;
use crate::dom::Dom;
use crate::game_state::GameState;
use crate::timer::{TimerId, TimerManager};

/// Everything a plugin may touch while handling one host callback
///
/// Built by the host for each call. The plugin gets exclusive access to the
/// DOM and to its own settings for the duration of the call and nothing
/// outlives it.
pub struct PluginContext<'a> {
    plugin_id: &'a str,
    dom: &'a mut dyn Dom,
    game: &'a dyn GameState,
    settings: &'a mut PluginSettings,
    timers: &'a mut TimerManager,
    event_time: Instant,
}

impl<'a> PluginContext<'a> {
    pub fn new(
        plugin_id: &'a str,
        dom: &'a mut dyn Dom,
        game: &'a dyn GameState,
        settings: &'a mut PluginSettings,
        timers: &'a mut TimerManager,
        event_time: Instant,
    ) -> Self {
        Self {
            plugin_id,
            dom,
            game,
            settings,
            timers,
            event_time,
        }
    }

    pub fn plugin_id(&self) -> &str {
        self.plugin_id
    }

    // ===== Host collaborators =====

    pub fn dom(&mut self) -> &mut dyn Dom {
        &mut *self.dom
    }

    pub fn game(&self) -> &dyn GameState {
        self.game
    }

    // ===== Settings =====

    /// The plugin's `enable` flag
    pub fn enabled(&self) -> bool {
        self.settings.enable
    }

    /// Flip the plugin's `enable` flag off, e.g. after the host refused to
    /// create its UI
    pub fn disable(&mut self) {
        self.settings.enable = false;
    }

    pub fn settings(&self) -> &PluginSettings {
        &*self.settings
    }

    pub fn settings_mut(&mut self) -> &mut PluginSettings {
        &mut *self.settings
    }

    // ===== Timers =====

    /// Schedule a one-shot timer that fires `delay` after the current event
    pub fn schedule_timer(&mut self, delay: Duration, name: impl Into<String>) -> TimerId {
        self.timers
            .schedule_timer(self.event_time, delay, name.into())
    }

    /// Schedule a timer that fires every `interval`
    pub fn schedule_recurring(&mut self, interval: Duration, name: impl Into<String>) -> TimerId {
        self.timers
            .schedule_recurring(self.event_time, interval, name.into())
    }

    pub fn cancel_timer(&mut self, timer_id: TimerId) -> bool {
        self.timers.cancel_timer(timer_id)
    }

    /// Check if a timer has fired (consumes the fired state)
    pub fn check_timer(&mut self, timer_id: TimerId) -> bool {
        self.timers.check_timer(timer_id)
    }

    // ===== Misc =====

    /// Host time of the callback being handled
    pub fn event_time(&self) -> Instant {
        self.event_time
    }

    /// Log a line attributed to this plugin
    pub fn log(&self, message: impl AsRef<str>) {
        info!(target: "plugins", plugin = self.plugin_id, "{}", message.as_ref());
    }
}
