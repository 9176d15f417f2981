use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use hudkit_events::{HostEvent, InteractionEvent, InteractionKind, ProtocolEvent};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::Plugin;
use crate::config::SettingsStore;
use crate::context::PluginContext;
use crate::dom::Dom;
use crate::game_state::GameState;
use crate::timer::TimerManager;

/// Default tick rate for plugins (50ms = 20Hz)
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

struct PluginEntry {
    plugin: Box<dyn Plugin>,
    started: bool,
}

/// Runs plugins and dispatches host callbacks to them
///
/// All dispatch happens on the caller's thread and each callback runs to
/// completion before the next one starts.
pub struct PluginHost<D: Dom, G: GameState> {
    plugins: Vec<PluginEntry>,
    dom: D,
    game: G,
    settings: SettingsStore,
    timers: TimerManager,
    /// Last time plugins were ticked
    last_tick: Option<Instant>,
    /// Interval between ticks (default 50ms for 20Hz)
    tick_interval: Duration,
}

impl<D: Dom, G: GameState> PluginHost<D, G> {
    /// Create a host with default settings and tick rate (20Hz)
    pub fn new(dom: D, game: G) -> Self {
        Self {
            plugins: Vec::new(),
            dom,
            game,
            settings: SettingsStore::new(),
            timers: TimerManager::new(),
            last_tick: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn with_settings(mut self, settings: SettingsStore) -> Self {
        self.settings = settings;
        self
    }

    /// Register a plugin and call its `init`
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        debug!(target: "host", "Registering plugin: {} ({})", plugin.name(), plugin.id());
        if self.index_of(plugin.id()).is_some() {
            error!(target: "host", "Plugin id {} already registered, ignoring", plugin.id());
            return;
        }

        self.plugins.push(PluginEntry {
            plugin,
            started: false,
        });
        let index = self.plugins.len() - 1;
        self.dispatch(index, Instant::now(), "init", |plugin, ctx| plugin.init(ctx));
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn plugin_ids(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|entry| entry.plugin.id()).collect()
    }

    pub fn is_started(&self, plugin_id: &str) -> bool {
        self.index_of(plugin_id)
            .is_some_and(|index| self.plugins[index].started)
    }

    /// Borrow a registered plugin as its concrete type
    pub fn plugin<T: Plugin>(&self, plugin_id: &str) -> Option<&T> {
        let index = self.index_of(plugin_id)?;
        self.plugins[index].plugin.as_any().downcast_ref::<T>()
    }

    pub fn plugin_mut<T: Plugin>(&mut self, plugin_id: &str) -> Option<&mut T> {
        let index = self.index_of(plugin_id)?;
        self.plugins[index].plugin.as_any_mut().downcast_mut::<T>()
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    /// Mutable access to the ambient state, for hosts that own it directly
    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn is_enabled(&self, plugin_id: &str) -> bool {
        self.settings.is_enabled(plugin_id)
    }

    fn index_of(&self, plugin_id: &str) -> Option<usize> {
        self.plugins
            .iter()
            .position(|entry| entry.plugin.id() == plugin_id)
    }

    // ===== Lifecycle =====

    /// Start a plugin; calling it again while started is forwarded so the
    /// plugin can recreate anything it is missing
    pub fn start_plugin(&mut self, plugin_id: &str, now: Instant) -> bool {
        let Some(index) = self.index_of(plugin_id) else {
            return false;
        };
        self.plugins[index].started = true;
        self.dispatch(index, now, "start", |plugin, ctx| plugin.start(ctx));
        true
    }

    /// Stop a plugin; forwarded even if it was never started
    pub fn stop_plugin(&mut self, plugin_id: &str, now: Instant) -> bool {
        let Some(index) = self.index_of(plugin_id) else {
            return false;
        };
        self.plugins[index].started = false;
        self.dispatch(index, now, "stop", |plugin, ctx| plugin.stop(ctx));
        true
    }

    pub fn start_all(&mut self, now: Instant) {
        for index in 0..self.plugins.len() {
            self.plugins[index].started = true;
            self.dispatch(index, now, "start", |plugin, ctx| plugin.start(ctx));
        }
        if !self.plugins.is_empty() {
            info!(target: "host", "Started {} plugin(s)", self.plugins.len());
        }
    }

    pub fn stop_all(&mut self, now: Instant) {
        for index in 0..self.plugins.len() {
            if self.plugins[index].started {
                self.plugins[index].started = false;
                self.dispatch(index, now, "stop", |plugin, ctx| plugin.stop(ctx));
            }
        }
    }

    /// Flip a plugin's `enable` setting and tell the plugin if it is running
    pub fn set_enabled(&mut self, plugin_id: &str, enabled: bool, now: Instant) -> bool {
        let Some(index) = self.index_of(plugin_id) else {
            return false;
        };

        let settings = self.settings.entry(plugin_id);
        if settings.enable == enabled {
            return true;
        }
        settings.enable = enabled;
        info!(target: "host", "Plugin {} {}", plugin_id, if enabled { "enabled" } else { "disabled" });

        if self.plugins[index].started {
            if enabled {
                self.dispatch(index, now, "on_enable", |plugin, ctx| plugin.on_enable(ctx));
            } else {
                self.dispatch(index, now, "on_disable", |plugin, ctx| plugin.on_disable(ctx));
            }
        }
        true
    }

    // ===== Dispatch =====

    /// Deliver an event to every started plugin subscribed to it
    pub fn handle_event(&mut self, event: &HostEvent, now: Instant) {
        debug!(target: "host", "Event received: {}", event.name());

        for index in 0..self.plugins.len() {
            let entry = &self.plugins[index];
            if !entry.started {
                continue;
            }

            let subscribed = entry
                .plugin
                .subscribed_events()
                .iter()
                .any(|filter| filter.matches(event));
            if !subscribed {
                continue;
            }

            self.dispatch(index, now, "on_event", |plugin, ctx| plugin.on_event(event, ctx));
        }
    }

    /// Decode a packet hook call and dispatch it; undecodable payloads are
    /// dropped
    pub fn handle_packet(&mut self, name: &str, payload: &[Value], now: Instant) {
        match ProtocolEvent::decode(name, payload) {
            Ok(event) => self.handle_event(&HostEvent::Protocol(event), now),
            Err(err) => debug!(target: "host", "Dropping packet {}: {}", name, err),
        }
    }

    pub fn handle_interaction(&mut self, kind: InteractionKind, now: Instant) {
        self.handle_event(&HostEvent::Interaction(InteractionEvent::new(kind)), now);
    }

    /// Host frame hook; ticks plugins if the tick interval has elapsed
    pub fn tick(&mut self, now: Instant) -> bool {
        let delta = match self.last_tick {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed < self.tick_interval {
                    return false;
                }
                elapsed
            }
            None => Duration::ZERO,
        };
        self.last_tick = Some(now);

        // Tick timers first so plugins see them as fired
        let fired = self.timers.tick(now);
        if !fired.is_empty() {
            debug!(target: "host", "Timers fired: {:?}", fired);
        }

        for index in 0..self.plugins.len() {
            if self.plugins[index].started {
                self.dispatch(index, now, "on_tick", |plugin, ctx| plugin.on_tick(ctx, delta));
            }
        }
        true
    }

    /// Run one callback on one plugin, containing any panic
    fn dispatch<F>(&mut self, index: usize, now: Instant, callback: &str, f: F)
    where
        F: FnOnce(&mut dyn Plugin, &mut PluginContext<'_>),
    {
        let Self {
            plugins,
            dom,
            game,
            settings,
            timers,
            ..
        } = self;

        let plugin = plugins[index].plugin.as_mut();
        let id = plugin.id();
        let name = plugin.name();
        let mut ctx = PluginContext::new(
            id,
            &mut *dom,
            &*game,
            settings.entry(id),
            timers,
            now,
        );

        if let Err(e) = catch_unwind(AssertUnwindSafe(|| f(plugin, &mut ctx))) {
            error!(target: "host",
                "Plugin {} ({}) panicked during {}: {:?}",
                name,
                id,
                callback,
                e
            );
        }
    }
}

impl<D: Dom, G: GameState> Drop for PluginHost<D, G> {
    fn drop(&mut self) {
        self.stop_all(Instant::now());
    }
}
