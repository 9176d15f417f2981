//! Idle Alert: tints the client red once the player has not touched it for a
//! while, and clears the tint on the next interaction

use std::any::Any;
use std::ops::Range;
use std::time::Duration;

use hudkit_events::{HostEvent, InteractionKind};
use hudkit_host::{
    Dom, EventFilter, ListenerId, ListenerOptions, OverlayError, Plugin, PluginContext, TimerId,
    UiScope, Widget,
};
use tracing::{debug, warn};

/// Setting holding the idle timeout in seconds
pub const IDLE_TIMEOUT_KEY: &str = "idle_timeout_secs";
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;
/// Longer timeouts are clamped to one day
pub const MAX_IDLE_TIMEOUT_SECS: u64 = 24 * 60 * 60;

const IDLE_TIMER_NAME: &str = "idle_alert";
const OVERLAY_ALPHA: f32 = 0.3;

const OVERLAY_STYLES: [(&str, &str); 5] = [
    ("position", "absolute"),
    ("pointer-events", "none"),
    ("z-index", "99999999"),
    ("width", "-webkit-fill-available"),
    ("height", "-webkit-fill-available"),
];

/// Convert `#rrggbb` to `rgba(r, g, b, alpha)`
///
/// Returns `None` for anything that is not six hex digits.
pub fn hex_to_rgba(hex: &str, alpha: f32) -> Option<String> {
    let clean = hex.trim().trim_start_matches('#');
    let channel = |range: Range<usize>| {
        clean
            .get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
    };

    let r = channel(0..2)?;
    let g = channel(2..4)?;
    let b = channel(4..6)?;
    Some(format!("rgba({}, {}, {}, {})", r, g, b, alpha))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Hidden,
    Shown,
}

/// Full-window tint plus the interaction listeners that clear it
#[derive(Debug)]
pub struct IdleOverlay {
    widget: Widget,
    state: IdleState,
    listeners: Vec<ListenerId>,
}

impl IdleOverlay {
    /// Theme colour the tint is derived from
    pub const DANGER_VARIABLE: &'static str = "--theme-danger";

    /// Interactions that count as the player being back
    pub const BOUND_KINDS: [InteractionKind; 6] = [
        InteractionKind::Focus,
        InteractionKind::Click,
        InteractionKind::KeyDown,
        InteractionKind::TouchStart,
        InteractionKind::PointerDown,
        InteractionKind::PointerUp,
    ];

    /// Create the hidden overlay, attach it and register its listeners
    pub fn create(dom: &mut dyn Dom) -> Result<Self, OverlayError> {
        let mut widget = Widget::create(dom, UiScope::ClientRelative)?;
        dom.add_class(widget.root(), "highlite-idle-overlay");
        widget.set_hidden(dom, true);
        for (property, value) in OVERLAY_STYLES {
            widget.set_style(dom, property, value);
        }
        if let Err(err) = widget.attach(dom) {
            widget.destroy(dom);
            return Err(err);
        }

        let listeners = Self::BOUND_KINDS
            .iter()
            .map(|kind| dom.add_event_listener(*kind, Self::listener_options(*kind)))
            .collect();

        let overlay = Self {
            widget,
            state: IdleState::Hidden,
            listeners,
        };
        overlay.update_background_color(dom);
        Ok(overlay)
    }

    /// Window focus uses plain listener options, input is observed passively
    /// in the capture phase
    pub fn listener_options(kind: InteractionKind) -> ListenerOptions {
        if kind.is_window_event() {
            ListenerOptions::default()
        } else {
            ListenerOptions::PASSIVE_CAPTURE
        }
    }

    pub fn is_bound(kind: InteractionKind) -> bool {
        Self::BOUND_KINDS.contains(&kind)
    }

    pub fn state(&self) -> IdleState {
        self.state
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    /// Re-read the theme colour; keeps the previous colour if the variable is
    /// missing or not a hex colour
    pub fn update_background_color(&self, dom: &mut dyn Dom) {
        let color = dom
            .css_variable(Self::DANGER_VARIABLE)
            .and_then(|hex| hex_to_rgba(&hex, OVERLAY_ALPHA));

        match color {
            Some(color) => self.widget.set_style(dom, "background-color", &color),
            None => debug!(target: "plugins", "No usable {}, keeping tint", Self::DANGER_VARIABLE),
        }
    }

    pub fn show(&mut self, dom: &mut dyn Dom) {
        self.update_background_color(dom);
        self.widget.set_hidden(dom, false);
        self.state = IdleState::Shown;
    }

    pub fn hide(&mut self, dom: &mut dyn Dom) {
        self.widget.set_hidden(dom, true);
        self.state = IdleState::Hidden;
    }

    /// Hide on any bound interaction; returns whether `kind` was bound
    pub fn on_interaction(&mut self, dom: &mut dyn Dom, kind: InteractionKind) -> bool {
        if !Self::is_bound(kind) {
            return false;
        }
        self.hide(dom);
        true
    }

    /// Unregister the listeners and remove the overlay
    pub fn destroy(self, dom: &mut dyn Dom) {
        for listener in self.listeners {
            dom.remove_event_listener(listener);
        }
        self.widget.destroy(dom);
    }
}

/// Plugin owning the [`IdleOverlay`] and the idle timer
#[derive(Debug, Default)]
pub struct IdleAlert {
    overlay: Option<IdleOverlay>,
    idle_timer: Option<TimerId>,
}

impl IdleAlert {
    pub fn overlay(&self) -> Option<&IdleOverlay> {
        self.overlay.as_ref()
    }

    pub fn idle_timeout(ctx: &PluginContext<'_>) -> Duration {
        let secs = ctx
            .settings()
            .get_u64(IDLE_TIMEOUT_KEY)
            .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS);
        if secs > MAX_IDLE_TIMEOUT_SECS {
            debug!(target: "plugins", "Idle timeout {}s clamped to {}s", secs, MAX_IDLE_TIMEOUT_SECS);
        }
        Duration::from_secs(secs.min(MAX_IDLE_TIMEOUT_SECS))
    }

    /// (Re)start the idle countdown from the current event
    fn arm_timer(&mut self, ctx: &mut PluginContext<'_>) {
        self.disarm_timer(ctx);
        let timeout = Self::idle_timeout(ctx);
        self.idle_timer = Some(ctx.schedule_timer(timeout, IDLE_TIMER_NAME));
    }

    fn disarm_timer(&mut self, ctx: &mut PluginContext<'_>) {
        if let Some(timer) = self.idle_timer.take() {
            ctx.cancel_timer(timer);
        }
    }

    fn activate(&mut self, ctx: &mut PluginContext<'_>) {
        if self.overlay.is_none() {
            match IdleOverlay::create(ctx.dom()) {
                Ok(overlay) => self.overlay = Some(overlay),
                Err(err) => {
                    warn!(target: "plugins", plugin = ctx.plugin_id(), "{}; disabling plugin", err);
                    ctx.disable();
                    return;
                }
            }
        }
        self.arm_timer(ctx);
    }

    fn deactivate(&mut self, ctx: &mut PluginContext<'_>) {
        self.disarm_timer(ctx);
        if let Some(overlay) = self.overlay.take() {
            overlay.destroy(ctx.dom());
        }
    }
}

impl Plugin for IdleAlert {
    fn id(&self) -> &'static str {
        "idle_alert"
    }

    fn name(&self) -> &'static str {
        "Idle Alert"
    }

    fn author(&self) -> &'static str {
        "Highlite"
    }

    fn init(&mut self, ctx: &mut PluginContext<'_>) {
        ctx.log("Initialized");
    }

    fn start(&mut self, ctx: &mut PluginContext<'_>) {
        ctx.log("Started");
        if ctx.enabled() {
            self.activate(ctx);
        }
    }

    fn stop(&mut self, ctx: &mut PluginContext<'_>) {
        ctx.log("Stopped");
        self.deactivate(ctx);
    }

    fn subscribed_events(&self) -> &[EventFilter] {
        &[EventFilter::Interaction]
    }

    fn on_event(&mut self, event: &HostEvent, ctx: &mut PluginContext<'_>) {
        if !ctx.enabled() {
            return;
        }
        let HostEvent::Interaction(interaction) = event else {
            return;
        };
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };

        if overlay.on_interaction(ctx.dom(), interaction.kind) {
            self.arm_timer(ctx);
        }
    }

    fn on_tick(&mut self, ctx: &mut PluginContext<'_>, _delta: Duration) {
        if !ctx.enabled() {
            return;
        }
        let Some(timer) = self.idle_timer else {
            return;
        };
        if !ctx.check_timer(timer) {
            return;
        }

        self.idle_timer = None;
        if let Some(overlay) = self.overlay.as_mut() {
            debug!(target: "plugins", plugin = ctx.plugin_id(), "Idle timeout reached");
            overlay.show(ctx.dom());
        }
    }

    fn on_enable(&mut self, ctx: &mut PluginContext<'_>) {
        self.activate(ctx);
    }

    fn on_disable(&mut self, ctx: &mut PluginContext<'_>) {
        self.deactivate(ctx);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgba() {
        assert_eq!(
            hex_to_rgba("#ef4444", 0.3).as_deref(),
            Some("rgba(239, 68, 68, 0.3)")
        );
        assert_eq!(
            hex_to_rgba(" 00ff7f ", 1.0).as_deref(),
            Some("rgba(0, 255, 127, 1)")
        );
    }

    #[test]
    fn test_hex_to_rgba_rejects_non_hex() {
        assert_eq!(hex_to_rgba("#abc", 0.3), None);
        assert_eq!(hex_to_rgba("red", 0.3), None);
        assert_eq!(hex_to_rgba("", 0.3), None);
    }

    #[test]
    fn test_listener_options() {
        assert_eq!(
            IdleOverlay::listener_options(InteractionKind::Focus),
            ListenerOptions::default()
        );
        assert_eq!(
            IdleOverlay::listener_options(InteractionKind::PointerUp),
            ListenerOptions::PASSIVE_CAPTURE
        );
    }

    #[test]
    fn test_mouse_move_is_not_bound() {
        assert!(!IdleOverlay::is_bound(InteractionKind::MouseMove));
        assert!(!IdleOverlay::is_bound(InteractionKind::Wheel));
        assert!(IdleOverlay::is_bound(InteractionKind::KeyDown));
    }
}
