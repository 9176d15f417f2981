//! Lifecycle controller for overlays created by a protocol event
//!
//! A feature supplies the event matching, the widget layout and the per-frame
//! update; [`OverlayController`] owns the widget and decides when it exists.

use std::any::Any;
use std::fmt::Debug;
use std::time::Duration;

use hudkit_events::{HostEvent, ProtocolEvent};
use tracing::{debug, trace, warn};

use crate::context::PluginContext;
use crate::dom::{Dom, UiScope};
use crate::overlay::{OverlayError, OverlayState, Widget};
use crate::{EventFilter, Plugin};

/// Feature-specific half of an event-driven overlay
pub trait OverlayFeature: Send + 'static {
    /// Data captured from a trigger event and rendered once at creation
    type Payload: Debug;

    const ID: &'static str;
    const NAME: &'static str;
    const AUTHOR: &'static str;

    /// Where the widget is attached
    const SCOPE: UiScope;

    /// Events the controller should receive (triggers and terminators)
    fn subscribed_events(&self) -> &[EventFilter];

    /// Stylesheet injected once when the plugin starts
    fn stylesheet(&self) -> Option<&'static str> {
        None
    }

    /// Extract a payload when `event` is an accepted trigger, `None` otherwise
    fn match_trigger(&self, event: &ProtocolEvent) -> Option<Self::Payload>;

    /// Whether `event` ends the overlay's session
    fn is_terminate(&self, event: &ProtocolEvent) -> bool;

    /// Lay out a new widget from `payload`
    fn build(
        &self,
        widget: &mut Widget,
        dom: &mut dyn Dom,
        payload: &Self::Payload,
    ) -> Result<(), OverlayError>;

    /// Push the current ambient state onto a live widget. Returns `None` when
    /// the state could not be read; the widget is then left as it was.
    fn poll(&self, widget: &Widget, ctx: &mut PluginContext<'_>) -> Option<()>;
}

/// Owns at most one live widget for a feature and drives its transitions
pub struct OverlayController<F: OverlayFeature> {
    feature: F,
    state: OverlayState,
}

impl<F: OverlayFeature> OverlayController<F> {
    pub fn new(feature: F) -> Self {
        Self {
            feature,
            state: OverlayState::Absent,
        }
    }

    pub fn feature(&self) -> &F {
        &self.feature
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_live(&self) -> bool {
        self.state.is_live()
    }

    /// Create (or replace) the widget for an accepted trigger
    pub fn on_trigger_event(&mut self, payload: F::Payload, ctx: &mut PluginContext<'_>) {
        if !ctx.enabled() {
            trace!(target: "plugins", plugin = F::ID, "Disabled, ignoring trigger {:?}", payload);
            return;
        }

        let feature = &self.feature;
        let result = self.state.create_with(ctx.dom(), F::SCOPE, |widget, dom| {
            feature.build(widget, dom, &payload)
        });

        match result {
            Ok(()) => debug!(target: "plugins", plugin = F::ID, "Overlay created for {:?}", payload),
            Err(err) => {
                warn!(target: "plugins", plugin = F::ID, "{}; disabling plugin", err);
                ctx.disable();
            }
        }
    }

    /// Destroy the widget if there is one
    pub fn on_terminate_event(&mut self, ctx: &mut PluginContext<'_>) {
        if self.state.destroy(ctx.dom()) {
            debug!(target: "plugins", plugin = F::ID, "Overlay removed");
        }
    }

    /// Route a protocol event to trigger, terminate, or nothing
    pub fn handle_protocol_event(&mut self, event: &ProtocolEvent, ctx: &mut PluginContext<'_>) {
        if let Some(payload) = self.feature.match_trigger(event) {
            self.on_trigger_event(payload, ctx);
        } else if self.feature.is_terminate(event) {
            self.on_terminate_event(ctx);
        } else {
            trace!(target: "plugins", plugin = F::ID, "Filtered {}", event.name());
        }
    }
}

impl<F: OverlayFeature + Default> Default for OverlayController<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: OverlayFeature> Plugin for OverlayController<F> {
    fn id(&self) -> &'static str {
        F::ID
    }

    fn name(&self) -> &'static str {
        F::NAME
    }

    fn author(&self) -> &'static str {
        F::AUTHOR
    }

    fn init(&mut self, ctx: &mut PluginContext<'_>) {
        ctx.log(format!("Initializing {}", F::NAME));
    }

    fn start(&mut self, ctx: &mut PluginContext<'_>) {
        ctx.log(format!("Started {}", F::NAME));
        if let Some(css) = self.feature.stylesheet() {
            ctx.dom().inject_stylesheet(F::ID, css);
        }
    }

    fn stop(&mut self, ctx: &mut PluginContext<'_>) {
        ctx.log(format!("Stopped {}", F::NAME));
        self.state.destroy(ctx.dom());
    }

    fn subscribed_events(&self) -> &[EventFilter] {
        self.feature.subscribed_events()
    }

    fn on_event(&mut self, event: &HostEvent, ctx: &mut PluginContext<'_>) {
        if let HostEvent::Protocol(event) = event {
            self.handle_protocol_event(event, ctx);
        }
    }

    fn on_tick(&mut self, ctx: &mut PluginContext<'_>, _delta: Duration) {
        if !ctx.enabled() {
            return;
        }
        let Some(widget) = self.state.widget() else {
            return;
        };
        if self.feature.poll(widget, ctx).is_none() {
            trace!(target: "plugins", plugin = F::ID, "Ambient state unavailable, skipping tick");
        }
    }

    fn on_enable(&mut self, ctx: &mut PluginContext<'_>) {
        ctx.log(format!("{} enabled", F::NAME));
    }

    fn on_disable(&mut self, ctx: &mut PluginContext<'_>) {
        if self.state.destroy(ctx.dom()) {
            debug!(target: "plugins", plugin = F::ID, "Disabled while live, overlay removed");
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
