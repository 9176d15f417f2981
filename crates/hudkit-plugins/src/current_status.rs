use std::any::Any;
use std::time::Duration;

use hudkit_events::HostEvent;
use hudkit_host::{
    Dom, EventFilter, OverlayError, OverlayState, Plugin, PluginContext, UiScope, Widget,
};
use tracing::{debug, warn};

/// Widget field holding the action state text
pub const VALUE_FIELD: &str = "status-value";

const PANEL_STYLES: [(&str, &str); 10] = [
    ("position", "absolute"),
    ("height", "auto"),
    ("z-index", "1000"),
    ("display", "flex"),
    ("flex-direction", "column"),
    ("justify-content", "space-evenly"),
    ("width", "auto"),
    ("padding", "10px"),
    ("right", "235px"),
    ("bottom", "110px"),
];

/// Shows the player's current action state in a small panel beside the game
/// menu
#[derive(Debug, Default)]
pub struct CurrentStatus {
    state: OverlayState,
}

impl CurrentStatus {
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    fn create_status_ui(&mut self, ctx: &mut PluginContext<'_>) {
        if let Err(err) = self
            .state
            .create_with(ctx.dom(), UiScope::ClientInternal, build_panel)
        {
            warn!(target: "plugins", plugin = ctx.plugin_id(), "Failed to create status UI: {}", err);
            ctx.disable();
        }
    }
}

fn build_panel(widget: &mut Widget, dom: &mut dyn Dom) -> Result<(), OverlayError> {
    let root = widget.root();
    for (property, value) in PANEL_STYLES {
        dom.set_style(root, property, value);
    }
    dom.add_class(root, "hs-menu");
    dom.add_class(root, "hs-game-menu");

    let row = widget.append(dom, None, "span", None)?;
    dom.set_style(row, "display", "flex");
    dom.set_style(row, "justify-content", "center");
    widget.append_field(dom, Some(row), "span", VALUE_FIELD, "Idle")?;
    Ok(())
}

impl Plugin for CurrentStatus {
    fn id(&self) -> &'static str {
        "current_status"
    }

    fn name(&self) -> &'static str {
        "Current Status"
    }

    fn author(&self) -> &'static str {
        "Doodleman360"
    }

    fn init(&mut self, ctx: &mut PluginContext<'_>) {
        ctx.log("Initialized");
    }

    fn start(&mut self, ctx: &mut PluginContext<'_>) {
        ctx.log("Started");
        if ctx.enabled() && !self.state.is_live() {
            self.create_status_ui(ctx);
        }
    }

    fn stop(&mut self, ctx: &mut PluginContext<'_>) {
        ctx.log("Stopped");
        self.state.destroy(ctx.dom());
    }

    fn subscribed_events(&self) -> &[EventFilter] {
        // Tick driven only
        &[]
    }

    fn on_event(&mut self, _event: &HostEvent, _ctx: &mut PluginContext<'_>) {}

    fn on_tick(&mut self, ctx: &mut PluginContext<'_>, _delta: Duration) {
        if !ctx.enabled() {
            return;
        }
        let Some(widget) = self.state.widget() else {
            return;
        };

        // Slide aside while the game menu is open
        let (right, transition) = if ctx.game().menu_open() {
            ("235px", "none")
        } else {
            ("6px", "all 0.1s ease-in-out")
        };
        widget.set_style(ctx.dom(), "right", right);
        widget.set_style(ctx.dom(), "transition", transition);

        let Some(action_state) = ctx.game().player_action_state() else {
            return;
        };
        widget.set_text(ctx.dom(), VALUE_FIELD, action_state.display_name());
    }

    fn on_enable(&mut self, ctx: &mut PluginContext<'_>) {
        if !self.state.is_live() {
            self.create_status_ui(ctx);
        }
    }

    fn on_disable(&mut self, ctx: &mut PluginContext<'_>) {
        if self.state.destroy(ctx.dom()) {
            debug!(target: "plugins", plugin = ctx.plugin_id(), "Status UI removed");
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
