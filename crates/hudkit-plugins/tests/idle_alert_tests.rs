// Integration tests for the idle alert overlay

use std::time::{Duration, Instant};

use hudkit_events::InteractionKind;
use hudkit_host::{GameSnapshot, HeadlessDom, ListenerOptions, NodeId, PluginHost, SettingsStore};
use hudkit_plugins::idle_alert::{IDLE_TIMEOUT_KEY, MAX_IDLE_TIMEOUT_SECS};
use hudkit_plugins::{IdleAlert, IdleOverlay, IdleState};

const ID: &str = "idle_alert";
const TIMEOUT: Duration = Duration::from_secs(1);

type Host = PluginHost<HeadlessDom, GameSnapshot>;

fn host_with(dom: HeadlessDom, start: Instant) -> Host {
    host_with_timeout(dom, start, TIMEOUT.as_secs())
}

fn host_with_timeout(dom: HeadlessDom, start: Instant, timeout_secs: u64) -> Host {
    let mut settings = SettingsStore::new();
    settings.entry(ID).set_u64(IDLE_TIMEOUT_KEY, timeout_secs);

    let mut host = PluginHost::new(dom, GameSnapshot::new()).with_settings(settings);
    host.register(Box::new(IdleAlert::default()));
    host.start_all(start);
    host
}

fn themed_dom() -> HeadlessDom {
    HeadlessDom::new().with_css_variable("--theme-danger", "#ef4444")
}

fn overlay(host: &Host) -> &IdleOverlay {
    host.plugin::<IdleAlert>(ID).unwrap().overlay().unwrap()
}

fn root(host: &Host) -> NodeId {
    overlay(host).widget().root()
}

#[test]
fn test_start_creates_hidden_overlay_with_listeners() {
    let host = host_with(themed_dom(), Instant::now());
    let dom = host.dom();
    let root = root(&host);

    assert_eq!(overlay(&host).state(), IdleState::Hidden);
    assert_eq!(dom.is_hidden(root), Some(true));
    assert_eq!(dom.classes(root), ["highlite-idle-overlay"]);
    assert_eq!(dom.style(root, "pointer-events"), Some("none"));
    assert_eq!(dom.style(root, "z-index"), Some("99999999"));
    assert_eq!(dom.style(root, "width"), Some("-webkit-fill-available"));
    assert_eq!(
        dom.style(root, "background-color"),
        Some("rgba(239, 68, 68, 0.3)")
    );

    let listeners = dom.listeners();
    assert_eq!(listeners.len(), IdleOverlay::BOUND_KINDS.len());
    for (kind, options) in listeners {
        let expected = if kind == InteractionKind::Focus {
            ListenerOptions::default()
        } else {
            ListenerOptions::PASSIVE_CAPTURE
        };
        assert_eq!(options, expected, "{} listener", kind);
    }
}

#[test]
fn test_shows_after_idle_timeout() {
    let start = Instant::now();
    let mut host = host_with(themed_dom(), start);

    host.tick(start + Duration::from_millis(500));
    assert_eq!(overlay(&host).state(), IdleState::Hidden);

    host.tick(start + TIMEOUT);
    assert_eq!(overlay(&host).state(), IdleState::Shown);
    assert_eq!(host.dom().is_hidden(root(&host)), Some(false));
}

#[test]
fn test_oversized_timeout_is_clamped() {
    let start = Instant::now();
    let max = Duration::from_secs(MAX_IDLE_TIMEOUT_SECS);
    let mut host = host_with_timeout(themed_dom(), start, u64::MAX);
    assert!(host.is_enabled(ID));

    host.handle_interaction(InteractionKind::Click, start);
    host.tick(start + max - Duration::from_secs(1));
    assert_eq!(overlay(&host).state(), IdleState::Hidden);

    host.tick(start + max);
    assert_eq!(overlay(&host).state(), IdleState::Shown);
}

#[test]
fn test_zero_timeout_shows_on_next_frame() {
    let start = Instant::now();
    let mut host = host_with_timeout(themed_dom(), start, 0);

    host.tick(start);
    assert_eq!(overlay(&host).state(), IdleState::Shown);
}

#[test]
fn test_every_bound_interaction_hides() {
    let start = Instant::now();
    let mut host = host_with(themed_dom(), start);
    let mut now = start;

    for kind in IdleOverlay::BOUND_KINDS {
        now += TIMEOUT;
        host.tick(now);
        assert_eq!(overlay(&host).state(), IdleState::Shown, "before {}", kind);

        host.handle_interaction(kind, now);
        assert_eq!(overlay(&host).state(), IdleState::Hidden, "after {}", kind);
        assert_eq!(host.dom().is_hidden(root(&host)), Some(true));
    }
}

#[test]
fn test_interaction_restarts_countdown() {
    let start = Instant::now();
    let mut host = host_with(themed_dom(), start);

    host.handle_interaction(InteractionKind::KeyDown, start + Duration::from_millis(800));
    host.tick(start + TIMEOUT);
    assert_eq!(overlay(&host).state(), IdleState::Hidden);

    host.tick(start + Duration::from_millis(1800));
    assert_eq!(overlay(&host).state(), IdleState::Shown);
}

#[test]
fn test_unbound_interactions_are_ignored() {
    let start = Instant::now();
    let mut host = host_with(themed_dom(), start);
    host.tick(start + TIMEOUT);

    host.handle_interaction(InteractionKind::MouseMove, start + TIMEOUT);
    host.handle_interaction(InteractionKind::Wheel, start + TIMEOUT);
    assert_eq!(overlay(&host).state(), IdleState::Shown);
}

#[test]
fn test_show_reads_current_theme() {
    let start = Instant::now();
    let mut host = host_with(themed_dom(), start);

    host.dom_mut().set_css_variable("--theme-danger", "#00ff00");
    host.tick(start + TIMEOUT);
    assert_eq!(
        host.dom().style(root(&host), "background-color"),
        Some("rgba(0, 255, 0, 0.3)")
    );
}

#[test]
fn test_bad_theme_keeps_previous_color() {
    let start = Instant::now();
    let mut host = host_with(themed_dom(), start);

    host.dom_mut().set_css_variable("--theme-danger", "crimson");
    host.tick(start + TIMEOUT);
    assert_eq!(overlay(&host).state(), IdleState::Shown);
    assert_eq!(
        host.dom().style(root(&host), "background-color"),
        Some("rgba(239, 68, 68, 0.3)")
    );
}

#[test]
fn test_stop_removes_overlay_and_listeners() {
    let start = Instant::now();
    let mut host = host_with(themed_dom(), start);

    host.stop_plugin(ID, start);
    host.stop_plugin(ID, start);
    assert!(host.plugin::<IdleAlert>(ID).unwrap().overlay().is_none());
    assert!(host.dom().listeners().is_empty());
    assert_eq!(host.dom().query_selector(".highlite-idle-overlay"), None);
    assert_eq!(host.dom().removal_count(), 1);

    // The countdown is cancelled too
    host.start_plugin(ID, start + Duration::from_millis(500));
    host.tick(start + TIMEOUT);
    assert_eq!(overlay(&host).state(), IdleState::Hidden);
}

#[test]
fn test_disable_and_enable() {
    let start = Instant::now();
    let mut host = host_with(themed_dom(), start);

    host.set_enabled(ID, false, start);
    assert!(host.plugin::<IdleAlert>(ID).unwrap().overlay().is_none());
    host.tick(start + TIMEOUT);

    host.set_enabled(ID, true, start + TIMEOUT);
    assert_eq!(overlay(&host).state(), IdleState::Hidden);
    assert_eq!(host.dom().listeners().len(), IdleOverlay::BOUND_KINDS.len());
}

#[test]
fn test_creation_failure_disables_plugin() {
    let mut dom = themed_dom();
    dom.refuse_element_creation(true);
    let host = host_with(dom, Instant::now());

    assert!(host.plugin::<IdleAlert>(ID).unwrap().overlay().is_none());
    assert!(!host.is_enabled(ID));
    assert!(host.dom().listeners().is_empty());
}

#[test]
fn test_refused_attach_disables_plugin() {
    let mut dom = themed_dom();
    dom.refuse_attach(true);
    let host = host_with(dom, Instant::now());

    assert!(host.plugin::<IdleAlert>(ID).unwrap().overlay().is_none());
    assert!(!host.is_enabled(ID));
    assert!(host.dom().listeners().is_empty());
    assert_eq!(host.dom().node_count(), 0);
}
