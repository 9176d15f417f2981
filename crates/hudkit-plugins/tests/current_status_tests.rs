// Integration tests for the current status panel

use std::time::{Duration, Instant};

use hudkit_events::{ActionState, MapLevel, Position};
use hudkit_host::{
    GameSnapshot, HeadlessDom, NodeId, PluginHost, PluginSettings, SettingsStore, UiScope,
};
use hudkit_plugins::CurrentStatus;
use hudkit_plugins::current_status::VALUE_FIELD;

const ID: &str = "current_status";

type Host = PluginHost<HeadlessDom, GameSnapshot>;

fn host_with(settings: SettingsStore) -> Host {
    let game = GameSnapshot::with_player(Position::new(0, 0), MapLevel::Overworld);
    let mut host = PluginHost::new(HeadlessDom::new(), game).with_settings(settings);
    host.register(Box::new(CurrentStatus::default()));
    host.start_all(Instant::now());
    host
}

fn host() -> Host {
    host_with(SettingsStore::new())
}

fn panel(host: &Host) -> NodeId {
    host.dom().query_selector(".hs-game-menu").unwrap()
}

fn status_text(host: &Host) -> &str {
    let widget = host
        .plugin::<CurrentStatus>(ID)
        .unwrap()
        .state()
        .widget()
        .unwrap();
    host.dom().text(widget.field(VALUE_FIELD).unwrap()).unwrap()
}

fn set_action(host: &mut Host, state: &str) {
    if let Some(player) = host.game_mut().player.as_mut() {
        player.action_state = ActionState::new(state);
    }
}

fn is_live(host: &Host) -> bool {
    host.plugin::<CurrentStatus>(ID).unwrap().state().is_live()
}

#[test]
fn test_start_creates_panel() {
    let host = host();
    let dom = host.dom();
    let panel = panel(&host);

    assert_eq!(dom.attached_count(UiScope::ClientInternal), 1);
    assert_eq!(dom.classes(panel), ["hs-menu", "hs-game-menu"]);
    assert_eq!(dom.style(panel, "position"), Some("absolute"));
    assert_eq!(dom.style(panel, "right"), Some("235px"));
    assert_eq!(dom.style(panel, "bottom"), Some("110px"));
    assert_eq!(status_text(&host), "Idle");
}

#[test]
fn test_start_is_idempotent() {
    let mut host = host();
    host.start_plugin(ID, Instant::now());
    host.start_plugin(ID, Instant::now());

    assert_eq!(host.dom().attached_count(UiScope::ClientInternal), 1);
    assert_eq!(host.dom().removal_count(), 0);
}

#[test]
fn test_tick_shows_action_state() {
    let mut host = host();
    set_action(&mut host, "WoodcuttingState");

    host.tick(Instant::now());
    assert_eq!(status_text(&host), "Woodcutting");
}

#[test]
fn test_tick_moves_panel_with_menu() {
    let mut host = host();
    let start = Instant::now();

    host.tick(start);
    let node = panel(&host);
    assert_eq!(host.dom().style(node, "right"), Some("6px"));
    assert_eq!(
        host.dom().style(node, "transition"),
        Some("all 0.1s ease-in-out")
    );

    host.game_mut().menu_open = true;
    host.tick(start + Duration::from_millis(50));
    assert_eq!(host.dom().style(node, "right"), Some("235px"));
    assert_eq!(host.dom().style(node, "transition"), Some("none"));
}

#[test]
fn test_tick_without_player_keeps_text() {
    let mut host = host();
    host.game_mut().player = None;

    host.tick(Instant::now());
    assert_eq!(status_text(&host), "Idle");
    assert_eq!(host.dom().style(panel(&host), "right"), Some("6px"));
}

#[test]
fn test_disabled_at_start_creates_nothing() {
    let mut settings = SettingsStore::new();
    *settings.entry(ID) = PluginSettings::disabled();
    let mut host = host_with(settings);

    host.tick(Instant::now());
    assert!(!is_live(&host));
    assert_eq!(host.dom().node_count(), 0);
}

#[test]
fn test_disable_destroys_and_enable_recreates() {
    let mut host = host();
    let now = Instant::now();

    host.set_enabled(ID, false, now);
    assert!(!is_live(&host));
    assert_eq!(host.dom().query_selector(".hs-game-menu"), None);

    host.set_enabled(ID, true, now);
    assert!(is_live(&host));
    assert_eq!(host.dom().attached_count(UiScope::ClientInternal), 1);
    assert_eq!(host.dom().peak_attached(UiScope::ClientInternal), 1);
}

#[test]
fn test_stop_twice_removes_once() {
    let mut host = host();
    let now = Instant::now();

    host.stop_plugin(ID, now);
    host.stop_plugin(ID, now);
    assert!(!is_live(&host));
    assert_eq!(host.dom().removal_count(), 1);
    assert_eq!(host.dom().node_count(), 0);
}

#[test]
fn test_creation_failure_disables_plugin() {
    let mut dom = HeadlessDom::new();
    dom.refuse_element_creation(true);
    let mut host = PluginHost::new(dom, GameSnapshot::new());
    host.register(Box::new(CurrentStatus::default()));
    host.start_all(Instant::now());

    assert!(!is_live(&host));
    assert!(!host.is_enabled(ID));
}
