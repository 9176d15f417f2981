use hudkit_events::{ActionState, MapLevel, Position};
use serde::{Deserialize, Serialize};

/// Read-only view of the game client's live state
///
/// Every accessor is queried fresh on each call; implementations must not
/// assume callers cache results. `None` means the value is not available
/// right now (no main player yet, loading screen, ...).
pub trait GameState: Send {
    fn player_position(&self) -> Option<Position>;

    fn player_map_level(&self) -> Option<MapLevel>;

    fn player_action_state(&self) -> Option<ActionState>;

    /// Whether the side game menu is open; only used to move overlays aside
    fn menu_open(&self) -> bool;
}

/// The main player's ambient fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: Position,
    pub map_level: MapLevel,
    pub action_state: ActionState,
}

impl PlayerSnapshot {
    pub fn new(position: Position, map_level: MapLevel) -> Self {
        Self {
            position,
            map_level,
            action_state: ActionState::new("IdleState"),
        }
    }
}

/// Plain-data [`GameState`] fed by whoever owns the real client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub player: Option<PlayerSnapshot>,
    pub menu_open: bool,
}

impl GameSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player(position: Position, map_level: MapLevel) -> Self {
        Self {
            player: Some(PlayerSnapshot::new(position, map_level)),
            menu_open: false,
        }
    }

    /// Move the player, creating one on the overworld if there is none
    pub fn move_player(&mut self, position: Position) {
        match &mut self.player {
            Some(player) => player.position = position,
            None => self.player = Some(PlayerSnapshot::new(position, MapLevel::Overworld)),
        }
    }
}

impl GameState for GameSnapshot {
    fn player_position(&self) -> Option<Position> {
        self.player.as_ref().map(|p| p.position)
    }

    fn player_map_level(&self) -> Option<MapLevel> {
        self.player.as_ref().map(|p| p.map_level)
    }

    fn player_action_state(&self) -> Option<ActionState> {
        self.player.as_ref().map(|p| p.action_state.clone())
    }

    fn menu_open(&self) -> bool {
        self.menu_open
    }
}
