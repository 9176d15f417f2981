//! Value types read from the game client's ambient state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Player position on the ground plane
///
/// The game stores positions as `(x, y, z)` with `y` as height; overlays only
/// ever show `x` and `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub z: i32,
}

impl Position {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Map level the player (or a treasure map) is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum MapLevel {
    Underground,
    Overworld,
    Sky,
    /// Level ids the client does not name
    Other(i32),
}

impl MapLevel {
    pub fn id(&self) -> i32 {
        match self {
            MapLevel::Underground => 0,
            MapLevel::Overworld => 1,
            MapLevel::Sky => 2,
            MapLevel::Other(id) => *id,
        }
    }
}

impl From<i32> for MapLevel {
    fn from(id: i32) -> Self {
        match id {
            0 => MapLevel::Underground,
            1 => MapLevel::Overworld,
            2 => MapLevel::Sky,
            other => MapLevel::Other(other),
        }
    }
}

impl From<MapLevel> for i32 {
    fn from(level: MapLevel) -> Self {
        level.id()
    }
}

impl fmt::Display for MapLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapLevel::Underground => write!(f, "Underground"),
            MapLevel::Overworld => write!(f, "Overworld"),
            MapLevel::Sky => write!(f, "Sky"),
            MapLevel::Other(id) => write!(f, "{}", id),
        }
    }
}

/// Name of the player's current action state as the client reports it,
/// e.g. `IdleState` or `WoodcuttingState`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionState(String);

impl ActionState {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Raw state name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// State name without its trailing `State` suffix
    pub fn display_name(&self) -> &str {
        self.0.strip_suffix("State").unwrap_or(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_level_names() {
        assert_eq!(MapLevel::from(0).to_string(), "Underground");
        assert_eq!(MapLevel::from(1).to_string(), "Overworld");
        assert_eq!(MapLevel::from(2).to_string(), "Sky");
        assert_eq!(MapLevel::from(7).to_string(), "7");
        assert_eq!(MapLevel::from(-1).to_string(), "-1");
    }

    #[test]
    fn test_map_level_id_preserved() {
        assert_eq!(MapLevel::Other(9).id(), 9);
        assert_eq!(MapLevel::Sky.id(), 2);
    }

    #[test]
    fn test_action_state_display_name() {
        assert_eq!(ActionState::new("IdleState").display_name(), "Idle");
        assert_eq!(ActionState::new("Woodcutting").display_name(), "Woodcutting");
        assert_eq!(ActionState::new("State").display_name(), "");
    }
}
