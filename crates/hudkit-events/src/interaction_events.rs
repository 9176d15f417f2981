//! Interaction event types for input handling
//!
//! The host forwards raw window input as these platform-agnostic events. Names
//! match the DOM event names so a browser host can map them one to one.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Kind of user interaction with the client window
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InteractionKind {
    /// Mouse click
    Click,
    /// Key pressed
    KeyDown,
    /// Touch began
    TouchStart,
    /// Pointer pressed
    PointerDown,
    /// Pointer released
    PointerUp,
    /// Client window gained focus
    Focus,
    /// Pointer moved
    MouseMove,
    /// Scroll wheel
    Wheel,
}

impl InteractionKind {
    /// Every kind the host can report
    pub const ALL: [InteractionKind; 8] = [
        InteractionKind::Click,
        InteractionKind::KeyDown,
        InteractionKind::TouchStart,
        InteractionKind::PointerDown,
        InteractionKind::PointerUp,
        InteractionKind::Focus,
        InteractionKind::MouseMove,
        InteractionKind::Wheel,
    ];

    /// Whether the event is dispatched on the window itself rather than
    /// captured from the document
    pub fn is_window_event(&self) -> bool {
        matches!(self, InteractionKind::Focus)
    }
}

/// A single interaction event; listeners only care about its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub kind: InteractionKind,
}

impl InteractionEvent {
    pub fn new(kind: InteractionKind) -> Self {
        Self { kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_dom_names() {
        assert_eq!(InteractionKind::KeyDown.as_ref(), "keydown");
        assert_eq!(InteractionKind::PointerUp.to_string(), "pointerup");
        assert_eq!(InteractionKind::Focus.as_ref(), "focus");
    }

    #[test]
    fn test_parse_dom_name() {
        assert_eq!(
            InteractionKind::from_str("touchstart").unwrap(),
            InteractionKind::TouchStart
        );
        assert!(InteractionKind::from_str("scroll").is_err());
    }

    #[test]
    fn test_only_focus_is_window_event() {
        let window_events: Vec<_> = InteractionKind::ALL
            .iter()
            .filter(|kind| kind.is_window_event())
            .collect();
        assert_eq!(window_events, vec![&InteractionKind::Focus]);
    }
}
