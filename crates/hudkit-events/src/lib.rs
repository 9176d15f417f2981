//! Event types shared by the hudkit host and its plugins
//!
//! The host decodes raw packets and input into these types before dispatching
//! them, so plugins never touch positional payloads directly.

pub mod game_types;
pub mod interaction_events;
pub mod protocol_events;

pub use game_types::{ActionState, MapLevel, Position};
pub use interaction_events::{InteractionEvent, InteractionKind};
pub use protocol_events::{
    DecodeError, InventoryItemAction, LootMenu, MapCoordinates, ProtocolEvent,
};

/// Unified event delivered to plugins by the host dispatcher
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Inbound game protocol packet, already decoded
    Protocol(ProtocolEvent),
    /// Raw user interaction with the client window
    Interaction(InteractionEvent),
}

impl HostEvent {
    /// Short name used in log lines
    pub fn name(&self) -> &str {
        match self {
            HostEvent::Protocol(event) => event.name(),
            HostEvent::Interaction(event) => event.kind.as_ref(),
        }
    }
}

impl From<ProtocolEvent> for HostEvent {
    fn from(event: ProtocolEvent) -> Self {
        HostEvent::Protocol(event)
    }
}

impl From<InteractionEvent> for HostEvent {
    fn from(event: InteractionEvent) -> Self {
        HostEvent::Interaction(event)
    }
}
