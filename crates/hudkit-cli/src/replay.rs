//! Recorded session logs
//!
//! A replay is a JSON-lines file, one event per line, each stamped with its
//! offset from the start of the session:
//!
//! ```text
//! {"at_ms": 0, "kind": "player", "x": 95, "z": 180, "level": 1}
//! {"at_ms": 40, "kind": "protocol", "name": "InvokedInventoryItemAction", "payload": [19, 0, 0, 442, 0, 0, 1, [0, 100, 200, 1]]}
//! {"at_ms": 900, "kind": "input", "interaction": "click"}
//! {"at_ms": 1500, "kind": "protocol", "name": "ShowLootMenu", "payload": [[], 0, null]}
//! ```
//!
//! The runner ticks the host at its tick interval between events, so timers
//! and per-frame updates behave as they would against a live client.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use hudkit_events::{ActionState, InteractionKind, MapLevel, Position};
use hudkit_host::{Dom, GameSnapshot, PluginHost};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Longest session a replay may span
pub const MAX_REPLAY_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: event at {at_ms}ms is earlier than the previous one")]
    OutOfOrder { line: usize, at_ms: u64 },

    #[error("line {line}: event at {at_ms}ms is past the {}s replay limit", MAX_REPLAY_DURATION.as_secs())]
    TooLate { line: usize, at_ms: u64 },
}

/// One thing that happened in a recorded session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// Inbound packet hook call, as the client delivered it
    Protocol {
        name: String,
        #[serde(default)]
        payload: Vec<Value>,
    },
    /// The main player (re)appeared or moved
    Player {
        x: i32,
        z: i32,
        #[serde(default)]
        level: Option<MapLevel>,
        #[serde(default)]
        action_state: Option<String>,
    },
    /// The main player is gone (logout, loading screen)
    PlayerGone,
    /// The side game menu opened or closed
    Menu { open: bool },
    /// Raw window input
    Input { interaction: InteractionKind },
    /// A plugin's `enable` setting was flipped
    Enable { plugin: String, value: bool },
    /// Request a host frame now
    Tick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Offset from the start of the session
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: ReplayEvent,
}

impl TimedEvent {
    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

/// A parsed session log, ordered by time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Replay {
    events: Vec<TimedEvent>,
}

impl Replay {
    pub fn from_path(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(BufReader::new(file)).map_err(|err| match err {
            ReplayError::Io { source, .. } => ReplayError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse JSON lines; blank lines are skipped
    pub fn parse(reader: impl BufRead) -> Result<Self, ReplayError> {
        let mut events: Vec<TimedEvent> = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line.map_err(|source| ReplayError::Io {
                path: PathBuf::new(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let event: TimedEvent =
                serde_json::from_str(&line).map_err(|source| ReplayError::Parse {
                    line: line_number,
                    source,
                })?;
            if event.offset() > MAX_REPLAY_DURATION {
                return Err(ReplayError::TooLate {
                    line: line_number,
                    at_ms: event.at_ms,
                });
            }
            if events.last().is_some_and(|last| last.at_ms > event.at_ms) {
                return Err(ReplayError::OutOfOrder {
                    line: line_number,
                    at_ms: event.at_ms,
                });
            }
            events.push(event);
        }

        Ok(Self { events })
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Offset of the last event
    pub fn duration(&self) -> Duration {
        self.events
            .last()
            .map(TimedEvent::offset)
            .unwrap_or_default()
    }
}

/// Drives a host through a replay on a virtual clock
pub struct ReplayRunner<D: Dom> {
    host: PluginHost<D, GameSnapshot>,
    start: Instant,
    /// Offset of the next scheduled frame
    next_frame: Duration,
}

impl<D: Dom> ReplayRunner<D> {
    pub fn new(host: PluginHost<D, GameSnapshot>, start: Instant) -> Self {
        Self {
            host,
            start,
            next_frame: Duration::ZERO,
        }
    }

    pub fn host(&self) -> &PluginHost<D, GameSnapshot> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut PluginHost<D, GameSnapshot> {
        &mut self.host
    }

    pub fn into_host(self) -> PluginHost<D, GameSnapshot> {
        self.host
    }

    /// Run every frame scheduled at or before `offset`
    ///
    /// Offsets past [`MAX_REPLAY_DURATION`] are clamped to it.
    pub fn advance_to(&mut self, offset: Duration) {
        let offset = offset.min(MAX_REPLAY_DURATION);
        let interval = self.host.tick_interval().max(Duration::from_millis(1));
        while self.next_frame <= offset {
            self.host.tick(self.start + self.next_frame);
            self.next_frame += interval;
        }
    }

    /// Run the frames leading up to `event`, then deliver it
    pub fn apply(&mut self, event: &TimedEvent) {
        let offset = event.offset().min(MAX_REPLAY_DURATION);
        self.advance_to(offset);

        let now = self.start + offset;
        trace!(target: "replay", "{:>8}ms {:?}", event.at_ms, event.event);
        match &event.event {
            ReplayEvent::Protocol { name, payload } => self.host.handle_packet(name, payload, now),
            ReplayEvent::Player {
                x,
                z,
                level,
                action_state,
            } => {
                let game = self.host.game_mut();
                game.move_player(Position::new(*x, *z));
                if let Some(player) = game.player.as_mut() {
                    if let Some(level) = level {
                        player.map_level = *level;
                    }
                    if let Some(action_state) = action_state {
                        player.action_state = ActionState::new(action_state.as_str());
                    }
                }
            }
            ReplayEvent::PlayerGone => self.host.game_mut().player = None,
            ReplayEvent::Menu { open } => self.host.game_mut().menu_open = *open,
            ReplayEvent::Input { interaction } => self.host.handle_interaction(*interaction, now),
            ReplayEvent::Enable { plugin, value } => {
                if !self.host.set_enabled(plugin, *value, now) {
                    warn!(target: "replay", "Unknown plugin {} at {}ms", plugin, event.at_ms);
                }
            }
            ReplayEvent::Tick => {
                self.host.tick(now);
            }
        }
    }

    /// Apply every event in order, then run the frame after the last one
    pub fn run(&mut self, replay: &Replay) {
        for event in replay.events() {
            self.apply(event);
        }
        self.advance_to(replay.duration());
        debug!(target: "replay", "Replayed {} events over {:?}", replay.len(), replay.duration());
    }
}
