//! Library half of the `hudkit` binary: recorded session logs and the runner
//! that plays them through a plugin host

pub mod replay;

pub use replay::{MAX_REPLAY_DURATION, Replay, ReplayError, ReplayEvent, ReplayRunner, TimedEvent};
