//! Playback driver: clock, tick scheduling, and the scene state machine.

pub(crate) mod clock;
pub(crate) mod driver;
pub(crate) mod scheduler;
pub(crate) mod state;
