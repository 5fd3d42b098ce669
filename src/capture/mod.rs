//! Frame capture: fixed-rate tapping of rendered frames into an encoding sink.

pub(crate) mod ffmpeg;
pub(crate) mod pipeline;
pub(crate) mod quality;
pub(crate) mod sink;
