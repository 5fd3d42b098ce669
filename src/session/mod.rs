//! Offline orchestration of playback, rendering and capture.

pub(crate) mod explainer;
