//! Play/pause/rewind control for scene media.
//!
//! Transports are driven by the playback clock: every call takes the current
//! time so that positions stay deterministic under a manual clock.

/// Rejected transport operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Pause was requested while the media was not playing.
    #[error("media is not playing")]
    NotPlaying,
}

/// Controls the media clock of one scene's background.
pub trait MediaTransport: Send {
    /// Start or continue playback at `now`.
    fn play(&mut self, now: f64) -> Result<(), TransportError>;
    /// Freeze playback at `now`.
    fn pause(&mut self, now: f64) -> Result<(), TransportError>;
    /// Move the media clock back to zero.
    fn rewind(&mut self, now: f64) -> Result<(), TransportError>;
    /// Media time in seconds at `now`.
    fn position(&self, now: f64) -> f64;
    /// Whether the transport is currently advancing.
    fn is_playing(&self) -> bool;
}

/// Media clock for looping video backgrounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Playhead {
    anchor: Option<f64>,
    offset: f64,
}

impl Playhead {
    /// A stopped playhead at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaTransport for Playhead {
    fn play(&mut self, now: f64) -> Result<(), TransportError> {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
        Ok(())
    }

    fn pause(&mut self, now: f64) -> Result<(), TransportError> {
        let anchor = self.anchor.take().ok_or(TransportError::NotPlaying)?;
        self.offset += (now - anchor).max(0.0);
        Ok(())
    }

    fn rewind(&mut self, now: f64) -> Result<(), TransportError> {
        self.offset = 0.0;
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
        Ok(())
    }

    fn position(&self, now: f64) -> f64 {
        match self.anchor {
            Some(anchor) => self.offset + (now - anchor).max(0.0),
            None => self.offset,
        }
    }

    fn is_playing(&self) -> bool {
        self.anchor.is_some()
    }
}

/// Transport for still images and placeholders. Every call is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct StillTransport;

impl MediaTransport for StillTransport {
    fn play(&mut self, _now: f64) -> Result<(), TransportError> {
        Ok(())
    }

    fn pause(&mut self, _now: f64) -> Result<(), TransportError> {
        Ok(())
    }

    fn rewind(&mut self, _now: f64) -> Result<(), TransportError> {
        Ok(())
    }

    fn position(&self, _now: f64) -> f64 {
        0.0
    }

    fn is_playing(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/transport.rs"]
mod tests;
