//! Narration requests, the provider seam, and the word-count fallback estimate.

use crate::foundation::error::SlidesageResult;
use crate::script::model::Speaker;

/// Words per second used to estimate narration length when speech is unavailable.
pub const DEFAULT_WORDS_PER_SECOND: f64 = 2.5;

/// Estimated narration length of `text` in seconds.
///
/// Counts whitespace-separated words, with a floor of one word so that empty text
/// still yields a non-zero duration. A non-positive rate falls back to the default.
pub fn estimate_narration_secs(text: &str, words_per_second: f64) -> f64 {
    let words = text.split_whitespace().count().max(1) as f64;
    let wps = if words_per_second.is_finite() && words_per_second > 0.0 {
        words_per_second
    } else {
        DEFAULT_WORDS_PER_SECOND
    };
    words / wps
}

/// Identifies one narration request; ids are never reused within a driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NarrationId(pub u64);

/// Voice shaping for providers that support it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VoiceHint {
    /// Relative pitch, 1.0 is neutral.
    pub pitch: f32,
    /// Relative speaking rate, 1.0 is neutral.
    pub rate: f32,
    /// Volume in `[0, 1]`.
    pub volume: f32,
}

impl VoiceHint {
    /// Student speaks higher, Sage lower; both slightly slow and quieter than full.
    pub fn for_speaker(speaker: Speaker) -> Self {
        let pitch = match speaker {
            Speaker::Student => 1.2,
            Speaker::Sage => 0.8,
        };
        Self {
            pitch,
            rate: 0.9,
            volume: 0.8,
        }
    }
}

/// One scene's narration.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationRequest {
    /// Request id, echoed in the completion event.
    pub id: NarrationId,
    /// Scene being narrated.
    pub scene_index: usize,
    /// Who speaks.
    pub speaker: Speaker,
    /// Text to speak.
    pub text: String,
    /// Voice shaping.
    pub voice: VoiceHint,
}

/// What the provider promises after accepting a request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NarrationTicket {
    /// Completion will be signalled later as a `NarrationComplete` event.
    Pending,
    /// No signal will come; treat the narration as lasting `duration_secs`.
    Timed {
        /// Seconds of speech to wait for.
        duration_secs: f64,
    },
}

/// How a narration ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NarrationOutcome {
    /// Speech finished normally.
    Finished,
    /// Speech failed; the driver falls back to the word-count estimate.
    Failed(String),
}

/// Speech synthesis seam.
///
/// A provider signals completion at most once per accepted [`NarrationTicket::Pending`]
/// request. After `cancel(id)` no completion for `id` may affect playback; the driver
/// also ignores stale ids on its own.
pub trait NarrationProvider {
    /// Begin speaking `request`.
    fn speak(&mut self, request: &NarrationRequest) -> SlidesageResult<NarrationTicket>;
    /// Stop speaking `id`. Unknown or finished ids are ignored.
    fn cancel(&mut self, id: NarrationId);
}

/// Provider for narration-disabled playback: every request is timed by its word count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimatedNarrator {
    words_per_second: f64,
}

impl Default for EstimatedNarrator {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS_PER_SECOND)
    }
}

impl EstimatedNarrator {
    /// Estimate at `words_per_second`.
    pub fn new(words_per_second: f64) -> Self {
        Self { words_per_second }
    }
}

impl NarrationProvider for EstimatedNarrator {
    fn speak(&mut self, request: &NarrationRequest) -> SlidesageResult<NarrationTicket> {
        Ok(NarrationTicket::Timed {
            duration_secs: estimate_narration_secs(&request.text, self.words_per_second),
        })
    }

    fn cancel(&mut self, _id: NarrationId) {}
}

#[cfg(test)]
#[path = "../../tests/unit/narration/mod.rs"]
mod tests;
