use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::narration::DEFAULT_WORDS_PER_SECOND;

/// How the driver decides to leave a scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Scenes advance when elapsed time crosses the next scene's start.
    #[default]
    #[serde(alias = "fixed")]
    FixedDuration,
    /// Scenes advance when their narration completes.
    SpeechGated,
}

/// Driver state machine phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Not started, or reset.
    #[default]
    Idle,
    /// Ticking.
    Playing,
    /// Frozen, resumable.
    Paused,
    /// Last scene finished; final frame frozen.
    Completed,
}

/// Driver tuning.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Scene advance policy.
    pub mode: PlaybackMode,
    /// Rate used to estimate narration when speech fails or is unavailable.
    pub words_per_second: f64,
    /// Delay between entering a scene and requesting its narration.
    pub advance_delay_secs: f64,
    /// Delay before the first scene's narration.
    pub first_narration_delay_secs: f64,
    /// Floor for the visual progress denominator in speech-gated mode. Zero uses the
    /// declared scene duration as is.
    pub min_scene_secs: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::FixedDuration,
            words_per_second: DEFAULT_WORDS_PER_SECOND,
            advance_delay_secs: 0.1,
            first_narration_delay_secs: 0.2,
            min_scene_secs: 0.0,
        }
    }
}

impl PlaybackConfig {
    /// Defaults with `mode` replaced.
    pub fn with_mode(mode: PlaybackMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> SlidesageResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| SlidesageError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that rates are positive and delays non-negative.
    pub fn validate(&self) -> SlidesageResult<()> {
        if !self.words_per_second.is_finite() || self.words_per_second <= 0.0 {
            return Err(SlidesageError::validation(
                "words_per_second must be finite and > 0",
            ));
        }
        for (name, v) in [
            ("advance_delay_secs", self.advance_delay_secs),
            ("first_narration_delay_secs", self.first_narration_delay_secs),
            ("min_scene_secs", self.min_scene_secs),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SlidesageError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

/// Mutable playback bookkeeping, written only by the driver.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackState {
    /// Current phase.
    pub phase: PlaybackPhase,
    /// When the current play session began, shifted forward by every pause.
    pub start_wall_clock: Option<f64>,
    /// Scene on screen.
    pub current_scene_index: usize,
    /// When the current scene began (speech-gated accounting), shifted by pauses.
    pub scene_start_wall_clock: Option<f64>,
    /// Narration for the current scene has finished.
    pub speech_complete: bool,
    /// A scene advance has started and its narration has not been requested yet.
    pub transition_in_flight: bool,
    /// Time at which accounting froze (pause or completion).
    pub frozen_at: Option<f64>,
}

impl PlaybackState {
    /// Whether the driver is ticking.
    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }
}
