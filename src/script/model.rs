use std::io::Read;

use anyhow::Context as _;

use crate::foundation::error::{SlidesageError, SlidesageResult};

/// Minimum number of scenes in a script.
pub const MIN_SCENES: usize = 3;
/// Maximum number of scenes in a script.
pub const MAX_SCENES: usize = 6;
/// Shortest allowed scene, in seconds.
pub const MIN_SCENE_SECS: f64 = 3.0;
/// Longest allowed scene, in seconds.
pub const MAX_SCENE_SECS: f64 = 20.0;

/// Narrating role of a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Speaker {
    /// The curious learner asking questions.
    Student,
    /// The explaining teacher.
    Sage,
}

impl Speaker {
    /// Display label drawn above captions.
    pub fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Sage => "Sage",
        }
    }

    /// Accent color (straight RGBA8) used for the speaker label.
    pub fn accent_rgba(self) -> [u8; 4] {
        match self {
            Self::Student => [0x60, 0xa5, 0xfa, 0xff],
            Self::Sage => [0x34, 0xd3, 0x99, 0xff],
        }
    }
}

/// One narrated segment of an explainer video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Who speaks this scene.
    pub speaker: Speaker,
    /// Narrated and captioned text.
    pub dialogue: String,
    /// Free-text description of the intended visual.
    pub visual_hint: String,
    /// Short phrase used to look up background media.
    pub visual_search_query: String,
    /// Intended scene length in seconds.
    pub duration_sec: f64,
}

/// Per-role voice descriptions supplied by the script author.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TtsVoiceHints {
    /// Voice description for [`Speaker::Student`].
    pub student: String,
    /// Voice description for [`Speaker::Sage`].
    pub sage: String,
}

/// Ordered explainer script. Playback order is the order of `scenes`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    /// Video title, drawn as permanent chrome.
    pub title: String,
    /// Ordered scenes.
    pub scenes: Vec<Scene>,
    /// Closing line of the script. Validated, not rendered.
    pub closing: String,
    /// Optional voice descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts_voice_hints: Option<TtsVoiceHints>,
}

impl Script {
    /// Parse a script from JSON text and validate it.
    pub fn from_json_str(s: &str) -> SlidesageResult<Self> {
        let script: Script =
            serde_json::from_str(s).map_err(|e| SlidesageError::serde(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    /// Parse a script from a JSON reader and validate it.
    pub fn from_reader(mut r: impl Read) -> SlidesageResult<Self> {
        let mut s = String::new();
        r.read_to_string(&mut s).context("read script JSON")?;
        Self::from_json_str(&s)
    }

    /// Scene durations in playback order.
    pub fn durations(&self) -> Vec<f64> {
        self.scenes.iter().map(|s| s.duration_sec).collect()
    }

    /// Check scene count, per-scene bounds and text lengths. Reports the first violation.
    pub fn validate(&self) -> SlidesageResult<()> {
        check_len("title", &self.title, 3, None).map_err(SlidesageError::validation)?;
        check_len("closing", &self.closing, 3, None).map_err(SlidesageError::validation)?;

        let n = self.scenes.len();
        if !(MIN_SCENES..=MAX_SCENES).contains(&n) {
            return Err(SlidesageError::validation(format!(
                "script must have {MIN_SCENES}..={MAX_SCENES} scenes, got {n}"
            )));
        }

        for (i, scene) in self.scenes.iter().enumerate() {
            if let Some(msg) = scene.violation() {
                return Err(SlidesageError::validation(format!("scene {i}: {msg}")));
            }
        }

        if let Some(hints) = &self.tts_voice_hints {
            check_len("ttsVoiceHints.student", &hints.student, 3, None)
                .map_err(SlidesageError::validation)?;
            check_len("ttsVoiceHints.sage", &hints.sage, 3, None)
                .map_err(SlidesageError::validation)?;
        }
        Ok(())
    }
}

impl Scene {
    /// Check this scene's bounds in isolation.
    pub fn validate(&self) -> SlidesageResult<()> {
        match self.violation() {
            Some(msg) => Err(SlidesageError::validation(msg)),
            None => Ok(()),
        }
    }

    fn violation(&self) -> Option<String> {
        let lens = check_len("dialogue", &self.dialogue, 5, Some(300))
            .and_then(|()| check_len("visualHint", &self.visual_hint, 3, Some(200)))
            .and_then(|()| {
                check_len("visualSearchQuery", &self.visual_search_query, 2, Some(50))
            });
        if let Err(msg) = lens {
            return Some(msg);
        }

        let d = self.duration_sec;
        if !d.is_finite() || !(MIN_SCENE_SECS..=MAX_SCENE_SECS).contains(&d) {
            return Some(format!(
                "durationSec must be within {MIN_SCENE_SECS}..={MAX_SCENE_SECS}, got {d}"
            ));
        }
        None
    }
}

fn check_len(field: &str, value: &str, min: usize, max: Option<usize>) -> Result<(), String> {
    let n = value.chars().count();
    if n < min {
        return Err(format!("{field} must be at least {min} characters, got {n}"));
    }
    if let Some(max) = max
        && n > max
    {
        return Err(format!("{field} must be at most {max} characters, got {n}"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;
