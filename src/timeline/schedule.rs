use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::foundation::math::clamp01;
use crate::script::model::Script;
use crate::timeline::fade::FadeEnvelope;

/// Placement of one scene on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SceneSpan {
    /// Cumulative start time in seconds.
    pub start: f64,
    /// Scene length in seconds.
    pub duration: f64,
}

impl SceneSpan {
    /// Exclusive end time in seconds.
    pub fn end(self) -> f64 {
        self.start + self.duration
    }
}

/// Where a timeline instant falls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePosition {
    /// Scene index in playback order.
    pub index: usize,
    /// Normalized progress within the scene, in `[0, 1]`.
    pub progress: f64,
    /// Whether the instant falls inside the scene's fade-in or fade-out window.
    pub in_transition: bool,
}

/// Derived schedule mapping elapsed time onto scenes.
///
/// Built once from an ordered duration list and never patched; a new script means a new
/// `Timeline`.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    spans: Vec<SceneSpan>,
    total: f64,
    fade: FadeEnvelope,
}

impl Timeline {
    /// Build a timeline from ordered, positive, finite scene durations.
    pub fn new(durations: &[f64]) -> SlidesageResult<Self> {
        Self::with_fade(durations, FadeEnvelope::default())
    }

    /// Build a timeline with a custom fade envelope.
    pub fn with_fade(durations: &[f64], fade: FadeEnvelope) -> SlidesageResult<Self> {
        if durations.is_empty() {
            return Err(SlidesageError::validation(
                "timeline needs at least one scene",
            ));
        }

        let mut spans = Vec::with_capacity(durations.len());
        let mut t = 0.0;
        for (i, &d) in durations.iter().enumerate() {
            if !d.is_finite() || d <= 0.0 {
                return Err(SlidesageError::validation(format!(
                    "scene {i} duration must be finite and > 0, got {d}"
                )));
            }
            spans.push(SceneSpan {
                start: t,
                duration: d,
            });
            t += d;
        }

        Ok(Self {
            spans,
            total: t,
            fade,
        })
    }

    /// Build a timeline from a script's scene durations.
    pub fn from_script(script: &Script) -> SlidesageResult<Self> {
        Self::new(&script.durations())
    }

    /// Sum of all scene durations.
    pub fn total_duration(&self) -> f64 {
        self.total
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Always `false`; a timeline cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// All spans in playback order.
    pub fn spans(&self) -> &[SceneSpan] {
        &self.spans
    }

    /// Span of scene `index`, if any.
    pub fn span(&self, index: usize) -> Option<SceneSpan> {
        self.spans.get(index).copied()
    }

    /// Fade envelope shared by all scenes.
    pub fn fade(&self) -> &FadeEnvelope {
        &self.fade
    }

    /// Locate `elapsed` seconds on the timeline.
    ///
    /// Scenes own the half-open interval `[start, start + duration)`, so a boundary instant
    /// belongs to the later scene. At or past the end this clamps to the last scene with
    /// `progress = 1`. Negative input is treated as `0`.
    pub fn scene_at(&self, elapsed: f64) -> ScenePosition {
        let last = self.spans.len() - 1;
        if elapsed >= self.total {
            return ScenePosition {
                index: last,
                progress: 1.0,
                in_transition: false,
            };
        }

        let t = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };
        let index = self
            .spans
            .partition_point(|s| s.start <= t)
            .saturating_sub(1)
            .min(last);
        let span = self.spans[index];
        let progress = clamp01((t - span.start) / span.duration);

        ScenePosition {
            index,
            progress,
            in_transition: self.fade.in_window(progress, span.duration),
        }
    }

    /// Fade opacity at `progress` through a scene lasting `scene_duration` seconds.
    pub fn opacity_at(&self, progress: f64, scene_duration: f64) -> f64 {
        self.fade.opacity_at(progress, scene_duration)
    }

    /// Fade opacity for a located position.
    pub fn opacity_for(&self, pos: ScenePosition) -> f64 {
        match self.span(pos.index) {
            Some(span) => self.opacity_at(pos.progress, span.duration),
            None => 0.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/schedule.rs"]
mod tests;
