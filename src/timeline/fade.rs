use crate::animation::ease::Ease;
use crate::foundation::math::clamp01;

/// Longest fade window at either end of a scene, in seconds.
pub const MAX_FADE_SECS: f64 = 0.5;

/// Fade-in / fade-out opacity envelope applied to every scene.
///
/// The fade windows last `min(max_window_secs, duration / 2)`, so on short scenes both windows
/// shrink to meet at the midpoint instead of overlapping.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FadeEnvelope {
    /// Upper bound for each fade window.
    pub max_window_secs: f64,
    /// Curve for the ramp up.
    pub fade_in: Ease,
    /// Curve for the ramp down, evaluated on the remaining fraction of the window.
    pub fade_out: Ease,
}

impl Default for FadeEnvelope {
    fn default() -> Self {
        Self {
            max_window_secs: MAX_FADE_SECS,
            fade_in: Ease::OutCubic,
            fade_out: Ease::InCubic,
        }
    }
}

impl FadeEnvelope {
    /// Length of each fade window for a scene of `scene_duration` seconds.
    pub fn window_secs(&self, scene_duration: f64) -> f64 {
        if scene_duration.is_nan() || scene_duration <= 0.0 {
            return 0.0;
        }
        self.max_window_secs.max(0.0).min(scene_duration / 2.0)
    }

    /// Opacity in `[0, 1]` at normalized `progress` through a scene.
    pub fn opacity_at(&self, progress: f64, scene_duration: f64) -> f64 {
        let window = self.window_secs(scene_duration);
        if window <= 0.0 {
            return 1.0;
        }

        let local = clamp01(progress) * scene_duration;
        let o = if local < window {
            self.fade_in.apply(local / window)
        } else if local > scene_duration - window {
            self.fade_out.apply((scene_duration - local) / window)
        } else {
            1.0
        };
        clamp01(o)
    }

    /// Whether `progress` lies inside either fade window.
    pub fn in_window(&self, progress: f64, scene_duration: f64) -> bool {
        let window = self.window_secs(scene_duration);
        if window <= 0.0 {
            return false;
        }
        let local = clamp01(progress) * scene_duration;
        local < window || local > scene_duration - window
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/fade.rs"]
mod tests;
