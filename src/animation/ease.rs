/// Easing curves used by scene fades and caption motion.
///
/// Every curve maps `[0, 1]` onto `[0, 1]` with `f(0) = 0` and `f(1) = 1`; inputs outside the
/// unit interval are clamped first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Identity.
    #[default]
    Linear,
    /// Cubic acceleration from rest.
    InCubic,
    /// Cubic deceleration to rest.
    OutCubic,
    /// Quadratic acceleration then deceleration.
    InOutQuad,
}

impl Ease {
    /// Evaluate the curve at `t`.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
