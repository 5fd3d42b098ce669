use crate::foundation::error::{SlidesageError, SlidesageResult};

pub use kurbo::Rect;

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SlidesageResult<Self> {
        if den == 0 {
            return Err(SlidesageError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SlidesageError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas. Both sides must be non-zero and fit a `u16` raster.
    pub fn new(width: u32, height: u32) -> SlidesageResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlidesageError::validation("canvas width/height must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(SlidesageError::validation(
                "canvas width/height must fit in 16 bits",
            ));
        }
        Ok(Self { width, height })
    }

    /// Width as `f64`.
    pub fn w(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`.
    pub fn h(self) -> f64 {
        f64::from(self.height)
    }

    /// Full-canvas rectangle anchored at the origin.
    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, self.w(), self.h())
    }

    /// Number of bytes in a tightly packed RGBA8 frame of this size.
    pub fn rgba_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
