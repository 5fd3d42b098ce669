use crate::capture::quality::QualityPreset;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Settings for one capture session.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureConfig {
    /// Frame size; every offered frame must match it.
    pub canvas: Canvas,
    /// Fixed capture rate.
    pub fps: Fps,
    /// Target bitrate for encoding sinks.
    pub bitrate_bps: u64,
    /// Delay between playback completion and the automatic stop.
    pub safety_buffer_secs: f64,
    /// Hard stop measured from the start of capture.
    pub timeout_secs: Option<f64>,
    /// Background used to flatten alpha (straight RGBA8).
    pub bg_rgba: [u8; 4],
}

impl CaptureConfig {
    /// 30 fps capture at the preset's size and bitrate, with a one second safety buffer.
    pub fn for_preset(preset: QualityPreset) -> Self {
        Self {
            canvas: preset.canvas(),
            fps: Fps { num: 30, den: 1 },
            bitrate_bps: preset.bitrate_bps(),
            safety_buffer_secs: 1.0,
            timeout_secs: None,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    /// Check rates, sizes and durations.
    pub fn validate(&self) -> SlidesageResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        Canvas::new(self.canvas.width, self.canvas.height)?;
        if self.bitrate_bps == 0 {
            return Err(SlidesageError::validation("capture bitrate must be > 0"));
        }
        if !self.safety_buffer_secs.is_finite() || self.safety_buffer_secs < 0.0 {
            return Err(SlidesageError::validation(
                "capture safety buffer must be finite and >= 0",
            ));
        }
        if let Some(t) = self.timeout_secs
            && (!t.is_finite() || t <= 0.0)
        {
            return Err(SlidesageError::validation(
                "capture timeout must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Container metadata of the artifact a sink produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArtifactFormat {
    /// MIME type, e.g. `video/webm`.
    pub mime: &'static str,
    /// File extension without the dot.
    pub extension: &'static str,
}

/// Encoder seam for the capture pipeline.
///
/// `begin` is called once per session, `encode` once per captured frame slot in order,
/// `finish` once at the end. Encoded bytes are appended to `out` as ordered chunks.
pub trait CaptureSink: Send {
    /// Container produced by this sink.
    fn format(&self) -> ArtifactFormat;
    /// Prepare for a session.
    fn begin(&mut self, cfg: &CaptureConfig) -> SlidesageResult<()>;
    /// Encode one frame.
    fn encode(&mut self, frame: &FrameRGBA, out: &mut Vec<Vec<u8>>) -> SlidesageResult<()>;
    /// Flush remaining output.
    fn finish(&mut self, out: &mut Vec<Vec<u8>>) -> SlidesageResult<()>;
}

/// Sink emitting each frame as one chunk of opaque RGBA8 bytes.
#[derive(Debug, Default)]
pub struct RawFrameSink {
    bg_rgba: [u8; 4],
    frames_encoded: u64,
}

impl RawFrameSink {
    /// New raw sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames encoded in the current session.
    pub fn frames_encoded(&self) -> u64 {
        self.frames_encoded
    }
}

impl CaptureSink for RawFrameSink {
    fn format(&self) -> ArtifactFormat {
        ArtifactFormat {
            mime: "application/octet-stream",
            extension: "rgba",
        }
    }

    fn begin(&mut self, cfg: &CaptureConfig) -> SlidesageResult<()> {
        self.bg_rgba = cfg.bg_rgba;
        self.frames_encoded = 0;
        Ok(())
    }

    fn encode(&mut self, frame: &FrameRGBA, out: &mut Vec<Vec<u8>>) -> SlidesageResult<()> {
        let mut chunk = vec![0u8; frame.data.len()];
        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut chunk, &frame.data, self.bg_rgba)?;
        } else {
            chunk.copy_from_slice(&frame.data);
        }
        out.push(chunk);
        self.frames_encoded += 1;
        Ok(())
    }

    fn finish(&mut self, _out: &mut Vec<Vec<u8>>) -> SlidesageResult<()> {
        Ok(())
    }
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> SlidesageResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(SlidesageError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (s[0] as u16 + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (s[1] as u16 + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (s[2] as u16 + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/capture/sink.rs"]
mod tests;
