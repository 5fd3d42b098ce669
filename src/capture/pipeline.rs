use std::path::Path;

use anyhow::Context as _;

use crate::capture::sink::{ArtifactFormat, CaptureConfig, CaptureSink};
use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::render::frame::FrameRGBA;

/// Finalized output of one capture session.
#[derive(Clone, PartialEq)]
pub struct CaptureArtifact {
    /// All encoded chunks concatenated in arrival order.
    pub bytes: Vec<u8>,
    /// Container produced by the sink.
    pub format: ArtifactFormat,
    /// Frame slots written.
    pub frame_count: u64,
    /// `frame_count / fps`.
    pub duration_secs: f64,
    /// Number of chunks the sink delivered.
    pub chunk_count: usize,
}

impl std::fmt::Debug for CaptureArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureArtifact")
            .field("bytes", &self.bytes.len())
            .field("format", &self.format)
            .field("frame_count", &self.frame_count)
            .field("duration_secs", &self.duration_secs)
            .field("chunk_count", &self.chunk_count)
            .finish()
    }
}

impl CaptureArtifact {
    /// Download name for `title`: every non-alphanumeric ASCII char becomes `_`.
    pub fn file_name(&self, title: &str) -> String {
        let stem: String = title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{stem}_explainer.{}", self.format.extension)
    }

    /// Write the artifact bytes to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> SlidesageResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write capture '{}'", path.display()))?;
        Ok(())
    }
}

const SLOT_EPSILON: f64 = 1e-3;

#[derive(Debug)]
struct ActiveCapture {
    cfg: CaptureConfig,
    started_at: f64,
    paused_at: Option<f64>,
    stop_at: Option<f64>,
    chunks: Vec<Vec<u8>>,
    frames_written: u64,
    last_frame: Option<FrameRGBA>,
}

impl ActiveCapture {
    fn elapsed(&self, now: f64) -> f64 {
        (self.paused_at.unwrap_or(now) - self.started_at).max(0.0)
    }

    /// Slots that should exist by `now`: slot `k` covers `[k/fps, (k+1)/fps)`.
    fn slots_due(&self, now: f64) -> u64 {
        // Tolerate clocks quantized to microseconds.
        let slots = self.elapsed(now) * self.cfg.fps.as_f64() + SLOT_EPSILON;
        slots.floor().max(0.0) as u64 + 1
    }
}

/// Taps rendered frames at a fixed rate and collects the sink's output.
///
/// At most one session is active at a time. The session stops by itself once playback has
/// completed and the safety buffer elapsed, or when its timeout is reached.
pub struct CapturePipeline {
    sink: Box<dyn CaptureSink>,
    active: Option<ActiveCapture>,
    artifact: Option<CaptureArtifact>,
}

impl std::fmt::Debug for CapturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturePipeline")
            .field("format", &self.sink.format())
            .field("active", &self.active.is_some())
            .field("artifact", &self.artifact)
            .finish()
    }
}

impl CapturePipeline {
    /// Pipeline encoding through `sink`.
    pub fn new(sink: Box<dyn CaptureSink>) -> Self {
        Self {
            sink,
            active: None,
            artifact: None,
        }
    }

    /// Whether a session is running.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the running session is paused.
    pub fn is_paused(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.paused_at.is_some())
    }

    /// Frame slots written by the running session.
    pub fn frames_written(&self) -> u64 {
        self.active.as_ref().map_or(0, |a| a.frames_written)
    }

    /// Artifact of the last finished session.
    pub fn artifact(&self) -> Option<&CaptureArtifact> {
        self.artifact.as_ref()
    }

    /// Take ownership of the last artifact.
    pub fn take_artifact(&mut self) -> Option<CaptureArtifact> {
        self.artifact.take()
    }

    /// Begin a session at wall time `now`.
    ///
    /// Fails when a session is already active or the sink cannot start. A previous artifact is
    /// discarded.
    pub fn start_capture(&mut self, cfg: CaptureConfig, now: f64) -> SlidesageResult<()> {
        if self.active.is_some() {
            return Err(SlidesageError::capture("a capture session is already active"));
        }
        cfg.validate()?;
        self.sink.begin(&cfg)?;

        tracing::info!(
            width = cfg.canvas.width,
            height = cfg.canvas.height,
            fps = cfg.fps.as_f64(),
            bitrate = cfg.bitrate_bps,
            format = self.sink.format().mime,
            "capture started"
        );
        self.artifact = None;
        self.active = Some(ActiveCapture {
            cfg,
            started_at: now,
            paused_at: None,
            stop_at: None,
            chunks: Vec::new(),
            frames_written: 0,
            last_frame: None,
        });
        Ok(())
    }

    /// Offer the frame currently on screen at `now`.
    ///
    /// Writes every slot that came due since the last call; slots skipped between calls
    /// repeat the previously offered frame. Returns the number of slots written. Frames are
    /// ignored when no session is active or it is paused.
    pub fn offer_frame(&mut self, frame: &FrameRGBA, now: f64) -> SlidesageResult<u64> {
        let Some(active) = self.active.as_mut() else {
            return Ok(0);
        };
        if active.paused_at.is_some() {
            return Ok(0);
        }
        if frame.width != active.cfg.canvas.width || frame.height != active.cfg.canvas.height {
            return Err(SlidesageError::capture(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, active.cfg.canvas.width, active.cfg.canvas.height
            )));
        }

        let due = active.slots_due(now);
        if due <= active.frames_written {
            active.last_frame = Some(frame.clone());
            return Ok(0);
        }

        let mut written = 0;
        while active.frames_written + 1 < due {
            let held = active.last_frame.as_ref().unwrap_or(frame);
            self.sink.encode(held, &mut active.chunks)?;
            active.frames_written += 1;
            written += 1;
        }
        self.sink.encode(frame, &mut active.chunks)?;
        active.frames_written += 1;
        written += 1;
        active.last_frame = Some(frame.clone());
        Ok(written)
    }

    /// Stop taking frames; chunks collected so far are kept.
    pub fn pause_capture(&mut self, now: f64) {
        if let Some(active) = self.active.as_mut()
            && active.paused_at.is_none()
        {
            active.paused_at = Some(now);
            tracing::debug!(frames = active.frames_written, "capture paused");
        }
    }

    /// Continue a paused session; the paused gap is not recorded.
    pub fn resume_capture(&mut self, now: f64) {
        if let Some(active) = self.active.as_mut()
            && let Some(paused_at) = active.paused_at.take()
        {
            let gap = (now - paused_at).max(0.0);
            active.started_at += gap;
            if let Some(stop_at) = active.stop_at.as_mut() {
                *stop_at += gap;
            }
            tracing::debug!(gap, "capture resumed");
        }
    }

    /// Arm the automatic stop at `now + safety_buffer_secs`. Later calls keep the first deadline.
    pub fn playback_completed(&mut self, now: f64) {
        if let Some(active) = self.active.as_mut()
            && active.stop_at.is_none()
        {
            let at = now + active.cfg.safety_buffer_secs;
            active.stop_at = Some(at);
            tracing::debug!(stop_at = at, "capture stop armed");
        }
    }

    /// Stop when the armed deadline or the timeout has passed. Returns `true` if this call
    /// finalized the session.
    pub fn poll(&mut self, now: f64) -> SlidesageResult<bool> {
        let Some(active) = self.active.as_ref() else {
            return Ok(false);
        };
        let deadline_hit = active.stop_at.is_some_and(|at| now >= at);
        let timed_out = active
            .cfg
            .timeout_secs
            .is_some_and(|t| active.elapsed(now) >= t);
        if !(deadline_hit || timed_out) {
            return Ok(false);
        }
        if timed_out && !deadline_hit {
            tracing::warn!(elapsed = active.elapsed(now), "capture timed out");
        }
        self.stop_capture()?;
        Ok(true)
    }

    /// Finalize the running session into an artifact. Calling it with no active session is a
    /// no-op.
    pub fn stop_capture(&mut self) -> SlidesageResult<()> {
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };
        self.sink.finish(&mut active.chunks)?;

        let chunk_count = active.chunks.len();
        let bytes = active.chunks.concat();
        let artifact = CaptureArtifact {
            bytes,
            format: self.sink.format(),
            frame_count: active.frames_written,
            duration_secs: active.cfg.fps.frames_to_secs(active.frames_written),
            chunk_count,
        };
        tracing::info!(
            frames = artifact.frame_count,
            bytes = artifact.bytes.len(),
            duration_secs = artifact.duration_secs,
            "capture stopped"
        );
        self.artifact = Some(artifact);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/pipeline.rs"]
mod tests;
