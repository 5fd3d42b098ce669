use std::io::{Read, Write as _};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;
use std::thread::JoinHandle;

use crate::capture::sink::{
    ArtifactFormat, CaptureConfig, CaptureSink, flatten_premul_over_bg_to_opaque_rgba8,
};
use crate::foundation::core::Fps;
use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::render::frame::FrameRGBA;

const STDOUT_CHUNK_BYTES: usize = 64 * 1024;

/// Sink that spawns the system `ffmpeg` and encodes VP9 WebM.
///
/// Raw frames go to stdin; encoded container bytes are read back from stdout on a drain thread
/// and handed to the pipeline as ordered chunks.
#[derive(Default)]
pub struct FfmpegCaptureSink {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    chunks: Option<mpsc::Receiver<Vec<u8>>>,
    stdout_drain: Option<JoinHandle<std::io::Result<()>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<CaptureConfig>,
}

impl FfmpegCaptureSink {
    /// New idle sink; `ffmpeg` is spawned on `begin`.
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_ready(&self, out: &mut Vec<Vec<u8>>) {
        if let Some(rx) = self.chunks.as_ref() {
            out.extend(rx.try_iter());
        }
    }
}

impl std::fmt::Debug for FfmpegCaptureSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegCaptureSink")
            .field("running", &self.child.is_some())
            .field("cfg", &self.cfg)
            .finish()
    }
}

impl CaptureSink for FfmpegCaptureSink {
    fn format(&self) -> ArtifactFormat {
        ArtifactFormat {
            mime: "video/webm",
            extension: "webm",
        }
    }

    fn begin(&mut self, cfg: &CaptureConfig) -> SlidesageResult<()> {
        cfg.validate()?;
        let (w, h) = (cfg.canvas.width, cfg.canvas.height);
        if !w.is_multiple_of(2) || !h.is_multiple_of(2) {
            return Err(SlidesageError::validation(
                "ffmpeg capture width/height must be even (required for yuv420p output)",
            ));
        }
        if self.child.is_some() {
            return Err(SlidesageError::capture("ffmpeg capture sink already running"));
        }
        if !is_ffmpeg_on_path() {
            return Err(SlidesageError::capture(
                "ffmpeg is required for WebM capture, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{w}x{h}"),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an", "-c:v", "libvpx-vp9", "-b:v"])
            .arg(cfg.bitrate_bps.to_string())
            .args(["-pix_fmt", "yuv420p", "-f", "webm", "pipe:1"]);

        let mut child = cmd.spawn().map_err(|e| {
            SlidesageError::capture(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SlidesageError::capture("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SlidesageError::capture("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SlidesageError::capture("failed to open ffmpeg stderr (unexpected)"))?;

        let (tx, rx) = mpsc::channel();
        let stdout_drain = std::thread::spawn(move || {
            let mut buf = vec![0u8; STDOUT_CHUNK_BYTES];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    return Ok(());
                }
                if tx.send(buf[..n].to_vec()).is_err() {
                    return Ok(());
                }
            }
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(width = w, height = h, bitrate = cfg.bitrate_bps, "ffmpeg capture started");

        self.scratch = vec![0u8; cfg.canvas.rgba_len()];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.chunks = Some(rx);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg.clone());
        Ok(())
    }

    fn encode(&mut self, frame: &FrameRGBA, out: &mut Vec<Vec<u8>>) -> SlidesageResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SlidesageError::capture("ffmpeg capture sink not started"))?;
        if frame.width != cfg.canvas.width || frame.height != cfg.canvas.height {
            return Err(SlidesageError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.canvas.width, cfg.canvas.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(SlidesageError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, cfg.bg_rgba)?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SlidesageError::capture("ffmpeg capture sink is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            SlidesageError::capture(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        self.collect_ready(out);
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<Vec<u8>>) -> SlidesageResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| SlidesageError::capture("ffmpeg capture sink not started"))?;

        if let Some(handle) = self.stdout_drain.take() {
            handle
                .join()
                .map_err(|_| SlidesageError::capture("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| SlidesageError::capture(format!("ffmpeg stdout read failed: {e}")))?;
        }
        self.collect_ready(out);
        self.chunks = None;

        let status = child.wait().map_err(|e| {
            SlidesageError::capture(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SlidesageError::capture("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| SlidesageError::capture(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        self.cfg = None;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(SlidesageError::capture(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // `-r` before `-i` sets the rawvideo input rate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/capture/ffmpeg.rs"]
mod tests;
