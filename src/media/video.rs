use std::path::{Path, PathBuf};

use crate::foundation::core::Fps;
use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::media::decode::PreparedImage;

/// Pre-decoded, looping, muted background clip.
#[derive(Clone)]
pub struct VideoClip {
    width: u32,
    height: u32,
    fps: Fps,
    frames: Vec<PreparedImage>,
}

impl std::fmt::Debug for VideoClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoClip")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fps", &self.fps)
            .field("frames", &self.frames.len())
            .finish()
    }
}

impl VideoClip {
    /// Build a clip from frames that all share one size.
    pub fn new(fps: Fps, frames: Vec<PreparedImage>) -> SlidesageResult<Self> {
        let first = frames
            .first()
            .ok_or_else(|| SlidesageError::media("video clip needs at least one frame"))?;
        let (width, height) = (first.width, first.height);
        if frames
            .iter()
            .any(|f| f.width != width || f.height != height)
        {
            return Err(SlidesageError::media(
                "video clip frames must all share one size",
            ));
        }
        Ok(Self {
            width,
            height,
            fps,
            frames,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sampling rate of the stored frames.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Number of stored frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Length of one loop in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frames.len() as u64)
    }

    /// Frame shown at `media_time` seconds, wrapping around at the end of the clip.
    pub fn frame_at(&self, media_time: f64) -> &PreparedImage {
        let t = if media_time.is_finite() {
            media_time.max(0.0)
        } else {
            0.0
        };
        let idx = self.fps.secs_to_frames_floor(t) as usize % self.frames.len();
        &self.frames[idx]
    }
}

/// Stream metadata reported by `ffprobe`.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    /// Probed file.
    pub source_path: PathBuf,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Container duration in seconds (0 when unknown).
    pub duration_sec: f64,
}

/// Decode up to `max_secs` of `path`, sampled at `sample_fps`, into a looping clip.
#[cfg(feature = "media-ffmpeg")]
pub fn load_video_clip(path: &Path, sample_fps: Fps, max_secs: f64) -> SlidesageResult<VideoClip> {
    let info = probe_video(path)?;
    let secs = if info.duration_sec > 0.0 {
        info.duration_sec.min(max_secs)
    } else {
        max_secs
    };
    let count = sample_fps.secs_to_frames_floor(secs).max(1);
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    let raw = decode_video_frames_rgba8(&info, sample_fps, count)?;

    let mut frames = Vec::with_capacity(raw.len());
    for mut bytes in raw {
        crate::media::decode::premultiply_rgba8_in_place(&mut bytes);
        frames.push(PreparedImage::from_premul_rgba8(
            info.width,
            info.height,
            bytes,
        )?);
    }
    VideoClip::new(sample_fps, frames)
}

/// Video clips require the `media-ffmpeg` feature.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn load_video_clip(
    _path: &Path,
    _sample_fps: Fps,
    _max_secs: f64,
) -> SlidesageResult<VideoClip> {
    Err(SlidesageError::media(
        "video backgrounds require the 'media-ffmpeg' feature",
    ))
}

/// Probe a video file with `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> SlidesageResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| SlidesageError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SlidesageError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| SlidesageError::media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| SlidesageError::media("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| SlidesageError::media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| SlidesageError::media("missing video height from ffprobe"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration_sec,
    })
}

/// Probing requires the `media-ffmpeg` feature.
#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> SlidesageResult<VideoSourceInfo> {
    Err(SlidesageError::media(
        "video backgrounds require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn decode_video_frames_rgba8(
    source: &VideoSourceInfo,
    sample_fps: Fps,
    frame_count: u32,
) -> SlidesageResult<Vec<Vec<u8>>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(&source.source_path)
        .args([
            "-an",
            "-vf",
            &format!("fps={}/{}", sample_fps.num, sample_fps.den),
            "-frames:v",
            &frame_count.to_string(),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| SlidesageError::media(format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(SlidesageError::media(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = source.width as usize * source.height as usize * 4;
    if expected_len == 0 {
        return Err(SlidesageError::media(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if out.stdout.len() < expected_len || !out.stdout.len().is_multiple_of(expected_len) {
        return Err(SlidesageError::media(format!(
            "decoded video has invalid size: got {} bytes, expected multiples of {expected_len}",
            out.stdout.len()
        )));
    }

    Ok(out
        .stdout
        .chunks_exact(expected_len)
        .take(frame_count as usize)
        .map(<[u8]>::to_vec)
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/media/video.rs"]
mod tests;
