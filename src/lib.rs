//! Slidesage turns a short lecture script into an explainer video.
//!
//! A script is a handful of narrated scenes. The crate schedules them on a [`Timeline`],
//! draws each frame with the [`CpuRenderer`], drives playback through the [`PlaybackDriver`]
//! state machine and taps the frames into a [`CapturePipeline`]:
//!
//! - Load and validate a [`Script`]
//! - Resolve background media with a [`MediaLoader`]
//! - Record it offline with an [`ExplainerSession`], or drive a [`PlaybackDriver`] live
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod capture;
pub(crate) mod media;
pub(crate) mod narration;
pub(crate) mod playback;
pub(crate) mod render;
pub(crate) mod script;
pub(crate) mod session;
pub(crate) mod timeline;

pub use crate::foundation::core::{Canvas, Fps, Rect};
pub use crate::foundation::error::{SlidesageError, SlidesageResult};

pub use crate::animation::ease::Ease;
pub use crate::capture::ffmpeg::{FfmpegCaptureSink, is_ffmpeg_on_path};
pub use crate::capture::pipeline::{CaptureArtifact, CapturePipeline};
pub use crate::capture::quality::QualityPreset;
pub use crate::capture::sink::{ArtifactFormat, CaptureConfig, CaptureSink, RawFrameSink};
pub use crate::media::decode::{PreparedImage, decode_image, load_image_file};
pub use crate::media::handle::MediaHandle;
pub use crate::media::provider::{
    DirectoryMediaProvider, MediaLoader, MediaProvider, NoMediaProvider, query_slug,
};
pub use crate::media::transport::{MediaTransport, Playhead, StillTransport, TransportError};
pub use crate::media::video::{VideoClip, VideoSourceInfo, load_video_clip, probe_video};
pub use crate::narration::{
    DEFAULT_WORDS_PER_SECOND, EstimatedNarrator, NarrationId, NarrationOutcome,
    NarrationProvider, NarrationRequest, NarrationTicket, VoiceHint, estimate_narration_secs,
};
pub use crate::playback::clock::{Clock, ManualClock, SystemClock};
pub use crate::playback::driver::{Dispatch, DriverDeps, PlaybackDriver, PlaybackEvent};
pub use crate::playback::scheduler::{ManualScheduler, TickHandle, TickScheduler};
pub use crate::playback::state::{PlaybackConfig, PlaybackMode, PlaybackPhase, PlaybackState};
pub use crate::render::cpu::CpuRenderer;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::layout::{counter_label, progress_fraction};
pub use crate::render::{FONT_ENV_VAR, FrameRenderer, FrameView, RenderSettings, SceneContent};
pub use crate::script::model::{Scene, Script, Speaker, TtsVoiceHints};
pub use crate::session::explainer::{ExplainerSession, ExplainerSessionOpts, RecordStats};
pub use crate::timeline::fade::FadeEnvelope;
pub use crate::timeline::schedule::{ScenePosition, SceneSpan, Timeline};
