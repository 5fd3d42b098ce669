//! Frame rendering: per-scene content plus timeline state in, RGBA pixels out.

pub(crate) mod cpu;
pub(crate) mod frame;
pub(crate) mod layout;
pub(crate) mod text;

use std::path::PathBuf;

use crate::foundation::core::Canvas;
use crate::foundation::error::SlidesageResult;
use crate::media::handle::MediaHandle;
use crate::render::frame::FrameRGBA;
use crate::render::layout::CAPTION_WIDTH_FRACTION;
use crate::script::model::{Script, Speaker};

/// Environment variable naming a TTF/OTF used for captions and chrome.
pub const FONT_ENV_VAR: &str = "SLIDESAGE_FONT";

/// Everything the renderer needs to know about one scene.
#[derive(Clone, Debug)]
pub struct SceneContent {
    /// Who is speaking.
    pub speaker: Speaker,
    /// Caption text; empty renders no caption block.
    pub caption: String,
    /// Declared scene length.
    pub duration_secs: f64,
    /// Background media.
    pub media: MediaHandle,
}

impl SceneContent {
    /// Pair each scene of `script` with its resolved media, in order.
    ///
    /// Missing media entries become placeholders.
    pub fn from_script(script: &Script, media: Vec<MediaHandle>) -> Vec<Self> {
        let mut media = media.into_iter();
        script
            .scenes
            .iter()
            .map(|scene| Self {
                speaker: scene.speaker,
                caption: scene.dialogue.clone(),
                duration_secs: scene.duration_sec,
                media: media.next().unwrap_or_default(),
            })
            .collect()
    }
}

/// Snapshot of playback handed to the renderer for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    /// Video title, drawn as permanent chrome.
    pub title: &'a str,
    /// Current scene.
    pub scene: &'a SceneContent,
    /// Index of the current scene.
    pub scene_index: usize,
    /// Total number of scenes.
    pub scene_count: usize,
    /// Progress within the current scene, `[0, 1]`.
    pub progress: f64,
    /// Scene fade opacity, `[0, 1]`.
    pub opacity: f64,
    /// Media clock of the scene background, in seconds.
    pub media_time: f64,
    /// Seconds elapsed within the current scene, shown by the counter.
    pub elapsed_secs: f64,
}

/// Produces one raster frame per view.
pub trait FrameRenderer {
    /// Output canvas.
    fn canvas(&self) -> Canvas;
    /// Render `view`.
    fn render(&mut self, view: &FrameView<'_>) -> SlidesageResult<FrameRGBA>;
}

/// Renderer options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Straight RGBA color behind everything.
    pub clear_rgba: [u8; 4],
    /// Straight RGBA color drawn when a scene has no media.
    pub placeholder_rgba: [u8; 4],
    /// Draw the caption box and speaker label.
    pub show_captions: bool,
    /// Fraction of the canvas width used by caption lines.
    pub caption_width_fraction: f64,
    /// Font file for all text. Without one, text is skipped.
    pub font_path: Option<PathBuf>,
    /// Replaces the script title when set.
    pub title: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_rgba: [0, 0, 0, 255],
            placeholder_rgba: [30, 41, 59, 255],
            show_captions: true,
            caption_width_fraction: CAPTION_WIDTH_FRACTION,
            font_path: None,
            title: None,
        }
    }
}

impl RenderSettings {
    /// Fill `font_path` from `SLIDESAGE_FONT` when it is unset.
    pub fn with_env_font(mut self) -> Self {
        if self.font_path.is_none() {
            self.font_path = std::env::var_os(FONT_ENV_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from);
        }
        self
    }
}
