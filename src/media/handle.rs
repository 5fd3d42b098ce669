use std::sync::Arc;

use crate::media::decode::PreparedImage;
use crate::media::transport::{MediaTransport, Playhead, StillTransport};
use crate::media::video::VideoClip;

/// Background media resolved for one scene.
///
/// Handles are cheap to clone and read-only; only the playback driver moves
/// their clocks, through the transport returned by [`MediaHandle::transport`].
#[derive(Clone, Debug, Default)]
pub enum MediaHandle {
    /// Looping, muted video clip.
    Video(Arc<VideoClip>),
    /// Static fallback image.
    Image(Arc<PreparedImage>),
    /// Media failed to load; the renderer draws a solid placeholder.
    #[default]
    Placeholder,
}

impl MediaHandle {
    /// Wrap a decoded image.
    pub fn image(image: PreparedImage) -> Self {
        Self::Image(Arc::new(image))
    }

    /// Wrap a decoded video clip.
    pub fn video(clip: VideoClip) -> Self {
        Self::Video(Arc::new(clip))
    }

    /// Image to draw at `media_time`, or `None` for the placeholder.
    pub fn image_at(&self, media_time: f64) -> Option<&PreparedImage> {
        match self {
            Self::Video(clip) => Some(clip.frame_at(media_time)),
            Self::Image(img) => Some(img.as_ref()),
            Self::Placeholder => None,
        }
    }

    /// Whether the renderer must fall back to the placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Short kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Image(_) => "image",
            Self::Placeholder => "placeholder",
        }
    }

    /// A fresh transport for this media's clock.
    pub fn transport(&self) -> Box<dyn MediaTransport> {
        match self {
            Self::Video(_) => Box::new(Playhead::new()),
            Self::Image(_) | Self::Placeholder => Box::new(StillTransport),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/handle.rs"]
mod tests;
