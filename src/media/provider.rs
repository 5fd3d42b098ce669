use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::core::Fps;
use crate::foundation::error::SlidesageResult;
use crate::media::decode::{PreparedImage, load_image_file};
use crate::media::handle::MediaHandle;
use crate::media::video::{VideoClip, load_video_clip};
use crate::script::model::Script;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Resolves a scene's search phrase to background media.
///
/// `Ok(None)` means "nothing found"; errors are load failures. Both lead the
/// [`MediaLoader`] to try the next fallback.
pub trait MediaProvider: Send + Sync {
    /// Look up a looping video for `query`.
    fn find_video(&self, query: &str) -> SlidesageResult<Option<VideoClip>>;
    /// Look up a still image for `query`.
    fn find_image(&self, query: &str) -> SlidesageResult<Option<PreparedImage>>;
}

/// Provider that never finds anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMediaProvider;

impl MediaProvider for NoMediaProvider {
    fn find_video(&self, _query: &str) -> SlidesageResult<Option<VideoClip>> {
        Ok(None)
    }

    fn find_image(&self, _query: &str) -> SlidesageResult<Option<PreparedImage>> {
        Ok(None)
    }
}

/// Lower-case ASCII slug: alphanumeric runs joined by `-`.
///
/// `"Light  Reactions!"` becomes `"light-reactions"`.
pub fn query_slug(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for word in query
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if !out.is_empty() {
            out.push('-');
        }
        out.extend(word.chars().map(|c| c.to_ascii_lowercase()));
    }
    out
}

/// Resolves queries to `<root>/<slug>.<ext>` files.
#[derive(Clone, Debug)]
pub struct DirectoryMediaProvider {
    root: PathBuf,
    video_fps: Fps,
    max_video_secs: f64,
}

impl DirectoryMediaProvider {
    /// Provider over `root`, sampling videos at 30 fps and keeping at most 20 s of each.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            video_fps: Fps { num: 30, den: 1 },
            max_video_secs: 20.0,
        }
    }

    /// Override how videos are sampled into memory.
    pub fn with_video_sampling(mut self, fps: Fps, max_secs: f64) -> Self {
        self.video_fps = fps;
        self.max_video_secs = max_secs;
        self
    }

    /// Directory searched by this provider.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn find_file(&self, query: &str, extensions: &[&str]) -> Option<PathBuf> {
        let slug = query_slug(query);
        if slug.is_empty() {
            return None;
        }
        extensions
            .iter()
            .map(|ext| self.root.join(format!("{slug}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl MediaProvider for DirectoryMediaProvider {
    fn find_video(&self, query: &str) -> SlidesageResult<Option<VideoClip>> {
        if !cfg!(feature = "media-ffmpeg") {
            return Ok(None);
        }
        match self.find_file(query, VIDEO_EXTENSIONS) {
            Some(path) => load_video_clip(&path, self.video_fps, self.max_video_secs).map(Some),
            None => Ok(None),
        }
    }

    fn find_image(&self, query: &str) -> SlidesageResult<Option<PreparedImage>> {
        match self.find_file(query, IMAGE_EXTENSIONS) {
            Some(path) => load_image_file(&path).map(Some),
            None => Ok(None),
        }
    }
}

/// Applies the video, image, default image, placeholder fallback chain.
pub struct MediaLoader {
    provider: Box<dyn MediaProvider>,
    default_image: Option<Arc<PreparedImage>>,
}

impl std::fmt::Debug for MediaLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaLoader")
            .field("has_default_image", &self.default_image.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for MediaLoader {
    fn default() -> Self {
        Self::new(Box::new(NoMediaProvider))
    }
}

impl MediaLoader {
    /// Loader over `provider` with no default image.
    pub fn new(provider: Box<dyn MediaProvider>) -> Self {
        Self {
            provider,
            default_image: None,
        }
    }

    /// Image used when the provider finds nothing for a scene.
    pub fn with_default_image(mut self, image: PreparedImage) -> Self {
        self.default_image = Some(Arc::new(image));
        self
    }

    /// Decode `path` and use it as the default image.
    pub fn with_default_image_file(self, path: &Path) -> SlidesageResult<Self> {
        let image = load_image_file(path)?;
        Ok(self.with_default_image(image))
    }

    /// Resolve one query. Never fails: every miss or error moves down the chain.
    #[tracing::instrument(skip(self))]
    pub fn load(&self, query: &str) -> MediaHandle {
        match self.provider.find_video(query) {
            Ok(Some(clip)) => return MediaHandle::video(clip),
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, query, "video load failed, trying image"),
        }
        match self.provider.find_image(query) {
            Ok(Some(image)) => return MediaHandle::image(image),
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, query, "image load failed, using default"),
        }
        match &self.default_image {
            Some(image) => MediaHandle::Image(Arc::clone(image)),
            None => {
                tracing::debug!(query, "no media found, using placeholder");
                MediaHandle::Placeholder
            }
        }
    }

    /// One handle per scene, in scene order.
    pub fn load_script(&self, script: &Script) -> Vec<MediaHandle> {
        script
            .scenes
            .iter()
            .map(|scene| self.load(&scene.visual_search_query))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/provider.rs"]
mod tests;
