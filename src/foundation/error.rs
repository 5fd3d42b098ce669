/// Convenience result type used across Slidesage.
pub type SlidesageResult<T> = Result<T, SlidesageError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only construction-time validation failures and capture failures are expected to reach
/// callers. Per-scene media and narration problems are absorbed by the playback driver and
/// surface as log records instead.
#[derive(thiserror::Error, Debug)]
pub enum SlidesageError {
    /// Invalid user-provided script or timeline data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Playback driver misuse that cannot be treated as a no-op.
    #[error("playback error: {0}")]
    Playback(String),

    /// Media lookup or decoding failure.
    #[error("media error: {0}")]
    Media(String),

    /// Narration provider failure.
    #[error("narration error: {0}")]
    Narration(String),

    /// Capture session start, encode or finalize failure.
    #[error("capture error: {0}")]
    Capture(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidesageError {
    /// Build a [`SlidesageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlidesageError::Playback`] value.
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Build a [`SlidesageError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`SlidesageError::Narration`] value.
    pub fn narration(msg: impl Into<String>) -> Self {
        Self::Narration(msg.into())
    }

    /// Build a [`SlidesageError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`SlidesageError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
