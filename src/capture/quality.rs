use crate::foundation::core::Canvas;

/// Discrete output quality tiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    /// 1280x720 at 2.5 Mbit/s.
    #[default]
    Standard,
    /// 1920x1080 at 5 Mbit/s.
    High,
}

impl QualityPreset {
    /// Output canvas for this tier.
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Standard => Canvas {
                width: 1280,
                height: 720,
            },
            Self::High => Canvas {
                width: 1920,
                height: 1080,
            },
        }
    }

    /// Target video bitrate in bits per second.
    pub fn bitrate_bps(self) -> u64 {
        match self {
            Self::Standard => 2_500_000,
            Self::High => 5_000_000,
        }
    }

    /// Short display name, e.g. `720p`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Standard => "720p",
            Self::High => "1080p",
        }
    }
}
