//! Render requests: what the caller asks the core to produce.

use std::path::PathBuf;
use std::str::FromStr;

use image::RgbaImage;
use newsframe_common::error::NewsframeError;
use serde::{Deserialize, Serialize};

use crate::geometry::{NormalizedRoi, Size};

/// Target output kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderMode {
    /// The source image at its own resolution, with overlay.
    #[serde(rename = "horizontal")]
    Horizontal,
    /// A 4:5 still for Instagram feeds.
    #[serde(rename = "instagram-4:5")]
    Instagram,
    /// A 9:16 pan-&-scan video.
    #[serde(rename = "video-9:16")]
    Video,
}

impl RenderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Instagram => "instagram-4:5",
            Self::Video => "video-9:16",
        }
    }

    pub fn is_image(self) -> bool {
        !matches!(self, Self::Video)
    }
}

impl FromStr for RenderMode {
    type Err = NewsframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "facebook" => Ok(Self::Horizontal),
            "instagram-4:5" | "instagram" => Ok(Self::Instagram),
            "video-9:16" | "video" => Ok(Self::Video),
            other => Err(NewsframeError::unsupported(format!(
                "unknown render mode {other:?} (use horizontal, instagram-4:5, video-9:16)"
            ))),
        }
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Camera motion for pan-&-scan videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
    ZoomIn,
    ZoomOut,
    #[serde(rename = "diagonal-tl-br")]
    DiagonalTlBr,
    #[serde(rename = "diagonal-tr-bl")]
    DiagonalTrBl,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::LeftToRight,
        Direction::RightToLeft,
        Direction::TopToBottom,
        Direction::BottomToTop,
        Direction::ZoomIn,
        Direction::ZoomOut,
        Direction::DiagonalTlBr,
        Direction::DiagonalTrBl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeftToRight => "left-to-right",
            Self::RightToLeft => "right-to-left",
            Self::TopToBottom => "top-to-bottom",
            Self::BottomToTop => "bottom-to-top",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::DiagonalTlBr => "diagonal-tl-br",
            Self::DiagonalTrBl => "diagonal-tr-bl",
        }
    }
}

impl FromStr for Direction {
    type Err = NewsframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.as_str() == s)
            .ok_or_else(|| NewsframeError::unsupported_direction(s))
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audio track whose duration the caller already measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInput {
    /// Encoded audio file handed to the encoder for muxing.
    pub path: PathBuf,

    /// Decoded length in seconds.
    pub duration_secs: f64,
}

/// Parameters that only apply to `RenderMode::Video`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoOptions {
    pub direction: Direction,

    /// Requested length; ignored when audio is present.
    pub duration_secs: f64,

    pub fps: u32,

    /// Letterbox the whole source into the 9:16 canvas instead of cropping.
    pub keep_aspect: bool,

    pub audio: Option<AudioInput>,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            direction: Direction::LeftToRight,
            duration_secs: 5.0,
            fps: 30,
            keep_aspect: true,
            audio: None,
        }
    }
}

/// A validated render request. Consumed once by the core.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub headline: String,

    /// Case-sensitive substring of `headline`; empty disables styling.
    pub highlight: String,

    /// Decoded source pixels.
    pub image: RgbaImage,

    /// Decoded brand logo.
    pub logo: Option<RgbaImage>,

    /// Explicit region of interest, normalized.
    pub roi: Option<NormalizedRoi>,

    pub mode: RenderMode,

    pub video: VideoOptions,
}

impl RenderRequest {
    pub fn new(
        headline: impl Into<String>,
        highlight: impl Into<String>,
        image: RgbaImage,
        mode: RenderMode,
    ) -> Self {
        Self {
            headline: headline.into(),
            highlight: highlight.into(),
            image,
            logo: None,
            roi: None,
            mode,
            video: VideoOptions::default(),
        }
    }

    pub fn with_logo(mut self, logo: RgbaImage) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn with_roi(mut self, roi: NormalizedRoi) -> Self {
        self.roi = Some(roi);
        self
    }

    pub fn with_video(mut self, video: VideoOptions) -> Self {
        self.video = video;
        self
    }

    pub fn image_size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}
