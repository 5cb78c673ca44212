//! Render results returned to the caller.

use std::path::PathBuf;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::request::RenderMode;

/// The produced artifact.
#[derive(Debug, Clone)]
pub enum RenderOutput {
    /// In-memory raster for image modes.
    Image(RgbaImage),
    /// Encoded video file on disk.
    Video { path: PathBuf },
}

/// Everything the caller needs to report about a finished render.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub mode: RenderMode,
    pub output: RenderOutput,
    pub size: Size,

    /// Final duration in seconds (video only).
    pub duration_secs: Option<f64>,

    /// Frames handed to the encoder (video only).
    pub frame_count: Option<u64>,

    pub has_audio: bool,
}

impl RenderResult {
    pub fn image(mode: RenderMode, image: RgbaImage) -> Self {
        let size = Size::new(image.width(), image.height());
        Self {
            mode,
            output: RenderOutput::Image(image),
            size,
            duration_secs: None,
            frame_count: None,
            has_audio: false,
        }
    }

    pub fn video_path(&self) -> Option<&PathBuf> {
        match &self.output {
            RenderOutput::Video { path } => Some(path),
            RenderOutput::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&RgbaImage> {
        match &self.output {
            RenderOutput::Image(image) => Some(image),
            RenderOutput::Video { .. } => None,
        }
    }

    /// Serializable view without pixel data.
    pub fn summary(&self) -> RenderSummary {
        RenderSummary {
            mode: self.mode,
            width: self.size.width,
            height: self.size.height,
            dimensions: self.size.to_string(),
            duration_secs: self.duration_secs,
            frame_count: self.frame_count,
            has_audio: self.has_audio,
            path: self.video_path().cloned(),
        }
    }
}

/// The fields surfaced to API consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSummary {
    pub mode: RenderMode,
    pub width: u32,
    pub height: u32,
    pub dimensions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<u64>,
    pub has_audio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}
