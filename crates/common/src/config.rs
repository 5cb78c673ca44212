//! Application configuration.
//!
//! Configuration is an explicit value: the caller loads it once and passes
//! the relevant sections down. Nothing in the rendering core reads it from
//! a global.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{NewsframeError, NewsframeResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where rendered artifacts are written.
    pub output_dir: PathBuf,

    /// Ordered font candidates.
    pub fonts: FontConfig,

    /// Brand styling for overlays.
    pub brand: BrandConfig,

    /// Canvas and motion parameters.
    pub render: RenderSettings,

    /// Video encoder settings.
    pub encoder: EncoderConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Font candidate lists, tried in order. The first file that exists and
/// parses wins; if none do, the built-in fallback face is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub regular: Vec<PathBuf>,
    pub bold: Vec<PathBuf>,
}

/// Where the brand logo is pinned on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoAnchor {
    TopLeft,
    TopRight,
}

/// Brand styling. Colors are RGBA.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandConfig {
    /// Text repeated along the vertical watermark strip. Empty disables it.
    pub watermark_text: String,

    pub text_color: [u8; 4],
    pub highlight_color: [u8; 4],
    pub panel_color: [u8; 4],
    pub watermark_color: [u8; 4],

    /// Logo width as a fraction of canvas width.
    pub logo_scale: f64,
    pub logo_anchor: LogoAnchor,
    pub logo_margin_px: u32,

    pub panel_padding_x: u32,
    pub panel_padding_y: u32,
    pub line_spacing: u32,

    /// Gap between the last text panel and the bottom edge.
    pub bottom_margin: u32,
}

/// Canvas sizes and pan-&-scan motion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub video_width: u32,
    pub video_height: u32,

    pub instagram_width: u32,
    pub instagram_height: u32,

    /// Horizontal canvases smaller than this are letterboxed up to it.
    pub min_canvas_width: u32,
    pub min_canvas_height: u32,

    /// Zoom ratio between the full-fit window and the zoomed window.
    pub zoom_factor: f64,

    /// Window shrink used when a straight pan has no room to travel.
    pub axis_pan_margin: f64,

    /// Window shrink used when a diagonal pan has no room to travel.
    pub diagonal_pan_margin: f64,

    /// Largest allowed scale from a crop window to the output canvas.
    pub max_upscale: f64,

    /// Frames rendered concurrently per batch (1 = sequential).
    pub frame_batch_size: usize,

    /// Fill color for letterbox bars.
    pub letterbox_color: [u8; 4],
}

/// External encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    pub video_codec: String,
    pub preset: String,
    pub crf: u32,
    pub pixel_format: String,
    pub audio_codec: String,
    pub audio_bitrate_kbps: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "newsframe=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs_default_output(),
            fonts: FontConfig::default(),
            brand: BrandConfig::default(),
            render: RenderSettings::default(),
            encoder: EncoderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            regular: vec![
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
                PathBuf::from("/usr/share/fonts/TTF/DejaVuSans.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf"),
                PathBuf::from("/Library/Fonts/Arial.ttf"),
                PathBuf::from("/System/Library/Fonts/Supplemental/Arial.ttf"),
            ],
            bold: vec![
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/TTF/DejaVuSans-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf"),
                PathBuf::from("/Library/Fonts/Arial Bold.ttf"),
                PathBuf::from("/System/Library/Fonts/Supplemental/Arial Bold.ttf"),
            ],
        }
    }
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            watermark_text: "diarioeldia.cl".to_string(),
            text_color: [0, 0, 0, 255],
            highlight_color: [0, 64, 145, 255],
            panel_color: [255, 255, 255, 230],
            watermark_color: [255, 255, 255, 150],
            logo_scale: 0.10,
            logo_anchor: LogoAnchor::TopRight,
            logo_margin_px: 10,
            panel_padding_x: 20,
            panel_padding_y: 10,
            line_spacing: 8,
            bottom_margin: 20,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            video_width: 1080,
            video_height: 1920,
            instagram_width: 1080,
            instagram_height: 1350,
            min_canvas_width: 640,
            min_canvas_height: 360,
            zoom_factor: 1.2,
            axis_pan_margin: 1.25,
            diagonal_pan_margin: 1.20,
            max_upscale: 4.0,
            frame_batch_size: 8,
            letterbox_color: [0, 0, 0, 255],
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate_kbps: 192,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Missing fields take defaults.
    pub fn load_from(path: &Path) -> NewsframeResult<Self> {
        if !path.exists() {
            return Err(NewsframeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config as pretty JSON at `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> NewsframeResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject settings the renderer cannot work with.
    pub fn validate(&self) -> NewsframeResult<()> {
        let r = &self.render;
        if r.video_width == 0 || r.video_height == 0 {
            return Err(NewsframeError::config("video canvas must be non-empty"));
        }
        if r.instagram_width == 0 || r.instagram_height == 0 {
            return Err(NewsframeError::config("instagram canvas must be non-empty"));
        }
        if r.zoom_factor < 1.0 {
            return Err(NewsframeError::config("zoom_factor must be >= 1.0"));
        }
        if r.axis_pan_margin < 1.0 || r.diagonal_pan_margin < 1.0 {
            return Err(NewsframeError::config("pan margins must be >= 1.0"));
        }
        if r.max_upscale < 1.0 {
            return Err(NewsframeError::config("max_upscale must be >= 1.0"));
        }
        if !(0.0..=1.0).contains(&self.brand.logo_scale) {
            return Err(NewsframeError::config("logo_scale must be within [0, 1]"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("newsframe").join("config.json")
}

/// Default output directory.
fn dirs_default_output() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("newsframe").join("output")
}
