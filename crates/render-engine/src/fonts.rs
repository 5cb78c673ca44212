//! Font resolution and glyph rasterization.
//!
//! Candidate paths from [`FontConfig`] are tried in order, once, when a
//! [`FontSet`] is built. If no candidate loads, a built-in block face keeps
//! rendering possible on hosts without any TrueType fonts.

use std::path::{Path, PathBuf};

use image::{Pixel, Rgba, RgbaImage};
use newsframe_common::config::FontConfig;
use newsframe_common::error::{NewsframeError, NewsframeResult};
use newsframe_processing_core::text_layout::FontMetrics;
use rusttype::{point, Font, Scale};

/// A loaded TrueType font and where it came from.
#[derive(Clone)]
struct LoadedFont {
    font: Font<'static>,
    source: Option<PathBuf>,
}

/// Regular and bold faces, resolved once and sized per render.
#[derive(Clone, Default)]
pub struct FontSet {
    regular: Option<LoadedFont>,
    bold: Option<LoadedFont>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("regular", &self.regular_source())
            .field("bold", &self.bold_source())
            .finish()
    }
}

impl FontSet {
    /// Resolve the first loadable candidate of each list.
    pub fn resolve(config: &FontConfig) -> Self {
        let regular = first_loadable(&config.regular, "regular");
        let bold = first_loadable(&config.bold, "bold");

        match (&regular, &bold) {
            (None, None) => {
                tracing::warn!("No font candidate could be loaded, using built-in block face")
            }
            (Some(_), None) => tracing::warn!("No bold font found, bold runs use the regular face"),
            (None, Some(_)) => tracing::warn!("No regular font found, using the bold face"),
            (Some(_), Some(_)) => {}
        }

        Self { regular, bold }
    }

    /// Only the built-in block face.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Faces from in-memory TrueType data.
    pub fn from_bytes(regular: Vec<u8>, bold: Vec<u8>) -> NewsframeResult<Self> {
        let parse = |data: Vec<u8>, which: &str| {
            Font::try_from_vec(data)
                .map(|font| LoadedFont { font, source: None })
                .ok_or_else(|| NewsframeError::font(format!("{which} font data is not a valid font")))
        };
        Ok(Self {
            regular: Some(parse(regular, "regular")?),
            bold: Some(parse(bold, "bold")?),
        })
    }

    pub fn is_builtin(&self) -> bool {
        self.regular.is_none() && self.bold.is_none()
    }

    /// Human-readable origin of the regular face.
    pub fn regular_source(&self) -> String {
        describe(self.regular.as_ref().or(self.bold.as_ref()))
    }

    /// Human-readable origin of the bold face.
    pub fn bold_source(&self) -> String {
        describe(self.bold.as_ref().or(self.regular.as_ref()))
    }

    /// Both faces at `px` pixels.
    pub fn at_size(&self, px: f32) -> FontPair {
        let px = px.max(1.0);
        let face = |primary: Option<&LoadedFont>, fallback: Option<&LoadedFont>, bold: bool| {
            match primary.or(fallback) {
                Some(loaded) => FontFace::Truetype {
                    font: loaded.font.clone(),
                    scale: Scale::uniform(px),
                },
                None => FontFace::Builtin { px, bold },
            }
        };
        FontPair {
            regular: face(self.regular.as_ref(), self.bold.as_ref(), false),
            bold: face(self.bold.as_ref(), self.regular.as_ref(), true),
        }
    }
}

fn describe(font: Option<&LoadedFont>) -> String {
    match font {
        Some(LoadedFont {
            source: Some(path), ..
        }) => path.display().to_string(),
        Some(LoadedFont { source: None, .. }) => "in-memory".to_string(),
        None => "built-in".to_string(),
    }
}

fn first_loadable(candidates: &[PathBuf], which: &str) -> Option<LoadedFont> {
    candidates.iter().find_map(|path| match load_font(path) {
        Ok(font) => {
            tracing::debug!(path = %path.display(), which, "Font resolved");
            Some(LoadedFont {
                font,
                source: Some(path.clone()),
            })
        }
        Err(NewsframeError::FileNotFound { .. }) => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), which, error = %e, "Skipping font candidate");
            None
        }
    })
}

fn load_font(path: &Path) -> NewsframeResult<Font<'static>> {
    if !path.exists() {
        return Err(NewsframeError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let data = std::fs::read(path)?;
    Font::try_from_vec(data)
        .ok_or_else(|| NewsframeError::font(format!("{} is not a valid font", path.display())))
}

/// One face at one size.
#[derive(Clone)]
pub enum FontFace {
    Truetype { font: Font<'static>, scale: Scale },
    /// Filled boxes with proportional metrics.
    Builtin { px: f32, bold: bool },
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truetype { scale, .. } => write!(f, "Truetype({}px)", scale.y),
            Self::Builtin { px, bold } => write!(f, "Builtin({px}px, bold: {bold})"),
        }
    }
}

impl FontFace {
    pub fn px(&self) -> f32 {
        match self {
            Self::Truetype { scale, .. } => scale.y,
            Self::Builtin { px, .. } => *px,
        }
    }

    /// Draw `text` with its first glyph origin at `(x, baseline)`.
    ///
    /// Coverage is alpha-blended over existing pixels; anything outside the
    /// canvas is clipped.
    pub fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: f32,
        baseline: f32,
        color: Rgba<u8>,
    ) {
        match self {
            Self::Truetype { font, scale } => {
                let mut caret = x;
                for ch in text.chars() {
                    let glyph = font.glyph(ch).scaled(*scale);
                    let advance = glyph.h_metrics().advance_width;
                    let glyph = glyph.positioned(point(caret, baseline));
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        glyph.draw(|gx, gy, coverage| {
                            blend_at(
                                canvas,
                                bb.min.x + gx as i32,
                                bb.min.y + gy as i32,
                                color,
                                coverage,
                            );
                        });
                    }
                    caret += advance;
                }
            }
            Self::Builtin { .. } => {
                let mut caret = x;
                let top = (baseline - self.ascent() * 0.9).round() as i32;
                let bottom = baseline.round() as i32;
                for ch in text.chars() {
                    let advance = self.advance(ch);
                    if !ch.is_whitespace() {
                        let left = (caret + advance * 0.1).round() as i32;
                        let right = (caret + advance * 0.9).round() as i32;
                        for py in top..bottom {
                            for px in left..right {
                                blend_at(canvas, px, py, color, 1.0);
                            }
                        }
                    }
                    caret += advance;
                }
            }
        }
    }
}

impl FontMetrics for FontFace {
    fn ascent(&self) -> f32 {
        match self {
            Self::Truetype { font, scale } => font.v_metrics(*scale).ascent,
            Self::Builtin { px, .. } => px * 0.78,
        }
    }

    fn descent(&self) -> f32 {
        match self {
            Self::Truetype { font, scale } => font.v_metrics(*scale).descent,
            Self::Builtin { px, .. } => -px * 0.22,
        }
    }

    fn advance(&self, ch: char) -> f32 {
        match self {
            Self::Truetype { font, scale } => font.glyph(ch).scaled(*scale).h_metrics().advance_width,
            Self::Builtin { px, bold } => {
                if ch.is_whitespace() {
                    px * 0.3
                } else if *bold {
                    px * 0.62
                } else {
                    px * 0.55
                }
            }
        }
    }
}

/// A regular and a bold face at the same size.
#[derive(Debug, Clone)]
pub struct FontPair {
    pub regular: FontFace,
    pub bold: FontFace,
}

fn blend_at(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let alpha = (color[3] as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
    if alpha == 0 {
        return;
    }
    let src = Rgba([color[0], color[1], color[2], alpha]);
    canvas.get_pixel_mut(x as u32, y as u32).blend(&src);
}
