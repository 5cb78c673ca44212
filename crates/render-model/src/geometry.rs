//! Image sizes, crop windows, and regions of interest.

use std::str::FromStr;

use newsframe_common::error::NewsframeError;
use serde::{Deserialize, Serialize};

/// Pixel dimensions of an image or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. Zero for an empty size.
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A rectangular window in source-image pixel space.
///
/// `(0.0, 0.0)` is the top-left pixel corner. A valid window for an image
/// of size `W x H` satisfies `0 <= x`, `0 <= y`, `x + width <= W` and
/// `y + height <= H`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropWindow {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Tolerance for floating-point bound checks, in pixels.
const BOUNDS_EPSILON: f64 = 1e-6;

impl CropWindow {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The window covering a whole image.
    pub fn full(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width as f64, size.height as f64)
    }

    /// A `width x height` window centered inside `size`.
    pub fn centered_in(size: Size, width: f64, height: f64) -> Self {
        Self::new(
            (size.width as f64 - width) / 2.0,
            (size.height as f64 - height) / 2.0,
            width,
            height,
        )
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn aspect(&self) -> f64 {
        if self.height <= 0.0 {
            return 0.0;
        }
        self.width / self.height
    }

    /// Whether the window has positive area and lies inside `size`.
    pub fn is_within(&self, size: Size) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.x >= -BOUNDS_EPSILON
            && self.y >= -BOUNDS_EPSILON
            && self.right() <= size.width as f64 + BOUNDS_EPSILON
            && self.bottom() <= size.height as f64 + BOUNDS_EPSILON
    }

    /// Same center, dimensions divided by `factor`.
    pub fn shrunk_about_center(&self, factor: f64) -> Self {
        let (cx, cy) = self.center();
        let w = self.width / factor;
        let h = self.height / factor;
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    /// Linearly interpolate between two windows.
    pub fn lerp(a: &CropWindow, b: &CropWindow, t: f64) -> CropWindow {
        let t = t.clamp(0.0, 1.0);
        CropWindow {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            width: a.width + (b.width - a.width) * t,
            height: a.height + (b.height - a.height) * t,
        }
    }

    /// Round to whole pixels, clamped to `bounds`. Width and height are at
    /// least one pixel.
    pub fn to_pixel_rect(&self, bounds: Size) -> PixelRect {
        let max_w = bounds.width.max(1);
        let max_h = bounds.height.max(1);
        let x = (self.x.round().max(0.0) as u32).min(max_w - 1);
        let y = (self.y.round().max(0.0) as u32).min(max_h - 1);
        let width = (self.width.round().max(1.0) as u32).min(max_w - x);
        let height = (self.height.round().max(1.0) as u32).min(max_h - y);
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}

/// An integer pixel rectangle, ready for cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A region of interest in normalized `[0, 1]` image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRoi {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl NormalizedRoi {
    /// The whole image.
    pub const FULL: NormalizedRoi = NormalizedRoi {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

impl FromStr for NormalizedRoi {
    type Err = NewsframeError;

    /// Parse `"x,y,w,h"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| NewsframeError::invalid_roi(format!("cannot parse {s:?}: {e}")))?;

        match parts.as_slice() {
            [x, y, w, h] => Ok(Self::new(*x, *y, *w, *h)),
            _ => Err(NewsframeError::invalid_roi(format!(
                "expected 4 comma-separated values, got {}",
                parts.len()
            ))),
        }
    }
}

/// How an aspect-fitted box is positioned inside a larger window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CropAnchor {
    #[default]
    Center,
    Top,
    TopLeft,
}

impl FromStr for CropAnchor {
    type Err = NewsframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(Self::Center),
            "top" => Ok(Self::Top),
            "top-left" | "topleft" => Ok(Self::TopLeft),
            other => Err(NewsframeError::unsupported(format!(
                "unknown crop anchor {other:?} (use center, top, top-left)"
            ))),
        }
    }
}
