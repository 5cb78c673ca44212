//! The static overlay drawn over every output: watermark strip, logo, and
//! the headline on per-line panels.
//!
//! The overlay is rendered once into a transparent layer the size of the
//! output canvas and alpha-composited onto the base image (or onto every
//! video frame).

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use newsframe_common::config::{BrandConfig, LogoAnchor};
use newsframe_common::error::NewsframeResult;
use newsframe_model::geometry::{PixelRect, Size};
use newsframe_model::request::RenderMode;
use newsframe_model::style::{Color, Palette};
use newsframe_processing_core::text_layout::{
    FontMetrics, LayoutConfig, TextLayout, TextLayoutEngine,
};

use crate::fonts::FontSet;

/// Size-dependent overlay measurements for one canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMetrics {
    /// Headline font size in pixels.
    pub font_px: f32,

    /// Watermark font size in pixels.
    pub watermark_px: f32,

    /// Width of the watermark strip along the left edge.
    pub bar_width: u32,

    /// Width the headline is centered in, right of the strip.
    pub text_area_width: u32,
}

impl OverlayMetrics {
    pub fn for_canvas(canvas: Size, mode: RenderMode) -> Self {
        let (w, h) = (canvas.width as f64, canvas.height as f64);
        let (font_factor, watermark_factor, bar_factor, text_margin) = match mode {
            RenderMode::Horizontal => (0.06, 0.03, 0.07, 20),
            RenderMode::Instagram | RenderMode::Video => (0.038, 0.022, 0.05, 10),
        };
        let bar_width = (w * bar_factor).floor() as u32;
        Self {
            font_px: (h * font_factor).floor().max(12.0) as f32,
            watermark_px: (h * watermark_factor).floor().max(8.0) as f32,
            bar_width,
            text_area_width: canvas
                .width
                .saturating_sub(bar_width)
                .saturating_sub(text_margin)
                .max(1),
        }
    }
}

/// A rendered overlay layer.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Transparent RGBA layer with the canvas size.
    pub layer: RgbaImage,

    pub metrics: OverlayMetrics,

    pub layout: TextLayout,

    /// One panel per layout line, top to bottom.
    pub panels: Vec<PixelRect>,
}

impl Overlay {
    /// Alpha-composite the layer onto `base` at the origin.
    pub fn apply(&self, base: &mut RgbaImage) {
        imageops::overlay(base, &self.layer, 0, 0);
    }

    /// Top edge of the headline band.
    pub fn band_top(&self) -> Option<u32> {
        self.panels.first().map(|panel| panel.y)
    }
}

/// Draws overlays with the brand style.
pub struct OverlayRenderer<'a> {
    fonts: &'a FontSet,
    brand: &'a BrandConfig,
}

impl<'a> OverlayRenderer<'a> {
    pub fn new(fonts: &'a FontSet, brand: &'a BrandConfig) -> Self {
        Self { fonts, brand }
    }

    /// Render the overlay for a `canvas`-sized output.
    ///
    /// Layout runs first so a missing highlight fails before any drawing.
    pub fn render(
        &self,
        canvas: Size,
        mode: RenderMode,
        headline: &str,
        highlight: &str,
        logo: Option<&RgbaImage>,
    ) -> NewsframeResult<Overlay> {
        let metrics = OverlayMetrics::for_canvas(canvas, mode);
        let faces = self.fonts.at_size(metrics.font_px);
        let pad_x = self.brand.panel_padding_x as f32;
        let pad_y = self.brand.panel_padding_y as f32;

        // Panels are stacked with padding on both sides of every line, so
        // the gap between line boxes includes both paddings.
        let layout_config = LayoutConfig {
            line_spacing: self.brand.line_spacing as f32 + 2.0 * pad_y,
            palette: Palette {
                text: Color::from(self.brand.text_color),
                highlight: Color::from(self.brand.highlight_color),
            },
            ..LayoutConfig::default()
        };
        let layout = TextLayoutEngine::new(&faces.regular, &faces.bold)
            .with_config(layout_config)
            .layout(headline, highlight, metrics.text_area_width as f32)?;

        let mut layer = RgbaImage::new(canvas.width, canvas.height);
        self.draw_watermark(&mut layer, &metrics);
        if let Some(logo) = logo {
            self.draw_logo(&mut layer, logo, &metrics);
        }

        let band_height = layout.total_height() + 2.0 * pad_y;
        let band_top =
            canvas.height as f32 - band_height - self.brand.bottom_margin as f32;
        let panel_color: Rgba<u8> = Color::from(self.brand.panel_color).into();

        let mut panels = Vec::with_capacity(layout.lines.len());
        for line in &layout.lines {
            if line.is_empty() {
                continue;
            }
            let panel_x = metrics.bar_width as f32 + line.x_offset - pad_x;
            let panel_y = band_top + line.top;
            let panel_w = line.width + 2.0 * pad_x;
            let panel_h = layout.line_height + 2.0 * pad_y;

            let rect = Rect::at(panel_x.round() as i32, panel_y.round() as i32)
                .of_size(panel_w.round().max(1.0) as u32, panel_h.round().max(1.0) as u32);
            draw_filled_rect_mut(&mut layer, rect, panel_color);
            panels.push(clip_rect(rect, canvas));

            for segment in &line.segments {
                let face = if segment.bold { &faces.bold } else { &faces.regular };
                let x = metrics.bar_width as f32 + line.x_offset + segment.x;
                let baseline = band_top + pad_y + layout.segment_baseline(line, segment);
                face.draw_text(&mut layer, &segment.text, x, baseline, segment.color.into());
            }
        }

        tracing::debug!(
            mode = %mode,
            canvas = %canvas,
            font_px = metrics.font_px,
            lines = layout.lines.len(),
            "Overlay rendered"
        );

        Ok(Overlay {
            layer,
            metrics,
            layout,
            panels,
        })
    }

    /// Repeated brand text running up the left edge.
    fn draw_watermark(&self, layer: &mut RgbaImage, metrics: &OverlayMetrics) {
        let text = self.brand.watermark_text.trim();
        if text.is_empty() || metrics.bar_width == 0 {
            return;
        }
        let face = self.fonts.at_size(metrics.watermark_px).regular;

        let phrase = format!("{text}   ");
        let phrase_width = face.run_width(&phrase).max(1.0);
        let repeats = (layer.height() as f32 / phrase_width) as usize + 3;
        let strip_text = phrase.repeat(repeats);

        // Drawn horizontally along the canvas height, then turned a quarter
        // counter-clockwise so it reads bottom to top.
        let mut strip = RgbaImage::new(layer.height(), metrics.bar_width);
        let glyph_height = face.ascent() - face.descent();
        let baseline = (metrics.bar_width as f32 - glyph_height) / 2.0 + face.ascent();
        let color: Rgba<u8> = Color::from(self.brand.watermark_color).into();
        face.draw_text(&mut strip, &strip_text, 0.0, baseline, color);

        let vertical = imageops::rotate270(&strip);
        imageops::overlay(layer, &vertical, 0, 0);
    }

    fn draw_logo(&self, layer: &mut RgbaImage, logo: &RgbaImage, metrics: &OverlayMetrics) {
        if logo.width() == 0 || logo.height() == 0 {
            return;
        }
        let logo_w = (layer.width() as f64 * self.brand.logo_scale).floor() as u32;
        let logo_h = (logo_w as f64 * logo.height() as f64 / logo.width() as f64).floor() as u32;
        if logo_w == 0 || logo_h == 0 {
            tracing::warn!(logo_w, logo_h, "Logo scales to nothing, skipping");
            return;
        }

        let resized = imageops::resize(logo, logo_w, logo_h, FilterType::Lanczos3);
        let margin = self.brand.logo_margin_px as i64;
        let x = match self.brand.logo_anchor {
            LogoAnchor::TopRight => layer.width() as i64 - logo_w as i64 - margin,
            LogoAnchor::TopLeft => metrics.bar_width as i64 + margin,
        };
        imageops::overlay(layer, &resized, x, margin);
    }
}

fn clip_rect(rect: Rect, canvas: Size) -> PixelRect {
    let x0 = rect.left().clamp(0, canvas.width as i32) as u32;
    let y0 = rect.top().clamp(0, canvas.height as i32) as u32;
    let x1 = (rect.right() + 1).clamp(0, canvas.width as i32) as u32;
    let y1 = (rect.bottom() + 1).clamp(0, canvas.height as i32) as u32;
    PixelRect {
        x: x0,
        y: y0,
        width: x1.saturating_sub(x0),
        height: y1.saturating_sub(y0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsframe_common::error::NewsframeError;

    fn brand() -> BrandConfig {
        BrandConfig::default()
    }

    #[test]
    fn test_metrics_per_mode() {
        let horizontal = OverlayMetrics::for_canvas(Size::new(1200, 800), RenderMode::Horizontal);
        assert_eq!(horizontal.font_px, 48.0);
        assert_eq!(horizontal.bar_width, 84);
        assert_eq!(horizontal.text_area_width, 1200 - 84 - 20);

        let insta = OverlayMetrics::for_canvas(Size::new(1080, 1350), RenderMode::Instagram);
        assert_eq!(insta.font_px, 51.0);
        assert_eq!(insta.bar_width, 54);
        assert_eq!(insta.text_area_width, 1080 - 54 - 10);

        let tiny = OverlayMetrics::for_canvas(Size::new(50, 50), RenderMode::Video);
        assert_eq!(tiny.font_px, 12.0);
        assert_eq!(tiny.watermark_px, 8.0);
    }

    #[test]
    fn test_panels_sit_in_lower_band_right_of_strip() {
        let fonts = FontSet::builtin();
        let brand = brand();
        let canvas = Size::new(1080, 1350);
        let overlay = OverlayRenderer::new(&fonts, &brand)
            .render(
                canvas,
                RenderMode::Instagram,
                "Alerta en Argentina por brote de sarampión en varias provincias del norte",
                "Argentina",
                None,
            )
            .unwrap();

        assert!(overlay.layout.lines.len() > 1);
        assert_eq!(overlay.panels.len(), overlay.layout.lines.len());
        let last = overlay.panels.last().unwrap();
        assert!(last.y + last.height <= canvas.height - brand.bottom_margin + 1);
        assert!(overlay.band_top().unwrap() > canvas.height / 2);
        for panel in &overlay.panels {
            assert!(panel.x >= overlay.metrics.bar_width - brand.panel_padding_x);
        }
        // Panels stack downward without overlapping.
        for pair in overlay.panels.windows(2) {
            assert!(pair[1].y >= pair[0].y + pair[0].height);
        }
    }

    #[test]
    fn test_layer_is_transparent_outside_drawn_areas() {
        let fonts = FontSet::builtin();
        let brand = brand();
        let overlay = OverlayRenderer::new(&fonts, &brand)
            .render(Size::new(800, 600), RenderMode::Horizontal, "Hola", "", None)
            .unwrap();
        // Center of the canvas, above the band and right of the strip.
        assert_eq!(overlay.layer.get_pixel(400, 100)[3], 0);
        // The panel is opaque-ish white.
        let panel = overlay.panels[0];
        let p = overlay.layer.get_pixel(panel.x + 2, panel.y + 2);
        assert_eq!(p[3], 230);
    }

    #[test]
    fn test_watermark_marks_strip() {
        let fonts = FontSet::builtin();
        let brand = brand();
        let overlay = OverlayRenderer::new(&fonts, &brand)
            .render(Size::new(800, 600), RenderMode::Horizontal, "Hola", "", None)
            .unwrap();
        let bar = overlay.metrics.bar_width;
        let strip_alpha = (0..600)
            .flat_map(|y| (0..bar).map(move |x| (x, y)))
            .filter(|&(x, y)| overlay.layer.get_pixel(x, y)[3] > 0)
            .count();
        assert!(strip_alpha > 0);
    }

    #[test]
    fn test_logo_top_right() {
        let fonts = FontSet::builtin();
        let brand = brand();
        let logo = RgbaImage::from_pixel(200, 100, Rgba([255, 0, 0, 255]));
        let overlay = OverlayRenderer::new(&fonts, &brand)
            .render(Size::new(1000, 800), RenderMode::Horizontal, "Hola", "", Some(&logo))
            .unwrap();
        // 10% of the width, aspect kept: 100x50 at (890, 10).
        let inside = overlay.layer.get_pixel(940, 35);
        assert!(inside[0] > 250 && inside[1] < 5 && inside[3] > 250);
        assert_eq!(overlay.layer.get_pixel(880, 35)[3], 0);
    }

    #[test]
    fn test_missing_highlight_fails_before_drawing() {
        let fonts = FontSet::builtin();
        let brand = brand();
        let err = OverlayRenderer::new(&fonts, &brand)
            .render(Size::new(800, 600), RenderMode::Horizontal, "Hola", "Chao", None)
            .unwrap_err();
        assert!(matches!(err, NewsframeError::Layout { .. }));
    }
}
